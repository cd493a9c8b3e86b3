//! Factor-model portfolio posed with second-order cones.

use cvxcheck_harness::{run_main, HarnessConfig};
use cvxcheck_instance::{Dimensions, ReturnVector};

fn main() -> anyhow::Result<()> {
    run_main(HarnessConfig::for_problem(Dimensions::portfolio_socp(
        ReturnVector::Mu1,
    )))
}
