//! Long-only portfolio allocation, checked against the reference weights.

use cvxcheck_harness::{run_main, HarnessConfig};
use cvxcheck_instance::{Dimensions, ReturnVector};

fn main() -> anyhow::Result<()> {
    run_main(HarnessConfig::for_problem(Dimensions::portfolio(ReturnVector::Mu1)))
}
