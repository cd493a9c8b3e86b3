//! Random least-squares fit, checked against its own residual.

use cvxcheck_harness::{run_main, HarnessConfig};
use cvxcheck_instance::Dimensions;

fn main() -> anyhow::Result<()> {
    run_main(HarnessConfig::for_problem(Dimensions::least_squares()))
}
