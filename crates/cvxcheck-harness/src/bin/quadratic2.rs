//! Random QP with inequality and equality constraints; prints the inequality duals.

use cvxcheck_harness::{run_main, HarnessConfig};
use cvxcheck_instance::Dimensions;

fn main() -> anyhow::Result<()> {
    run_main(HarnessConfig::for_problem(Dimensions::random_quadratic()))
}
