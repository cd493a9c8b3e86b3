//! Steer a two-state plant to the origin under state and input limits.

use cvxcheck_harness::{run_main, HarnessConfig};
use cvxcheck_instance::Dimensions;

fn main() -> anyhow::Result<()> {
    run_main(HarnessConfig::for_problem(Dimensions::mpc()))
}
