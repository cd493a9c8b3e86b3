//! Fixed LP checked against its recorded optimal cost.

use cvxcheck_harness::{run_main, HarnessConfig};
use cvxcheck_instance::Dimensions;

fn main() -> anyhow::Result<()> {
    run_main(HarnessConfig::for_problem(Dimensions::Linear))
}
