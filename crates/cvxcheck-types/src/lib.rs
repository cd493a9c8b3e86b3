mod error;
mod solution;

pub use error::{CheckError, Result};
pub use solution::{ObjectiveValue, SolveResult, SolveStatus};

#[cfg(test)]
mod tests;
