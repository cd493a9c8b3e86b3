mod variable;
mod objective;
mod constraint;
mod problem;
mod assemble;

pub use variable::{Domain, Variable};
pub use objective::{Objective, StandardObjective};
pub use constraint::{Constraint, ConstraintKind};
pub use problem::{ConvexProblem, ProblemClass};
pub use assemble::assemble_problem;

#[cfg(test)]
mod tests;
