mod backend;
mod standard_form;
mod clarabel_backend;
mod admm_backend;

pub use backend::{backend_for, SolverBackend, SolverChoice, SolverSettings};
pub use standard_form::check_convex;
pub use clarabel_backend::ClarabelBackend;
pub use admm_backend::AdmmBackend;

#[cfg(test)]
mod tests;
