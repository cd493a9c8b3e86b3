use cvxcheck_model::ConvexProblem;
use cvxcheck_types::{Result, SolveResult};
use serde::{Deserialize, Serialize};

use crate::admm_backend::AdmmBackend;
use crate::clarabel_backend::ClarabelBackend;

/// Which backend solves the problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverChoice {
    /// Interior-point conic solver (LP, QP, SOCP)
    Clarabel,
    /// Operator-splitting QP solver (LP, QP)
    Admm,
}

impl SolverChoice {
    pub fn name(&self) -> &'static str {
        match self {
            SolverChoice::Clarabel => "clarabel",
            SolverChoice::Admm => "admm",
        }
    }
}

/// Backend settings; each backend reads the fields that apply to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub verbose: bool,
    pub max_iter: u32,
    /// Absolute tolerance (gap and feasibility)
    pub eps_abs: f64,
    /// Relative tolerance (gap and feasibility)
    pub eps_rel: f64,
    /// Tolerance for infeasibility certificates
    pub eps_infeasible: f64,
    /// ADMM step size
    pub rho: f64,
    /// ADMM proximal regularization
    pub sigma: f64,
    /// ADMM over-relaxation
    pub alpha: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            verbose: false,
            max_iter: 20_000,
            eps_abs: 1e-7,
            eps_rel: 1e-7,
            eps_infeasible: 1e-6,
            rho: 0.1,
            sigma: 1e-6,
            alpha: 1.6,
        }
    }
}

/// Injected solve capability.
///
/// Infeasible, unbounded and iteration-limited runs are returned as a
/// result carrying a sentinel value. `Err` is reserved for problems the
/// backend refuses (not convex, unsupported constraint kinds) and for
/// unexpected internal failures.
pub trait SolverBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, problem: &ConvexProblem) -> Result<SolveResult>;
}

pub fn backend_for(choice: SolverChoice, settings: &SolverSettings) -> Box<dyn SolverBackend> {
    match choice {
        SolverChoice::Clarabel => Box::new(ClarabelBackend::with_settings(settings.clone())),
        SolverChoice::Admm => Box::new(AdmmBackend::with_settings(settings.clone())),
    }
}
