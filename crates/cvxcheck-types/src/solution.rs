use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Termination status reported by a solver backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    Optimal,
    OptimalInaccurate,
    PrimalInfeasible,
    DualInfeasible,
    MaxIterations,
    NumericalError,
    Unsolved,
}

impl SolveStatus {
    /// True when the returned primal point can be trusted as a solution
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::OptimalInaccurate)
    }

    pub fn description(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "Optimal solution found.",
            SolveStatus::OptimalInaccurate => {
                "Optimal solution found subject to reduced tolerances."
            }
            SolveStatus::PrimalInfeasible => "Certificate of primal infeasibility found.",
            SolveStatus::DualInfeasible => "Certificate of dual infeasibility found.",
            SolveStatus::MaxIterations => "Maximum number of iterations reached.",
            SolveStatus::NumericalError => "Numerical problems in solver.",
            SolveStatus::Unsolved => "Problem not solved yet.",
        }
    }
}

/// Optimal objective value, or the sentinel for a run without one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObjectiveValue {
    Optimal(f64),
    Infeasible,
    Unbounded,
    SolverError(SolveStatus),
}

impl ObjectiveValue {
    /// Map a backend status and its objective onto a reportable value
    pub fn from_status(status: SolveStatus, objective: f64) -> Self {
        match status {
            SolveStatus::Optimal | SolveStatus::OptimalInaccurate => {
                ObjectiveValue::Optimal(objective)
            }
            SolveStatus::PrimalInfeasible => ObjectiveValue::Infeasible,
            SolveStatus::DualInfeasible => ObjectiveValue::Unbounded,
            other => ObjectiveValue::SolverError(other),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            ObjectiveValue::Optimal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, ObjectiveValue::Infeasible)
    }
}

impl fmt::Display for ObjectiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveValue::Optimal(v) => write!(f, "{}", v),
            ObjectiveValue::Infeasible => write!(f, "infeasible"),
            ObjectiveValue::Unbounded => write!(f, "unbounded"),
            ObjectiveValue::SolverError(status) => write!(f, "solver error ({:?})", status),
        }
    }
}

/// Outcome of exactly one solve call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResult {
    pub status: SolveStatus,
    pub value: ObjectiveValue,
    /// Resolved variable; `None` unless the status carries a solution
    pub x: Option<Vec<f64>>,
    /// Dual values keyed by constraint name
    pub duals: BTreeMap<String, Vec<f64>>,
    pub iterations: usize,
    pub backend: String,
}

impl SolveResult {
    /// Result for a run that ended without a usable point
    pub fn without_solution(status: SolveStatus, iterations: usize, backend: &str) -> Self {
        SolveResult {
            status,
            value: ObjectiveValue::from_status(status, f64::NAN),
            x: None,
            duals: BTreeMap::new(),
            iterations,
            backend: backend.to_string(),
        }
    }

    pub fn dual(&self, constraint: &str) -> Option<&[f64]> {
        self.duals.get(constraint).map(|d| d.as_slice())
    }
}
