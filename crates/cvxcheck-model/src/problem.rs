use cvxcheck_types::{CheckError, Result};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::constraint::Constraint;
use crate::objective::Objective;
use crate::variable::Variable;

/// Problem class, used to pick a suitable backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemClass {
    Lp,
    Qp,
    Socp,
}

/// Assembled problem: one vector variable, one objective, named constraints
#[derive(Debug, Clone)]
pub struct ConvexProblem {
    pub variable: Variable,
    pub objective: Objective,
    pub constraints: Vec<Constraint>,
}

impl ConvexProblem {
    pub fn new(variable: Variable, objective: Objective, constraints: Vec<Constraint>) -> Self {
        ConvexProblem {
            variable,
            objective,
            constraints,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.variable.len
    }

    /// Total constraint rows, domain restriction excluded
    pub fn num_constraint_rows(&self) -> usize {
        self.constraints.iter().map(|c| c.num_rows()).sum()
    }

    pub fn class(&self) -> ProblemClass {
        if self.constraints.iter().any(|c| c.is_cone()) {
            ProblemClass::Socp
        } else if self.objective.is_linear() {
            ProblemClass::Lp
        } else {
            ProblemClass::Qp
        }
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Shape and data consistency; convexity is left to the backend
    pub fn validate(&self) -> Result<()> {
        let n = self.num_vars();
        if n == 0 {
            return Err(CheckError::Dimension(format!(
                "variable '{}' has no elements",
                self.variable.name
            )));
        }

        if self.objective.num_vars() != n {
            return Err(CheckError::Dimension(format!(
                "objective is posed over {} variables, '{}' has {}",
                self.objective.num_vars(),
                self.variable.name,
                n
            )));
        }
        if let Objective::SumSquares { a, b } = &self.objective {
            if a.nrows() != b.len() {
                return Err(CheckError::Dimension(format!(
                    "objective: A has {} rows but b has {}",
                    a.nrows(),
                    b.len()
                )));
            }
        }
        if let Objective::Quadratic { p, .. } = &self.objective {
            if p.shape() != (n, n) {
                return Err(CheckError::Dimension(format!(
                    "objective: P must be {}x{}, got {}x{}",
                    n,
                    n,
                    p.nrows(),
                    p.ncols()
                )));
            }
        }
        if self.objective.coefficients().iter().any(|v| !v.is_finite()) {
            return Err(CheckError::Config("objective has non-finite coefficients".to_string()));
        }

        let mut names = BTreeSet::new();
        for constraint in &self.constraints {
            if !names.insert(constraint.name.as_str()) {
                return Err(CheckError::Config(format!(
                    "duplicate constraint name '{}'",
                    constraint.name
                )));
            }
            constraint.validate(n)?;
            if constraint.coefficients().iter().any(|v| v.is_nan() || v.is_infinite()) {
                return Err(CheckError::Config(format!(
                    "constraint '{}' has non-finite coefficients",
                    constraint.name
                )));
            }
        }

        Ok(())
    }

    /// Objective value at `x`, including any constant term
    pub fn evaluate(&self, x: &DVector<f64>) -> f64 {
        self.objective.evaluate(x)
    }

    /// Largest violation over the domain and all constraints
    pub fn max_violation(&self, x: &DVector<f64>) -> f64 {
        self.constraints
            .iter()
            .map(|c| c.violation(x))
            .fold(self.variable.domain_violation(x), f64::max)
    }
}

impl fmt::Display for ConvexProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Minimize {}", self.objective)?;
        writeln!(
            f,
            "Over {} ({} elements, {:?})",
            self.variable.name, self.variable.len, self.variable.domain
        )?;
        if self.constraints.is_empty() {
            return write!(f, "Unconstrained");
        }
        write!(f, "Subject to")?;
        for constraint in &self.constraints {
            write!(f, "\n  {}", constraint)?;
        }
        Ok(())
    }
}
