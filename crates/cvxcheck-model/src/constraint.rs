use cvxcheck_types::{CheckError, Result};
use nalgebra::{DMatrix, DVector};
use std::fmt;

/// Relation over the decision variable
#[derive(Debug, Clone)]
pub enum ConstraintKind {
    /// A x == b
    Equality { a: DMatrix<f64>, b: DVector<f64> },
    /// G x <= h
    Inequality { g: DMatrix<f64>, h: DVector<f64> },
    /// l <= A x <= u
    Range {
        a: DMatrix<f64>,
        l: DVector<f64>,
        u: DVector<f64>,
    },
    /// ||A x + b||_2 <= c'x + d
    NormCone {
        a: DMatrix<f64>,
        b: DVector<f64>,
        c: DVector<f64>,
        d: f64,
    },
}

/// Named constraint; the name keys its dual value in the solve result
#[derive(Debug, Clone)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
}

impl Constraint {
    pub fn equality(name: &str, a: DMatrix<f64>, b: DVector<f64>) -> Self {
        Constraint {
            name: name.to_string(),
            kind: ConstraintKind::Equality { a, b },
        }
    }

    pub fn inequality(name: &str, g: DMatrix<f64>, h: DVector<f64>) -> Self {
        Constraint {
            name: name.to_string(),
            kind: ConstraintKind::Inequality { g, h },
        }
    }

    pub fn range(name: &str, a: DMatrix<f64>, l: DVector<f64>, u: DVector<f64>) -> Self {
        Constraint {
            name: name.to_string(),
            kind: ConstraintKind::Range { a, l, u },
        }
    }

    pub fn norm_cone(name: &str, a: DMatrix<f64>, b: DVector<f64>, c: DVector<f64>, d: f64) -> Self {
        Constraint {
            name: name.to_string(),
            kind: ConstraintKind::NormCone { a, b, c, d },
        }
    }

    pub fn is_cone(&self) -> bool {
        matches!(self.kind, ConstraintKind::NormCone { .. })
    }

    /// Number of scalar rows the relation contributes
    pub fn num_rows(&self) -> usize {
        match &self.kind {
            ConstraintKind::Equality { b, .. } => b.len(),
            ConstraintKind::Inequality { h, .. } => h.len(),
            ConstraintKind::Range { l, .. } => l.len(),
            ConstraintKind::NormCone { b, .. } => b.len() + 1,
        }
    }

    /// Check that every coefficient conforms to a variable of length `n`
    pub fn validate(&self, n: usize) -> Result<()> {
        let shape_err = |what: &str, expected: (usize, usize), got: (usize, usize)| {
            CheckError::Dimension(format!(
                "constraint '{}': {} must be {}x{}, got {}x{}",
                self.name, what, expected.0, expected.1, got.0, got.1
            ))
        };

        match &self.kind {
            ConstraintKind::Equality { a, b } => {
                if a.shape() != (b.len(), n) {
                    return Err(shape_err("A", (b.len(), n), a.shape()));
                }
            }
            ConstraintKind::Inequality { g, h } => {
                if g.shape() != (h.len(), n) {
                    return Err(shape_err("G", (h.len(), n), g.shape()));
                }
            }
            ConstraintKind::Range { a, l, u } => {
                if l.len() != u.len() {
                    return Err(CheckError::Dimension(format!(
                        "constraint '{}': l has {} rows but u has {}",
                        self.name,
                        l.len(),
                        u.len()
                    )));
                }
                if a.shape() != (l.len(), n) {
                    return Err(shape_err("A", (l.len(), n), a.shape()));
                }
            }
            ConstraintKind::NormCone { a, b, c, d } => {
                if a.shape() != (b.len(), n) {
                    return Err(shape_err("A", (b.len(), n), a.shape()));
                }
                if c.len() != n {
                    return Err(shape_err("c", (n, 1), (c.len(), 1)));
                }
                if !d.is_finite() {
                    return Err(CheckError::Config(format!(
                        "constraint '{}': offset d is not finite",
                        self.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Largest amount by which `x` violates the relation
    pub fn violation(&self, x: &DVector<f64>) -> f64 {
        match &self.kind {
            ConstraintKind::Equality { a, b } => (a * x - b).amax(),
            ConstraintKind::Inequality { g, h } => {
                (g * x - h).iter().fold(0.0, |acc, &r| acc.max(r))
            }
            ConstraintKind::Range { a, l, u } => {
                let ax = a * x;
                ax.iter()
                    .zip(l.iter().zip(u.iter()))
                    .map(|(&v, (&lo, &hi))| (lo - v).max(v - hi).max(0.0))
                    .fold(0.0, f64::max)
            }
            ConstraintKind::NormCone { a, b, c, d } => {
                ((a * x + b).norm() - (c.dot(x) + d)).max(0.0)
            }
        }
    }

    pub(crate) fn coefficients(&self) -> Vec<f64> {
        match &self.kind {
            ConstraintKind::Equality { a, b } => a.iter().chain(b.iter()).copied().collect(),
            ConstraintKind::Inequality { g, h } => g.iter().chain(h.iter()).copied().collect(),
            // Range bounds may legitimately be infinite
            ConstraintKind::Range { a, .. } => a.iter().copied().collect(),
            ConstraintKind::NormCone { a, b, c, .. } => {
                a.iter().chain(b.iter()).chain(c.iter()).copied().collect()
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let relation = match &self.kind {
            ConstraintKind::Equality { .. } => "A x == b",
            ConstraintKind::Inequality { .. } => "G x <= h",
            ConstraintKind::Range { .. } => "l <= A x <= u",
            ConstraintKind::NormCone { .. } => "||A x + b|| <= c'x + d",
        };
        write!(f, "{}: {} ({} rows)", self.name, relation, self.num_rows())
    }
}
