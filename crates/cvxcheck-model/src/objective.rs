use nalgebra::{DMatrix, DVector};
use std::fmt;

/// Convex objective, always minimized
#[derive(Debug, Clone)]
pub enum Objective {
    /// ||A x - b||^2
    SumSquares { a: DMatrix<f64>, b: DVector<f64> },
    /// x'P x + q'x (no one-half factor)
    Quadratic { p: DMatrix<f64>, q: DVector<f64> },
    /// c'x
    Linear { c: DVector<f64> },
}

/// Objective expanded to 0.5 x'P x + q'x + constant with symmetric P
#[derive(Debug, Clone)]
pub struct StandardObjective {
    pub p: DMatrix<f64>,
    pub q: DVector<f64>,
    pub constant: f64,
}

impl StandardObjective {
    pub fn evaluate(&self, x: &DVector<f64>) -> f64 {
        0.5 * x.dot(&(&self.p * x)) + self.q.dot(x) + self.constant
    }
}

impl Objective {
    /// Number of variables the objective is posed over
    pub fn num_vars(&self) -> usize {
        match self {
            Objective::SumSquares { a, .. } => a.ncols(),
            Objective::Quadratic { q, .. } => q.len(),
            Objective::Linear { c } => c.len(),
        }
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, Objective::Linear { .. })
    }

    pub fn evaluate(&self, x: &DVector<f64>) -> f64 {
        match self {
            Objective::SumSquares { a, b } => (a * x - b).norm_squared(),
            Objective::Quadratic { p, q } => x.dot(&(p * x)) + q.dot(x),
            Objective::Linear { c } => c.dot(x),
        }
    }

    pub fn to_standard(&self) -> StandardObjective {
        let n = self.num_vars();
        match self {
            Objective::SumSquares { a, b } => StandardObjective {
                p: a.transpose() * a * 2.0,
                q: a.transpose() * b * -2.0,
                constant: b.norm_squared(),
            },
            Objective::Quadratic { p, q } => StandardObjective {
                // x'Px == 0.5 x'(P + P')x
                p: p + p.transpose(),
                q: q.clone(),
                constant: 0.0,
            },
            Objective::Linear { c } => StandardObjective {
                p: DMatrix::zeros(n, n),
                q: c.clone(),
                constant: 0.0,
            },
        }
    }

    pub(crate) fn coefficients(&self) -> Vec<f64> {
        match self {
            Objective::SumSquares { a, b } => a.iter().chain(b.iter()).copied().collect(),
            Objective::Quadratic { p, q } => p.iter().chain(q.iter()).copied().collect(),
            Objective::Linear { c } => c.iter().copied().collect(),
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::SumSquares { a, .. } => {
                write!(f, "sum_squares(A x - b), A {}x{}", a.nrows(), a.ncols())
            }
            Objective::Quadratic { p, .. } => {
                write!(f, "quad_form(x, P) + q'x, P {}x{}", p.nrows(), p.ncols())
            }
            Objective::Linear { c } => write!(f, "c'x, c {}", c.len()),
        }
    }
}
