use cvxcheck_types::{CheckError, Result};
use serde::{Deserialize, Serialize};

use crate::data::ReturnVector;

/// Shape parameters selecting and sizing a problem instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dimensions {
    /// minimize ||Ax - b||^2 with A m x n
    LeastSquares { m: usize, n: usize },
    /// Long-only mean-variance allocation over the fixed five assets
    Portfolio { returns: ReturnVector },
    /// The same allocation with risk posed through the factor model as cones
    PortfolioSocp { returns: ReturnVector },
    /// Fixed 3-variable quadratic with box and sum constraints
    BoxQuadratic,
    /// Random QP with m inequalities, n variables and p equalities
    RandomQuadratic { m: usize, n: usize, p: usize },
    /// maximize sum(x) s.t. ||(sqrt(weight) x0, x1)|| <= radius, x >= lower
    NormCone { weight: f64, radius: f64, lower: f64 },
    /// Fixed 2-variable QP with range constraints l <= Ax <= u
    RangeQuadratic,
    /// Random SOCP, feasible by construction
    RandomSocp {
        cones: usize,
        cone_size: usize,
        n: usize,
        p: usize,
    },
    /// sum(x) == 1 together with x <= 0
    Contradictory { n: usize },
    /// Fixed 15-row, 10-variable LP with a known optimal cost
    Linear,
    /// Steer a two-state plant to the origin over `horizon` steps
    Mpc { horizon: usize },
}

impl Dimensions {
    pub fn least_squares() -> Self {
        Dimensions::LeastSquares { m: 20, n: 15 }
    }

    pub fn portfolio(returns: ReturnVector) -> Self {
        Dimensions::Portfolio { returns }
    }

    pub fn portfolio_socp(returns: ReturnVector) -> Self {
        Dimensions::PortfolioSocp { returns }
    }

    pub fn mpc() -> Self {
        Dimensions::Mpc { horizon: 7 }
    }

    pub fn random_quadratic() -> Self {
        Dimensions::RandomQuadratic { m: 15, n: 10, p: 5 }
    }

    pub fn norm_cone() -> Self {
        Dimensions::NormCone {
            weight: 6.0,
            radius: 5.0,
            lower: 1.0,
        }
    }

    pub fn random_socp() -> Self {
        Dimensions::RandomSocp {
            cones: 3,
            cone_size: 5,
            n: 10,
            p: 5,
        }
    }

    /// Short name used in logs and reports
    pub fn name(&self) -> &'static str {
        match self {
            Dimensions::LeastSquares { .. } => "least_squares",
            Dimensions::Portfolio { .. } => "portfolio",
            Dimensions::BoxQuadratic => "box_quadratic",
            Dimensions::RandomQuadratic { .. } => "random_quadratic",
            Dimensions::NormCone { .. } => "norm_cone",
            Dimensions::RangeQuadratic => "range_quadratic",
            Dimensions::RandomSocp { .. } => "random_socp",
            Dimensions::Contradictory { .. } => "contradictory",
            Dimensions::PortfolioSocp { .. } => "portfolio_socp",
            Dimensions::Linear => "linear",
            Dimensions::Mpc { .. } => "mpc",
        }
    }

    /// Whether building this instance consumes random draws
    pub fn is_random(&self) -> bool {
        matches!(
            self,
            Dimensions::LeastSquares { .. }
                | Dimensions::RandomQuadratic { .. }
                | Dimensions::RandomSocp { .. }
        )
    }

    /// Reject shapes that cannot produce a well-formed instance
    pub fn validate(&self) -> Result<()> {
        match *self {
            Dimensions::LeastSquares { m, n } => {
                require_positive("least squares", &[("m", m), ("n", n)])
            }
            Dimensions::RandomQuadratic { m, n, p } => {
                require_positive("random quadratic", &[("m", m), ("n", n), ("p", p)])?;
                if p > n {
                    return Err(CheckError::Dimension(format!(
                        "random quadratic needs p <= n so the equality rows can be independent, got p={} n={}",
                        p, n
                    )));
                }
                Ok(())
            }
            Dimensions::NormCone {
                weight,
                radius,
                lower,
            } => {
                if !(weight.is_finite() && weight > 0.0) {
                    return Err(CheckError::Dimension(format!(
                        "norm cone weight must be positive, got {}",
                        weight
                    )));
                }
                if !(radius.is_finite() && radius > 0.0) {
                    return Err(CheckError::Dimension(format!(
                        "norm cone radius must be positive, got {}",
                        radius
                    )));
                }
                if !lower.is_finite() {
                    return Err(CheckError::Dimension(format!(
                        "norm cone lower bound must be finite, got {}",
                        lower
                    )));
                }
                Ok(())
            }
            Dimensions::RandomSocp {
                cones,
                cone_size,
                n,
                p,
            } => {
                require_positive(
                    "random socp",
                    &[("cones", cones), ("cone_size", cone_size), ("n", n)],
                )?;
                if p > n {
                    return Err(CheckError::Dimension(format!(
                        "random socp needs p <= n, got p={} n={}",
                        p, n
                    )));
                }
                Ok(())
            }
            Dimensions::Contradictory { n } => require_positive("contradictory", &[("n", n)]),
            Dimensions::Mpc { horizon } => require_positive("mpc", &[("horizon", horizon)]),
            Dimensions::Portfolio { .. }
            | Dimensions::PortfolioSocp { .. }
            | Dimensions::BoxQuadratic
            | Dimensions::RangeQuadratic
            | Dimensions::Linear => Ok(()),
        }
    }
}

fn require_positive(what: &str, dims: &[(&str, usize)]) -> Result<()> {
    for (name, value) in dims {
        if *value == 0 {
            return Err(CheckError::Dimension(format!(
                "{}: dimension {} must be positive",
                what, name
            )));
        }
    }
    Ok(())
}
