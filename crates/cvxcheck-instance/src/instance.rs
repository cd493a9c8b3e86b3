use cvxcheck_types::Result;
use nalgebra::{DMatrix, DVector};

use crate::data::{
    linear_data, mpc_data, portfolio_data, LinearData, MpcData, PortfolioData, ReturnVector,
    LINEAR_REFERENCE_VALUE,
};
use crate::dimensions::Dimensions;
use crate::random::RandomSource;

/// One norm-cone block: ||A x + b|| <= c'x + d
#[derive(Debug, Clone, PartialEq)]
pub struct SocBlock {
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    pub c: DVector<f64>,
    pub d: f64,
}

/// Immutable coefficient data for one run
#[derive(Debug, Clone)]
pub enum ProblemInstance {
    LeastSquares {
        a: DMatrix<f64>,
        b: DVector<f64>,
    },
    Portfolio {
        returns: ReturnVector,
        data: PortfolioData,
    },
    BoxQuadratic {
        p: DMatrix<f64>,
        c: DVector<f64>,
    },
    RandomQuadratic {
        p: DMatrix<f64>,
        q: DVector<f64>,
        g: DMatrix<f64>,
        h: DVector<f64>,
        a: DMatrix<f64>,
        b: DVector<f64>,
    },
    NormCone {
        weight: f64,
        radius: f64,
        lower: f64,
    },
    RangeQuadratic {
        p: DMatrix<f64>,
        q: DVector<f64>,
        a: DMatrix<f64>,
        l: DVector<f64>,
        u: DVector<f64>,
    },
    RandomSocp {
        blocks: Vec<SocBlock>,
        f: DMatrix<f64>,
        g: DVector<f64>,
        objective: DVector<f64>,
    },
    Contradictory {
        n: usize,
    },
    PortfolioSocp {
        returns: ReturnVector,
        data: PortfolioData,
    },
    Linear {
        data: LinearData,
    },
    Mpc {
        data: MpcData,
        horizon: usize,
    },
}

/// Build the instance described by `dims`, drawing from `rng` when random.
///
/// The same seed always yields bit-identical coefficients.
pub fn build_instance(dims: &Dimensions, rng: &mut RandomSource) -> Result<ProblemInstance> {
    dims.validate()?;

    let instance = match *dims {
        Dimensions::LeastSquares { m, n } => {
            let values = rng.normal_matrix(m, n);
            let mask = rng.normal_matrix(m, n);
            let a = values.zip_map(&mask, |v, keep| if keep > 0.0 { v } else { 0.0 });
            let b = rng.normal_vector(m);
            ProblemInstance::LeastSquares { a, b }
        }
        Dimensions::Portfolio { returns } => ProblemInstance::Portfolio {
            returns,
            data: portfolio_data(returns),
        },
        Dimensions::BoxQuadratic => ProblemInstance::BoxQuadratic {
            p: DMatrix::from_row_slice(3, 3, &[1.0, 0.5, 0.0, 0.5, 1.0, 0.0, 0.0, 0.0, 2.0]),
            c: DVector::from_row_slice(&[1.0, 3.0, 2.0]),
        },
        Dimensions::RandomQuadratic { m, n, p } => {
            let r = rng.normal_matrix(n, n);
            let p_mat = r.transpose() * &r;
            let q = rng.normal_vector(n);
            let g = rng.normal_matrix(m, n);
            // x0 satisfies both the inequalities and the equalities
            let x0 = rng.normal_vector(n);
            let h = &g * &x0;
            let a = rng.normal_matrix(p, n);
            let b = &a * &x0;
            ProblemInstance::RandomQuadratic {
                p: p_mat,
                q,
                g,
                h,
                a,
                b,
            }
        }
        Dimensions::NormCone {
            weight,
            radius,
            lower,
        } => ProblemInstance::NormCone {
            weight,
            radius,
            lower,
        },
        Dimensions::RangeQuadratic => ProblemInstance::RangeQuadratic {
            p: DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]),
            q: DVector::from_row_slice(&[1.0, 1.0]),
            a: DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 1.0, 0.0, 0.0, 1.0]),
            l: DVector::from_row_slice(&[1.0, 0.0, 0.0]),
            u: DVector::from_row_slice(&[1.0, 0.7, 0.7]),
        },
        Dimensions::RandomSocp {
            cones,
            cone_size,
            n,
            p,
        } => {
            let x0 = rng.uniform_vector(n);
            let objective = rng.uniform_vector(n);
            let blocks = (0..cones)
                .map(|_| {
                    let a = rng.uniform_matrix(cone_size, n);
                    let b = rng.uniform_vector(cone_size);
                    let c = rng.uniform_vector(n);
                    // x0 sits on the boundary of every cone
                    let d = (&a * &x0 + &b).norm() - c.dot(&x0);
                    SocBlock { a, b, c, d }
                })
                .collect();
            let f = rng.uniform_matrix(p, n);
            let g = &f * &x0;
            ProblemInstance::RandomSocp {
                blocks,
                f,
                g,
                objective,
            }
        }
        Dimensions::Contradictory { n } => ProblemInstance::Contradictory { n },
        Dimensions::PortfolioSocp { returns } => ProblemInstance::PortfolioSocp {
            returns,
            data: portfolio_data(returns),
        },
        Dimensions::Linear => ProblemInstance::Linear {
            data: linear_data(),
        },
        Dimensions::Mpc { horizon } => ProblemInstance::Mpc {
            data: mpc_data(),
            horizon,
        },
    };

    tracing::debug!(
        kind = dims.name(),
        num_variables = instance.num_variables(),
        "built problem instance"
    );

    Ok(instance)
}

impl ProblemInstance {
    pub fn name(&self) -> &'static str {
        match self {
            ProblemInstance::LeastSquares { .. } => "least_squares",
            ProblemInstance::Portfolio { .. } => "portfolio",
            ProblemInstance::BoxQuadratic { .. } => "box_quadratic",
            ProblemInstance::RandomQuadratic { .. } => "random_quadratic",
            ProblemInstance::NormCone { .. } => "norm_cone",
            ProblemInstance::RangeQuadratic { .. } => "range_quadratic",
            ProblemInstance::RandomSocp { .. } => "random_socp",
            ProblemInstance::Contradictory { .. } => "contradictory",
            ProblemInstance::PortfolioSocp { .. } => "portfolio_socp",
            ProblemInstance::Linear { .. } => "linear",
            ProblemInstance::Mpc { .. } => "mpc",
        }
    }

    /// Length of the decision variable this instance is posed over
    pub fn num_variables(&self) -> usize {
        match self {
            ProblemInstance::LeastSquares { a, .. } => a.ncols(),
            ProblemInstance::Portfolio { data, .. } => data.mu.len(),
            ProblemInstance::BoxQuadratic { c, .. } => c.len(),
            ProblemInstance::RandomQuadratic { q, .. } => q.len(),
            ProblemInstance::NormCone { .. } => 2,
            ProblemInstance::RangeQuadratic { q, .. } => q.len(),
            ProblemInstance::RandomSocp { objective, .. } => objective.len(),
            ProblemInstance::Contradictory { n } => *n,
            // assets followed by the epigraph variables t, s, u, v
            ProblemInstance::PortfolioSocp { data, .. } => data.mu.len() + 4,
            ProblemInstance::Linear { data } => data.c.len(),
            ProblemInstance::Mpc { data, horizon } => data.num_variables(*horizon),
        }
    }

    /// Analytic optimum where one exists (the norm-cone instance)
    pub fn closed_form_optimum(&self) -> Option<f64> {
        match *self {
            ProblemInstance::NormCone {
                weight,
                radius,
                lower,
            } => norm_cone_optimum(weight, radius, lower),
            _ => None,
        }
    }

    /// Optimal cost recorded from an independent solve of fixed data
    pub fn reference_value(&self) -> Option<f64> {
        match self {
            ProblemInstance::Linear { .. } => Some(LINEAR_REFERENCE_VALUE),
            _ => None,
        }
    }

    /// All coefficient data as little-endian bytes, matrices in row-major order
    pub fn coefficient_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(self.name().as_bytes());

        match self {
            ProblemInstance::LeastSquares { a, b } => {
                push_matrix(&mut out, a);
                push_vector(&mut out, b);
            }
            ProblemInstance::Portfolio { data, .. } => {
                push_scalar(&mut out, data.gamma);
                push_matrix(&mut out, &data.sigma);
                push_vector(&mut out, &data.mu);
            }
            ProblemInstance::BoxQuadratic { p, c } => {
                push_matrix(&mut out, p);
                push_vector(&mut out, c);
            }
            ProblemInstance::RandomQuadratic { p, q, g, h, a, b } => {
                push_matrix(&mut out, p);
                push_vector(&mut out, q);
                push_matrix(&mut out, g);
                push_vector(&mut out, h);
                push_matrix(&mut out, a);
                push_vector(&mut out, b);
            }
            ProblemInstance::NormCone {
                weight,
                radius,
                lower,
            } => {
                push_scalar(&mut out, *weight);
                push_scalar(&mut out, *radius);
                push_scalar(&mut out, *lower);
            }
            ProblemInstance::RangeQuadratic { p, q, a, l, u } => {
                push_matrix(&mut out, p);
                push_vector(&mut out, q);
                push_matrix(&mut out, a);
                push_vector(&mut out, l);
                push_vector(&mut out, u);
            }
            ProblemInstance::RandomSocp {
                blocks,
                f,
                g,
                objective,
            } => {
                for block in blocks {
                    push_matrix(&mut out, &block.a);
                    push_vector(&mut out, &block.b);
                    push_vector(&mut out, &block.c);
                    push_scalar(&mut out, block.d);
                }
                push_matrix(&mut out, f);
                push_vector(&mut out, g);
                push_vector(&mut out, objective);
            }
            ProblemInstance::Contradictory { n } => {
                out.extend_from_slice(&(*n as u64).to_le_bytes());
            }
            ProblemInstance::PortfolioSocp { data, .. } => {
                push_scalar(&mut out, data.gamma);
                push_matrix(&mut out, &data.factors);
                push_vector(&mut out, &data.idiosyncratic);
                push_vector(&mut out, &data.mu);
            }
            ProblemInstance::Linear { data } => {
                push_matrix(&mut out, &data.a);
                push_vector(&mut out, &data.b);
                push_vector(&mut out, &data.c);
            }
            ProblemInstance::Mpc { data, horizon } => {
                out.extend_from_slice(&(*horizon as u64).to_le_bytes());
                push_matrix(&mut out, &data.dynamics);
                push_matrix(&mut out, &data.input);
                push_vector(&mut out, &data.initial);
                push_scalar(&mut out, data.state_limit);
                push_scalar(&mut out, data.input_limit);
            }
        }

        out
    }
}

/// maximize x0 + x1 s.t. weight*x0^2 + x1^2 <= radius^2, x >= lower,
/// returned as the minimized value -(x0 + x1). `None` when infeasible.
fn norm_cone_optimum(weight: f64, radius: f64, lower: f64) -> Option<f64> {
    let r2 = radius * radius;
    if lower > 0.0 && (weight + 1.0) * lower * lower > r2 {
        return None;
    }

    // Tangent point of the objective direction on the ellipse
    let x0 = radius / (weight * (1.0 + weight)).sqrt();
    let x1 = weight * x0;

    let (x0, x1) = if x0 < lower {
        (lower, (r2 - weight * lower * lower).sqrt())
    } else if x1 < lower {
        (((r2 - lower * lower) / weight).sqrt(), lower)
    } else {
        (x0, x1)
    };

    Some(-(x0 + x1))
}

fn push_scalar(out: &mut Vec<u8>, v: f64) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn push_vector(out: &mut Vec<u8>, v: &DVector<f64>) {
    out.extend_from_slice(&(v.len() as u64).to_le_bytes());
    for x in v.iter() {
        push_scalar(out, *x);
    }
}

fn push_matrix(out: &mut Vec<u8>, m: &DMatrix<f64>) {
    out.extend_from_slice(&(m.nrows() as u64).to_le_bytes());
    out.extend_from_slice(&(m.ncols() as u64).to_le_bytes());
    for row in m.row_iter() {
        for x in row.iter() {
            push_scalar(out, *x);
        }
    }
}
