use cvxcheck_instance::{MpcData, PortfolioData, ProblemInstance};
use cvxcheck_types::Result;
use nalgebra::{DMatrix, DVector};

use crate::constraint::Constraint;
use crate::objective::Objective;
use crate::problem::ConvexProblem;
use crate::variable::{Domain, Variable};

/// Declare the variable, objective and constraints for an instance.
///
/// Only shape consistency is checked here.
pub fn assemble_problem(instance: &ProblemInstance) -> Result<ConvexProblem> {
    let problem = match instance {
        ProblemInstance::LeastSquares { a, b } => ConvexProblem::new(
            Variable::free("x", a.ncols()),
            Objective::SumSquares {
                a: a.clone(),
                b: b.clone(),
            },
            Vec::new(),
        ),
        ProblemInstance::Portfolio { data, .. } => {
            let n = data.mu.len();
            ConvexProblem::new(
                Variable::nonnegative("x", n),
                // quad_form(x, gamma * Sigma) - mu'x
                Objective::Quadratic {
                    p: &data.sigma * data.gamma,
                    q: -&data.mu,
                },
                vec![Constraint::equality(
                    "budget",
                    DMatrix::from_element(1, n, 1.0),
                    DVector::from_element(1, 1.0),
                )],
            )
        }
        ProblemInstance::BoxQuadratic { p, c } => {
            let n = c.len();
            ConvexProblem::new(
                Variable::new(
                    "x",
                    n,
                    Domain::Box {
                        lower: -1.0,
                        upper: 1.0,
                    },
                ),
                Objective::Quadratic {
                    p: p.clone(),
                    q: c.clone(),
                },
                vec![Constraint::equality(
                    "sum",
                    DMatrix::from_element(1, n, 1.0),
                    DVector::from_element(1, 1.0),
                )],
            )
        }
        ProblemInstance::RandomQuadratic { p, q, g, h, a, b } => ConvexProblem::new(
            Variable::free("x", q.len()),
            // quad_form(x, 0.5 P) + q'x
            Objective::Quadratic {
                p: p * 0.5,
                q: q.clone(),
            },
            vec![
                Constraint::inequality("inequalities", g.clone(), h.clone()),
                Constraint::equality("equalities", a.clone(), b.clone()),
            ],
        ),
        ProblemInstance::NormCone {
            weight,
            radius,
            lower,
        } => {
            let scale = DMatrix::from_diagonal(&DVector::from_row_slice(&[weight.sqrt(), 1.0]));
            ConvexProblem::new(
                Variable::nonnegative("x", 2),
                // maximize sum(x)
                Objective::Linear {
                    c: DVector::from_element(2, -1.0),
                },
                vec![
                    Constraint::norm_cone(
                        "cone",
                        scale,
                        DVector::zeros(2),
                        DVector::zeros(2),
                        *radius,
                    ),
                    Constraint::inequality(
                        "lower",
                        -DMatrix::identity(2, 2),
                        DVector::from_element(2, -*lower),
                    ),
                ],
            )
        }
        ProblemInstance::RangeQuadratic { p, q, a, l, u } => ConvexProblem::new(
            Variable::free("x", q.len()),
            Objective::Quadratic {
                p: p.clone(),
                q: q.clone(),
            },
            vec![Constraint::range("bounds", a.clone(), l.clone(), u.clone())],
        ),
        ProblemInstance::RandomSocp {
            blocks,
            f,
            g,
            objective,
        } => {
            let mut constraints: Vec<Constraint> = blocks
                .iter()
                .enumerate()
                .map(|(i, block)| {
                    Constraint::norm_cone(
                        &format!("cone_{}", i),
                        block.a.clone(),
                        block.b.clone(),
                        block.c.clone(),
                        block.d,
                    )
                })
                .collect();
            if f.nrows() > 0 {
                constraints.push(Constraint::equality("equalities", f.clone(), g.clone()));
            }
            ConvexProblem::new(
                Variable::free("x", objective.len()),
                Objective::Linear {
                    c: objective.clone(),
                },
                constraints,
            )
        }
        ProblemInstance::Contradictory { n } => ConvexProblem::new(
            Variable::free("x", *n),
            Objective::Quadratic {
                p: DMatrix::identity(*n, *n),
                q: DVector::zeros(*n),
            },
            vec![
                Constraint::equality(
                    "sum",
                    DMatrix::from_element(1, *n, 1.0),
                    DVector::from_element(1, 1.0),
                ),
                Constraint::inequality("nonpositive", DMatrix::identity(*n, *n), DVector::zeros(*n)),
            ],
        ),
        ProblemInstance::PortfolioSocp { data, .. } => portfolio_socp(data),
        ProblemInstance::Linear { data } => ConvexProblem::new(
            Variable::free("x", data.c.len()),
            Objective::Linear { c: data.c.clone() },
            vec![Constraint::inequality(
                "inequalities",
                data.a.clone(),
                data.b.clone(),
            )],
        ),
        ProblemInstance::Mpc { data, horizon } => mpc(data, *horizon),
    };

    problem.validate()?;

    tracing::debug!(
        instance = instance.name(),
        class = ?problem.class(),
        num_vars = problem.num_vars(),
        num_rows = problem.num_constraint_rows(),
        "assembled problem"
    );

    Ok(problem)
}

/// Factor-model portfolio over `(x, t, s, u, v)`.
///
/// `u` and `v` bound the idiosyncratic and factor risk norms, and the
/// rotated cones `||(1 - t, 2u)|| <= 1 + t` give `u^2 <= t`, so
/// `gamma (t + s) - mu'x` is the mean-variance cost at the optimum.
fn portfolio_socp(data: &PortfolioData) -> ConvexProblem {
    let n = data.mu.len();
    let (t, s, u, v) = (n, n + 1, n + 2, n + 3);
    let len = n + 4;

    let unit = |i: usize| {
        let mut e = DVector::zeros(len);
        e[i] = 1.0;
        e
    };
    let on_assets = |block: DMatrix<f64>| {
        let mut a = DMatrix::zeros(block.nrows(), len);
        a.view_mut((0, 0), (block.nrows(), n)).copy_from(&block);
        a
    };
    // ||(1 - epi, 2 norm)|| <= 1 + epi
    let rotated = |epi: usize, norm: usize| {
        let mut a = DMatrix::zeros(2, len);
        a[(0, epi)] = -1.0;
        a[(1, norm)] = 2.0;
        (a, DVector::from_row_slice(&[1.0, 0.0]), unit(epi))
    };

    let mut budget = DMatrix::zeros(1, len);
    budget.view_mut((0, 0), (1, n)).fill(1.0);

    let mut cost = DVector::zeros(len);
    cost.rows_mut(0, n).copy_from(&(-&data.mu));
    cost[t] = data.gamma;
    cost[s] = data.gamma;

    let (a_t, b_t, c_t) = rotated(t, u);
    let (a_s, b_s, c_s) = rotated(s, v);

    ConvexProblem::new(
        Variable::nonnegative("x", len),
        Objective::Linear { c: cost },
        vec![
            Constraint::equality("budget", budget, DVector::from_element(1, 1.0)),
            Constraint::norm_cone(
                "idiosyncratic",
                on_assets(DMatrix::from_diagonal(&data.idiosyncratic.map(f64::sqrt))),
                DVector::zeros(n),
                unit(u),
                0.0,
            ),
            Constraint::norm_cone(
                "factor",
                on_assets(data.factors.transpose()),
                DVector::zeros(data.factors.ncols()),
                unit(v),
                0.0,
            ),
            Constraint::norm_cone("idiosyncratic_epigraph", a_t, b_t, c_t, 1.0),
            Constraint::norm_cone("factor_epigraph", a_s, b_s, c_s, 1.0),
        ],
    )
}

/// Minimum-energy steering of `x+ = A x + B u` over the stacked `(x_0..x_T, u_0..u_{T-1})`
fn mpc(data: &MpcData, horizon: usize) -> ConvexProblem {
    let (nx, nu) = (data.num_states(), data.num_inputs());
    let len = data.num_variables(horizon);

    let mut dynamics = DMatrix::zeros(nx * horizon, len);
    for t in 0..horizon {
        let rows = nx * t;
        let next = data.state_offset(t + 1);
        for k in 0..nx {
            dynamics[(rows + k, next + k)] = 1.0;
        }
        dynamics
            .view_mut((rows, data.state_offset(t)), (nx, nx))
            .copy_from(&(-&data.dynamics));
        dynamics
            .view_mut((rows, data.input_offset(horizon, t)), (nx, nu))
            .copy_from(&(-&data.input));
    }

    let select = |offset: usize, count: usize| {
        let mut a = DMatrix::zeros(count, len);
        for i in 0..count {
            a[(i, offset + i)] = 1.0;
        }
        a
    };
    let states = nx * (horizon + 1);
    let inputs = nu * horizon;

    ConvexProblem::new(
        Variable::free("z", len),
        Objective::Quadratic {
            p: DMatrix::identity(len, len),
            q: DVector::zeros(len),
        },
        vec![
            Constraint::equality("dynamics", dynamics, DVector::zeros(nx * horizon)),
            Constraint::equality(
                "initial",
                select(data.state_offset(0), nx),
                data.initial.clone(),
            ),
            Constraint::equality(
                "terminal",
                select(data.state_offset(horizon), nx),
                DVector::zeros(nx),
            ),
            Constraint::range(
                "state_limits",
                select(data.state_offset(0), states),
                DVector::from_element(states, -data.state_limit),
                DVector::from_element(states, data.state_limit),
            ),
            Constraint::range(
                "input_limits",
                select(data.input_offset(horizon, 0), inputs),
                DVector::from_element(inputs, -data.input_limit),
                DVector::from_element(inputs, data.input_limit),
            ),
        ],
    )
}
