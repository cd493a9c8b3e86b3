use cvxcheck_instance::{MpcData, PortfolioData, ProblemInstance, ReturnVector};
use cvxcheck_model::{ConstraintKind, ConvexProblem};
use cvxcheck_report::CheckRecord;
use cvxcheck_types::SolveResult;
use nalgebra::{DMatrix, DVector};

const OBJECTIVE_TOL: f64 = 1e-6;
const FEASIBILITY_TOL: f64 = 1e-6;
const PORTFOLIO_TOL: f64 = 1e-3;
const CLOSED_FORM_TOL: f64 = 1e-6;
const RANGE_TOL: f64 = 1e-4;
const CONSTRAINT_TOL: f64 = 1e-5;
const REFERENCE_TOL: f64 = 1e-5;
const RISK_TOL: f64 = 1e-5;
const DYNAMICS_TOL: f64 = 1e-5;
const LIMIT_TOL: f64 = 1e-3;

const RANGE_REFERENCE: [f64; 2] = [0.3, 0.7];

/// Verification checks for one solved instance.
///
/// Each instance kind has its own set; every check fails when the run
/// produced no solution, except `reports_infeasible` and a norm-cone
/// instance without an optimum, which expect none.
pub fn run_checks(
    instance: &ProblemInstance,
    problem: &ConvexProblem,
    result: &SolveResult,
) -> Vec<CheckRecord> {
    match instance {
        ProblemInstance::LeastSquares { a, b } => vec![objective_matches_residual(a, b, result)],
        ProblemInstance::Portfolio { returns, data } => vec![
            portfolio_feasible(data.mu.len(), result),
            portfolio_matches_reference(*returns, result),
        ],
        ProblemInstance::PortfolioSocp { returns, data } => vec![
            portfolio_feasible(data.mu.len(), result),
            portfolio_matches_reference(*returns, result),
            objective_matches_factor_risk(data, result),
        ],
        ProblemInstance::Linear { .. } => vec![
            constraints_satisfied(problem, result),
            matches_reference_value(instance, result),
            inequality_duals_nonnegative("inequalities", result),
        ],
        ProblemInstance::Mpc { data, horizon } => vec![
            dynamics_satisfied(data, *horizon, result),
            limits_respected(data, *horizon, result),
        ],
        ProblemInstance::BoxQuadratic { .. } => vec![box_and_sum_feasible(-1.0, 1.0, result)],
        ProblemInstance::RandomQuadratic { .. } => vec![
            constraints_satisfied(problem, result),
            inequality_duals_nonnegative("inequalities", result),
        ],
        ProblemInstance::NormCone { .. } => vec![matches_closed_form(instance, result)],
        ProblemInstance::RangeQuadratic { .. } => vec![range_matches_reference(result)],
        ProblemInstance::RandomSocp { .. } => vec![socp_feasible(problem, result)],
        ProblemInstance::Contradictory { .. } => vec![reports_infeasible(result)],
    }
}

fn record(name: &str, passed: bool, detail: String) -> CheckRecord {
    CheckRecord {
        name: name.to_string(),
        passed,
        detail,
    }
}

/// Run `check` on the solution, or fail when there is none
fn with_solution<F>(name: &str, result: &SolveResult, check: F) -> CheckRecord
where
    F: FnOnce(&[f64]) -> (bool, String),
{
    match &result.x {
        Some(x) => {
            let (passed, detail) = check(x);
            record(name, passed, detail)
        }
        None => record(
            name,
            false,
            format!("no solution ({:?})", result.status),
        ),
    }
}

fn sum_error(x: &[f64]) -> f64 {
    (x.iter().sum::<f64>() - 1.0).abs()
}

fn max_abs_diff(x: &[f64], reference: &[f64]) -> f64 {
    x.iter()
        .zip(reference.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}

pub fn objective_matches_residual(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    result: &SolveResult,
) -> CheckRecord {
    with_solution("objective_matches_residual", result, |x| {
        let residual = (a * DVector::from_column_slice(x) - b).norm_squared();
        match result.value.value() {
            Some(value) => {
                let err = (value - residual).abs();
                (
                    err <= OBJECTIVE_TOL * value.abs().max(1.0),
                    format!("|value - ||Ax - b||^2| = {:.3e}", err),
                )
            }
            None => (false, format!("value is {}", result.value)),
        }
    })
}

pub fn box_and_sum_feasible(lower: f64, upper: f64, result: &SolveResult) -> CheckRecord {
    with_solution("box_and_sum_feasible", result, |x| {
        let sum_err = sum_error(x);
        let in_box = x
            .iter()
            .all(|&v| v >= lower - FEASIBILITY_TOL && v <= upper + FEASIBILITY_TOL);
        (
            sum_err <= FEASIBILITY_TOL && in_box,
            format!("|sum(x) - 1| = {:.3e}, within [{}, {}]: {}", sum_err, lower, upper, in_box),
        )
    })
}

/// Long-only and fully invested over the first `assets` entries
pub fn portfolio_feasible(assets: usize, result: &SolveResult) -> CheckRecord {
    with_solution("portfolio_feasible", result, |x| {
        let x = &x[..assets.min(x.len())];
        let sum_err = sum_error(x);
        let min = x.iter().copied().fold(f64::INFINITY, f64::min);
        (
            sum_err <= FEASIBILITY_TOL && min >= -FEASIBILITY_TOL,
            format!("|sum(x) - 1| = {:.3e}, min(x) = {:.3e}", sum_err, min),
        )
    })
}

pub fn portfolio_matches_reference(returns: ReturnVector, result: &SolveResult) -> CheckRecord {
    with_solution("portfolio_matches_reference", result, |x| {
        // max_abs_diff stops at the shorter of the two
        let err = max_abs_diff(x, &returns.reference_allocation());
        (
            err <= PORTFOLIO_TOL,
            format!("max |x - reference({:?})| = {:.3e}", returns, err),
        )
    })
}

pub fn matches_closed_form(instance: &ProblemInstance, result: &SolveResult) -> CheckRecord {
    let name = "matches_closed_form";
    let expected = match instance.closed_form_optimum() {
        Some(v) => v,
        None => {
            return record(
                name,
                result.value.is_infeasible(),
                format!("no analytic optimum, value is {}", result.value),
            )
        }
    };
    with_solution(name, result, |_| match result.value.value() {
        Some(value) => {
            let err = (value - expected).abs();
            (
                err <= CLOSED_FORM_TOL,
                format!("value {:.8} vs analytic {:.8}", value, expected),
            )
        }
        None => (false, format!("value is {}", result.value)),
    })
}

pub fn matches_reference_value(instance: &ProblemInstance, result: &SolveResult) -> CheckRecord {
    let name = "matches_reference_value";
    let expected = match instance.reference_value() {
        Some(v) => v,
        None => return record(name, false, "instance has no reference value".to_string()),
    };
    with_solution(name, result, |_| match result.value.value() {
        Some(value) => {
            let err = (value - expected).abs();
            (
                err <= REFERENCE_TOL,
                format!("value {:.8} vs reference {:.8}", value, expected),
            )
        }
        None => (false, format!("value is {}", result.value)),
    })
}

/// Cone value agrees with gamma x'(F F' + D) x - mu'x at the returned allocation
pub fn objective_matches_factor_risk(data: &PortfolioData, result: &SolveResult) -> CheckRecord {
    with_solution("objective_matches_factor_risk", result, |x| {
        let n = data.mu.len();
        if x.len() < n {
            return (false, format!("solution has {} entries, need {}", x.len(), n));
        }
        let x = DVector::from_column_slice(&x[..n]);
        let risk = (data.factors.transpose() * &x).norm_squared()
            + data.idiosyncratic.component_mul(&x).dot(&x);
        let expected = data.gamma * risk - data.mu.dot(&x);
        match result.value.value() {
            Some(value) => {
                let err = (value - expected).abs();
                (
                    err <= RISK_TOL * expected.abs().max(1.0),
                    format!("|value - mean-variance cost| = {:.3e}", err),
                )
            }
            None => (false, format!("value is {}", result.value)),
        }
    })
}

/// States follow the plant from the initial state and end at the origin
pub fn dynamics_satisfied(data: &MpcData, horizon: usize, result: &SolveResult) -> CheckRecord {
    with_solution("dynamics_satisfied", result, |z| {
        let expected = data.num_variables(horizon);
        if z.len() != expected {
            return (false, format!("solution has {} entries, need {}", z.len(), expected));
        }
        let (states, inputs) = data.split(z, horizon);
        let dynamics = (0..horizon)
            .map(|t| {
                (&states[t + 1] - &data.dynamics * &states[t] - &data.input * &inputs[t]).amax()
            })
            .fold(0.0, f64::max);
        let boundary = (&states[0] - &data.initial).amax().max(states[horizon].amax());
        (
            dynamics <= DYNAMICS_TOL && boundary <= DYNAMICS_TOL,
            format!(
                "max dynamics error {:.3e}, boundary error {:.3e}",
                dynamics, boundary
            ),
        )
    })
}

pub fn limits_respected(data: &MpcData, horizon: usize, result: &SolveResult) -> CheckRecord {
    with_solution("limits_respected", result, |z| {
        let expected = data.num_variables(horizon);
        if z.len() != expected {
            return (false, format!("solution has {} entries, need {}", z.len(), expected));
        }
        let (states, inputs) = data.split(z, horizon);
        let state_max = states.iter().map(|x| x.amax()).fold(0.0, f64::max);
        let input_max = inputs.iter().map(|u| u.amax()).fold(0.0, f64::max);
        (
            state_max <= data.state_limit + LIMIT_TOL && input_max <= data.input_limit + LIMIT_TOL,
            format!("max |x| = {:.4}, max |u| = {:.4}", state_max, input_max),
        )
    })
}

pub fn range_matches_reference(result: &SolveResult) -> CheckRecord {
    with_solution("range_matches_reference", result, |x| {
        let err = max_abs_diff(x, &RANGE_REFERENCE);
        (
            x.len() == RANGE_REFERENCE.len() && err <= RANGE_TOL,
            format!("max |x - (0.3, 0.7)| = {:.3e}", err),
        )
    })
}

pub fn constraints_satisfied(problem: &ConvexProblem, result: &SolveResult) -> CheckRecord {
    with_solution("constraints_satisfied", result, |x| {
        let violation = problem.max_violation(&DVector::from_column_slice(x));
        (
            violation <= CONSTRAINT_TOL,
            format!("max violation {:.3e}", violation),
        )
    })
}

pub fn inequality_duals_nonnegative(constraint: &str, result: &SolveResult) -> CheckRecord {
    let name = "inequality_duals_nonnegative";
    with_solution(name, result, |_| match result.dual(constraint) {
        Some(y) => {
            let min = y.iter().copied().fold(f64::INFINITY, f64::min);
            (
                min >= -FEASIBILITY_TOL,
                format!("min dual of '{}' = {:.3e}", constraint, min),
            )
        }
        None => (false, format!("no dual for '{}'", constraint)),
    })
}

/// Cone and equality rows hold, relative to the size of their right-hand side
pub fn socp_feasible(problem: &ConvexProblem, result: &SolveResult) -> CheckRecord {
    with_solution("socp_feasible", result, |x| {
        let x = DVector::from_column_slice(x);
        let mut worst = 0.0_f64;
        for constraint in &problem.constraints {
            let scale = match &constraint.kind {
                ConstraintKind::NormCone { c, d, .. } => (c.dot(&x) + d).abs().max(1.0),
                ConstraintKind::Equality { b, .. } => b.amax().max(1.0),
                ConstraintKind::Inequality { h, .. } => h.amax().max(1.0),
                ConstraintKind::Range { .. } => 1.0,
            };
            worst = worst.max(constraint.violation(&x) / scale);
        }
        (
            worst <= FEASIBILITY_TOL,
            format!("max relative violation {:.3e}", worst),
        )
    })
}

pub fn reports_infeasible(result: &SolveResult) -> CheckRecord {
    record(
        "reports_infeasible",
        result.value.is_infeasible(),
        format!("value is {}", result.value),
    )
}
