use cvxcheck_model::ConvexProblem;
use cvxcheck_types::{CheckError, ObjectiveValue, Result, SolveResult, SolveStatus};
use nalgebra::{Cholesky, DMatrix, DVector, Dyn};

use crate::backend::{SolverBackend, SolverSettings};
use crate::standard_form::{extract_duals, RangeForm};

const BACKEND_NAME: &str = "admm";

const RHO_MIN: f64 = 1e-6;
const RHO_MAX: f64 = 1e6;
/// Equality rows get a stiffer penalty
const RHO_EQ_SCALE: f64 = 1e3;
const CHECK_INTERVAL: u32 = 10;
const ADAPT_INTERVAL: u32 = 50;
/// Residual slack accepted for an inaccurate solution at the iteration limit
const INACCURATE_SCALE: f64 = 1e3;

/// Operator-splitting QP solver for l <= A x <= u.
///
/// Each iteration solves one linear system with a cached Cholesky factor of
/// P + sigma I + A' diag(rho) A, then projects onto the bounds. Norm-cone
/// constraints are rejected.
pub struct AdmmBackend {
    settings: SolverSettings,
}

impl AdmmBackend {
    pub fn new() -> Self {
        Self::with_settings(SolverSettings::default())
    }

    pub fn with_settings(settings: SolverSettings) -> Self {
        AdmmBackend { settings }
    }
}

impl Default for AdmmBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterate state
struct State {
    x: DVector<f64>,
    z: DVector<f64>,
    y: DVector<f64>,
    delta_x: DVector<f64>,
    delta_y: DVector<f64>,
}

/// Residuals and the norms used to scale the stopping thresholds
struct Residuals {
    prim: f64,
    dual: f64,
    prim_scale: f64,
    dual_scale: f64,
}

enum Termination {
    Converged,
    PrimalInfeasible,
    DualInfeasible,
}

struct Workspace<'a> {
    form: &'a RangeForm,
    settings: &'a SolverSettings,
    base_rho: f64,
    rho: DVector<f64>,
    factor: Cholesky<f64, Dyn>,
}

impl<'a> Workspace<'a> {
    fn new(form: &'a RangeForm, settings: &'a SolverSettings) -> Result<Self> {
        let base_rho = settings.rho.clamp(RHO_MIN, RHO_MAX);
        let rho = rho_vector(form, base_rho);
        let factor = factorize(form, settings.sigma, &rho)?;
        Ok(Workspace {
            form,
            settings,
            base_rho,
            rho,
            factor,
        })
    }

    fn step(&self, state: &mut State) {
        let form = self.form;
        let alpha = self.settings.alpha;
        let sigma = self.settings.sigma;

        let rhs = &state.x * sigma - &form.objective.q
            + form.a.transpose() * (self.rho.component_mul(&state.z) - &state.y);
        let x_tilde = self.factor.solve(&rhs);
        let z_tilde = &form.a * &x_tilde;

        let x_next = &x_tilde * alpha + &state.x * (1.0 - alpha);
        let z_relaxed = &z_tilde * alpha + &state.z * (1.0 - alpha);

        let shifted = &z_relaxed + state.y.component_div(&self.rho);
        let z_next = project(&shifted, &form.l, &form.u);
        let y_next = &state.y + self.rho.component_mul(&(&z_relaxed - &z_next));

        state.delta_x = &x_next - &state.x;
        state.delta_y = &y_next - &state.y;
        state.x = x_next;
        state.z = z_next;
        state.y = y_next;
    }

    fn residuals(&self, state: &State) -> Residuals {
        let form = self.form;
        let ax = &form.a * &state.x;
        let px = &form.objective.p * &state.x;
        let aty = form.a.transpose() * &state.y;

        Residuals {
            prim: inf_norm(&(&ax - &state.z)),
            dual: inf_norm(&(&px + &form.objective.q + &aty)),
            prim_scale: inf_norm(&ax).max(inf_norm(&state.z)),
            dual_scale: inf_norm(&px)
                .max(inf_norm(&aty))
                .max(inf_norm(&form.objective.q)),
        }
    }

    fn converged(&self, r: &Residuals, slack: f64) -> bool {
        let eps_abs = self.settings.eps_abs * slack;
        let eps_rel = self.settings.eps_rel * slack;
        r.prim <= eps_abs + eps_rel * r.prim_scale && r.dual <= eps_abs + eps_rel * r.dual_scale
    }

    fn primal_infeasible(&self, state: &State) -> bool {
        let eps = self.settings.eps_infeasible;
        let dy_norm = inf_norm(&state.delta_y);
        if dy_norm < eps {
            return false;
        }

        let at_dy = self.form.a.transpose() * &state.delta_y;
        if inf_norm(&at_dy) > eps * dy_norm {
            return false;
        }

        // u' max(dy, 0) + l' min(dy, 0) must be strictly negative
        let mut support = 0.0;
        for ((&dy, &l), &u) in state.delta_y.iter().zip(self.form.l.iter()).zip(self.form.u.iter()) {
            if dy > eps * dy_norm {
                if !u.is_finite() {
                    return false;
                }
                support += u * dy;
            } else if dy < -eps * dy_norm {
                if !l.is_finite() {
                    return false;
                }
                support += l * dy;
            }
        }
        support < -eps * dy_norm
    }

    fn dual_infeasible(&self, state: &State) -> bool {
        let eps = self.settings.eps_infeasible;
        let dx_norm = inf_norm(&state.delta_x);
        if dx_norm < eps {
            return false;
        }

        let form = self.form;
        if inf_norm(&(&form.objective.p * &state.delta_x)) > eps * dx_norm {
            return false;
        }
        if form.objective.q.dot(&state.delta_x) >= -eps * dx_norm {
            return false;
        }

        let a_dx = &form.a * &state.delta_x;
        a_dx.iter()
            .zip(form.l.iter().zip(form.u.iter()))
            .all(|(&v, (&l, &u))| {
                let tol = eps * dx_norm;
                match (l.is_finite(), u.is_finite()) {
                    (true, true) => v.abs() <= tol,
                    (true, false) => v >= -tol,
                    (false, true) => v <= tol,
                    (false, false) => true,
                }
            })
    }

    /// Rebalance rho when the residuals drift apart, refactoring on change
    fn adapt_rho(&mut self, r: &Residuals) -> Result<()> {
        if self.form.a.nrows() == 0 {
            return Ok(());
        }
        let prim = r.prim / (r.prim_scale + 1e-10);
        let dual = r.dual / (r.dual_scale + 1e-10);
        let current = self.base_rho;
        let proposed = (current * (prim / (dual + 1e-10)).sqrt()).clamp(RHO_MIN, RHO_MAX);

        if proposed > 5.0 * current || proposed < current / 5.0 {
            tracing::trace!(from = current, to = proposed, "admm: updating rho");
            self.base_rho = proposed;
            self.rho = rho_vector(self.form, proposed);
            self.factor = factorize(self.form, self.settings.sigma, &self.rho)?;
        }
        Ok(())
    }
}

impl SolverBackend for AdmmBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn solve(&self, problem: &ConvexProblem) -> Result<SolveResult> {
        problem.validate()?;
        let form = RangeForm::from_problem(problem, BACKEND_NAME)?;
        let n = problem.num_vars();
        let m = form.a.nrows();

        let mut work = Workspace::new(&form, &self.settings)?;
        let mut state = State {
            x: DVector::zeros(n),
            z: DVector::zeros(m),
            y: DVector::zeros(m),
            delta_x: DVector::zeros(n),
            delta_y: DVector::zeros(m),
        };

        let mut termination = None;
        let mut iterations = 0;

        for iter in 1..=self.settings.max_iter {
            work.step(&mut state);
            iterations = iter;

            if iter % CHECK_INTERVAL != 0 {
                continue;
            }
            let residuals = work.residuals(&state);
            if self.settings.verbose {
                tracing::info!(
                    iter,
                    prim = residuals.prim,
                    dual = residuals.dual,
                    rho = work.base_rho,
                    "admm: progress"
                );
            }
            if work.converged(&residuals, 1.0) {
                termination = Some(Termination::Converged);
                break;
            }
            if work.primal_infeasible(&state) {
                termination = Some(Termination::PrimalInfeasible);
                break;
            }
            if work.dual_infeasible(&state) {
                termination = Some(Termination::DualInfeasible);
                break;
            }
            if iter % ADAPT_INTERVAL == 0 {
                work.adapt_rho(&residuals)?;
            }
        }

        let status = match termination {
            Some(Termination::Converged) => SolveStatus::Optimal,
            Some(Termination::PrimalInfeasible) => SolveStatus::PrimalInfeasible,
            Some(Termination::DualInfeasible) => SolveStatus::DualInfeasible,
            None => {
                let residuals = work.residuals(&state);
                if work.converged(&residuals, INACCURATE_SCALE) {
                    SolveStatus::OptimalInaccurate
                } else {
                    SolveStatus::MaxIterations
                }
            }
        };

        tracing::info!(
            status = ?status,
            iterations,
            "admm: {}",
            status.description()
        );

        let iterations = iterations as usize;
        if !status.has_solution() {
            return Ok(SolveResult::without_solution(status, iterations, BACKEND_NAME));
        }

        Ok(SolveResult {
            status,
            value: ObjectiveValue::from_status(status, form.objective.evaluate(&state.x)),
            x: Some(state.x.iter().copied().collect()),
            duals: extract_duals(&form.duals, state.y.as_slice()),
            iterations,
            backend: BACKEND_NAME.to_string(),
        })
    }
}

fn rho_vector(form: &RangeForm, rho: f64) -> DVector<f64> {
    DVector::from_iterator(
        form.l.len(),
        form.l.iter().zip(form.u.iter()).map(|(&l, &u)| {
            if l == u {
                RHO_EQ_SCALE * rho
            } else if !l.is_finite() && !u.is_finite() {
                RHO_MIN
            } else {
                rho
            }
        }),
    )
}

fn factorize(form: &RangeForm, sigma: f64, rho: &DVector<f64>) -> Result<Cholesky<f64, Dyn>> {
    let n = form.objective.q.len();
    let scaled_a = DMatrix::from_diagonal(rho) * &form.a;
    let kkt = &form.objective.p + DMatrix::identity(n, n) * sigma + form.a.transpose() * scaled_a;

    Cholesky::new(kkt).ok_or_else(|| {
        CheckError::Solver("admm: linear system is not positive definite".to_string())
    })
}

fn project(v: &DVector<f64>, l: &DVector<f64>, u: &DVector<f64>) -> DVector<f64> {
    DVector::from_iterator(
        v.len(),
        v.iter()
            .zip(l.iter().zip(u.iter()))
            .map(|(&vi, (&li, &ui))| vi.max(li).min(ui)),
    )
}

fn inf_norm(v: &DVector<f64>) -> f64 {
    v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}
