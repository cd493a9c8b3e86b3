use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettings, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};
use cvxcheck_model::ConvexProblem;
use cvxcheck_types::{ObjectiveValue, Result, SolveResult, SolveStatus};
use nalgebra::DMatrix;

use crate::backend::{SolverBackend, SolverSettings};
use crate::standard_form::{extract_duals, ConeBlock, ConicForm};

const BACKEND_NAME: &str = "clarabel";

/// Interior-point backend for LP, QP and SOCP problems
pub struct ClarabelBackend {
    settings: SolverSettings,
}

impl ClarabelBackend {
    pub fn new() -> Self {
        Self::with_settings(SolverSettings::default())
    }

    pub fn with_settings(settings: SolverSettings) -> Self {
        ClarabelBackend { settings }
    }

    fn clarabel_settings(&self) -> DefaultSettings<f64> {
        let mut settings = DefaultSettings::default();
        settings.verbose = self.settings.verbose;
        settings.max_iter = self.settings.max_iter;
        settings.tol_gap_abs = self.settings.eps_abs;
        settings.tol_gap_rel = self.settings.eps_rel;
        settings.tol_feas = self.settings.eps_abs.max(1e-10);
        settings.tol_infeas_abs = self.settings.eps_infeasible;
        settings.tol_infeas_rel = self.settings.eps_infeasible;
        settings
    }
}

impl Default for ClarabelBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverBackend for ClarabelBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn solve(&self, problem: &ConvexProblem) -> Result<SolveResult> {
        problem.validate()?;
        let form = ConicForm::from_problem(problem)?;

        let p_csc = to_clarabel_csc_upper(&form.objective.p);
        let a_csc = to_clarabel_csc(&form.a);
        let cones: Vec<SupportedConeT<f64>> = form.cones.iter().map(to_clarabel_cone).collect();

        tracing::debug!(
            vars = problem.num_vars(),
            rows = form.a.nrows(),
            cones = cones.len(),
            "clarabel: conic form built"
        );

        let mut solver = DefaultSolver::new(
            &p_csc,
            form.objective.q.as_slice(),
            &a_csc,
            form.b.as_slice(),
            &cones,
            self.clarabel_settings(),
        );
        solver.solve();

        let status = map_status(solver.solution.status);
        let iterations = solver.info.iterations as usize;

        tracing::info!(
            status = ?status,
            iterations,
            "clarabel: {}",
            status.description()
        );

        if !status.has_solution() {
            return Ok(SolveResult::without_solution(status, iterations, BACKEND_NAME));
        }

        // Clarabel drops the constant term of the objective
        let value = ObjectiveValue::from_status(
            status,
            solver.solution.obj_val + form.objective.constant,
        );

        Ok(SolveResult {
            status,
            value,
            x: Some(solver.solution.x.clone()),
            duals: extract_duals(&form.duals, &solver.solution.z),
            iterations,
            backend: BACKEND_NAME.to_string(),
        })
    }
}

fn map_status(status: SolverStatus) -> SolveStatus {
    match status {
        SolverStatus::Solved => SolveStatus::Optimal,
        SolverStatus::AlmostSolved => SolveStatus::OptimalInaccurate,
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
            SolveStatus::PrimalInfeasible
        }
        SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
            SolveStatus::DualInfeasible
        }
        SolverStatus::MaxIterations | SolverStatus::MaxTime => SolveStatus::MaxIterations,
        SolverStatus::NumericalError | SolverStatus::InsufficientProgress => {
            SolveStatus::NumericalError
        }
        _ => SolveStatus::Unsolved,
    }
}

fn to_clarabel_cone(cone: &ConeBlock) -> SupportedConeT<f64> {
    match *cone {
        ConeBlock::Zero(dim) => SupportedConeT::ZeroConeT(dim),
        ConeBlock::Nonnegative(dim) => SupportedConeT::NonnegativeConeT(dim),
        ConeBlock::SecondOrder(dim) => SupportedConeT::SecondOrderConeT(dim),
    }
}

const SPARSITY_THRESHOLD: f64 = 1e-12;

/// Upper triangle of a symmetric matrix in CSC form
fn to_clarabel_csc_upper(mat: &DMatrix<f64>) -> CscMatrix<f64> {
    to_csc(mat, |row, col| row <= col)
}

fn to_clarabel_csc(mat: &DMatrix<f64>) -> CscMatrix<f64> {
    to_csc(mat, |_, _| true)
}

fn to_csc(mat: &DMatrix<f64>, keep: impl Fn(usize, usize) -> bool) -> CscMatrix<f64> {
    let mut colptr = vec![0];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    for col in 0..mat.ncols() {
        for row in 0..mat.nrows() {
            let val = mat[(row, col)];
            if keep(row, col) && val.abs() > SPARSITY_THRESHOLD {
                rowval.push(row);
                nzval.push(val);
            }
        }
        colptr.push(nzval.len());
    }

    CscMatrix {
        m: mat.nrows(),
        n: mat.ncols(),
        colptr,
        rowval,
        nzval,
    }
}
