use cvxcheck_instance::{build_instance, ProblemInstance, RandomSource};
use cvxcheck_model::{assemble_problem, ConvexProblem};
use cvxcheck_report::{instance_fingerprint, DualRecord, Reporter, RunReport, TextReporter};
use cvxcheck_solver::{backend_for, SolverBackend};
use cvxcheck_types::{CheckError, Result, SolveResult};
use nalgebra::DVector;
use std::io::Write;

use crate::checks::run_checks;
use crate::config::HarnessConfig;

/// Submit an assembled problem to a backend, once.
///
/// A solution whose length differs from the variable is rejected.
pub fn solve(problem: &ConvexProblem, backend: &dyn SolverBackend) -> Result<SolveResult> {
    tracing::info!(
        backend = backend.name(),
        class = ?problem.class(),
        vars = problem.num_vars(),
        rows = problem.num_constraint_rows(),
        "solving"
    );
    let result = backend.solve(problem)?;
    tracing::info!(
        backend = backend.name(),
        status = ?result.status,
        iterations = result.iterations,
        value = %result.value,
        "solve finished"
    );

    if let Some(x) = &result.x {
        if x.len() != problem.num_vars() {
            return Err(CheckError::Solver(format!(
                "{} returned a solution of length {}, expected {}",
                backend.name(),
                x.len(),
                problem.num_vars()
            )));
        }
    }
    Ok(result)
}

/// Constraint whose dual the report prints, if the instance has one
pub fn reported_dual(instance: &ProblemInstance) -> Option<&'static str> {
    match instance {
        ProblemInstance::RandomQuadratic { .. } | ProblemInstance::Linear { .. } => {
            Some("inequalities")
        }
        ProblemInstance::NormCone { .. } => Some("lower"),
        _ => None,
    }
}

/// Runs build, assemble, solve, check and report against an injected backend
pub struct Harness<'a> {
    backend: &'a dyn SolverBackend,
}

impl<'a> Harness<'a> {
    pub fn new(backend: &'a dyn SolverBackend) -> Self {
        Harness { backend }
    }

    pub fn run(&self, config: &HarnessConfig, reporter: &mut dyn Reporter) -> Result<RunReport> {
        config.validate()?;

        let mut rng = RandomSource::from_optional_seed(config.seed);
        let instance = build_instance(&config.problem, &mut rng)?;
        let fingerprint = instance_fingerprint(&instance);
        tracing::info!(
            instance = instance.name(),
            seed = rng.seed(),
            fingerprint = %fingerprint,
            "instance built"
        );

        let problem = assemble_problem(&instance)?;
        tracing::info!(
            class = ?problem.class(),
            vars = problem.num_vars(),
            constraints = problem.constraints.len(),
            "problem assembled"
        );
        tracing::debug!("{}", problem);

        let result = solve(&problem, self.backend)?;

        let checks = run_checks(&instance, &problem, &result);
        for check in checks.iter().filter(|c| !c.passed) {
            tracing::warn!(check = %check.name, detail = %check.detail, "check failed");
        }

        let residual_norm = match (&instance, &result.x) {
            (ProblemInstance::LeastSquares { a, b }, Some(x)) => {
                Some((a * DVector::from_column_slice(x) - b).norm())
            }
            _ => None,
        };
        let dual = reported_dual(&instance).and_then(|name| {
            result.dual(name).map(|values| DualRecord {
                constraint: name.to_string(),
                values: values.to_vec(),
            })
        });

        let report = RunReport {
            instance: instance.name().to_string(),
            fingerprint,
            seed: config.problem.is_random().then(|| rng.seed()),
            backend: result.backend.clone(),
            status: result.status,
            iterations: result.iterations,
            value: result.value,
            x: result.x.clone(),
            residual_norm,
            dual,
            checks,
        };
        reporter.publish(&report)?;
        Ok(report)
    }
}

/// Run a configuration with the backend it names, printing a text report to `out`
pub fn run_config<W: Write>(config: &HarnessConfig, out: W) -> Result<RunReport> {
    let backend = backend_for(config.solver, &config.settings);
    let mut reporter = TextReporter::new(out).with_json(config.json_report);
    Harness::new(backend.as_ref()).run(config, &mut reporter)
}
