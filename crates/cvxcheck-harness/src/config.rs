use cvxcheck_instance::Dimensions;
use cvxcheck_solver::{SolverChoice, SolverSettings};
use cvxcheck_types::{CheckError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a JSON file that replaces the built-in config
pub const CONFIG_ENV_VAR: &str = "CVXCHECK_CONFIG";

/// Configuration for one harness run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Instance kind and its dimensions
    pub problem: Dimensions,

    /// Seed for random instances; `None` draws one from OS entropy
    pub seed: Option<u64>,

    /// Solver backend to use
    pub solver: SolverChoice,

    /// Backend tolerances and iteration limits
    pub settings: SolverSettings,

    /// Also print the serialized report after the text report
    pub json_report: bool,
}

impl HarnessConfig {
    /// Defaults for an instance kind.
    ///
    /// Random kinds are seeded with 1. Cone kinds and the LP go to Clarabel,
    /// everything else to the ADMM backend.
    pub fn for_problem(problem: Dimensions) -> Self {
        let seed = if problem.is_random() { Some(1) } else { None };
        let solver = match problem {
            Dimensions::NormCone { .. }
            | Dimensions::RandomSocp { .. }
            | Dimensions::PortfolioSocp { .. }
            | Dimensions::Linear => SolverChoice::Clarabel,
            _ => SolverChoice::Admm,
        };

        HarnessConfig {
            problem,
            seed,
            solver,
            settings: SolverSettings::default(),
            json_report: false,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_solver(mut self, solver: SolverChoice) -> Self {
        self.solver = solver;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.problem.validate()?;

        let s = &self.settings;
        if s.max_iter == 0 {
            return Err(CheckError::Config("settings.max_iter must be positive".to_string()));
        }
        for (name, value) in [
            ("eps_abs", s.eps_abs),
            ("eps_rel", s.eps_rel),
            ("eps_infeasible", s.eps_infeasible),
            ("rho", s.rho),
            ("sigma", s.sigma),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CheckError::Config(format!(
                    "settings.{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !(s.alpha > 0.0 && s.alpha < 2.0) {
            return Err(CheckError::Config(format!(
                "settings.alpha must lie in (0, 2), got {}",
                s.alpha
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: HarnessConfig = serde_json::from_str(json)
            .map_err(|e| CheckError::Config(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CheckError::Io(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Load from `path` when given, else keep `default`
    pub fn from_path_or(path: Option<&Path>, default: HarnessConfig) -> Result<Self> {
        match path {
            Some(path) => {
                let config = Self::from_json_file(path)?;
                tracing::info!(path = %path.display(), "loaded configuration");
                Ok(config)
            }
            None => {
                default.validate()?;
                Ok(default)
            }
        }
    }

    /// Load from the file named by `CVXCHECK_CONFIG`, else keep `default`
    pub fn from_env_or(default: HarnessConfig) -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV_VAR);
        Self::from_path_or(path.as_deref().map(Path::new), default)
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::for_problem(Dimensions::least_squares())
    }
}
