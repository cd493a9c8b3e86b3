use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Domain restriction declared together with a variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Domain {
    Free,
    Nonnegative,
    Box { lower: f64, upper: f64 },
}

impl Domain {
    /// Elementwise bounds implied by the domain
    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            Domain::Free => (f64::NEG_INFINITY, f64::INFINITY),
            Domain::Nonnegative => (0.0, f64::INFINITY),
            Domain::Box { lower, upper } => (lower, upper),
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, Domain::Free)
    }
}

/// Named vector of unknowns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub len: usize,
    pub domain: Domain,
}

impl Variable {
    pub fn new(name: &str, len: usize, domain: Domain) -> Self {
        Variable {
            name: name.to_string(),
            len,
            domain,
        }
    }

    pub fn free(name: &str, len: usize) -> Self {
        Self::new(name, len, Domain::Free)
    }

    pub fn nonnegative(name: &str, len: usize) -> Self {
        Self::new(name, len, Domain::Nonnegative)
    }

    /// Name under which backends report the dual of the domain restriction
    pub fn domain_constraint_name(&self) -> String {
        format!("{}.domain", self.name)
    }

    /// Largest amount by which `x` leaves the domain
    pub fn domain_violation(&self, x: &DVector<f64>) -> f64 {
        let (lower, upper) = self.domain.bounds();
        x.iter()
            .map(|&v| (lower - v).max(v - upper).max(0.0))
            .fold(0.0, f64::max)
    }
}
