use cvxcheck_types::{ObjectiveValue, Result, SolveStatus};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::hashing::HashRef;

/// Outcome of one verification check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

/// Dual value of one named constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualRecord {
    pub constraint: String,
    pub values: Vec<f64>,
}

/// Everything a run prints, in serializable form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub instance: String,
    pub fingerprint: HashRef,
    pub seed: Option<u64>,
    pub backend: String,
    pub status: SolveStatus,
    pub iterations: usize,
    pub value: ObjectiveValue,
    pub x: Option<Vec<f64>>,
    /// ||A x - b||_2, least squares only
    pub residual_norm: Option<f64>,
    pub dual: Option<DualRecord>,
    pub checks: Vec<CheckRecord>,
}

impl RunReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckRecord> {
        self.checks.iter().filter(|c| !c.passed)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Reporter trait
pub trait Reporter {
    fn publish(&mut self, report: &RunReport) -> Result<()>;
}

/// Human-readable report on any writer, optionally followed by JSON
pub struct TextReporter<W: Write> {
    out: W,
    json: bool,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        TextReporter { out, json: false }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn publish(&mut self, report: &RunReport) -> Result<()> {
        let out = &mut self.out;

        writeln!(out)?;
        writeln!(out, "The optimal value is {}", report.value)?;
        match &report.x {
            Some(x) => {
                writeln!(out, "A solution x is")?;
                writeln!(out, "{}", format_vector(x))?;
            }
            None => writeln!(out, "No solution: {}", report.status.description())?,
        }
        if let Some(norm) = report.residual_norm {
            writeln!(out, "The norm of the residual is {}", norm)?;
        }
        if let Some(dual) = &report.dual {
            writeln!(
                out,
                "A dual solution corresponding to the {} constraints is",
                dual.constraint
            )?;
            writeln!(out, "{}", format_vector(&dual.values))?;
        }

        writeln!(out)?;
        writeln!(
            out,
            "Solved {} with {} in {} iterations ({:?})",
            report.instance, report.backend, report.iterations, report.status
        )?;
        for check in &report.checks {
            let mark = if check.passed { "pass" } else { "FAIL" };
            writeln!(out, "  [{}] {}: {}", mark, check.name, check.detail)?;
        }
        writeln!(out, "Instance fingerprint: {}", report.fingerprint)?;

        if self.json {
            writeln!(out, "{}", report.to_json()?)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Collects reports in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    pub reports: Vec<RunReport>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for MemoryReporter {
    fn publish(&mut self, report: &RunReport) -> Result<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}

pub fn format_vector(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{:.8}", v)).collect();
    format!("[{}]", parts.join(", "))
}
