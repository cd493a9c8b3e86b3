use cvxcheck_model::{ConstraintKind, ConvexProblem, StandardObjective};
use cvxcheck_types::{CheckError, Result};
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;
use std::ops::Range;

/// Reject a quadratic term that is not positive semidefinite.
///
/// This is the only convexity rule the closed set of objectives needs.
pub fn check_convex(p: &DMatrix<f64>) -> Result<()> {
    if p.is_empty() {
        return Ok(());
    }
    if p.nrows() != p.ncols() {
        return Err(CheckError::Dimension(format!(
            "quadratic term must be square, got {}x{}",
            p.nrows(),
            p.ncols()
        )));
    }

    let scale = p.amax().max(1.0);
    let sym = (p + p.transpose()) * 0.5;
    let min_eig = sym.symmetric_eigen().eigenvalues.min();

    if min_eig < -1e-9 * scale {
        return Err(CheckError::NotConvex(format!(
            "quadratic term has eigenvalue {:.3e} < 0",
            min_eig
        )));
    }
    Ok(())
}

/// Cone of one block of rows in the conic form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConeBlock {
    Zero(usize),
    Nonnegative(usize),
    SecondOrder(usize),
}

/// Where a named constraint's multipliers live in the dual vector
#[derive(Debug, Clone)]
pub(crate) enum DualRows {
    Direct(Range<usize>),
    /// Two-sided rows; either side may be absent when its bound is infinite
    Paired {
        lower: Vec<Option<usize>>,
        upper: Vec<Option<usize>>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct DualMap {
    pub name: String,
    pub rows: DualRows,
}

impl DualMap {
    /// Dual for the constraint; two-sided rows report upper minus lower
    pub fn extract(&self, z: &[f64]) -> Vec<f64> {
        match &self.rows {
            DualRows::Direct(range) => z[range.clone()].to_vec(),
            DualRows::Paired { lower, upper } => lower
                .iter()
                .zip(upper.iter())
                .map(|(lo, hi)| {
                    let zu = hi.map(|k| z[k]).unwrap_or(0.0);
                    let zl = lo.map(|k| z[k]).unwrap_or(0.0);
                    zu - zl
                })
                .collect(),
        }
    }
}

pub(crate) fn extract_duals(maps: &[DualMap], z: &[f64]) -> BTreeMap<String, Vec<f64>> {
    maps.iter()
        .map(|map| (map.name.clone(), map.extract(z)))
        .collect()
}

/// Row-major accumulator for constraint rows and right-hand sides
struct RowBuilder {
    n: usize,
    data: Vec<f64>,
    rhs: Vec<f64>,
}

impl RowBuilder {
    fn new(n: usize) -> Self {
        RowBuilder {
            n,
            data: Vec::new(),
            rhs: Vec::new(),
        }
    }

    fn len(&self) -> usize {
        self.rhs.len()
    }

    fn push<I: IntoIterator<Item = f64>>(&mut self, coeffs: I, rhs: f64) -> usize {
        let before = self.data.len();
        self.data.extend(coeffs);
        debug_assert_eq!(self.data.len() - before, self.n);
        self.rhs.push(rhs);
        self.rhs.len() - 1
    }

    fn finish(self) -> (DMatrix<f64>, DVector<f64>) {
        let m = self.rhs.len();
        (
            DMatrix::from_row_slice(m, self.n, &self.data),
            DVector::from_vec(self.rhs),
        )
    }
}

/// minimize 0.5 x'Px + q'x  s.t.  A x + s = b, s in K
#[derive(Debug, Clone)]
pub(crate) struct ConicForm {
    pub objective: StandardObjective,
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    pub cones: Vec<ConeBlock>,
    pub duals: Vec<DualMap>,
}

impl ConicForm {
    pub fn from_problem(problem: &ConvexProblem) -> Result<Self> {
        let objective = problem.objective.to_standard();
        check_convex(&objective.p)?;

        let n = problem.num_vars();
        let mut rows = RowBuilder::new(n);
        let mut cones = Vec::new();
        let mut duals = Vec::new();

        if !problem.variable.domain.is_free() {
            let (lower, upper) = problem.variable.domain.bounds();
            push_range_rows(
                &mut rows,
                &mut cones,
                &mut duals,
                &problem.variable.domain_constraint_name(),
                &DMatrix::identity(n, n),
                &DVector::from_element(n, lower),
                &DVector::from_element(n, upper),
            );
        }

        for constraint in &problem.constraints {
            let start = rows.len();
            match &constraint.kind {
                ConstraintKind::Equality { a, b } => {
                    for (row, rhs) in a.row_iter().zip(b.iter()) {
                        rows.push(row.iter().copied(), *rhs);
                    }
                    push_cone(&mut cones, ConeBlock::Zero(b.len()));
                }
                ConstraintKind::Inequality { g, h } => {
                    for (row, rhs) in g.row_iter().zip(h.iter()) {
                        rows.push(row.iter().copied(), *rhs);
                    }
                    push_cone(&mut cones, ConeBlock::Nonnegative(h.len()));
                }
                ConstraintKind::Range { a, l, u } => {
                    push_range_rows(&mut rows, &mut cones, &mut duals, &constraint.name, a, l, u);
                    continue;
                }
                ConstraintKind::NormCone { a, b, c, d } => {
                    // s = (c'x + d, A x + b) in the second-order cone
                    rows.push(c.iter().map(|v| -v), *d);
                    for (row, rhs) in a.row_iter().zip(b.iter()) {
                        rows.push(row.iter().map(|v| -v), *rhs);
                    }
                    push_cone(&mut cones, ConeBlock::SecondOrder(b.len() + 1));
                }
            }
            duals.push(DualMap {
                name: constraint.name.clone(),
                rows: DualRows::Direct(start..rows.len()),
            });
        }

        let (a, b) = rows.finish();
        Ok(ConicForm {
            objective,
            a,
            b,
            cones,
            duals,
        })
    }
}

fn push_cone(cones: &mut Vec<ConeBlock>, cone: ConeBlock) {
    let dim = match cone {
        ConeBlock::Zero(d) | ConeBlock::Nonnegative(d) | ConeBlock::SecondOrder(d) => d,
    };
    if dim > 0 {
        cones.push(cone);
    }
}

/// l <= A x <= u as -A x + s = -l and A x + s = u, finite sides only
fn push_range_rows(
    rows: &mut RowBuilder,
    cones: &mut Vec<ConeBlock>,
    duals: &mut Vec<DualMap>,
    name: &str,
    a: &DMatrix<f64>,
    l: &DVector<f64>,
    u: &DVector<f64>,
) {
    let m = l.len();
    let mut lower = vec![None; m];
    let mut upper = vec![None; m];
    let start = rows.len();

    for i in 0..m {
        if l[i].is_finite() {
            lower[i] = Some(rows.push(a.row(i).iter().map(|v| -v), -l[i]));
        }
        if u[i].is_finite() {
            upper[i] = Some(rows.push(a.row(i).iter().copied(), u[i]));
        }
    }

    push_cone(cones, ConeBlock::Nonnegative(rows.len() - start));
    duals.push(DualMap {
        name: name.to_string(),
        rows: DualRows::Paired { lower, upper },
    });
}

/// minimize 0.5 x'Px + q'x  s.t.  l <= A x <= u
#[derive(Debug, Clone)]
pub(crate) struct RangeForm {
    pub objective: StandardObjective,
    pub a: DMatrix<f64>,
    pub l: DVector<f64>,
    pub u: DVector<f64>,
    pub duals: Vec<DualMap>,
}

impl RangeForm {
    pub fn from_problem(problem: &ConvexProblem, backend: &str) -> Result<Self> {
        if let Some(cone) = problem.constraints.iter().find(|c| c.is_cone()) {
            return Err(CheckError::Unsupported(format!(
                "constraint '{}' is a second-order cone; the {} backend only handles linear constraints",
                cone.name, backend
            )));
        }

        let objective = problem.objective.to_standard();
        check_convex(&objective.p)?;

        let n = problem.num_vars();
        let mut rows = RowBuilder::new(n);
        let mut lower = Vec::new();
        let mut duals = Vec::new();

        let mut push_block = |name: &str, a: &DMatrix<f64>, l: &[f64], u: &[f64]| {
            let start = rows.len();
            for (i, row) in a.row_iter().enumerate() {
                rows.push(row.iter().copied(), u[i]);
                lower.push(l[i]);
            }
            duals.push(DualMap {
                name: name.to_string(),
                rows: DualRows::Direct(start..rows.len()),
            });
        };

        if !problem.variable.domain.is_free() {
            let (lo, hi) = problem.variable.domain.bounds();
            push_block(
                &problem.variable.domain_constraint_name(),
                &DMatrix::identity(n, n),
                &vec![lo; n],
                &vec![hi; n],
            );
        }

        for constraint in &problem.constraints {
            match &constraint.kind {
                ConstraintKind::Equality { a, b } => {
                    push_block(&constraint.name, a, b.as_slice(), b.as_slice())
                }
                ConstraintKind::Inequality { g, h } => push_block(
                    &constraint.name,
                    g,
                    &vec![f64::NEG_INFINITY; h.len()],
                    h.as_slice(),
                ),
                ConstraintKind::Range { a, l, u } => {
                    push_block(&constraint.name, a, l.as_slice(), u.as_slice())
                }
                ConstraintKind::NormCone { .. } => unreachable!("cones rejected above"),
            }
        }

        let (a, u) = rows.finish();
        Ok(RangeForm {
            objective,
            a,
            l: DVector::from_vec(lower),
            u,
            duals,
        })
    }
}
