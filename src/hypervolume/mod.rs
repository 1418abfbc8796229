//! Exact hypervolume by slicing objectives (HSO).
//!
//! Measures the region of objective space dominated by a point set and
//! bounded by a reference point — the standard quality indicator for the
//! fronts produced by the engines. Higher is better.
//!
//! The calculator is written for **pure minimization**: the canonical
//! objective vector already stores maximization axes negated (see
//! [`crate::model::Solution`]), so every axis that arrives here is
//! minimized and the reference point must be strictly worse (greater)
//! than every point on every axis. A reference that fails this is
//! automatically grown per axis before slicing.
//!
//! # Reference
//!
//! While, Hingston, Barone & Huband (2006), "A Faster Algorithm for
//! Calculating Hypervolume", IEEE Trans. Evolutionary Computation 10(1).

use std::fmt::{self, Display, Formatter};

use crate::pareto::{dominance_unchecked, Dominance};

/// Errors raised by the hypervolume calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HypervolumeError {
    /// A point's length differs from the reference point's.
    DimensionMismatch {
        /// Reference point length.
        expected: usize,
        /// Offending point length.
        found: usize,
    },
}

impl Display for HypervolumeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { expected, found } => write!(
                f,
                "point has {found} objectives but the reference point has {expected}"
            ),
        }
    }
}

impl std::error::Error for HypervolumeError {}

/// Exact hypervolume of `points` against `reference`, all axes minimized.
///
/// Returns 0 for an empty set. Points that fail to strictly dominate the
/// (possibly adjusted) reference on some axis enclose no volume and are
/// dropped up front.
///
/// # Examples
///
/// ```
/// use roteiro::hypervolume::hypervolume;
///
/// let points = vec![vec![1.0, 1.0], vec![2.0, 2.0]];
/// let hv = hypervolume(&points, &[3.0, 3.0]).unwrap();
/// assert_eq!(hv, 4.0);
/// ```
pub fn hypervolume(points: &[Vec<f64>], reference: &[f64]) -> Result<f64, HypervolumeError> {
    let d = reference.len();
    if points.is_empty() || d == 0 {
        return Ok(0.0);
    }
    for p in points {
        if p.len() != d {
            return Err(HypervolumeError::DimensionMismatch {
                expected: d,
                found: p.len(),
            });
        }
    }

    let reference = effective_reference(points, reference);
    let contributing: Vec<Vec<f64>> = points
        .iter()
        .filter(|p| strictly_dominates(p, &reference))
        .cloned()
        .collect();
    if contributing.is_empty() {
        return Ok(0.0);
    }

    Ok(hso(contributing, 0, &reference))
}

/// Volume lost when each point is omitted from the set.
pub fn contributions(
    points: &[Vec<f64>],
    reference: &[f64],
) -> Result<Vec<f64>, HypervolumeError> {
    let total = hypervolume(points, reference)?;
    let mut result = Vec::with_capacity(points.len());
    for i in 0..points.len() {
        let mut rest: Vec<Vec<f64>> = points.to_vec();
        rest.remove(i);
        result.push(total - hypervolume(&rest, reference)?);
    }
    Ok(result)
}

/// 2D marginal of `point` against `others` on the first two axes.
///
/// The cheap estimate the engines use when ranking individual solutions
/// by cost/time contribution without paying for the full-dimensional
/// computation.
pub fn exclusive_2d(
    point: &[f64],
    others: &[Vec<f64>],
    reference: &[f64],
) -> Result<f64, HypervolumeError> {
    if point.len() < 2 || reference.len() < 2 {
        return Err(HypervolumeError::DimensionMismatch {
            expected: 2,
            found: point.len().min(reference.len()),
        });
    }
    let plane = |p: &[f64]| vec![p[0], p[1]];
    let mut with: Vec<Vec<f64>> = others.iter().map(|p| plane(p)).collect();
    let without = with.clone();
    with.push(plane(point));
    let r2 = [reference[0], reference[1]];
    Ok(hypervolume(&with, &r2)? - hypervolume(&without, &r2)?)
}

/// Ensures the reference is strictly dominated by every point, growing
/// each axis to `min_i + max(0.1·|min_i|, 1)` when it is not.
fn effective_reference(points: &[Vec<f64>], reference: &[f64]) -> Vec<f64> {
    let ok = points.iter().all(|p| strictly_dominates(p, reference));
    if ok {
        return reference.to_vec();
    }
    (0..reference.len())
        .map(|axis| {
            let min = points
                .iter()
                .map(|p| p[axis])
                .fold(f64::INFINITY, f64::min);
            min + (0.1 * min.abs()).max(1.0)
        })
        .collect()
}

/// `p_i < r_i` on every axis.
fn strictly_dominates(point: &[f64], reference: &[f64]) -> bool {
    point.iter().zip(reference).all(|(&p, &r)| p < r)
}

/// Recursive slicing on axes `[k, d)`.
///
/// Points are sorted descending on axis `k`; the slab between
/// consecutive values (starting from the reference) is covered exactly by
/// the points at and after the slab's lower bound, so each slab's depth
/// multiplies the sub-volume of that suffix on the remaining axes.
fn hso(points: Vec<Vec<f64>>, k: usize, reference: &[f64]) -> f64 {
    let d = reference.len();
    let points = filter_dominated(points, k);

    if d - k == 1 {
        // One axis left: the deepest point wins.
        let min = points
            .iter()
            .map(|p| p[k])
            .fold(f64::INFINITY, f64::min);
        return (reference[k] - min).max(0.0);
    }
    if d - k == 2 {
        return sweep_2d(points, k, reference);
    }

    let mut points = points;
    points.sort_by(|a, b| b[k].partial_cmp(&a[k]).unwrap_or(std::cmp::Ordering::Equal));

    let mut volume = 0.0;
    let mut prev = reference[k];
    for i in 0..points.len() {
        let depth = prev - points[i][k];
        if depth > 0.0 {
            volume += depth * hso(points[i..].to_vec(), k + 1, reference);
        }
        prev = points[i][k];
    }
    volume
}

/// Closed-form base case on axes `(k, k+1)`.
///
/// Sorted ascending on the first axis, a non-dominated set descends on
/// the second; each improvement on the second axis contributes the
/// rectangle between it and the running best.
fn sweep_2d(mut points: Vec<Vec<f64>>, k: usize, reference: &[f64]) -> f64 {
    points.sort_by(|a, b| a[k].partial_cmp(&b[k]).unwrap_or(std::cmp::Ordering::Equal));

    let (rx, ry) = (reference[k], reference[k + 1]);
    let mut area = 0.0;
    let mut best_y = ry;
    for p in &points {
        let (x, y) = (p[k], p[k + 1]);
        if x >= rx || y >= ry {
            continue;
        }
        if y < best_y {
            area += (rx - x) * (best_y - y);
            best_y = y;
        }
    }
    area
}

/// Drops points dominated by another point on axes `[k, d)`.
fn filter_dominated(points: Vec<Vec<f64>>, k: usize) -> Vec<Vec<f64>> {
    if points.len() < 2 {
        return points;
    }
    let mut kept: Vec<Vec<f64>> = Vec::with_capacity(points.len());
    for p in points {
        let mut dominated = false;
        for q in &kept {
            if dominance_unchecked(&q[k..], &p[k..]) == Dominance::Left {
                dominated = true;
                break;
            }
        }
        if dominated {
            continue;
        }
        kept.retain(|q| dominance_unchecked(&p[k..], &q[k..]) != Dominance::Left);
        kept.push(p);
    }
    kept
}

// ============================================================================
// Tests
// ============================================================================
