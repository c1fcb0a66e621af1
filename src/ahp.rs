//! Analytic Hierarchy Process: priority weights from pairwise comparisons.
//!
//! The input is a square matrix where entry (i, j) answers "how many times
//! more important is criterion i than criterion j". Weights come from the
//! standard geometric-mean approximation to the principal eigenvector, and
//! the consistency ratio (CR) normalizes the consistency index against
//! Saaty's Random Index table. CR < 0.10 is the conventional bar for
//! usable judgments.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Conventional acceptability threshold for the consistency ratio.
pub const CONSISTENCY_THRESHOLD: f64 = 0.10;

/// Saaty's Random Index, indexed by matrix dimension 1..=15.
///
/// Dimensions outside the table map to 0, which forces CR = 0 — a 1x1, 2x2,
/// or >15x15 matrix is always reported consistent regardless of its entries.
/// That edge-case policy is part of the reference behavior and is kept as-is.
const RANDOM_INDEX: [f64; 15] = [
    0.00, 0.00, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49, 1.51, 1.48, 1.56, 1.57, 1.58,
];

fn random_index(n: usize) -> f64 {
    if (1..=RANDOM_INDEX.len()).contains(&n) {
        RANDOM_INDEX[n - 1]
    } else {
        0.0
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AhpError {
    #[error("comparison matrix is empty")]
    Empty,
    #[error("comparison matrix is not square: row {row} has {got} entries, expected {expected}")]
    NotSquare {
        row: usize,
        got: usize,
        expected: usize,
    },
    #[error("comparison matrix entry ({row}, {col}) is {value}; entries must be positive and finite")]
    NonPositiveEntry { row: usize, col: usize, value: f64 },
    #[error("label count {got} does not match matrix dimension {expected}")]
    LabelCountMismatch { expected: usize, got: usize },
}

/// A validated square pairwise comparison matrix.
///
/// Reciprocal symmetry (entry (j, i) = 1 / entry (i, j)) is assumed supplied
/// by the caller; only squareness and positivity are enforced here.
/// [`ComparisonMatrix::from_upper_triangle`] builds a reciprocal matrix from
/// the upper-triangle judgments alone.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonMatrix {
    values: DMatrix<f64>,
}

impl ComparisonMatrix {
    /// Build from row-major entries, validating shape and positivity.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, AhpError> {
        let n = rows.len();
        if n == 0 {
            return Err(AhpError::Empty);
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(AhpError::NotSquare {
                    row: i,
                    got: row.len(),
                    expected: n,
                });
            }
            for (j, &v) in row.iter().enumerate() {
                if !v.is_finite() || v <= 0.0 {
                    return Err(AhpError::NonPositiveEntry {
                        row: i,
                        col: j,
                        value: v,
                    });
                }
            }
        }
        let values = DMatrix::from_fn(n, n, |i, j| rows[i][j]);
        Ok(Self { values })
    }

    /// Build an n x n reciprocal matrix from upper-triangle judgments given
    /// in row order: (0,1), (0,2), .., (0,n-1), (1,2), .. The diagonal is 1
    /// and the lower triangle is filled with reciprocals.
    pub fn from_upper_triangle(n: usize, judgments: &[f64]) -> Result<Self, AhpError> {
        if n == 0 {
            return Err(AhpError::Empty);
        }
        let expected = n * (n - 1) / 2;
        if judgments.len() != expected {
            return Err(AhpError::NotSquare {
                row: 0,
                got: judgments.len(),
                expected,
            });
        }
        let mut values = DMatrix::from_element(n, n, 1.0);
        let mut k = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                let v = judgments[k];
                k += 1;
                if !v.is_finite() || v <= 0.0 {
                    return Err(AhpError::NonPositiveEntry {
                        row: i,
                        col: j,
                        value: v,
                    });
                }
                values[(i, j)] = v;
                values[(j, i)] = 1.0 / v;
            }
        }
        Ok(Self { values })
    }

    pub fn dim(&self) -> usize {
        self.values.nrows()
    }

    /// Row-major copy of the entries, for display and persistence.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.dim())
            .map(|i| (0..self.dim()).map(|j| self.values[(i, j)]).collect())
            .collect()
    }
}

/// Consistency figures for one comparison matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub lambda_max: f64,
    pub ci: f64,
    pub ri: f64,
    pub cr: f64,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.cr < CONSISTENCY_THRESHOLD
    }
}

/// One row of the labeled weight table: a label, its comparison row, and
/// the weight derived for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTableRow {
    pub label: String,
    pub comparisons: Vec<f64>,
    pub weight: f64,
}

/// Full output of one AHP computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AhpResult {
    pub labels: Vec<String>,
    pub table: Vec<WeightTableRow>,
    pub weights: Vec<f64>,
    pub geometric_means: Vec<f64>,
    pub consistency: ConsistencyReport,
}

/// Row geometric means, normalized to sum to 1.
///
/// Returns `(weights, geometric_means)`. Weights are non-negative and sum to
/// 1 within floating-point tolerance.
pub fn weights(matrix: &ComparisonMatrix) -> (Vec<f64>, Vec<f64>) {
    let n = matrix.dim();
    let exponent = 1.0 / n as f64;
    let geo_means: Vec<f64> = (0..n)
        .map(|i| {
            let product: f64 = (0..n).map(|j| matrix.values[(i, j)]).product();
            product.powf(exponent)
        })
        .collect();
    let sum: f64 = geo_means.iter().sum();
    let weights = geo_means.iter().map(|m| m / sum).collect();
    (weights, geo_means)
}

/// Consistency report for a matrix and its derived weights.
///
/// lambda_max is the sum over rows of AW\[i\] / (n * w\[i\]) with AW the
/// weighted sum vector, equivalently the mean of the per-row eigenvalue
/// estimates. CI is zero for a 1x1 matrix, and CR is zero wherever the
/// Random Index is zero (dimensions 1, 2, and anything past the table).
pub fn consistency(matrix: &ComparisonMatrix, w: &[f64]) -> ConsistencyReport {
    let n = matrix.dim();
    let wv = DVector::from_column_slice(w);
    let aw = &matrix.values * wv;
    let lambda_max: f64 = (0..n).map(|i| aw[i] / (n as f64 * w[i])).sum();
    let ci = if n > 1 {
        (lambda_max - n as f64) / (n as f64 - 1.0)
    } else {
        0.0
    };
    let ri = random_index(n);
    let cr = if ri != 0.0 { ci / ri } else { 0.0 };
    ConsistencyReport {
        lambda_max,
        ci,
        ri,
        cr,
    }
}

/// Full AHP computation: weights, consistency, and the labeled audit table.
///
/// This is the one entry point callers need. Pure and deterministic; the
/// same inputs always produce bit-identical output.
pub fn compute(matrix: &ComparisonMatrix, labels: &[String]) -> Result<AhpResult, AhpError> {
    let n = matrix.dim();
    if labels.len() != n {
        return Err(AhpError::LabelCountMismatch {
            expected: n,
            got: labels.len(),
        });
    }
    let (w, geo_means) = weights(matrix);
    let report = consistency(matrix, &w);
    let rows = matrix.to_rows();
    let table = labels
        .iter()
        .zip(rows)
        .zip(&w)
        .map(|((label, comparisons), &weight)| WeightTableRow {
            label: label.clone(),
            comparisons,
            weight,
        })
        .collect();
    Ok(AhpResult {
        labels: labels.to_vec(),
        table,
        weights: w,
        geometric_means: geo_means,
        consistency: report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn weights_sum_to_one_and_match_dimension() {
        let m = ComparisonMatrix::from_rows(vec![
            vec![1.0, 3.0, 5.0],
            vec![1.0 / 3.0, 1.0, 2.0],
            vec![0.2, 0.5, 1.0],
        ])
        .unwrap();
        let (w, geo) = weights(&m);
        assert_eq!(w.len(), 3);
        assert_eq!(geo.len(), 3);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(w.iter().all(|&x| x >= 0.0));
        // Row dominance carries through to the weights.
        assert!(w[0] > w[1]);
        assert!(w[1] > w[2]);
    }

    #[test]
    fn unit_matrix_is_perfectly_consistent() {
        for n in [1usize, 3, 5, 9] {
            let m = ComparisonMatrix::from_rows(vec![vec![1.0; n]; n]).unwrap();
            let (w, _) = weights(&m);
            let report = consistency(&m, &w);
            assert!(
                report.cr.abs() < 1e-12,
                "n={n} expected CR 0, got {}",
                report.cr
            );
            assert!((report.lambda_max - n as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn two_by_two_is_always_reported_consistent() {
        // RI is 0 at n=2, which forces CR = 0 no matter how lopsided the
        // judgments are.
        let m =
            ComparisonMatrix::from_rows(vec![vec![1.0, 9.0], vec![1.0 / 9.0, 1.0]]).unwrap();
        let (w, _) = weights(&m);
        let report = consistency(&m, &w);
        assert_eq!(report.cr, 0.0);
        assert!(report.is_consistent());
        assert!((w[0] - 0.9).abs() < 1e-9);
        assert!((w[1] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn inconsistent_three_by_three_exceeds_threshold() {
        // A > B, B > C, but C > A: a judgment cycle.
        let m = ComparisonMatrix::from_rows(vec![
            vec![1.0, 3.0, 1.0 / 3.0],
            vec![1.0 / 3.0, 1.0, 3.0],
            vec![3.0, 1.0 / 3.0, 1.0],
        ])
        .unwrap();
        let (w, _) = weights(&m);
        let report = consistency(&m, &w);
        assert!(report.cr >= CONSISTENCY_THRESHOLD);
        assert!(!report.is_consistent());
    }

    #[test]
    fn oversized_dimension_falls_back_to_zero_ri() {
        let n = 16;
        let m = ComparisonMatrix::from_rows(vec![vec![1.0; n]; n]).unwrap();
        let (w, _) = weights(&m);
        let report = consistency(&m, &w);
        assert_eq!(report.ri, 0.0);
        assert_eq!(report.cr, 0.0);
    }

    #[test]
    fn compute_builds_labeled_table() {
        let m = ComparisonMatrix::from_rows(vec![
            vec![1.0, 2.0],
            vec![0.5, 1.0],
        ])
        .unwrap();
        let result = compute(&m, &labels(&["Cost", "Quality"])).unwrap();
        assert_eq!(result.table.len(), 2);
        assert_eq!(result.table[0].label, "Cost");
        assert_eq!(result.table[0].comparisons, vec![1.0, 2.0]);
        assert!((result.table[0].weight - result.weights[0]).abs() < 1e-15);
        assert!((result.weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn compute_is_deterministic() {
        let m = ComparisonMatrix::from_rows(vec![
            vec![1.0, 4.0, 0.5],
            vec![0.25, 1.0, 3.0],
            vec![2.0, 1.0 / 3.0, 1.0],
        ])
        .unwrap();
        let names = labels(&["a", "b", "c"]);
        let first = compute(&m, &names).unwrap();
        let second = compute(&m, &names).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_matrix_is_rejected() {
        assert_eq!(ComparisonMatrix::from_rows(vec![]), Err(AhpError::Empty));
    }

    #[test]
    fn ragged_matrix_is_rejected() {
        let err =
            ComparisonMatrix::from_rows(vec![vec![1.0, 2.0], vec![0.5]]).unwrap_err();
        assert_eq!(
            err,
            AhpError::NotSquare {
                row: 1,
                got: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn non_positive_entries_are_rejected() {
        let err = ComparisonMatrix::from_rows(vec![vec![1.0, 0.0], vec![2.0, 1.0]]).unwrap_err();
        assert_eq!(
            err,
            AhpError::NonPositiveEntry {
                row: 0,
                col: 1,
                value: 0.0
            }
        );
        assert!(ComparisonMatrix::from_rows(vec![vec![1.0, -2.0], vec![2.0, 1.0]]).is_err());
        assert!(
            ComparisonMatrix::from_rows(vec![vec![1.0, f64::NAN], vec![2.0, 1.0]]).is_err()
        );
    }

    #[test]
    fn label_count_must_match_dimension() {
        let m = ComparisonMatrix::from_rows(vec![vec![1.0]]).unwrap();
        let err = compute(&m, &labels(&["a", "b"])).unwrap_err();
        assert_eq!(
            err,
            AhpError::LabelCountMismatch {
                expected: 1,
                got: 2
            }
        );
    }

    #[test]
    fn upper_triangle_constructor_fills_reciprocals() {
        let m = ComparisonMatrix::from_upper_triangle(3, &[3.0, 5.0, 2.0]).unwrap();
        let rows = m.to_rows();
        assert_eq!(rows[0], vec![1.0, 3.0, 5.0]);
        assert!((rows[1][0] - 1.0 / 3.0).abs() < 1e-15);
        assert_eq!(rows[1][2], 2.0);
        assert_eq!(rows[2][2], 1.0);
    }

    #[test]
    fn upper_triangle_constructor_checks_judgment_count() {
        assert!(ComparisonMatrix::from_upper_triangle(3, &[3.0]).is_err());
        assert!(ComparisonMatrix::from_upper_triangle(0, &[]).is_err());
    }
}
