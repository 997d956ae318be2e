//! Intermediate matrices of a solve, for logging and serialization.

use serde::Serialize;

/// Dense snapshots of every stage of one evaluation.
///
/// Rows and columns follow `nuclides`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecayDiagnostics {
    pub nuclides: Vec<String>,
    pub elapsed_secs: f64,
    /// Λ.
    pub transition: Vec<Vec<f64>>,
    pub c: Vec<Vec<f64>>,
    pub c_inv: Vec<Vec<f64>>,
    /// exp(D·t) as a dense diagonal matrix.
    pub exp_dt: Vec<Vec<f64>>,
    /// N(0).
    pub initial: Vec<f64>,
    /// N(t).
    pub result: Vec<f64>,
}

/// Dense diagonal matrix with `diagonal` on the main diagonal.
pub(crate) fn dense_diagonal(diagonal: &[f64]) -> Vec<Vec<f64>> {
    let n = diagonal.len();
    (0..n)
        .map(|i| {
            let mut row = vec![0.0; n];
            row[i] = diagonal[i];
            row
        })
        .collect()
}
