//! Analytic eigen-decomposition of a lower-triangular rate matrix.
//!
//! For lower-triangular Λ with diagonal D, the eigenvector matrix C and its
//! inverse are themselves unit lower-triangular and follow row by row from
//! `ΛC = CD` and `C·C⁻¹ = I`:
//!
//! ```text
//! C[i][j]    = ( Σ_{k=j}^{i-1} Λ[i][k] · C[k][j] ) / ( Λ[j][j] − Λ[i][i] )
//! C⁻¹[i][j]  = − Σ_{k=j}^{i-1} C[i][k] · C⁻¹[k][j]
//! ```
//!
//! Row `i` only reads rows `< i`, so rows are filled in increasing order.
//!
//! Two nuclides in the same chain with identical decay constants make the
//! denominator vanish. That coefficient is set to zero. This is an
//! approximation: it drops the `t·e^{-λt}` term an exact degenerate solution
//! would carry.

use bateman_core::error::DecayError;
use tracing::warn;

use crate::matrix::TriangularMatrix;

/// `Λ = C · diag(Λ) · C⁻¹`.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub c: TriangularMatrix,
    pub c_inv: TriangularMatrix,
    /// Coefficients zeroed because two decay constants coincided.
    pub degenerate: usize,
}

/// Compute C and C⁻¹ for a lower-triangular `lambda`.
pub fn decompose(lambda: &TriangularMatrix) -> Result<Decomposition, DecayError> {
    let n = lambda.dim();
    let mut c = TriangularMatrix::identity(n);
    let mut c_inv = TriangularMatrix::identity(n);
    let mut degenerate = 0;

    for i in 0..n {
        let l_ii = lambda.get(i, i);

        for j in 0..i {
            // Only stored Λ[i][k] contribute.
            let sum: f64 = lambda
                .row_range(i, j..i)
                .map(|(k, l_ik)| l_ik * c.get(k, j))
                .sum();
            if sum == 0.0 {
                continue;
            }
            let denom = lambda.get(j, j) - l_ii;
            let value = if denom == 0.0 {
                warn!(row = i, col = j, "tied decay constants; coupling coefficient set to zero");
                degenerate += 1;
                0.0
            } else {
                sum / denom
            };
            c.set(i, j, value)?;
        }

        for j in 0..i {
            let sum: f64 = c
                .row_range(i, j..i)
                .map(|(k, c_ik)| c_ik * c_inv.get(k, j))
                .sum();
            c_inv.set(i, j, -sum)?;
        }
    }

    Ok(Decomposition {
        c,
        c_inv,
        degenerate,
    })
}
