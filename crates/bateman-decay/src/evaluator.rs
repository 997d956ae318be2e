//! Time evolution `N(t) = C · exp(D·t) · C⁻¹ · N(0)`.

use bateman_core::error::DecayError;
use bateman_core::types::{Inventory, InventoryEntry};

use crate::matrix::TriangularMatrix;

/// `exp(d_i · t)` for every diagonal entry.
pub fn exp_diagonal(diagonal: &[f64], elapsed_secs: f64) -> Vec<f64> {
    diagonal.iter().map(|&d| (d * elapsed_secs).exp()).collect()
}

/// Initial atom counts laid out over `order`. Nuclides missing from the
/// inventory hold zero atoms.
pub fn initial_vector(order: &[String], inventory: &Inventory) -> Vec<f64> {
    order.iter().map(|name| inventory.atoms(name)).collect()
}

/// Evaluate `C · exp(D·t) · C⁻¹ · n0`.
pub fn evolve_vector(
    c: &TriangularMatrix,
    c_inv: &TriangularMatrix,
    diagonal: &[f64],
    n0: &[f64],
    elapsed_secs: f64,
) -> Result<Vec<f64>, DecayError> {
    if diagonal.len() != c.dim() {
        return Err(DecayError::DimensionMismatch {
            expected: c.dim(),
            got: diagonal.len(),
        });
    }
    let modal = c_inv.mul_vec(n0)?;
    let scaled: Vec<f64> = modal
        .iter()
        .zip(exp_diagonal(diagonal, elapsed_secs))
        .map(|(y, e)| y * e)
        .collect();
    c.mul_vec(&scaled)
}

/// Turn evolved counts back into an inventory, in `order`.
///
/// Counts whose magnitude does not exceed `elide_below` are dropped; with
/// `elide_below == 0.0` only exact zeros go.
pub fn materialize(order: &[String], counts: &[f64], elide_below: f64) -> Inventory {
    order
        .iter()
        .zip(counts)
        .filter(|&(_, &atoms)| atoms.abs() > elide_below)
        .map(|(name, &atoms)| InventoryEntry::new(name.clone(), atoms))
        .collect()
}
