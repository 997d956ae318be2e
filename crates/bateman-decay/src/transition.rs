//! Decay/production rate matrix Λ.
//!
//! Over a topological order, `Λ[i][i] = -λ_i` and, for every parent `j`
//! producing daughter `i`, `Λ[i][j] += λ_j · f(j → i)`. Parents precede their
//! daughters, so every production term lands strictly below the diagonal.

use std::collections::HashMap;

use bateman_core::error::{ChainError, DecayError};
use bateman_core::types::NuclideRegistry;
use tracing::warn;

use crate::matrix::TriangularMatrix;

/// Build Λ for `order`.
///
/// Daughters that are not part of `order` are ignored. A production term
/// that would land above the diagonal means `order` is not topological and
/// fails with [`DecayError::NotLowerTriangular`].
pub fn build_transition_matrix(
    order: &[String],
    registry: &NuclideRegistry,
) -> Result<TriangularMatrix, DecayError> {
    let index: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();
    let mut lambda = TriangularMatrix::zeros(order.len());

    for (i, name) in order.iter().enumerate() {
        let nuclide = registry
            .get(name)
            .ok_or_else(|| ChainError::UnknownNuclide(name.clone()))?;
        let rate = nuclide.decay_constant();
        if !nuclide.stable && rate == 0.0 {
            warn!(nuclide = %name, half_life = nuclide.half_life, "non-finite decay constant treated as zero");
        }
        lambda.set(i, i, -rate)?;
        if rate == 0.0 {
            continue;
        }

        for (daughter, &fraction) in &nuclide.daughters {
            // Zero-fraction edges are absent from the graph, so the order
            // may place such a daughter before its listed parent.
            if !nuclide.decays_to(daughter) {
                continue;
            }
            let Some(&j) = index.get(daughter.as_str()) else {
                continue;
            };
            let production = rate * fraction;
            if production.is_nan() {
                warn!(parent = %name, daughter = %daughter, "NaN production rate treated as zero");
            }
            lambda.add(j, i, production)?;
        }
    }

    Ok(lambda)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bateman_core::types::Nuclide;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn krypton() -> NuclideRegistry {
        [
            Nuclide::new("Kr-85m", 16_128.0)
                .with_daughter("Kr-85", 0.212)
                .with_daughter("Rb-85", 0.788),
            Nuclide::new("Kr-85", 3912.0 * 86_400.0).with_daughter("Rb-85", 1.0),
            Nuclide::stable("Rb-85"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn diagonal_is_negative_decay_constant() {
        let reg = krypton();
        let order = names(&["Kr-85m", "Kr-85", "Rb-85"]);
        let m = build_transition_matrix(&order, &reg).unwrap();
        assert_eq!(m.get(0, 0), -reg.get("Kr-85m").unwrap().decay_constant());
        assert_eq!(m.get(1, 1), -reg.get("Kr-85").unwrap().decay_constant());
    }

    #[test]
    fn stable_row_has_zero_diagonal() {
        let order = names(&["Kr-85m", "Kr-85", "Rb-85"]);
        let m = build_transition_matrix(&order, &krypton()).unwrap();
        assert_eq!(m.get(2, 2), 0.0);
    }

    #[test]
    fn production_terms_below_diagonal() {
        let reg = krypton();
        let order = names(&["Kr-85m", "Kr-85", "Rb-85"]);
        let m = build_transition_matrix(&order, &reg).unwrap();
        let l_m = reg.get("Kr-85m").unwrap().decay_constant();
        let l_85 = reg.get("Kr-85").unwrap().decay_constant();
        assert_eq!(m.get(1, 0), l_m * 0.212);
        assert_eq!(m.get(2, 0), l_m * 0.788);
        assert_eq!(m.get(2, 1), l_85);
        assert_eq!(m.get(0, 1), 0.0);
    }

    #[test]
    fn columns_conserve_atoms_when_branching_sums_to_one() {
        let order = names(&["Kr-85m", "Kr-85", "Rb-85"]);
        let m = build_transition_matrix(&order, &krypton()).unwrap();
        for col in 0..3 {
            let sum: f64 = (0..3).map(|row| m.get(row, col)).sum();
            assert!(sum.abs() < 1e-18, "column {col} sums to {sum}");
        }
    }

    #[test]
    fn daughters_outside_order_are_ignored() {
        let order = names(&["Kr-85"]);
        let m = build_transition_matrix(&order, &krypton()).unwrap();
        assert_eq!(m.dim(), 1);
        assert_eq!(m.stored(), 1);
    }

    #[test]
    fn non_topological_order_is_rejected() {
        let order = names(&["Rb-85", "Kr-85"]);
        let err = build_transition_matrix(&order, &krypton()).unwrap_err();
        assert_eq!(err, DecayError::NotLowerTriangular { row: 0, col: 1 });
    }

    #[test]
    fn malformed_half_life_gives_zero_row() {
        let reg: NuclideRegistry = [
            Nuclide::new("Bad", 0.0).with_daughter("Child", 1.0),
            Nuclide::stable("Child"),
        ]
        .into_iter()
        .collect();
        let m = build_transition_matrix(&names(&["Bad", "Child"]), &reg).unwrap();
        assert_eq!(m.stored(), 0);
    }

    #[test]
    fn nan_fraction_is_coerced_to_zero() {
        let reg: NuclideRegistry = [
            Nuclide::new("P", 10.0).with_daughter("D", f64::NAN),
            Nuclide::stable("D"),
        ]
        .into_iter()
        .collect();
        let m = build_transition_matrix(&names(&["P", "D"]), &reg).unwrap();
        assert_eq!(m.get(1, 0), 0.0);
    }

    #[test]
    fn zero_fraction_daughter_ahead_of_parent_is_skipped() {
        let reg: NuclideRegistry = [
            Nuclide::new("P", 10.0)
                .with_daughter("D", 0.0)
                .with_daughter("S", 1.0),
            Nuclide::new("D", 20.0).with_daughter("P", 1.0),
            Nuclide::stable("S"),
        ]
        .into_iter()
        .collect();
        let m = build_transition_matrix(&names(&["D", "P", "S"]), &reg).unwrap();
        assert_eq!(m.get(0, 1), 0.0);
        assert_eq!(m.get(1, 0), reg.get("D").unwrap().decay_constant());
        assert_eq!(m.get(2, 1), reg.get("P").unwrap().decay_constant());
    }

    #[test]
    fn unknown_nuclide_in_order_fails() {
        let err = build_transition_matrix(&names(&["Xe-133"]), &krypton()).unwrap_err();
        assert!(matches!(err, DecayError::Chain(ChainError::UnknownNuclide(_))));
    }
}
