//! Shared fixtures and closed-form solutions for integration tests.

use std::path::PathBuf;

use bateman_core::constants::LN_2;
use bateman_core::types::{Nuclide, NuclideRegistry};

/// Path of a file in this crate's `data/` directory.
pub fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

/// `λ = ln 2 / t½`.
pub fn lambda(half_life: f64) -> f64 {
    LN_2 / half_life
}

/// Kr-85m → {Kr-85 (0.212), Rb-85 (0.788)}, Kr-85 → Rb-85 (stable).
pub fn krypton_registry() -> NuclideRegistry {
    [
        Nuclide::new("Kr-85m", 4.48 * 3600.0)
            .with_daughter("Kr-85", 0.212)
            .with_daughter("Rb-85", 0.788),
        Nuclide::new("Kr-85", 3912.0 * 86_400.0).with_daughter("Rb-85", 1.0),
        Nuclide::stable("Rb-85"),
    ]
    .into_iter()
    .collect()
}

/// A linear chain `N0 → N1 → … → N{n-1}` with the given half-lives.
/// A half-life of `None` makes that member stable.
pub fn linear_registry(half_lives: &[Option<f64>]) -> NuclideRegistry {
    half_lives
        .iter()
        .enumerate()
        .map(|(i, half_life)| {
            let name = format!("N{i}");
            let nuclide = match half_life {
                Some(h) => Nuclide::new(name, *h),
                None => Nuclide::stable(name),
            };
            if i + 1 < half_lives.len() && half_life.is_some() {
                nuclide.with_daughter(format!("N{}", i + 1), 1.0)
            } else {
                nuclide
            }
        })
        .collect()
}

/// Closed-form Bateman solution for member `n` of a linear chain starting
/// with `n0` atoms of the first member only. Decay constants must be
/// pairwise distinct; a zero constant marks a stable end member.
pub fn bateman_linear(lambdas: &[f64], n0: f64, n: usize, t: f64) -> f64 {
    let prefix: f64 = lambdas[..n].iter().product();
    let sum: f64 = (0..=n)
        .map(|i| {
            let denom: f64 = (0..=n)
                .filter(|&j| j != i)
                .map(|j| lambdas[j] - lambdas[i])
                .product();
            (-lambdas[i] * t).exp() / denom
        })
        .sum();
    n0 * prefix * sum
}

/// Relative error of `actual` against a non-zero `expected`.
pub fn rel_err(actual: f64, expected: f64) -> f64 {
    (actual - expected).abs() / expected.abs()
}
