//! Input validation for nuclide data.
//!
//! Validation never aborts: each check returns the problems it found as
//! [`ValidationIssue`]s and the caller decides what to do with them. The
//! solver itself does not depend on any of these checks passing.
//!
//! - **Per nuclide** ([`validate_nuclide`]): branching fractions, half-life,
//!   gamma lines.
//! - **Duplicate definitions** ([`compare_definitions`]): a nuclide that
//!   appears more than once in the tables must agree with itself.
//! - **Registry-wide** ([`validate_registry`]): every per-nuclide check plus
//!   daughters that are never defined.

use serde::Serialize;
use thiserror::Error;

use crate::constants::MAX_BRANCHING_SUM;
use crate::types::{Nuclide, NuclideRegistry};

/// A single data-quality finding.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    #[error("invalid branching fraction for {nuclide} -> {daughter}: {fraction}")]
    InvalidBranchingFraction { nuclide: String, daughter: String, fraction: f64 },
    #[error("daughter fractions for {nuclide} sum above 1: {sum}")]
    BranchingSumAboveOne { nuclide: String, sum: f64 },
    #[error("invalid half-life for {nuclide}: {half_life}")]
    InvalidHalfLife { nuclide: String, half_life: f64 },
    #[error("invalid gamma energy listed for {nuclide}: {energy_kev}")]
    InvalidGammaEnergy { nuclide: String, energy_kev: f64 },
    #[error("zero-frequency gamma listed for {nuclide} {energy_kev}")]
    ZeroGammaIntensity { nuclide: String, energy_kev: f64 },
    #[error("invalid gamma frequency listed for {nuclide} {energy_kev}: {intensity}")]
    InvalidGammaIntensity { nuclide: String, energy_kev: f64, intensity: f64 },
    #[error("inconsistent half-lives found for {nuclide} ({first} !== {second})")]
    InconsistentHalfLife { nuclide: String, first: f64, second: f64 },
    #[error("inconsistent number of gammas listed for {nuclide} ({first} !== {second})")]
    InconsistentGammaCount { nuclide: String, first: usize, second: usize },
    #[error("inconsistent gamma frequency for {nuclide} {energy_kev} ({first} !== {second})")]
    InconsistentGammaIntensity { nuclide: String, energy_kev: f64, first: f64, second: f64 },
    #[error("inconsistent gammas listed for {nuclide} (mismatched: {})", format_energies(.mismatched))]
    MismatchedGammas { nuclide: String, mismatched: Vec<f64> },
    #[error("{nuclide} decays to {daughter}, which is never defined")]
    UndefinedDaughter { nuclide: String, daughter: String },
    #[error("nuclide not found in data: {nuclide}")]
    UnknownInventoryNuclide { nuclide: String },
    #[error("line {line}: {message}")]
    Unreadable { line: usize, message: String },
}

fn format_energies(energies: &[f64]) -> String {
    energies
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Collected findings from one or more validation passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// True when no issue was recorded.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter()
    }
}

impl Extend<ValidationIssue> for ValidationReport {
    fn extend<I: IntoIterator<Item = ValidationIssue>>(&mut self, iter: I) {
        self.issues.extend(iter);
    }
}

impl IntoIterator for ValidationReport {
    type Item = ValidationIssue;
    type IntoIter = std::vec::IntoIter<ValidationIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

/// Branching fractions must be finite and sum to at most one.
pub fn validate_daughters(nuclide: &Nuclide) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut sum = 0.0;
    for (daughter, &fraction) in &nuclide.daughters {
        if !fraction.is_finite() || fraction < 0.0 {
            issues.push(ValidationIssue::InvalidBranchingFraction {
                nuclide: nuclide.name.clone(),
                daughter: daughter.clone(),
                fraction,
            });
        }
        sum += fraction;
    }
    // Rounding in the tables: 0.212 + 0.788 must not trip the check.
    if sum > MAX_BRANCHING_SUM + 1e-9 {
        issues.push(ValidationIssue::BranchingSumAboveOne {
            nuclide: nuclide.name.clone(),
            sum,
        });
    }
    issues
}

/// Unstable nuclides need a positive, finite half-life.
pub fn validate_half_life(nuclide: &Nuclide) -> Option<ValidationIssue> {
    if nuclide.stable {
        return None;
    }
    let h = nuclide.half_life;
    if h.is_finite() && h > 0.0 {
        None
    } else {
        Some(ValidationIssue::InvalidHalfLife {
            nuclide: nuclide.name.clone(),
            half_life: h,
        })
    }
}

/// Gamma energies must be numbers; intensities must be non-zero numbers.
pub fn validate_gammas(nuclide: &Nuclide) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for gamma in &nuclide.gammas {
        if !gamma.energy_kev.is_finite() {
            issues.push(ValidationIssue::InvalidGammaEnergy {
                nuclide: nuclide.name.clone(),
                energy_kev: gamma.energy_kev,
            });
        }
        if gamma.intensity == 0.0 {
            issues.push(ValidationIssue::ZeroGammaIntensity {
                nuclide: nuclide.name.clone(),
                energy_kev: gamma.energy_kev,
            });
        }
        if !gamma.intensity.is_finite() {
            issues.push(ValidationIssue::InvalidGammaIntensity {
                nuclide: nuclide.name.clone(),
                energy_kev: gamma.energy_kev,
                intensity: gamma.intensity,
            });
        }
    }
    issues
}

/// All per-nuclide checks.
pub fn validate_nuclide(nuclide: &Nuclide) -> Vec<ValidationIssue> {
    let mut issues = validate_daughters(nuclide);
    issues.extend(validate_half_life(nuclide));
    issues.extend(validate_gammas(nuclide));
    issues
}

/// Compare a repeated definition of a nuclide against the first one seen.
pub fn compare_definitions(first: &Nuclide, second: &Nuclide) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let name = &first.name;

    let same_half_life = first.half_life == second.half_life
        || (first.half_life.is_nan() && second.half_life.is_nan());
    if !same_half_life {
        issues.push(ValidationIssue::InconsistentHalfLife {
            nuclide: name.clone(),
            first: first.half_life,
            second: second.half_life,
        });
    }

    if first.gammas.len() != second.gammas.len() {
        issues.push(ValidationIssue::InconsistentGammaCount {
            nuclide: name.clone(),
            first: first.gammas.len(),
            second: second.gammas.len(),
        });
    }

    // Energies present in only one of the two definitions.
    let mut unmatched: Vec<f64> = second.gammas.iter().map(|g| g.energy_kev).collect();
    for gamma in &first.gammas {
        let other = second
            .gammas
            .iter()
            .find(|g| g.energy_kev == gamma.energy_kev);
        let Some(other) = other else {
            unmatched.push(gamma.energy_kev);
            continue;
        };
        if other.intensity != gamma.intensity {
            issues.push(ValidationIssue::InconsistentGammaIntensity {
                nuclide: name.clone(),
                energy_kev: gamma.energy_kev,
                first: gamma.intensity,
                second: other.intensity,
            });
        }
        if let Some(pos) = unmatched.iter().position(|&e| e == gamma.energy_kev) {
            unmatched.remove(pos);
        }
    }
    if !unmatched.is_empty() {
        issues.push(ValidationIssue::MismatchedGammas {
            nuclide: name.clone(),
            mismatched: unmatched,
        });
    }

    issues
}

/// Run every per-nuclide check and flag daughters missing from the registry.
pub fn validate_registry(registry: &NuclideRegistry) -> ValidationReport {
    let mut report = ValidationReport::new();
    for nuclide in registry.iter() {
        report.extend(validate_nuclide(nuclide));
        for daughter in nuclide.daughters.keys() {
            if !registry.contains(daughter) {
                report.push(ValidationIssue::UndefinedDaughter {
                    nuclide: nuclide.name.clone(),
                    daughter: daughter.clone(),
                });
            }
        }
    }
    report
}
