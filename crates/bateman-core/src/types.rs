//! Nuclide model and inventories.
//!
//! Half-lives are in seconds. A stable nuclide carries an infinite half-life
//! by convention, but its decay constant is zero because of the `stable` flag,
//! not because of the half-life value.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::LN_2;
use crate::error::DataError;

/// One gamma emission line.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GammaLine {
    /// Photon energy in keV.
    pub energy_kev: f64,
    /// Emission probability per decay.
    pub intensity: f64,
}

/// Immutable description of one nuclide's decay behaviour.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Nuclide {
    /// Unique key, e.g. `"Kr-85m"`.
    pub name: String,
    /// Half-life in seconds. Infinite for stable nuclides.
    #[serde(with = "finite_or_null")]
    pub half_life: f64,
    /// Stable nuclides never decay and produce nothing.
    pub stable: bool,
    /// Daughter name → branching fraction.
    pub daughters: BTreeMap<String, f64>,
    /// Significant gamma lines. Carried for validation and reporting only.
    #[serde(default)]
    pub gammas: Vec<GammaLine>,
}

impl Nuclide {
    /// An unstable nuclide with the given half-life and no daughters.
    pub fn new(name: impl Into<String>, half_life: f64) -> Self {
        Self {
            name: name.into(),
            half_life,
            stable: false,
            daughters: BTreeMap::new(),
            gammas: Vec::new(),
        }
    }

    /// A stable nuclide.
    pub fn stable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            half_life: f64::INFINITY,
            stable: true,
            daughters: BTreeMap::new(),
            gammas: Vec::new(),
        }
    }

    /// Builder: add (or overwrite) a daughter with the given branching fraction.
    pub fn with_daughter(mut self, daughter: impl Into<String>, fraction: f64) -> Self {
        self.daughters.insert(daughter.into(), fraction);
        self
    }

    /// Builder: append a gamma line.
    pub fn with_gamma(mut self, energy_kev: f64, intensity: f64) -> Self {
        self.gammas.push(GammaLine { energy_kev, intensity });
        self
    }

    /// Decay constant `λ = ln2 / half_life` in 1/s.
    ///
    /// Exactly zero for stable nuclides. A half-life that yields a
    /// non-finite quotient (zero, NaN) also gives zero.
    pub fn decay_constant(&self) -> f64 {
        if self.stable {
            return 0.0;
        }
        let lambda = LN_2 / self.half_life;
        if lambda.is_finite() { lambda } else { 0.0 }
    }

    /// Whether this nuclide lists `daughter` with a non-zero branching fraction.
    pub fn decays_to(&self, daughter: &str) -> bool {
        self.branching_fraction(daughter) != 0.0
    }

    /// Branching fraction towards `daughter`, zero when not listed.
    pub fn branching_fraction(&self, daughter: &str) -> f64 {
        self.daughters.get(daughter).copied().unwrap_or(0.0)
    }

    /// Sum of all branching fractions.
    pub fn branching_sum(&self) -> f64 {
        self.daughters.values().sum()
    }
}

impl fmt::Display for Nuclide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stable {
            write!(f, "{} (stable)", self.name)
        } else {
            write!(f, "{} (t½ = {} s)", self.name, self.half_life)
        }
    }
}

/// Name → nuclide map shared read-only by the solver.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct NuclideRegistry {
    nuclides: BTreeMap<String, Nuclide>,
}

impl NuclideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a nuclide, returning the previous definition under the same name.
    pub fn insert(&mut self, nuclide: Nuclide) -> Option<Nuclide> {
        self.nuclides.insert(nuclide.name.clone(), nuclide)
    }

    pub fn get(&self, name: &str) -> Option<&Nuclide> {
        self.nuclides.get(name)
    }

    /// Mutable access, used by readers that attach daughters after the fact.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Nuclide> {
        self.nuclides.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nuclides.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nuclides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nuclides.is_empty()
    }

    /// Nuclides in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Nuclide> {
        self.nuclides.values()
    }

    /// Names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nuclides.keys().map(String::as_str)
    }
}

impl FromIterator<Nuclide> for NuclideRegistry {
    fn from_iter<I: IntoIterator<Item = Nuclide>>(iter: I) -> Self {
        let mut registry = Self::new();
        for nuclide in iter {
            registry.insert(nuclide);
        }
        registry
    }
}

/// One `(nuclide, atom count)` pair.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InventoryEntry {
    pub nuclide: String,
    /// Number of atoms. Non-negative, may be fractional.
    pub atoms: f64,
}

impl InventoryEntry {
    pub fn new(nuclide: impl Into<String>, atoms: f64) -> Self {
        Self {
            nuclide: nuclide.into(),
            atoms,
        }
    }

    /// Build an entry from an activity in Bq: `N = A / λ`.
    pub fn from_activity(
        nuclide: impl Into<String>,
        activity_bq: f64,
        decay_constant: f64,
    ) -> Result<Self, DataError> {
        let nuclide = nuclide.into();
        if decay_constant == 0.0 {
            return Err(DataError::ZeroDecayConstant(nuclide));
        }
        Ok(Self {
            nuclide,
            atoms: activity_bq / decay_constant,
        })
    }
}

/// A collection of inventory entries.
///
/// Lookups treat nuclides that are not listed as holding zero atoms.
/// Duplicate entries for the same nuclide add up.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct Inventory {
    entries: Vec<InventoryEntry>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: InventoryEntry) {
        self.entries.push(entry);
    }

    /// Atom count for `nuclide`, zero when absent.
    pub fn atoms(&self, nuclide: &str) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.nuclide == nuclide)
            .fold(0.0, |acc, e| acc + e.atoms)
    }

    pub fn contains(&self, nuclide: &str) -> bool {
        self.entries.iter().any(|e| e.nuclide == nuclide)
    }

    /// Sum of all atom counts.
    pub fn total_atoms(&self) -> f64 {
        self.entries.iter().fold(0.0, |acc, e| acc + e.atoms)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.entries.iter()
    }

    /// Distinct nuclide names in first-seen order.
    pub fn nuclides(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !seen.contains(&entry.nuclide.as_str()) {
                seen.push(&entry.nuclide);
            }
        }
        seen
    }
}

impl FromIterator<InventoryEntry> for Inventory {
    fn from_iter<I: IntoIterator<Item = InventoryEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(name, atoms)| InventoryEntry::new(name, atoms))
            .collect()
    }
}

impl IntoIterator for Inventory {
    type Item = InventoryEntry;
    type IntoIter = std::vec::IntoIter<InventoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// JSON has no infinity: non-finite half-lives round-trip through `null`.
mod finite_or_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kr85() -> Nuclide {
        Nuclide::new("Kr-85", 3912.0 * 86_400.0).with_daughter("Rb-85", 1.0)
    }

    // --- decay constant ---

    #[test]
    fn decay_constant_from_half_life() {
        let n = Nuclide::new("X", 10.0);
        assert!((n.decay_constant() - LN_2 / 10.0).abs() < 1e-15);
    }

    #[test]
    fn kr85_decay_constant() {
        let lambda = kr85().decay_constant();
        assert!((lambda - 2.0508e-9).abs() / 2.0508e-9 < 1e-3, "λ = {lambda}");
    }

    #[test]
    fn stable_has_zero_decay_constant() {
        assert_eq!(Nuclide::stable("Rb-85").decay_constant(), 0.0);
    }

    #[test]
    fn stable_flag_wins_over_half_life() {
        let mut n = Nuclide::new("Odd", 5.0);
        n.stable = true;
        assert_eq!(n.decay_constant(), 0.0);
    }

    #[test]
    fn zero_half_life_gives_zero_constant() {
        assert_eq!(Nuclide::new("Bad", 0.0).decay_constant(), 0.0);
        assert_eq!(Nuclide::new("Bad", f64::NAN).decay_constant(), 0.0);
    }

    // --- branching ---

    #[test]
    fn decays_to_listed_daughter() {
        let n = kr85();
        assert!(n.decays_to("Rb-85"));
        assert!(!n.decays_to("Sr-85"));
        assert_eq!(n.branching_fraction("Sr-85"), 0.0);
    }

    #[test]
    fn zero_fraction_is_not_a_decay() {
        let n = Nuclide::new("X", 1.0).with_daughter("Y", 0.0);
        assert!(!n.decays_to("Y"));
    }

    #[test]
    fn branching_sum_adds_fractions() {
        let n = Nuclide::new("Kr-85m", 16_128.0)
            .with_daughter("Kr-85", 0.212)
            .with_daughter("Rb-85", 0.788);
        assert!((n.branching_sum() - 1.0).abs() < 1e-12);
    }

    // --- registry ---

    #[test]
    fn registry_insert_returns_previous() {
        let mut reg = NuclideRegistry::new();
        assert!(reg.insert(kr85()).is_none());
        let prev = reg.insert(Nuclide::new("Kr-85", 1.0));
        assert_eq!(prev, Some(kr85()));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn registry_names_sorted() {
        let reg: NuclideRegistry = [Nuclide::stable("Rb-85"), kr85(), Nuclide::new("A-1", 1.0)]
            .into_iter()
            .collect();
        let names: Vec<&str> = reg.names().collect();
        assert_eq!(names, vec!["A-1", "Kr-85", "Rb-85"]);
    }

    #[test]
    fn registry_json_round_trip_keeps_stable_infinity() {
        let reg: NuclideRegistry = [kr85(), Nuclide::stable("Rb-85")].into_iter().collect();
        let json = serde_json::to_string(&reg).unwrap();
        assert!(json.contains("\"half_life\":null"));
        let back: NuclideRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reg);
        assert!(back.get("Rb-85").unwrap().half_life.is_infinite());
    }

    // --- inventory ---

    #[test]
    fn missing_inventory_entry_is_zero() {
        let inv: Inventory = [("Kr-85", 100.0)].into_iter().collect();
        assert_eq!(inv.atoms("Kr-85"), 100.0);
        assert_eq!(inv.atoms("Rb-85"), 0.0);
    }

    #[test]
    fn absent_nuclide_is_positive_zero() {
        let inv: Inventory = [("Kr-85", 100.0)].into_iter().collect();
        assert!(inv.atoms("Rb-85").is_sign_positive());
        assert!(Inventory::new().total_atoms().is_sign_positive());
    }

    #[test]
    fn duplicate_entries_add_up() {
        let inv: Inventory = [("Kr-85", 100.0), ("Kr-85", 50.0)].into_iter().collect();
        assert_eq!(inv.atoms("Kr-85"), 150.0);
        assert_eq!(inv.nuclides(), vec!["Kr-85"]);
    }

    #[test]
    fn from_activity_divides_by_lambda() {
        let e = InventoryEntry::from_activity("X", 10.0, 0.5).unwrap();
        assert_eq!(e.atoms, 20.0);
    }

    #[test]
    fn from_activity_rejects_zero_lambda() {
        let err = InventoryEntry::from_activity("Rb-85", 10.0, 0.0).unwrap_err();
        assert_eq!(err, DataError::ZeroDecayConstant("Rb-85".into()));
    }

    #[test]
    fn total_atoms_sums_entries() {
        let inv: Inventory = [("A", 1.5), ("B", 2.5)].into_iter().collect();
        assert_eq!(inv.total_atoms(), 4.0);
        assert_eq!(inv.len(), 2);
    }

    // --- proptest ---

    proptest! {
        #[test]
        fn decay_constant_non_negative_and_finite(half_life in 1e-6f64..1e20) {
            let n = Nuclide::new("X", half_life);
            let lambda = n.decay_constant();
            prop_assert!(lambda > 0.0);
            prop_assert!(lambda.is_finite());
        }

        #[test]
        fn stable_always_zero(half_life in proptest::num::f64::ANY) {
            let mut n = Nuclide::new("X", half_life);
            n.stable = true;
            prop_assert_eq!(n.decay_constant(), 0.0);
        }
    }
}
