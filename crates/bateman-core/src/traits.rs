//! Trait interfaces for the Bateman solver.
//!
//! - [`DecaySolver`]: evolves an inventory through pure radioactive decay
//!   (bateman-decay implements)

use crate::error::DecayError;
use crate::types::{Inventory, NuclideRegistry};

/// Pure computation of decayed inventories.
///
/// A solve is a function of the registry, the initial inventory and the
/// elapsed time only. Implementations hold no mutable state, so one solver
/// can serve any number of callers.
pub trait DecaySolver: Send + Sync {
    /// Inventory after `elapsed_secs` seconds of decay.
    ///
    /// Every nuclide in `initial` must be in `registry`; daughters reached by
    /// decay are pulled in automatically. Nuclides whose resulting count is
    /// elided are left out of the returned inventory.
    fn decay(
        &self,
        registry: &NuclideRegistry,
        initial: &Inventory,
        elapsed_secs: f64,
    ) -> Result<Inventory, DecayError>;

    /// Inventories at each of `times`, in the same order.
    ///
    /// Default implementation solves each time independently. Implementations
    /// that can reuse work between time points should override it.
    fn decay_series(
        &self,
        registry: &NuclideRegistry,
        initial: &Inventory,
        times: &[f64],
    ) -> Result<Vec<Inventory>, DecayError> {
        times
            .iter()
            .map(|&t| self.decay(registry, initial, t))
            .collect()
    }
}
