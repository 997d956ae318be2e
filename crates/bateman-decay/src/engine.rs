//! Decay engine implementing the [`DecaySolver`] trait.
//!
//! Solving splits in two. [`PreparedChain::prepare`] sorts the chain, builds
//! Λ and decomposes it; none of that depends on time or on the atom counts.
//! [`PreparedChain::evolve`] then evaluates any number of inventories and
//! time points against the same preparation.

use std::collections::HashSet;

use bateman_core::constants::DEFAULT_ELIDE_BELOW;
use bateman_core::error::DecayError;
use bateman_core::traits::DecaySolver;
use bateman_core::types::{Inventory, NuclideRegistry};
use tracing::{debug, info, warn};

use crate::diagnostics::{dense_diagonal, DecayDiagnostics};
use crate::evaluator::{evolve_vector, exp_diagonal, initial_vector, materialize};
use crate::graph::DecayGraph;
use crate::matrix::TriangularMatrix;
use crate::transition::build_transition_matrix;
use crate::triangular::{decompose, Decomposition};

/// Evaluation knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolveOptions {
    /// Resulting counts with magnitude at or below this are left out.
    pub elide_below: f64,
}

impl Default for EvolveOptions {
    fn default() -> Self {
        Self {
            elide_below: DEFAULT_ELIDE_BELOW,
        }
    }
}

fn check_time(elapsed_secs: f64) -> Result<(), DecayError> {
    if elapsed_secs.is_finite() && elapsed_secs >= 0.0 {
        Ok(())
    } else {
        Err(DecayError::InvalidTime(elapsed_secs))
    }
}

/// A sorted, decomposed decay chain, ready for evaluation.
///
/// Holds only owned numeric data, so it can be shared across threads and
/// evaluated concurrently.
#[derive(Debug, Clone)]
pub struct PreparedChain {
    order: Vec<String>,
    transition: TriangularMatrix,
    decomposition: Decomposition,
    diagonal: Vec<f64>,
}

impl PreparedChain {
    /// Sort, build and decompose the chain rooted at `roots`.
    pub fn prepare<'a, I>(registry: &NuclideRegistry, roots: I) -> Result<Self, DecayError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let graph = DecayGraph::from_roots(registry, roots)?;
        let order = graph.topological_order()?;
        let transition = build_transition_matrix(&order, registry)?;
        let decomposition = decompose(&transition)?;
        let diagonal = transition.diagonal();

        info!(
            nuclides = order.len(),
            stored = transition.stored(),
            "prepared decay chain"
        );
        debug!(order = ?order, "topological order");
        debug!(transition = ?transition.to_dense(), "transition matrix");
        debug!(c = ?decomposition.c.to_dense(), "C matrix");
        debug!(c_inv = ?decomposition.c_inv.to_dense(), "inverse C matrix");
        if decomposition.degenerate > 0 {
            warn!(
                coefficients = decomposition.degenerate,
                "chain has tied decay constants; results are approximate"
            );
        }

        Ok(Self {
            order,
            transition,
            decomposition,
            diagonal,
        })
    }

    /// The chain rooted at every nuclide of `inventory`.
    pub fn for_inventory(registry: &NuclideRegistry, inventory: &Inventory) -> Result<Self, DecayError> {
        Self::prepare(registry, inventory.nuclides())
    }

    /// Nuclides in topological order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Λ over [`order`](Self::order).
    pub fn transition(&self) -> &TriangularMatrix {
        &self.transition
    }

    pub fn c(&self) -> &TriangularMatrix {
        &self.decomposition.c
    }

    pub fn c_inv(&self) -> &TriangularMatrix {
        &self.decomposition.c_inv
    }

    /// Number of coefficients zeroed because of tied decay constants.
    pub fn degenerate_coefficients(&self) -> usize {
        self.decomposition.degenerate
    }

    /// N(0) over the chain order. Fails if `inventory` holds a nuclide outside the chain.
    pub fn initial_vector(&self, inventory: &Inventory) -> Result<Vec<f64>, DecayError> {
        let known: HashSet<&str> = self.order.iter().map(String::as_str).collect();
        if let Some(stray) = inventory.iter().find(|e| !known.contains(e.nuclide.as_str())) {
            return Err(DecayError::NotInChain(stray.nuclide.clone()));
        }
        Ok(initial_vector(&self.order, inventory))
    }

    /// Raw counts N(t) over the chain order.
    pub fn evolve_counts(&self, inventory: &Inventory, elapsed_secs: f64) -> Result<Vec<f64>, DecayError> {
        check_time(elapsed_secs)?;
        let n0 = self.initial_vector(inventory)?;
        evolve_vector(
            &self.decomposition.c,
            &self.decomposition.c_inv,
            &self.diagonal,
            &n0,
            elapsed_secs,
        )
    }

    /// Inventory after `elapsed_secs` of decay.
    pub fn evolve(
        &self,
        inventory: &Inventory,
        elapsed_secs: f64,
        options: EvolveOptions,
    ) -> Result<Inventory, DecayError> {
        let counts = self.evolve_counts(inventory, elapsed_secs)?;
        debug!(elapsed_secs, counts = ?counts, "evolved inventory");
        Ok(materialize(&self.order, &counts, options.elide_below))
    }

    /// Inventories at each of `times`, in order.
    pub fn evolve_series(
        &self,
        inventory: &Inventory,
        times: &[f64],
        options: EvolveOptions,
    ) -> Result<Vec<Inventory>, DecayError> {
        times
            .iter()
            .map(|&t| self.evolve(inventory, t, options))
            .collect()
    }

    /// Every intermediate stage of one evaluation.
    pub fn diagnostics(&self, inventory: &Inventory, elapsed_secs: f64) -> Result<DecayDiagnostics, DecayError> {
        let result = self.evolve_counts(inventory, elapsed_secs)?;
        Ok(DecayDiagnostics {
            nuclides: self.order.clone(),
            elapsed_secs,
            transition: self.transition.to_dense(),
            c: self.decomposition.c.to_dense(),
            c_inv: self.decomposition.c_inv.to_dense(),
            exp_dt: dense_diagonal(&exp_diagonal(&self.diagonal, elapsed_secs)),
            initial: initial_vector(&self.order, inventory),
            result,
        })
    }
}

/// The production decay solver.
///
/// Implements [`DecaySolver`] by preparing the chain rooted at the initial
/// inventory and evaluating it.
#[derive(Debug, Clone, Default)]
pub struct DecayEngine {
    options: EvolveOptions,
}

impl DecayEngine {
    /// Create a DecayEngine that drops only exact-zero counts.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EvolveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> EvolveOptions {
        self.options
    }
}

impl DecaySolver for DecayEngine {
    fn decay(
        &self,
        registry: &NuclideRegistry,
        initial: &Inventory,
        elapsed_secs: f64,
    ) -> Result<Inventory, DecayError> {
        check_time(elapsed_secs)?;
        info!(elapsed_secs, "decaying inventory");
        PreparedChain::for_inventory(registry, initial)?.evolve(initial, elapsed_secs, self.options)
    }

    fn decay_series(
        &self,
        registry: &NuclideRegistry,
        initial: &Inventory,
        times: &[f64],
    ) -> Result<Vec<Inventory>, DecayError> {
        if let Some(&bad) = times.iter().find(|&&t| check_time(t).is_err()) {
            return Err(DecayError::InvalidTime(bad));
        }
        PreparedChain::for_inventory(registry, initial)?.evolve_series(initial, times, self.options)
    }
}
