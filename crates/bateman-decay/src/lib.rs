//! # bateman-decay — Analytic radioactive decay-chain solver.
//!
//! Given a nuclide registry and an initial inventory, this crate computes the
//! inventory after an elapsed time by solving the Bateman equations exactly:
//! - **Chain discovery**: the graph of every nuclide reachable from the
//!   inventory is sorted so parents precede daughters; cycles are rejected.
//! - **Rate matrix**: decay and production rates form a lower-triangular Λ.
//! - **Decomposition**: Λ = C·D·C⁻¹ is computed analytically, row by row.
//! - **Evaluation**: `N(t) = C · exp(D·t) · C⁻¹ · N(0)`.

pub mod diagnostics;
pub mod engine;
pub mod evaluator;
pub mod graph;
pub mod matrix;
pub mod transition;
pub mod triangular;

pub use diagnostics::DecayDiagnostics;
pub use engine::{DecayEngine, EvolveOptions, PreparedChain};
pub use graph::DecayGraph;
pub use matrix::TriangularMatrix;
pub use triangular::Decomposition;
