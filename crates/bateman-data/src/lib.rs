//! # bateman-data — File input and output for the decay solver.
//!
//! - **Nuclide tables** ([`reader::read_nuclides`]): chained CSV records
//!   describing each nuclide and its daughters.
//! - **Inventories** ([`reader::read_inventory`]): initial amounts in atoms
//!   or becquerels.
//! - **Reports** ([`writer::OutputWriter`]): error log, JSON results, an
//!   optional LaTeX table and optional solver diagnostics.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::FileError;
pub use reader::{read_inventory, read_inventory_path, read_nuclides, read_nuclides_path, InventoryTable, NuclideTable};
pub use writer::{DecayReport, OutputWriter};
