//! # bateman-core
//! Foundation types and traits for the Bateman decay-chain solver.

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
pub mod units;
pub mod validation;
