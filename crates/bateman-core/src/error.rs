//! Error types for the Bateman solver.
use thiserror::Error;

/// Data-shape errors in the decay network. The solve cannot proceed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("unknown nuclide: {0}")] UnknownNuclide(String),
    #[error("{parent} decays to {daughter}, which is not in the registry")] UnknownDaughter { parent: String, daughter: String },
    #[error("decay chain contains a cycle through: {}", .0.join(", "))] Cycle(Vec<String>),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecayError {
    #[error("invalid decay time: {0} s")] InvalidTime(f64),
    #[error("write into upper triangle at ({row}, {col})")] NotLowerTriangular { row: usize, col: usize },
    #[error("dimension mismatch: expected {expected}, got {got}")] DimensionMismatch { expected: usize, got: usize },
    #[error("nuclide not part of the prepared chain: {0}")] NotInChain(String),
    #[error(transparent)] Chain(#[from] ChainError),
}

/// Problems reading nuclide or inventory data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("invalid half-life: {0}")] InvalidHalfLife(String),
    #[error("invalid number in column {column} of line {line}: {value}")] InvalidNumber { line: usize, column: usize, value: String },
    #[error("malformed record on line {line}: {reason}")] MalformedRecord { line: usize, reason: String },
    #[error("unknown unit: {0}")] UnknownUnit(String),
    #[error("cannot convert activity to atoms for {0}: decay constant is zero")] ZeroDecayConstant(String),
}

/// Any solver-side failure, for callers that read data and solve in one step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatemanError {
    #[error(transparent)] Chain(#[from] ChainError),
    #[error(transparent)] Decay(#[from] DecayError),
    #[error(transparent)] Data(#[from] DataError),
}
