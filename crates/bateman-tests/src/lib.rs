//! Integration test suite for the Bateman decay solver.
//!
//! Regression tests compare solver output against closed-form Bateman
//! solutions and reference data; adversarial tests feed malformed networks
//! and inputs and check that every failure is reported, never panicked on.

pub mod helpers;
