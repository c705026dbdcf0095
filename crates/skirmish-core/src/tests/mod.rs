//! Scenario tests for the round protocol.
//!
//! - `determinism.rs`: same seed, same match
//! - `integration.rs`: end-to-end rounds, barrier and termination
//! - `helpers.rs`: scripted RNG, setup utilities and event capture

pub mod helpers;
