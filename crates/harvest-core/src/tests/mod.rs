//! Crate-level test suite.
//!
//! - `helpers.rs`: grid builders shared by the unit tests
//! - `determinism.rs`: same seed and inputs give the same level
//! - `integration.rs`: landing, pass-through and patrol-to-chase scenarios
//! - `properties.rs`: proptest invariants of the resolver and the strategies

pub(crate) mod helpers;
