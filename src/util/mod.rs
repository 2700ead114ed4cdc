//! Internal utilities for the morphlab engine.
//!
//! These utilities are intentionally minimal and dependency-free to maintain
//! determinism in the oracle runner.

pub mod det_rng;

pub use det_rng::{DetRng, derive_seed, mix_seed};
