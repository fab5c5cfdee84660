//! banditry - sequential experiments with Thompson sampling.
//!
//! The library core lives in [`bandit`]: per-arm Beta posteriors, a Monte
//! Carlo estimate of which arm is optimal and how much value is left, and
//! stopping rules evaluated once per round. The `banditry` binary wraps it
//! with config loading and a simulation CLI.

pub mod app;
pub mod bandit;
pub mod cli;
pub mod config;
pub mod error;
pub mod test_utils;

pub use error::{BanditError, Result};
