//! Property and statistical tests for the experiment engine.

mod invariant_tests;
mod statistical_tests;
