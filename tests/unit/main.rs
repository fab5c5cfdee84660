//! Unit-level suites exercised through the public API.

mod config_tests;
mod stopping_tests;
