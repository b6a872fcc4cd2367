//! Unit tests for the repository commit delivery context.

mod domain_tests;
mod fixtures;
