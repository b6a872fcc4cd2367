//! Unit tests for the task delivery context.

mod domain_tests;
mod fixtures;
mod prompt_tests;
