//! Unit tests for change-set extraction.

mod domain_tests;
mod extractor_tests;
