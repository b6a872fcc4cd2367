//! Change-set extraction for generated task output.
//!
//! Turns free-form text produced by a language model into an ordered,
//! path-deduplicated set of file edits. Extraction never fails: text without
//! recognisable file blocks yields an empty [`domain::ChangeSet`]. The module
//! follows the same layout as the other contexts:
//!
//! - Domain types in [`domain`]
//! - Extraction strategies and the extractor in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
