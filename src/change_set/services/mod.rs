//! Extraction services turning generated text into change sets.

mod extractor;
mod fences;
mod rules;

pub use extractor::ChangeSetExtractor;
pub use fences::{FencedBlock, ScannedText};
pub use rules::{Candidate, LANGUAGE_TAGS, MatchRule};
