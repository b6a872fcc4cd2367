//! Cascading extraction of file edits from generated text.

use super::{MatchRule, ScannedText};
use crate::change_set::domain::ChangeSet;
use tracing::debug;

/// Extracts an ordered, path-deduplicated [`ChangeSet`] from raw text.
///
/// The primary rules ([`MatchRule::PRIMARY`]) are all applied and their
/// candidates accumulated in rule order, then text order; the first
/// candidate for a path wins. The fallback rule runs only when no primary
/// rule matched anything. Extraction never fails.
///
/// # Examples
///
///     use devpilot::change_set::services::ChangeSetExtractor;
///
///     let text = "Here you go:\n```src/app.py\nprint(1)\n```\n";
///     let changes = ChangeSetExtractor::new().extract(text);
///     assert_eq!(changes.len(), 1);
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeSetExtractor;

impl ChangeSetExtractor {
    /// Creates an extractor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Extracts file edits from generated text.
    #[must_use]
    pub fn extract(&self, raw: &str) -> ChangeSet {
        let text = ScannedText::scan(raw);
        let primary = collect(&text, &MatchRule::PRIMARY);
        if !primary.is_empty() {
            return primary;
        }

        let fallback = collect(&text, &[MatchRule::FALLBACK]);
        debug!(
            blocks = text.blocks().len(),
            files = fallback.len(),
            "primary rules matched nothing, used leading-comment fallback"
        );
        fallback
    }
}

fn collect(text: &ScannedText<'_>, rules: &[MatchRule]) -> ChangeSet {
    rules
        .iter()
        .flat_map(|rule| {
            let candidates = rule.candidates(text);
            debug!(rule = %rule, matches = candidates.len(), "applied match rule");
            candidates
        })
        .map(super::Candidate::into_change)
        .collect()
}
