//! Independent matcher strategies locating file blocks in generated text.

use super::{FencedBlock, ScannedText};
use crate::change_set::domain::{FileChange, FilePath};
use std::fmt;

/// Bare language tags that are never accepted as paths.
pub const LANGUAGE_TAGS: [&str; 13] = [
    "php",
    "javascript",
    "python",
    "dart",
    "vue",
    "html",
    "css",
    "json",
    "yaml",
    "bash",
    "shell",
    "sql",
    "xml",
];

/// Line prefixes labelling an explicit file path.
const PATH_LABELS: [&str; 3] = ["filename:", "file:", "path:"];

/// Single-line comment openers, longest first.
const COMMENT_OPENERS: [&str; 4] = ["<!--", "/*", "//", "#"];

/// Characters stripped from both ends of a path token.
const TOKEN_DECORATIONS: [char; 10] = ['`', '*', '"', '\'', '(', ')', '[', ']', '<', '>'];

/// A matching strategy mapping fenced blocks to file paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchRule {
    /// The fence info-string is itself a path (` ```src/app.py `).
    FenceInfoPath,
    /// A heading or bold line naming a path directly precedes the fence.
    NamedHeading,
    /// A `File:`, `Path:` or `Filename:` line directly precedes the fence.
    LabelledPath,
    /// The first body line is a comment naming a path.
    LeadingComment,
}

impl MatchRule {
    /// Primary rules, applied cumulatively in priority order.
    pub const PRIMARY: [Self; 3] = [Self::FenceInfoPath, Self::NamedHeading, Self::LabelledPath];

    /// Rule applied only when every primary rule matched nothing.
    pub const FALLBACK: Self = Self::LeadingComment;

    /// Returns the stable rule identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FenceInfoPath => "fence_info_path",
            Self::NamedHeading => "named_heading",
            Self::LabelledPath => "labelled_path",
            Self::LeadingComment => "leading_comment",
        }
    }

    /// Returns every candidate this rule finds, in text order.
    #[must_use]
    pub fn candidates(self, text: &ScannedText<'_>) -> Vec<Candidate> {
        text.blocks()
            .iter()
            .filter_map(|block| self.match_block(text, block))
            .collect()
    }

    fn match_block(self, text: &ScannedText<'_>, block: &FencedBlock) -> Option<Candidate> {
        let (path, content) = match self {
            Self::FenceInfoPath => (path_from_info(block.info())?, block.body()),
            Self::NamedHeading => (path_from_heading(text.naming_line(block)?)?, block.body()),
            Self::LabelledPath => (path_from_label(text.naming_line(block)?)?, block.body()),
            Self::LeadingComment => path_from_leading_comment(block.body())?,
        };
        Some(Candidate {
            rule: self,
            path,
            content: content.trim().to_owned(),
            line: block.opening_line(),
        })
    }
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A path/content pair found by one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    rule: MatchRule,
    path: FilePath,
    content: String,
    line: usize,
}

impl Candidate {
    /// Returns the rule that produced the candidate.
    #[must_use]
    pub const fn rule(&self) -> MatchRule {
        self.rule
    }

    /// Returns the normalized path.
    #[must_use]
    pub const fn path(&self) -> &FilePath {
        &self.path
    }

    /// Returns the trimmed block content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the zero-based line of the opening fence.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Converts the candidate into a `create` file change.
    #[must_use]
    pub fn into_change(self) -> FileChange {
        FileChange::new(self.path, self.content)
    }
}

fn is_language_tag(token: &str) -> bool {
    let lowered = token.to_ascii_lowercase();
    LANGUAGE_TAGS.contains(&lowered.as_str())
}

fn has_extension(token: &str) -> bool {
    token.rsplit_once('.').is_some_and(|(_, extension)| {
        extension.chars().all(|c| c.is_ascii_alphanumeric())
            && extension.chars().any(|c| c.is_ascii_alphabetic())
    })
}

fn looks_like_path(token: &str) -> bool {
    let is_rejected = token.is_empty()
        || token.starts_with('!')
        || token.contains("://")
        || token.chars().any(char::is_whitespace)
        || is_language_tag(token);

    !is_rejected && (token.contains('/') || has_extension(token))
}

fn clean_token(raw: &str) -> String {
    raw.trim()
        .trim_matches(TOKEN_DECORATIONS.as_slice())
        .trim_end_matches([':', ',', ';'])
        .replace('\\', "/")
}

fn accept(token: &str) -> Option<FilePath> {
    if is_language_tag(token) {
        return None;
    }
    FilePath::new(token).ok()
}

fn path_from_info(info: &str) -> Option<FilePath> {
    info.split_whitespace()
        .filter(|token| !token.contains("://"))
        .map(|token| token.rsplit([':', '=']).next().unwrap_or(token))
        .map(clean_token)
        .find(|token| looks_like_path(token))
        .and_then(|token| accept(&token))
}

fn strip_list_marker(line: &str) -> &str {
    let trimmed = line.trim_start();
    if let Some(rest) = ["- ", "* ", "+ "]
        .iter()
        .find_map(|marker| trimmed.strip_prefix(marker))
    {
        return rest.trim_start();
    }

    let after_digits = trimmed.trim_start_matches(|c: char| c.is_ascii_digit());
    if after_digits.len() == trimmed.len() {
        return trimmed;
    }
    after_digits
        .strip_prefix(". ")
        .or_else(|| after_digits.strip_prefix(") "))
        .map_or(trimmed, str::trim_start)
}

fn heading_text(line: &str) -> Option<&str> {
    let trimmed = strip_list_marker(line).trim_end();
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if hashes > 0 {
        let rest = trimmed.trim_start_matches('#');
        let is_heading = hashes <= 6 && rest.starts_with(char::is_whitespace);
        return is_heading.then(|| rest.trim());
    }

    ["**", "__"].iter().find_map(|marker| {
        let (bold, _) = trimmed.strip_prefix(marker)?.split_once(marker)?;
        Some(bold.trim())
    })
}

fn named_path(text: &str) -> Option<FilePath> {
    let quoted = text
        .split('`')
        .skip(1)
        .step_by(2)
        .map(clean_token)
        .find(|token| looks_like_path(token));
    let token = quoted.or_else(|| {
        text.split_whitespace()
            .map(clean_token)
            .find(|token| looks_like_path(token))
    })?;
    accept(&token)
}

fn path_from_heading(line: &str) -> Option<FilePath> {
    named_path(heading_text(line)?)
}

fn strip_label(text: &str) -> Option<&str> {
    let lowered = text.to_ascii_lowercase();
    let label = PATH_LABELS
        .iter()
        .find(|label| lowered.starts_with(*label))?;
    text.get(label.len()..)
}

fn path_from_label(line: &str) -> Option<FilePath> {
    let undecorated = line
        .trim()
        .trim_start_matches(|c: char| matches!(c, '#' | '*' | '_' | '>' | '-') || c.is_whitespace());
    let value = strip_label(undecorated)?
        .trim_start_matches(|c: char| matches!(c, '*' | '_') || c.is_whitespace());
    let token = clean_token(value.split_whitespace().next()?);
    accept(&token)
}

fn path_from_leading_comment(body: &str) -> Option<(FilePath, &str)> {
    let (first_line, rest) = body.split_once('\n').unwrap_or((body, ""));
    let opened = first_line.trim();
    let comment = COMMENT_OPENERS
        .iter()
        .find_map(|opener| opened.strip_prefix(opener))?
        .trim_end()
        .trim_end_matches("-->")
        .trim_end_matches("*/")
        .trim();
    let named = strip_label(comment).map_or(comment, str::trim);

    let mut tokens = named.split_whitespace();
    let token = clean_token(tokens.next()?);
    if tokens.next().is_some() || !looks_like_path(&token) {
        return None;
    }
    accept(&token).map(|path| (path, rest))
}
