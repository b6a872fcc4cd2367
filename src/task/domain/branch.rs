//! Branch naming for task delivery runs.

use super::TaskDomainError;
use crate::vcs::domain::BranchName;
use mockable::Clock;
use std::sync::Arc;

/// Prefix shared by every delivery branch.
pub const BRANCH_PREFIX: &str = "feature/";

/// Longest slug kept before the timestamp suffix.
pub const MAX_SLUG_LEN: usize = 50;

/// Slug used when a title has no usable characters.
const EMPTY_SLUG: &str = "task";

/// Minute-resolution suffix format (`YYYYMMDDHHmm`, UTC).
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";

/// Derives ref-safe delivery branch names from task titles.
///
/// Names are deterministic for a title within one clock minute, so two runs
/// of identically titled tasks in the same minute produce the same name and
/// the second branch creation is rejected by the host.
///
/// # Examples
///
/// ```
/// use devpilot::task::domain::slugify;
///
/// assert_eq!(slugify("Fix Login Bug!!!"), "fix-login-bug");
/// ```
#[derive(Debug)]
pub struct BranchNamer<C>
where
    C: Clock,
{
    clock: Arc<C>,
}

impl<C> Clone for BranchNamer<C>
where
    C: Clock,
{
    fn clone(&self) -> Self {
        Self {
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> BranchNamer<C>
where
    C: Clock,
{
    /// Creates a namer reading the current minute from `clock`.
    #[must_use]
    pub const fn new(clock: Arc<C>) -> Self {
        Self { clock }
    }

    /// Returns `feature/<slug>-<YYYYMMDDHHmm>` for `title`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Vcs`] if the composed name is not a valid
    /// branch name.
    pub fn name_for(&self, title: &str) -> Result<BranchName, TaskDomainError> {
        let stamp = self.clock.utc().format(TIMESTAMP_FORMAT);
        let name = format!("{BRANCH_PREFIX}{}-{stamp}", slugify(title));
        Ok(BranchName::new(name)?)
    }
}

/// Reduces a title to lowercase ASCII words joined by single hyphens.
///
/// The result holds at most [`MAX_SLUG_LEN`] characters, never starts or
/// ends with a hyphen, and falls back to `task` when nothing survives.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for character in title.to_lowercase().chars() {
        if character.is_whitespace() || character == '-' {
            pending_hyphen = true;
            continue;
        }
        if !(character.is_ascii_lowercase() || character.is_ascii_digit()) {
            continue;
        }
        if pending_hyphen && !slug.is_empty() {
            slug.push('-');
        }
        pending_hyphen = false;
        slug.push(character);
    }

    slug.truncate(MAX_SLUG_LEN);
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        EMPTY_SLUG.to_owned()
    } else {
        trimmed.to_owned()
    }
}
