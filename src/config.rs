//! Runtime configuration for hosting-service and text-generation adapters.
//!
//! Configuration comes from a JSON document whose every field is optional,
//! or from `DEVPILOT_*` environment variables read through an injectable
//! lookup:
//!
//! ```
//! use devpilot::config::DevpilotConfig;
//!
//! let config = DevpilotConfig::from_lookup(|key| {
//!     (key == "DEVPILOT_BASE_BRANCH").then(|| "trunk".to_owned())
//! })?;
//! assert_eq!(config.delivery.base_branch, "trunk");
//! # Ok::<(), devpilot::config::ConfigError>(())
//! ```

use crate::vcs::domain::{AccessToken, BranchName, VcsDomainError};
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;

/// Default GitHub REST endpoint.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Default chat-completions endpoint.
pub const DEFAULT_GENERATION_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default text-generation model.
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-5.2";

/// Default base branch when a repository does not report one.
pub const DEFAULT_BASE_BRANCH: &str = "main";

/// Longest accepted timeout, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric setting could not be parsed.
    #[error("invalid value '{value}' for {key}, expected a whole number of seconds")]
    InvalidNumber {
        /// Setting name.
        key: String,
        /// Rejected raw value.
        value: String,
    },

    /// A timeout is zero or longer than [`MAX_TIMEOUT_SECS`].
    #[error("timeout {key} must be between 1 and {max} seconds, got {secs}", max = MAX_TIMEOUT_SECS)]
    TimeoutOutOfRange {
        /// Setting name.
        key: &'static str,
        /// Rejected value.
        secs: u64,
    },

    /// The multi-step delivery budget does not exceed a single host call.
    #[error("delivery timeout {delivery_secs}s must exceed the host call timeout {call_secs}s")]
    BudgetNotAboveCallTimeout {
        /// Configured delivery budget.
        delivery_secs: u64,
        /// Longer of the read and write timeouts.
        call_secs: u64,
    },

    /// The fallback base branch is not a valid branch name.
    #[error("invalid base branch: {0}")]
    InvalidBaseBranch(#[from] VcsDomainError),

    /// The JSON document is malformed.
    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),
}

/// GitHub REST adapter settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API base URL.
    pub api_url: String,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Timeout for single read calls, in seconds.
    pub read_timeout_secs: u64,
    /// Timeout for single mutation calls, in seconds.
    pub write_timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_owned(),
            user_agent: concat!("devpilot/", env!("CARGO_PKG_VERSION")).to_owned(),
            read_timeout_secs: 30,
            write_timeout_secs: 60,
        }
    }
}

impl GitHubConfig {
    /// Returns the read timeout.
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Returns the mutation timeout.
    #[must_use]
    pub const fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

/// Delivery pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Budget for the whole branch, commit, and pull-request sequence.
    pub timeout_secs: u64,
    /// Base branch used when the repository's default cannot be read.
    pub base_branch: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            base_branch: DEFAULT_BASE_BRANCH.to_owned(),
        }
    }
}

impl DeliveryConfig {
    /// Returns the delivery budget.
    #[must_use]
    pub const fn budget(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the validated fallback base branch.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseBranch`] when the name is not a
    /// valid branch.
    pub fn fallback_base_branch(&self) -> Result<BranchName, ConfigError> {
        Ok(BranchName::new(self.base_branch.as_str())?)
    }
}

/// Chat-completions adapter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Chat-completions endpoint.
    pub api_url: String,
    /// Model name sent with every request.
    pub model: String,
    /// Timeout for one generation call, in seconds.
    pub timeout_secs: u64,
    /// Bearer key, when the endpoint requires one.
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_key: Option<AccessToken>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GENERATION_API_URL.to_owned(),
            model: DEFAULT_GENERATION_MODEL.to_owned(),
            timeout_secs: 120,
            api_key: None,
        }
    }
}

impl GenerationConfig {
    /// Returns the per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<AccessToken>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|key| !key.is_empty()).map(AccessToken::new))
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DevpilotConfig {
    /// Hosting-service settings.
    pub github: GitHubConfig,
    /// Delivery pipeline settings.
    pub delivery: DeliveryConfig,
    /// Text-generation settings.
    pub generation: GenerationConfig,
}

impl DevpilotConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed documents, or any error
    /// of [`DevpilotConfig::validate`].
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`DevpilotConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Overlays `DEVPILOT_*` variables returned by `lookup` on the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNumber`] for unparsable timeouts, or
    /// any error of [`DevpilotConfig::validate`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let text = |key: &str, target: &mut String| {
            if let Some(value) = lookup(key) {
                *target = value;
            }
        };
        text("DEVPILOT_GITHUB_API_URL", &mut config.github.api_url);
        text("DEVPILOT_GITHUB_USER_AGENT", &mut config.github.user_agent);
        text("DEVPILOT_BASE_BRANCH", &mut config.delivery.base_branch);
        text("DEVPILOT_LLM_API_URL", &mut config.generation.api_url);
        text("DEVPILOT_LLM_MODEL", &mut config.generation.model);

        let seconds = |key: &str, target: &mut u64| -> Result<(), ConfigError> {
            if let Some(value) = lookup(key) {
                *target = value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber {
                        key: key.to_owned(),
                        value,
                    })?;
            }
            Ok(())
        };
        seconds("DEVPILOT_READ_TIMEOUT_SECS", &mut config.github.read_timeout_secs)?;
        seconds("DEVPILOT_WRITE_TIMEOUT_SECS", &mut config.github.write_timeout_secs)?;
        seconds("DEVPILOT_DELIVERY_TIMEOUT_SECS", &mut config.delivery.timeout_secs)?;
        seconds("DEVPILOT_LLM_TIMEOUT_SECS", &mut config.generation.timeout_secs)?;

        config.generation.api_key = lookup("DEVPILOT_LLM_API_KEY")
            .filter(|key| !key.is_empty())
            .map(AccessToken::new);

        config.validate()?;
        Ok(config)
    }

    /// Checks ranges and cross-field invariants.
    ///
    /// Every timeout lies in `1..=MAX_TIMEOUT_SECS`, the delivery budget is
    /// longer than both single-call timeouts, and the fallback base branch
    /// is a valid branch name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TimeoutOutOfRange`],
    /// [`ConfigError::BudgetNotAboveCallTimeout`], or
    /// [`ConfigError::InvalidBaseBranch`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeouts = [
            ("read_timeout_secs", self.github.read_timeout_secs),
            ("write_timeout_secs", self.github.write_timeout_secs),
            ("delivery.timeout_secs", self.delivery.timeout_secs),
            ("generation.timeout_secs", self.generation.timeout_secs),
        ];
        if let Some((key, secs)) = timeouts
            .into_iter()
            .find(|(_, secs)| !(1..=MAX_TIMEOUT_SECS).contains(secs))
        {
            return Err(ConfigError::TimeoutOutOfRange { key, secs });
        }

        let call_secs = self
            .github
            .read_timeout_secs
            .max(self.github.write_timeout_secs);
        if self.delivery.timeout_secs <= call_secs {
            return Err(ConfigError::BudgetNotAboveCallTimeout {
                delivery_secs: self.delivery.timeout_secs,
                call_secs,
            });
        }

        self.delivery.fallback_base_branch()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration loading.

    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let table: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key| table.get(key).cloned()
    }

    #[rstest]
    fn defaults_apply_without_variables() {
        let config = DevpilotConfig::from_lookup(|_| None).expect("defaults are valid");

        assert_eq!(config.github.api_url, DEFAULT_GITHUB_API_URL);
        assert_eq!(config.github.read_timeout(), Duration::from_secs(30));
        assert_eq!(config.github.write_timeout(), Duration::from_secs(60));
        assert_eq!(config.delivery.budget(), Duration::from_secs(300));
        assert_eq!(config.delivery.base_branch, "main");
        assert!(config.generation.api_key.is_none());
    }

    #[rstest]
    fn variables_override_defaults() {
        let config = DevpilotConfig::from_lookup(lookup_from(&[
            ("DEVPILOT_GITHUB_API_URL", "https://ghe.example.com/api/v3"),
            ("DEVPILOT_READ_TIMEOUT_SECS", " 5 "),
            ("DEVPILOT_DELIVERY_TIMEOUT_SECS", "90"),
            ("DEVPILOT_LLM_MODEL", "local-coder"),
            ("DEVPILOT_LLM_API_KEY", "sk-test"),
        ]))
        .expect("valid overrides");

        assert_eq!(config.github.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.github.read_timeout_secs, 5);
        assert_eq!(config.delivery.timeout_secs, 90);
        assert_eq!(config.generation.model, "local-coder");
        let key = config.generation.api_key.expect("key loaded");
        assert_eq!(key.expose(), "sk-test");
    }

    #[rstest]
    #[case("DEVPILOT_READ_TIMEOUT_SECS", "soon")]
    #[case("DEVPILOT_WRITE_TIMEOUT_SECS", "-1")]
    #[case("DEVPILOT_DELIVERY_TIMEOUT_SECS", "1.5")]
    fn non_numeric_timeouts_are_rejected(#[case] key: &str, #[case] value: &str) {
        let result = DevpilotConfig::from_lookup(lookup_from(&[(key, value)]));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidNumber { key: ref rejected, .. }) if rejected == key
        ));
    }

    #[rstest]
    #[case("60", "60", "10", 60)]
    #[case("45", "30", "45", 45)]
    #[case("30", "90", "90", 90)]
    fn delivery_budget_must_exceed_single_calls(
        #[case] read: &str,
        #[case] write: &str,
        #[case] delivery: &str,
        #[case] call: u64,
    ) {
        let result = DevpilotConfig::from_lookup(lookup_from(&[
            ("DEVPILOT_READ_TIMEOUT_SECS", read),
            ("DEVPILOT_WRITE_TIMEOUT_SECS", write),
            ("DEVPILOT_DELIVERY_TIMEOUT_SECS", delivery),
        ]));

        assert!(matches!(
            result,
            Err(ConfigError::BudgetNotAboveCallTimeout { delivery_secs, call_secs })
                if delivery_secs.to_string() == delivery && call_secs == call
        ));
    }

    #[rstest]
    #[case("DEVPILOT_READ_TIMEOUT_SECS", "0")]
    #[case("DEVPILOT_LLM_TIMEOUT_SECS", "0")]
    #[case("DEVPILOT_DELIVERY_TIMEOUT_SECS", "18446744073709551615")]
    #[case("DEVPILOT_WRITE_TIMEOUT_SECS", "86401")]
    fn timeouts_outside_the_accepted_range_are_rejected(#[case] key: &str, #[case] value: &str) {
        let result = DevpilotConfig::from_lookup(lookup_from(&[(key, value)]));

        assert!(matches!(
            result,
            Err(ConfigError::TimeoutOutOfRange { secs, .. }) if secs.to_string() == value
        ));
    }

    #[rstest]
    fn invalid_base_branch_is_rejected() {
        let result =
            DevpilotConfig::from_lookup(lookup_from(&[("DEVPILOT_BASE_BRANCH", "no spaces")]));

        assert!(matches!(result, Err(ConfigError::InvalidBaseBranch(_))));
    }

    #[rstest]
    fn json_document_fills_missing_fields() {
        let config = DevpilotConfig::from_json(
            r#"{"github": {"user_agent": "ci"}, "generation": {"api_key": ""}}"#,
        )
        .expect("valid document");

        assert_eq!(config.github.user_agent, "ci");
        assert_eq!(config.github.api_url, DEFAULT_GITHUB_API_URL);
        assert_eq!(config.delivery, DeliveryConfig::default());
        assert!(config.generation.api_key.is_none());
    }

    #[rstest]
    fn malformed_json_is_reported() {
        let result = DevpilotConfig::from_json("{\"delivery\": {\"timeout_secs\": \"x\"}}");

        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[rstest]
    fn api_key_is_redacted_in_debug_output() {
        let config =
            DevpilotConfig::from_lookup(lookup_from(&[("DEVPILOT_LLM_API_KEY", "sk-live")]))
                .expect("valid");

        assert!(!format!("{config:?}").contains("sk-live"));
    }
}
