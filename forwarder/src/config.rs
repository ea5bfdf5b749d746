//! Configuration module for environment variable parsing.
//!
//! Everything is read once at startup into [`Config`], which is then shared
//! read-only with the request handlers.

use std::env;

use thiserror::Error;
use tracing::warn;
use url::Url;

/// Default Resend email-send endpoint.
pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Default replay window for webhook timestamps, in seconds.
pub const DEFAULT_TOLERANCE_SECS: u64 = 300;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Resend API key used to send the forwarded email
    pub resend_api_key: Option<String>,

    /// Webhook signing secret (`whsec_...`)
    pub webhook_secret: Option<String>,

    /// Sender address of the forwarded email
    pub forward_from: Option<String>,

    /// Recipient address of the forwarded email
    pub forward_to: Option<String>,

    /// Email-send endpoint
    pub resend_api_url: Url,

    /// Maximum age in seconds for webhook timestamps
    pub tolerance_secs: u64,
}

/// A required configuration value is missing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),
}

/// The values a webhook needs before the core may be invoked.
#[derive(Debug, Clone, Copy)]
pub struct ForwardSettings<'a> {
    pub api_key: &'a str,
    pub webhook_secret: &'a str,
    pub forward_from: &'a str,
    pub forward_to: &'a str,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            resend_api_key: non_empty_var("RESEND_API_KEY"),

            webhook_secret: non_empty_var("RESEND_WEBHOOK_SECRET"),

            forward_from: non_empty_var("FORWARD_FROM"),

            forward_to: non_empty_var("FORWARD_TO"),

            resend_api_url: parse_url("RESEND_API_URL", DEFAULT_RESEND_API_URL),

            tolerance_secs: env::var("WEBHOOK_TOLERANCE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TOLERANCE_SECS),
        }
    }

    /// Borrow the four required values, or name the first one missing.
    pub fn forward_settings(&self) -> Result<ForwardSettings<'_>, ConfigError> {
        Ok(ForwardSettings {
            api_key: self
                .resend_api_key
                .as_deref()
                .ok_or(ConfigError::Missing("RESEND_API_KEY"))?,
            webhook_secret: self
                .webhook_secret
                .as_deref()
                .ok_or(ConfigError::Missing("RESEND_WEBHOOK_SECRET"))?,
            forward_from: self
                .forward_from
                .as_deref()
                .ok_or(ConfigError::Missing("FORWARD_FROM"))?,
            forward_to: self
                .forward_to
                .as_deref()
                .ok_or(ConfigError::Missing("FORWARD_TO"))?,
        })
    }

    /// Names of the required values that are not set.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("RESEND_API_KEY", self.resend_api_key.is_none()),
            ("RESEND_WEBHOOK_SECRET", self.webhook_secret.is_none()),
            ("FORWARD_FROM", self.forward_from.is_none()),
            ("FORWARD_TO", self.forward_to.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}

/// Read a variable, treating blank values as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a URL variable, falling back to `default` when unset or invalid.
fn parse_url(name: &str, default: &str) -> Url {
    let fallback = || Url::parse(default).expect("default URL is valid");

    let raw = match non_empty_var(name) {
        Some(v) => v,
        None => return fallback(),
    };

    match Url::parse(&raw) {
        Ok(url) => url,
        Err(e) => {
            warn!(env_var = name, value = %raw, error = %e, "Invalid URL, using default");
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Config {
        Config {
            port: 8080,
            resend_api_key: Some("re_test".to_string()),
            webhook_secret: Some("whsec_c2VjcmV0a2V5".to_string()),
            forward_from: Some("catch@example.com".to_string()),
            forward_to: Some("me@example.com".to_string()),
            resend_api_url: Url::parse(DEFAULT_RESEND_API_URL).unwrap(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    #[test]
    fn test_non_empty_var_blank() {
        env::set_var("CATCHMAIL_TEST_BLANK", "   ");
        assert_eq!(non_empty_var("CATCHMAIL_TEST_BLANK"), None);
        env::remove_var("CATCHMAIL_TEST_BLANK");
    }

    #[test]
    fn test_non_empty_var_trims() {
        env::set_var("CATCHMAIL_TEST_TRIM", " value ");
        assert_eq!(non_empty_var("CATCHMAIL_TEST_TRIM"), Some("value".to_string()));
        env::remove_var("CATCHMAIL_TEST_TRIM");
    }

    #[test]
    fn test_parse_url_invalid_falls_back() {
        env::set_var("CATCHMAIL_TEST_URL", "not a url");
        let url = parse_url("CATCHMAIL_TEST_URL", DEFAULT_RESEND_API_URL);
        assert_eq!(url.as_str(), DEFAULT_RESEND_API_URL);
        env::remove_var("CATCHMAIL_TEST_URL");
    }

    #[test]
    fn test_parse_url_default() {
        let url = parse_url("CATCHMAIL_TEST_URL_UNSET", DEFAULT_RESEND_API_URL);
        assert_eq!(url.host_str(), Some("api.resend.com"));
    }

    #[test]
    fn test_forward_settings_complete() {
        let config = complete();
        let settings = config.forward_settings().unwrap();
        assert_eq!(settings.api_key, "re_test");
        assert_eq!(settings.forward_to, "me@example.com");
        assert!(config.missing().is_empty());
    }

    #[test]
    fn test_forward_settings_missing_secret() {
        let config = Config {
            webhook_secret: None,
            ..complete()
        };
        assert_eq!(
            config.forward_settings().unwrap_err(),
            ConfigError::Missing("RESEND_WEBHOOK_SECRET")
        );
    }

    #[test]
    fn test_missing_lists_all() {
        let config = Config {
            resend_api_key: None,
            forward_to: None,
            ..complete()
        };
        assert_eq!(config.missing(), vec!["RESEND_API_KEY", "FORWARD_TO"]);
    }
}
