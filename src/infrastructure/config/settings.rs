//! Application configuration loading and validation.
//!
//! Settings come from environment-style keys (a `.env` file is loaded by the
//! binary before this runs). An optional TOML file supplies non-secret
//! tunables such as logging, retry policy and job intervals; environment
//! keys override it. Secrets are only ever read from the environment.
//!
//! # Example
//!
//! ```no_run
//! use insiderwatch::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use super::logging::{LogFormat, LoggingConfig};
use crate::application::recovery::DEFAULT_SESSION_TTL_MINUTES;
use crate::application::retry::RetryPolicy;
use crate::application::scheduler::SchedulerSettings;
use crate::domain::BrokerCredentials;
use crate::error::{ConfigError, Result};
use crate::infrastructure::crypto::KEY_LEN;

pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const BROKER_USERNAME: &str = "BROKER_USERNAME";
pub const BROKER_PASSWORD: &str = "BROKER_PASSWORD";
pub const ENCRYPTION_KEY: &str = "ENCRYPTION_KEY";
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const CHECK_INTERVAL_MINUTES: &str = "CHECK_INTERVAL_MINUTES";
pub const LOG_LEVEL: &str = "LOG_LEVEL";
pub const LOG_FORMAT: &str = "LOG_FORMAT";
pub const BROKER_SESSION_TTL_MINUTES: &str = "BROKER_SESSION_TTL_MINUTES";

/// A value that must never appear in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Job intervals from the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_check_interval_minutes")]
    pub check_interval_minutes: u64,
    #[serde(default = "default_portfolio_interval_minutes")]
    pub portfolio_interval_minutes: u64,
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,
}

const fn default_check_interval_minutes() -> u64 {
    30
}

const fn default_portfolio_interval_minutes() -> u64 {
    60
}

const fn default_initial_delay_secs() -> u64 {
    10
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_minutes: default_check_interval_minutes(),
            portfolio_interval_minutes: default_portfolio_interval_minutes(),
            initial_delay_secs: default_initial_delay_secs(),
        }
    }
}

/// Non-secret settings that may live in a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// SQLite database path; `DATABASE_URL` overrides it.
    #[serde(default)]
    pub database: Option<String>,
    /// Lifetime of sessions created by recovery; the environment overrides it.
    #[serde(default)]
    pub session_ttl_minutes: Option<i64>,
}

/// Brokerage integration settings.
#[derive(Debug, Clone)]
pub struct BrokerageConfig {
    /// Present iff both username and password are set and non-empty.
    pub credentials: Option<BrokerCredentials>,
    pub retry: RetryPolicy,
    pub session_ttl_minutes: i64,
}

impl BrokerageConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// Lifetime of recovered sessions. Validation bounds it to
    /// [`MAX_SPAN_MINUTES`].
    #[must_use]
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_ttl_minutes)
    }
}

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: Secret,
    pub encryption_key: Secret,
    pub broker: BrokerageConfig,
    /// Filesystem path of the SQLite database.
    pub database_path: String,
    pub scheduler: SchedulerConfig,
    pub logging: LoggingConfig,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_number<T: FromStr>(field: &'static str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        ConfigError::InvalidValue {
            field,
            reason: format!("expected a whole number, got {raw:?}"),
        }
        .into()
    })
}

/// Accepts `sqlite:///path`, `sqlite://path` or a bare path.
fn database_path(url: &str) -> String {
    url.strip_prefix("sqlite:///")
        .or_else(|| url.strip_prefix("sqlite://"))
        .unwrap_or(url)
        .to_string()
}

impl Config {
    /// Build configuration from file settings and a key lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for missing required keys and invalid values.
    pub fn from_parts<F>(file: FileConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let telegram_token = non_empty(lookup(TELEGRAM_TOKEN)).ok_or(ConfigError::MissingField {
            field: TELEGRAM_TOKEN,
        })?;
        let encryption_key = non_empty(lookup(ENCRYPTION_KEY)).ok_or(ConfigError::MissingField {
            field: ENCRYPTION_KEY,
        })?;

        let credentials = match (
            non_empty(lookup(BROKER_USERNAME)),
            non_empty(lookup(BROKER_PASSWORD)),
        ) {
            (Some(username), Some(password)) => Some(BrokerCredentials::new(username, password)),
            _ => None,
        };

        let mut scheduler = file.scheduler;
        if let Some(raw) = non_empty(lookup(CHECK_INTERVAL_MINUTES)) {
            scheduler.check_interval_minutes = parse_number(CHECK_INTERVAL_MINUTES, &raw)?;
        }

        let session_ttl_minutes = match non_empty(lookup(BROKER_SESSION_TTL_MINUTES)) {
            Some(raw) => parse_number(BROKER_SESSION_TTL_MINUTES, &raw)?,
            None => file
                .session_ttl_minutes
                .unwrap_or(DEFAULT_SESSION_TTL_MINUTES),
        };

        let mut logging = file.logging;
        if let Some(level) = non_empty(lookup(LOG_LEVEL)) {
            logging.level = level;
        }
        if let Some(raw) = non_empty(lookup(LOG_FORMAT)) {
            logging.format = raw
                .parse::<LogFormat>()
                .map_err(|reason| ConfigError::InvalidValue {
                    field: LOG_FORMAT,
                    reason,
                })?;
        }

        let database_path = non_empty(lookup(DATABASE_URL))
            .or(file.database)
            .map_or_else(default_database_path, |url| database_path(&url));

        let config = Self {
            telegram_token: Secret::new(telegram_token),
            encryption_key: Secret::new(encryption_key),
            broker: BrokerageConfig {
                credentials,
                retry: file.retry,
                session_ttl_minutes,
            },
            database_path,
            scheduler,
            logging,
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration from a key lookup with file defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_parts(FileConfig::default(), lookup)
    }

    /// Configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse TOML tunables, then apply the process environment.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
        Self::from_parts(file, |key| std::env::var(key).ok())
    }

    /// Load TOML tunables from a file, then apply the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting configuration is invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    fn validate(&self) -> Result<()> {
        let key_len = self.encryption_key.expose().len();
        if key_len != KEY_LEN {
            return Err(ConfigError::InvalidValue {
                field: ENCRYPTION_KEY,
                reason: format!("must be {KEY_LEN} bytes long, got {key_len}"),
            }
            .into());
        }
        check_span(CHECK_INTERVAL_MINUTES, self.scheduler.check_interval_minutes)?;
        check_span(
            "portfolio_interval_minutes",
            self.scheduler.portfolio_interval_minutes,
        )?;
        if self.scheduler.initial_delay_secs > MAX_SPAN_MINUTES * 60 {
            return Err(ConfigError::InvalidValue {
                field: "initial_delay_secs",
                reason: format!("must be at most {} seconds", MAX_SPAN_MINUTES * 60),
            }
            .into());
        }
        let ttl = u64::try_from(self.broker.session_ttl_minutes).unwrap_or(0);
        check_span(BROKER_SESSION_TTL_MINUTES, ttl)?;
        if self.broker.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_attempts",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        let multiplier = self.broker.retry.backoff_multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_multiplier",
                reason: "must be a finite number >= 1.0".to_string(),
            }
            .into());
        }
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: DATABASE_URL,
                reason: "must name a database file".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Whether brokerage credentials are configured.
    #[must_use]
    pub fn brokerage_enabled(&self) -> bool {
        self.broker.is_enabled()
    }

    /// Job timing derived from the scheduler section.
    #[must_use]
    pub fn scheduler_settings(&self) -> SchedulerSettings {
        SchedulerSettings {
            initial_delay: Duration::from_secs(self.scheduler.initial_delay_secs),
            check_interval: Duration::from_secs(
                self.scheduler.check_interval_minutes.saturating_mul(60),
            ),
            portfolio_interval: Duration::from_secs(
                self.scheduler.portfolio_interval_minutes.saturating_mul(60),
            ),
        }
    }
}

/// Longest accepted job interval or session lifetime, one leap year.
///
/// Larger values would overflow when turned into instants and timestamps.
pub const MAX_SPAN_MINUTES: u64 = 366 * 24 * 60;

fn check_span(field: &'static str, minutes: u64) -> Result<()> {
    if minutes == 0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must be greater than 0".to_string(),
        }
        .into());
    }
    if minutes > MAX_SPAN_MINUTES {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be at most {MAX_SPAN_MINUTES} minutes"),
        }
        .into());
    }
    Ok(())
}

fn default_database_path() -> String {
    "data/insiderwatch.db".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![(TELEGRAM_TOKEN, "123:abc"), (ENCRYPTION_KEY, KEY)]
    }

    #[test]
    fn minimal_environment_uses_defaults() {
        let config = Config::from_lookup(lookup(&minimal())).unwrap();

        assert_eq!(config.telegram_token.expose(), "123:abc");
        assert!(!config.brokerage_enabled());
        assert_eq!(config.database_path, "data/insiderwatch.db");
        assert_eq!(config.scheduler.check_interval_minutes, 30);
        assert_eq!(config.broker.session_ttl_minutes, 1800);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.broker.retry, RetryPolicy::default());
    }

    #[test]
    fn missing_token_is_reported() {
        let result = Config::from_lookup(lookup(&[(ENCRYPTION_KEY, KEY)]));
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingField {
                field: "TELEGRAM_TOKEN"
            }))
        ));
    }

    #[test]
    fn missing_key_is_reported() {
        let result = Config::from_lookup(lookup(&[(TELEGRAM_TOKEN, "t")]));
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingField {
                field: "ENCRYPTION_KEY"
            }))
        ));
    }

    #[test]
    fn short_key_is_rejected() {
        let result = Config::from_lookup(lookup(&[
            (TELEGRAM_TOKEN, "t"),
            (ENCRYPTION_KEY, "too-short"),
        ]));
        match result {
            Err(Error::Config(ConfigError::InvalidValue { field, reason })) => {
                assert_eq!(field, "ENCRYPTION_KEY");
                assert!(reason.contains("got 9"));
            }
            other => panic!("expected invalid key, got {other:?}"),
        }
    }

    #[test]
    fn brokerage_needs_both_halves() {
        let mut pairs = minimal();
        pairs.push((BROKER_USERNAME, "ann"));
        assert!(!Config::from_lookup(lookup(&pairs)).unwrap().brokerage_enabled());

        pairs.push((BROKER_PASSWORD, "pw"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert!(config.brokerage_enabled());
        assert_eq!(config.broker.credentials.unwrap().username, "ann");
    }

    #[test]
    fn sqlite_url_prefix_is_stripped() {
        let mut pairs = minimal();
        pairs.push((DATABASE_URL, "sqlite:///./data/bot.db"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.database_path, "./data/bot.db");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut pairs = minimal();
        pairs.push((CHECK_INTERVAL_MINUTES, "0"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "CHECK_INTERVAL_MINUTES",
                ..
            }))
        ));
    }

    #[test]
    fn overflowing_intervals_are_rejected() {
        let mut pairs = minimal();
        pairs.push((CHECK_INTERVAL_MINUTES, "18446744073709551615"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "CHECK_INTERVAL_MINUTES",
                ..
            }))
        ));

        let file = FileConfig {
            scheduler: SchedulerConfig {
                portfolio_interval_minutes: u64::MAX,
                ..SchedulerConfig::default()
            },
            ..FileConfig::default()
        };
        assert!(matches!(
            Config::from_parts(file, lookup(&minimal())),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "portfolio_interval_minutes",
                ..
            }))
        ));
    }

    #[test]
    fn huge_ttl_is_rejected() {
        let mut pairs = minimal();
        pairs.push((BROKER_SESSION_TTL_MINUTES, "9223372036854775807"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "BROKER_SESSION_TTL_MINUTES",
                ..
            }))
        ));
    }

    #[test]
    fn longest_accepted_ttl_still_yields_a_duration() {
        let mut pairs = minimal();
        pairs.push((BROKER_SESSION_TTL_MINUTES, "527040"));
        pairs.push((CHECK_INTERVAL_MINUTES, "527040"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.broker.session_ttl(), chrono::Duration::days(366));
        assert_eq!(
            config.scheduler_settings().check_interval,
            Duration::from_secs(366 * 24 * 60 * 60)
        );
    }

    #[test]
    fn non_finite_backoff_is_rejected() {
        let file = FileConfig {
            retry: RetryPolicy {
                backoff_multiplier: f64::NAN,
                ..RetryPolicy::default()
            },
            ..FileConfig::default()
        };
        assert!(matches!(
            Config::from_parts(file, lookup(&minimal())),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "backoff_multiplier",
                ..
            }))
        ));
    }

    #[test]
    fn non_numeric_ttl_is_rejected() {
        let mut pairs = minimal();
        pairs.push((BROKER_SESSION_TTL_MINUTES, "thirty"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "BROKER_SESSION_TTL_MINUTES",
                ..
            }))
        ));
    }

    #[test]
    fn environment_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
            database = "file.db"

            [logging]
            level = "debug"
            format = "json"

            [scheduler]
            check_interval_minutes = 5

            [retry]
            max_attempts = 4
            "#,
        )
        .unwrap();

        let mut pairs = minimal();
        pairs.push((CHECK_INTERVAL_MINUTES, "15"));
        pairs.push((LOG_LEVEL, "warn"));
        let config = Config::from_parts(file, lookup(&pairs)).unwrap();

        assert_eq!(config.database_path, "file.db");
        assert_eq!(config.scheduler.check_interval_minutes, 15);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.broker.retry.max_attempts, 4);
        assert_eq!(
            config.scheduler_settings().check_interval,
            Duration::from_secs(15 * 60)
        );
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let config = Config::from_lookup(lookup(&minimal())).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("123:abc"));
        assert!(!rendered.contains(KEY));
    }

    #[test]
    fn bad_log_format_is_rejected() {
        let mut pairs = minimal();
        pairs.push((LOG_FORMAT, "xml"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "LOG_FORMAT",
                ..
            }))
        ));
    }
}
