use crate::{Context, Error, IsolationLevel, Result};
use std::time::Duration;
use time::{UtcOffset, macros::format_description};
use url::form_urlencoded;
use urlencoding::decode;

/// Settings of a database handle, fixed once the handle is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Isolation of the transactions, the database default when `None`.
    pub isolation_level: Option<IsolationLevel>,
    pub default_fetch_size: Option<u32>,
    /// Times a unit of work runs before a transient conflict is surfaced.
    pub max_attempts: u32,
    pub min_retry_delay: Duration,
    pub max_retry_delay: Duration,
    /// Zone of the local date times exchanged with the database.
    pub default_time_zone: UtcOffset,
    pub statement_timeout: Option<Duration>,
    pub read_only: bool,
    pub default_schema: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            isolation_level: None,
            default_fetch_size: None,
            max_attempts: 3,
            min_retry_delay: Duration::ZERO,
            max_retry_delay: Duration::ZERO,
            default_time_zone: UtcOffset::UTC,
            statement_timeout: None,
            read_only: false,
            default_schema: None,
        }
    }
}

impl DatabaseConfig {
    pub fn builder() -> DatabaseConfigBuilder {
        DatabaseConfigBuilder(Self::default())
    }

    /// Read the settings from the query string of a database URL.
    ///
    /// Returns the configuration and the URL without the parameters consumed here, the others are
    /// left for the connection provider.
    pub fn from_url(url: &str) -> Result<(DatabaseConfig, String)> {
        let context = || format!("While reading the configuration from `{}`", url);
        let decoded = decode(url).with_context(context)?;
        let (base, query) = match decoded.split_once('?') {
            Some((base, query)) => (base, query),
            None => (decoded.as_ref(), ""),
        };
        let mut config = DatabaseConfig::default();
        let mut rest = form_urlencoded::Serializer::new(String::new());
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            let invalid = || {
                let error = Error::msg(format!("Invalid value `{}` for `{}`", value, key))
                    .context(context());
                log::error!("{:#}", error);
                error
            };
            match key.as_ref() {
                "isolation" => {
                    config.isolation_level =
                        Some(IsolationLevel::from_name(value).ok_or_else(invalid)?)
                }
                "max_attempts" => config.max_attempts = value.parse().map_err(|_| invalid())?,
                "fetch_size" => {
                    config.default_fetch_size = Some(value.parse().map_err(|_| invalid())?)
                }
                "time_zone" => {
                    config.default_time_zone = parse_offset(value).ok_or_else(invalid)?
                }
                "timeout_ms" => {
                    config.statement_timeout =
                        Some(Duration::from_millis(value.parse().map_err(|_| invalid())?))
                }
                "retry_delay_ms" => {
                    let delay = Duration::from_millis(value.parse().map_err(|_| invalid())?);
                    config.min_retry_delay = delay;
                    config.max_retry_delay = config.max_retry_delay.max(delay);
                }
                "max_retry_delay_ms" => {
                    config.max_retry_delay =
                        Duration::from_millis(value.parse().map_err(|_| invalid())?)
                }
                "read_only" => config.read_only = value.parse().map_err(|_| invalid())?,
                "schema" => config.default_schema = Some(value.to_string()),
                _ => {
                    rest.append_pair(&key, value);
                }
            }
        }
        let rest = rest.finish();
        if config.max_attempts == 0 {
            let error = Error::msg("`max_attempts` must be at least 1").context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        if rest.is_empty() {
            Ok((config, base.to_string()))
        } else {
            Ok((config, format!("{}?{}", base, rest)))
        }
    }

    /// Pause before the attempt following `attempt`, growing linearly within the bounds.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let max = self.max_retry_delay.max(self.min_retry_delay);
        (self.min_retry_delay * attempt.max(1)).min(max)
    }
}

/// Offsets like `+02:00`, `-05:30`, `02:00` (a `+` may arrive decoded as a space) or `UTC`.
fn parse_offset(value: &str) -> Option<UtcOffset> {
    if value.eq_ignore_ascii_case("utc") || value.eq_ignore_ascii_case("z") {
        return Some(UtcOffset::UTC);
    }
    let value = if value.starts_with(['+', '-']) {
        value.to_string()
    } else {
        format!("+{}", value)
    };
    UtcOffset::parse(
        &value,
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .ok()
}

/// Consuming builder of [`DatabaseConfig`].
#[derive(Debug, Clone)]
pub struct DatabaseConfigBuilder(DatabaseConfig);

impl DatabaseConfigBuilder {
    pub fn isolation_level(mut self, isolation_level: IsolationLevel) -> Self {
        self.0.isolation_level = Some(isolation_level);
        self
    }

    pub fn default_fetch_size(mut self, fetch_size: u32) -> Self {
        self.0.default_fetch_size = Some(fetch_size);
        self
    }

    /// Clamped to at least one attempt.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.0.max_attempts = max_attempts.max(1);
        self
    }

    pub fn retry_delay(mut self, min: Duration, max: Duration) -> Self {
        self.0.min_retry_delay = min;
        self.0.max_retry_delay = max.max(min);
        self
    }

    pub fn default_time_zone(mut self, time_zone: UtcOffset) -> Self {
        self.0.default_time_zone = time_zone;
        self
    }

    pub fn statement_timeout(mut self, timeout: Duration) -> Self {
        self.0.statement_timeout = Some(timeout);
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.0.read_only = read_only;
        self
    }

    pub fn default_schema(mut self, schema: impl Into<String>) -> Self {
        self.0.default_schema = Some(schema.into());
        self
    }

    pub fn build(self) -> DatabaseConfig {
        self.0
    }
}
