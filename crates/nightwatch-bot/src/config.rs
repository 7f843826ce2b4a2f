//! Startup configuration read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;

use nightwatch_game::domain::phase_clock::{DEFAULT_PHASE_SECONDS, PhaseDurations};

use crate::error::AppError;

/// How chat messages reach the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Axum HTTP surface with an outbox for a chat bridge to poll.
    Http,
    /// Lines of `<player> <message>` on stdin, replies on stdout.
    Console,
}

impl FromStr for TransportMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Self::Http),
            "console" => Ok(Self::Console),
            other => Err(AppError::Config(format!(
                "NIGHTWATCH_MODE must be `http` or `console`, got `{other}`"
            ))),
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Transport selection.
    pub mode: TransportMode,
    /// HTTP bind host.
    pub host: String,
    /// HTTP bind port.
    pub port: u16,
    /// Prefix that marks a chat message as a command.
    pub command_prefix: String,
    /// Initial day/night lengths.
    pub durations: PhaseDurations,
    /// Messages kept in the HTTP outbox.
    pub outbox_capacity: usize,
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{key} must be valid: {e}"))),
        None => Ok(default),
    }
}

fn phase_length(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<u64, AppError> {
    let Some(raw) = lookup(key) else {
        return Ok(DEFAULT_PHASE_SECONDS);
    };
    let seconds: i64 = raw
        .parse()
        .map_err(|e| AppError::Config(format!("{key} must be valid: {e}")))?;
    PhaseDurations::validate(seconds).map_err(|e| AppError::Config(format!("{key}: {e}")))
}

impl BotConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset keys.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mode = match lookup("NIGHTWATCH_MODE") {
            Some(raw) => raw.parse()?,
            None => TransportMode::Http,
        };
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_var(&lookup, "PORT", 3000_u16)?;
        let command_prefix = lookup("NIGHTWATCH_PREFIX").unwrap_or_else(|| "/".to_string());
        if command_prefix.is_empty() || command_prefix.chars().any(char::is_whitespace) {
            return Err(AppError::Config(
                "NIGHTWATCH_PREFIX must be non-empty and contain no whitespace".to_string(),
            ));
        }

        let day_seconds = phase_length(&lookup, "NIGHTWATCH_DAY_SECONDS")?;
        let night_seconds = phase_length(&lookup, "NIGHTWATCH_NIGHT_SECONDS")?;

        let outbox_capacity = parse_var(&lookup, "NIGHTWATCH_OUTBOX_CAPACITY", 1024_usize)?;

        Ok(Self {
            mode,
            host,
            port,
            command_prefix,
            durations: PhaseDurations {
                day_seconds,
                night_seconds,
            },
            outbox_capacity,
        })
    }

    /// The HTTP listen address.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<BotConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        BotConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.mode, TransportMode::Http);
        assert_eq!(config.port, 3000);
        assert_eq!(config.command_prefix, "/");
        assert_eq!(config.durations, PhaseDurations::default());
        assert_eq!(config.outbox_capacity, 1024);
        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides_are_read() {
        let config = config_from(&[
            ("NIGHTWATCH_MODE", "console"),
            ("NIGHTWATCH_PREFIX", "!"),
            ("NIGHTWATCH_DAY_SECONDS", "90"),
            ("NIGHTWATCH_NIGHT_SECONDS", "45"),
        ])
        .unwrap();

        assert_eq!(config.mode, TransportMode::Console);
        assert_eq!(config.command_prefix, "!");
        assert_eq!(config.durations.day_seconds, 90);
        assert_eq!(config.durations.night_seconds, 45);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        for vars in [
            [("PORT", "eighty")],
            [("NIGHTWATCH_MODE", "discord")],
            [("NIGHTWATCH_DAY_SECONDS", "0")],
            [("NIGHTWATCH_NIGHT_SECONDS", "10000000000000")],
            [("NIGHTWATCH_PREFIX", "")],
        ] {
            let result = config_from(&vars);
            assert!(matches!(result, Err(AppError::Config(_))), "{vars:?}");
        }
    }
}
