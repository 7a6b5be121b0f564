//! Configuration types.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::ConfigError;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the HTTP API.
    pub port: u16,
    /// Fixed price charged per word.
    pub price_per_word: Decimal,
    /// How many times a delivery is requeued after a nack before it is
    /// routed to the dead-letter queue.
    pub max_redeliveries: u32,
    /// Consumer workers spawned per queue.
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            price_per_word: dec!(0.10),
            max_redeliveries: 3,
            workers: 4,
        }
    }
}

impl Config {
    /// Build a config from `POSTWORKS_*` environment variables, falling
    /// back to defaults for anything unset. Set-but-invalid values are an
    /// error rather than a silent fallback.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("POSTWORKS_PORT") {
            config.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "POSTWORKS_PORT".into(),
                message: format!("not a port number: {port}"),
            })?;
        }

        if let Ok(rate) = std::env::var("POSTWORKS_PRICE_PER_WORD") {
            let parsed: Decimal = rate.parse().map_err(|_| ConfigError::InvalidValue {
                key: "POSTWORKS_PRICE_PER_WORD".into(),
                message: format!("not a decimal: {rate}"),
            })?;
            if parsed.is_sign_negative() {
                return Err(ConfigError::InvalidValue {
                    key: "POSTWORKS_PRICE_PER_WORD".into(),
                    message: "rate must be non-negative".into(),
                });
            }
            config.price_per_word = parsed;
        }

        if let Ok(max) = std::env::var("POSTWORKS_MAX_REDELIVERIES") {
            config.max_redeliveries = max.parse().map_err(|_| ConfigError::InvalidValue {
                key: "POSTWORKS_MAX_REDELIVERIES".into(),
                message: format!("not a count: {max}"),
            })?;
        }

        if let Ok(workers) = std::env::var("POSTWORKS_WORKERS") {
            let parsed: usize = workers.parse().map_err(|_| ConfigError::InvalidValue {
                key: "POSTWORKS_WORKERS".into(),
                message: format!("not a count: {workers}"),
            })?;
            if parsed == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "POSTWORKS_WORKERS".into(),
                    message: "at least one worker is required".into(),
                });
            }
            config.workers = parsed;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.price_per_word, dec!(0.10));
        assert_eq!(config.max_redeliveries, 3);
        assert!(config.workers > 0);
    }
}
