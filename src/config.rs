// Application configuration
// Loaded once from the environment at startup and passed down explicitly

use chrono_tz::Tz;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::pricing::{OperatingHours, PricingPolicy};

/// Errors raised while reading configuration from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("Opening hour {open} must be before closing hour {close} (both 0-23)")]
    InvalidHours { open: u32, close: u32 },
}

/// Runtime configuration for the booking service
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub timezone: Tz,
    pub open_hour: u32,
    pub close_hour: u32,
    pub default_price_per_hour: Decimal,
    pub rounding_unit: Decimal,
    pub booking_hold: Duration,
    pub expiry_interval: Duration,
    pub tier_cache_ttl: Duration,
}

impl AppConfig {
    /// Read configuration from process environment variables
    ///
    /// `DATABASE_URL` and `JWT_SECRET` are required, everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            database_url: required("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parsed("PORT", 8080)?,
            jwt_secret: required("JWT_SECRET")?,
            timezone: parsed("BUSINESS_TIMEZONE", chrono_tz::Asia::Ho_Chi_Minh)?,
            open_hour: parsed("OPEN_HOUR", 6)?,
            close_hour: parsed("CLOSE_HOUR", 22)?,
            default_price_per_hour: parsed("DEFAULT_PRICE_PER_HOUR", Decimal::from(100_000))?,
            rounding_unit: parsed("PRICE_ROUNDING_UNIT", Decimal::from(1_000))?,
            booking_hold: Duration::from_secs(60 * parsed::<u64>("BOOKING_HOLD_MINUTES", 15)?),
            expiry_interval: Duration::from_secs(parsed("BOOKING_EXPIRY_INTERVAL_SECS", 60)?),
            tier_cache_ttl: Duration::from_secs(parsed("TIER_CACHE_TTL_SECS", 60)?),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.open_hour >= self.close_hour || self.close_hour > 23 {
            return Err(ConfigError::InvalidHours {
                open: self.open_hour,
                close: self.close_hour,
            });
        }
        if self.default_price_per_hour <= Decimal::ZERO {
            return Err(ConfigError::Invalid {
                name: "DEFAULT_PRICE_PER_HOUR",
                value: self.default_price_per_hour.to_string(),
            });
        }
        if self.rounding_unit <= Decimal::ZERO {
            return Err(ConfigError::Invalid {
                name: "PRICE_ROUNDING_UNIT",
                value: self.rounding_unit.to_string(),
            });
        }
        Ok(())
    }

    /// Socket address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn operating_hours(&self) -> OperatingHours {
        OperatingHours::new(self.open_hour, self.close_hour, self.timezone)
    }

    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            default_price_per_hour: self.default_price_per_hour,
            rounding_unit: self.rounding_unit,
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
