//! Service configuration loaded from environment variables.
//!
//! `.env` is read by `main` through `dotenvy` before [`Config::from_env`] runs.
//!
//! # Environment Variables
//! - `BAKERY_HOST` - Bind address (default: 0.0.0.0)
//! - `BAKERY_PORT` - Listen port (default: 8083)
//! - `BAKERY_CHECKOUT_DELAY_MS` - Simulated order submission delay (default: 1500)
//! - `BAKERY_DELIVERY_FEE` - Flat delivery fee (default: 5.00)
//! - `BAKERY_CART_IDLE_SECS` - Idle time before a cart session is evicted (default: 3600)

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub checkout_delay: Duration,
    pub delivery_fee: Decimal,
    pub cart_idle: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8083,
            checkout_delay: Duration::from_millis(1500),
            delivery_fee: Decimal::new(500, 2),
            cart_idle: Duration::from_secs(3600),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let delivery_fee: Decimal = parse_or(&lookup, "BAKERY_DELIVERY_FEE", defaults.delivery_fee)?;
        if delivery_fee.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar("BAKERY_DELIVERY_FEE".into(), "must not be negative".into()));
        }
        Ok(Self {
            host: parse_or(&lookup, "BAKERY_HOST", defaults.host)?,
            port: parse_or(&lookup, "BAKERY_PORT", defaults.port)?,
            checkout_delay: Duration::from_millis(parse_or(&lookup, "BAKERY_CHECKOUT_DELAY_MS", 1500u64)?),
            delivery_fee,
            cart_idle: Duration::from_secs(parse_or(&lookup, "BAKERY_CART_IDLE_SECS", 3600u64)?),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
