//! Environment-driven configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `PLATFORM_COMMISSION` | `0.10` |
//! | `COURIER_FEE_DEFAULT` | `15000` |
//! | `CURRENCY` | `UZS` |
//! | `PROOF_SECRET` | random per process |
//! | `PROOF_TTL_SECS` | `86400` |
//! | `ORDER_SHARDS` | `16` |
//! | `ACTOR_MAILBOX` | `32` |
//! | `STRICT_DELIVERY_PROOF` | `false` |
//! | `ORDER_NUMBER_PREFIX` | `GGM` |

use crate::proof::ProofService;
use chrono::Duration;
use rand::RngCore;
use rust_decimal::Decimal;
use std::env;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Clone)]
pub struct FulfillmentConfig {
    /// Fraction of the merchandise subtotal kept by the platform.
    pub commission_rate: Decimal,
    pub courier_fee: Decimal,
    pub currency: String,
    pub proof_secret: Vec<u8>,
    pub proof_ttl: Duration,
    pub order_shards: usize,
    pub actor_mailbox: usize,
    /// When set, a presented but invalid delivery proof cannot fall back to the numeric code.
    pub strict_delivery_proof: bool,
    pub order_number_prefix: String,
}

impl fmt::Debug for FulfillmentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FulfillmentConfig")
            .field("commission_rate", &self.commission_rate)
            .field("courier_fee", &self.courier_fee)
            .field("currency", &self.currency)
            .field("proof_secret", &"[REDACTED]")
            .field("proof_ttl", &self.proof_ttl)
            .field("order_shards", &self.order_shards)
            .field("actor_mailbox", &self.actor_mailbox)
            .field("strict_delivery_proof", &self.strict_delivery_proof)
            .field("order_number_prefix", &self.order_number_prefix)
            .finish()
    }
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            commission_rate: Decimal::new(10, 2),
            courier_fee: Decimal::from(15_000),
            currency: "UZS".to_string(),
            proof_secret: random_secret(),
            proof_ttl: Duration::seconds(86_400),
            order_shards: 16,
            actor_mailbox: 32,
            strict_delivery_proof: false,
            order_number_prefix: "GGM".to_string(),
        }
    }
}

impl FulfillmentConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        info!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Builds a config from an arbitrary key lookup. Missing keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let commission_rate: Decimal =
            parse_or(&lookup, "PLATFORM_COMMISSION", defaults.commission_rate)?;
        if commission_rate < Decimal::ZERO || commission_rate >= Decimal::ONE {
            return Err(invalid("PLATFORM_COMMISSION", "must be in [0, 1)"));
        }

        let courier_fee: Decimal = parse_or(&lookup, "COURIER_FEE_DEFAULT", defaults.courier_fee)?;
        if courier_fee < Decimal::ZERO {
            return Err(invalid("COURIER_FEE_DEFAULT", "must not be negative"));
        }

        let currency = lookup("CURRENCY").unwrap_or(defaults.currency);
        if currency.trim().is_empty() {
            return Err(invalid("CURRENCY", "must not be empty"));
        }

        let proof_secret = match lookup("PROOF_SECRET") {
            Some(secret) if !secret.is_empty() => secret.into_bytes(),
            Some(_) => return Err(invalid("PROOF_SECRET", "must not be empty")),
            None => {
                warn!("PROOF_SECRET not set; proofs will not survive a restart");
                defaults.proof_secret
            }
        };

        let ttl_secs: i64 = parse_or(&lookup, "PROOF_TTL_SECS", 86_400)?;
        if ttl_secs <= 0 {
            return Err(invalid("PROOF_TTL_SECS", "must be positive"));
        }
        let proof_ttl = Duration::try_seconds(ttl_secs)
            .ok_or_else(|| invalid("PROOF_TTL_SECS", "out of range"))?;

        let order_shards: usize = parse_or(&lookup, "ORDER_SHARDS", defaults.order_shards)?;
        if order_shards == 0 {
            return Err(invalid("ORDER_SHARDS", "must be at least 1"));
        }

        let actor_mailbox: usize = parse_or(&lookup, "ACTOR_MAILBOX", defaults.actor_mailbox)?;
        if actor_mailbox == 0 {
            return Err(invalid("ACTOR_MAILBOX", "must be at least 1"));
        }

        let strict_delivery_proof: bool = parse_or(
            &lookup,
            "STRICT_DELIVERY_PROOF",
            defaults.strict_delivery_proof,
        )?;

        let order_number_prefix =
            lookup("ORDER_NUMBER_PREFIX").unwrap_or(defaults.order_number_prefix);

        Ok(Self {
            commission_rate,
            courier_fee,
            currency,
            proof_secret,
            proof_ttl,
            order_shards,
            actor_mailbox,
            strict_delivery_proof,
            order_number_prefix,
        })
    }

    pub fn proof_service(&self) -> Result<ProofService, ConfigError> {
        ProofService::new(&self.proof_secret, self.proof_ttl)
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| invalid(key, &e.to_string())),
        None => Ok(default),
    }
}

fn invalid(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.to_string(),
    }
}

fn random_secret() -> Vec<u8> {
    let mut secret = vec![0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}
