//! CLI arguments for the provider's retrieval ask.

use clap::Args;
use serde::{Deserialize, Serialize};
use turnstile_primitives::TokenAmount;

use crate::ask::{Ask, DEFAULT_PAYMENT_INTERVAL, DEFAULT_PAYMENT_INTERVAL_INCREASE};

/// Retrieval ask CLI arguments. All prices are in atto.
#[derive(Debug, Args, Clone, Serialize, Deserialize)]
#[command(next_help_heading = "Retrieval Ask")]
#[serde(default)]
pub struct AskArgs {
    /// Price per byte transferred
    #[arg(long = "ask.price-per-byte", default_value_t = 0)]
    pub price_per_byte: u64,

    /// Flat fee for unsealing a piece
    #[arg(long = "ask.unseal-price", default_value_t = 0)]
    pub unseal_price: u64,

    /// Bytes released before the first payment demand
    #[arg(long = "ask.payment-interval", default_value_t = DEFAULT_PAYMENT_INTERVAL)]
    pub payment_interval: u64,

    /// Growth of the payment interval each time it elapses
    #[arg(long = "ask.interval-increase", default_value_t = DEFAULT_PAYMENT_INTERVAL_INCREASE)]
    pub payment_interval_increase: u64,
}

impl Default for AskArgs {
    fn default() -> Self {
        Self {
            price_per_byte: 0,
            unseal_price: 0,
            payment_interval: DEFAULT_PAYMENT_INTERVAL,
            payment_interval_increase: DEFAULT_PAYMENT_INTERVAL_INCREASE,
        }
    }
}

impl AskArgs {
    /// Validate argument combinations.
    pub fn validate(&self) -> Result<(), String> {
        if self.price_per_byte > 0 && self.payment_interval == 0 && self.payment_interval_increase == 0
        {
            return Err(
                "a paid ask needs a non-zero payment interval or interval increase".to_string(),
            );
        }
        Ok(())
    }

    /// The ask these arguments configure.
    pub fn ask(&self) -> Ask {
        Ask {
            price_per_byte: TokenAmount::from_atto(self.price_per_byte),
            unseal_price: TokenAmount::from_atto(self.unseal_price),
            payment_interval: self.payment_interval,
            payment_interval_increase: self.payment_interval_increase,
        }
    }
}
