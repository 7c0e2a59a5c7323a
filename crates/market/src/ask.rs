//! Provider pricing policy inputs.
//!
//! An [`Ask`] is the provider's standing price policy, independent of any
//! single deal. A [`PricingInput`] is the immutable fact sheet handed to an
//! external pricing policy when a query arrives; the policy answers with an
//! `Ask`-shaped quote. This core defines the shapes, not the policy.

use libp2p_identity::PeerId;
use serde::{Deserialize, Serialize};
use turnstile_primitives::{PayloadAddress, PieceAddress, TokenAmount};

/// Default bytes released before the first payment demand (1 MiB).
pub const DEFAULT_PAYMENT_INTERVAL: u64 = 1 << 20;

/// Default growth of the payment interval each time it elapses (1 MiB).
pub const DEFAULT_PAYMENT_INTERVAL_INCREASE: u64 = 1 << 20;

/// A provider's standing price policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ask {
    /// Price per byte transferred, in atto.
    pub price_per_byte: TokenAmount,
    /// Flat unseal fee, in atto.
    pub unseal_price: TokenAmount,
    /// Bytes released before the first payment demand.
    pub payment_interval: u64,
    /// Growth of the interval each time it elapses.
    pub payment_interval_increase: u64,
}

impl Default for Ask {
    /// Free retrieval with 1 MiB escalating intervals.
    fn default() -> Self {
        Self {
            price_per_byte: TokenAmount::zero(),
            unseal_price: TokenAmount::zero(),
            payment_interval: DEFAULT_PAYMENT_INTERVAL,
            payment_interval_increase: DEFAULT_PAYMENT_INTERVAL_INCREASE,
        }
    }
}

/// Facts needed to price one incoming query.
///
/// Consumed read-only by the external pricing policy.
#[derive(Debug, Clone)]
pub struct PricingInput {
    /// Payload being asked about.
    pub payload: PayloadAddress,
    /// Piece the payload would be served from.
    pub piece: PieceAddress,
    /// Size of that piece in bytes.
    pub piece_size: u64,
    /// Peer asking.
    pub client: PeerId,
    /// A verified storage deal exists for the payload.
    pub verified_deal: bool,
    /// An unsealed copy currently exists, so no unseal work is needed.
    pub unsealed: bool,
    /// The provider's currently configured ask.
    pub current_ask: Ask,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ask_is_free_with_mib_intervals() {
        let ask = Ask::default();
        assert!(ask.price_per_byte.is_zero());
        assert!(ask.unseal_price.is_zero());
        assert_eq!(ask.payment_interval, 1 << 20);
        assert_eq!(ask.payment_interval_increase, 1 << 20);
    }
}
