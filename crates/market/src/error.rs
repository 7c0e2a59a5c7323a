//! Market error kinds.
//!
//! A closed enumeration rather than sentinel values, so callers can match on
//! kind across the protocol boundary.

use turnstile_primitives::{ParseAmountError, TokenAmount};

/// Errors surfaced by the retrieval market core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    /// Requested content was not found.
    ///
    /// Recoverable at a higher layer by trying another provider.
    #[error("not found")]
    NotFound,

    /// A received block failed integrity verification.
    ///
    /// The current deal must abort; continuing would pay for bad data.
    #[error("block verification failed")]
    Verification,

    /// Funds received so far are insufficient.
    ///
    /// Carries the missing amount so the counterparty can request exactly
    /// that much more and retry.
    #[error("insufficient funds, shortfall: {0}")]
    Shortfall(TokenAmount),

    /// A decoded wire payload does not match the expected shape.
    ///
    /// The message is rejected whole; no part of it is applied to state.
    #[error("invalid wire payload: {0}")]
    Schema(String),

    /// Malformed numeric text in a wire payload.
    #[error(transparent)]
    Parse(#[from] ParseAmountError),
}

impl MarketError {
    /// The missing amount, when this is a shortfall.
    pub fn shortfall(&self) -> Option<&TokenAmount> {
        match self {
            MarketError::Shortfall(amount) => Some(amount),
            _ => None,
        }
    }
}
