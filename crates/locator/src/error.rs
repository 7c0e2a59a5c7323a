//! Locator error types.

use turnstile_primitives::PieceAddress;

/// Errors that can occur while locating a readable piece copy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocatorError {
    /// The piece index knows of no copies at all.
    #[error("no locations for piece {0}")]
    NoLocations(PieceAddress),

    /// The caller cancelled the fetch.
    ///
    /// Distinct from not-found: nothing can be concluded about the piece.
    #[error("fetch cancelled")]
    Cancelled,

    /// The piece index could not be consulted.
    #[error("piece catalog: {0}")]
    Catalog(String),

    /// A sector could not be checked or unsealed.
    #[error("unseal: {0}")]
    Unseal(String),
}
