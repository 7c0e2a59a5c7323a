//! Content and payment addresses.
//!
//! Payloads and pieces are identified by 32-byte content-derived addresses.
//! Funds move to a [`PaymentAddress`], which is distinct from any content
//! identity.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address to which retrieval funds are sent.
pub use alloy_primitives::Address as PaymentAddress;

macro_rules! content_address {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        pub struct $name(B256);

        impl $name {
            /// Wrap a raw 32-byte digest.
            pub const fn new(digest: B256) -> Self {
                Self(digest)
            }

            /// The raw digest bytes.
            pub const fn as_bytes(&self) -> &[u8; 32] {
                &self.0.0
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(B256::from(bytes))
            }
        }

        impl From<B256> for $name {
            fn from(digest: B256) -> Self {
                Self(digest)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

content_address!(
    /// Content-derived identity of a retrievable payload.
    PayloadAddress
);

content_address!(
    /// Content-derived identity of a stored piece (the sealed aggregate a
    /// payload is served from).
    PieceAddress
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_hex() {
        let addr = PayloadAddress::from([0xab; 32]);
        let s = addr.to_string();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 2 + 64);
    }

    #[test]
    fn test_payload_piece_are_distinct_types() {
        let payload = PayloadAddress::from([1u8; 32]);
        let piece = PieceAddress::from([1u8; 32]);
        assert_eq!(payload.as_bytes(), piece.as_bytes());
    }
}
