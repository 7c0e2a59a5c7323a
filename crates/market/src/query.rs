//! Query protocol: ask a provider what it has and on what terms.
//!
//! A consumer sends a [`Query`] naming a payload (and optionally the piece it
//! expects the payload in); the provider answers with a [`QueryResponse`]
//! carrying availability and its price terms. No deal exists yet at this
//! stage.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use turnstile_primitives::{PayloadAddress, PaymentAddress, PieceAddress, TokenAmount};

/// Protocol identifier for the query sub-protocol.
///
/// Any wire-incompatible change must bump this string.
pub const QUERY_PROTOCOL: &str = "/fil/retrieval/qry/1.0.0";

macro_rules! impl_wire_enum_serde {
    ($name:ident) => {
        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u64(*self as u64)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = u64::deserialize(deserializer)?;
                $name::from_repr(raw).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        concat!("unknown ", stringify!($name), " {}"),
                        raw
                    ))
                })
            }
        }
    };
}

/// Whether the provider can serve the queried piece at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[repr(u64)]
pub enum QueryResponseStatus {
    /// Provider has the piece and is prepared to return it.
    Available = 0,
    /// Provider does not have, or cannot serve, the piece.
    Unavailable = 1,
    /// Something went wrong generating the response.
    Error = 2,
}

impl_wire_enum_serde!(QueryResponseStatus);

/// Whether a specific queried item is in the piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[repr(u64)]
pub enum QueryItemStatus {
    /// The item is in the piece and can be served.
    Available = 0,
    /// The piece does not contain the item, or it cannot be served.
    Unavailable = 1,
    /// The provider cannot tell without unsealing (for example, when it
    /// keeps no payload index for the sealed piece).
    Unknown = 2,
}

impl_wire_enum_serde!(QueryItemStatus);

/// A query for information about a payload a provider may hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Query {
    /// The payload being asked about.
    pub payload: PayloadAddress,
    /// Specific piece to look in; some providers cannot answer this.
    pub piece: Option<PieceAddress>,
}

impl Query {
    /// Query for a payload, any piece.
    pub fn new_v0(payload: PayloadAddress) -> Self {
        Self {
            payload,
            piece: None,
        }
    }

    /// Query for a payload inside a specific piece.
    pub fn new_v1(payload: PayloadAddress, piece: Option<PieceAddress>) -> Self {
        Self { payload, piece }
    }
}

/// A provider's response to a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryResponse {
    /// Whether the provider can serve the piece.
    pub status: QueryResponseStatus,
    /// If a piece was named in the query, whether the payload is in it.
    pub piece_found: QueryItemStatus,
    /// Total size of the piece in bytes.
    pub size: u64,
    /// Where to send funds; may differ from the provider's own address.
    pub payment_address: PaymentAddress,
    /// Lowest price per byte the provider will take.
    pub min_price_per_byte: TokenAmount,
    /// Largest initial payment interval the provider will grant.
    pub max_payment_interval: u64,
    /// Largest interval growth the provider will grant.
    pub max_payment_interval_increase: u64,
    /// Human-readable context, required on error statuses.
    pub message: String,
    /// Flat fee for unsealing the piece.
    pub unseal_price: TokenAmount,
}

impl QueryResponse {
    /// Total price to retrieve the whole piece:
    /// `size * min_price_per_byte + unseal_price`.
    ///
    /// Same formula as the funds required at finalization, reused for
    /// up-front quoting.
    pub fn piece_retrieval_price(&self) -> TokenAmount {
        TokenAmount::from_atto(self.size) * self.min_price_per_byte.clone()
            + self.unseal_price.clone()
    }
}

/// A provider to target queries and deals at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalPeer {
    /// Provider's payment address.
    pub address: PaymentAddress,
    /// Provider's peer identity.
    pub id: libp2p_identity::PeerId,
    /// Piece the provider is known to hold, when known.
    pub piece: Option<PieceAddress>,
}
