//! Opaque payment-channel voucher pass-through.
//!
//! Vouchers are produced and validated by the external payment-channel
//! authority. This core re-serializes them byte-exactly but never inspects
//! or mutates them beyond the documented tuple shape.
//!
//! All three records use a fixed-order tuple representation for compactness:
//! field order here is the wire contract.

use bytes::Bytes;
use serde::de::{self, SeqAccess};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use turnstile_primitives::{PaymentAddress, TokenAmount};

/// A signed, off-chain claim against a payment channel.
///
/// Tuple representation:
/// `[channel, time_lock_min, time_lock_max, secret_preimage, extra, lane,
/// nonce, amount, min_settle_height, merges, signature]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignedVoucher {
    /// Channel the voucher draws on.
    pub channel: PaymentAddress,
    /// Earliest epoch at which the voucher may be redeemed.
    pub time_lock_min: i64,
    /// Latest epoch at which the voucher may be redeemed; 0 means no bound.
    pub time_lock_max: i64,
    /// Preimage the redeemer must present, when the channel demands one.
    pub secret_preimage: Bytes,
    /// Extra verification the channel actor runs before paying out.
    pub extra: Option<ModVerifyParams>,
    /// Lane within the channel.
    pub lane: u64,
    /// Strictly increasing per lane.
    pub nonce: u64,
    /// Cumulative amount redeemable with this voucher.
    pub amount: TokenAmount,
    /// Earliest epoch at which the channel may settle.
    pub min_settle_height: i64,
    /// Lanes merged into this voucher.
    pub merges: Vec<Merge>,
    /// Signature over the voucher by the channel owner.
    pub signature: Option<Bytes>,
}

/// Extra verification parameters: `[actor, method, data]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModVerifyParams {
    /// Actor running the verification.
    pub actor: PaymentAddress,
    /// Method to invoke on it.
    pub method: u64,
    /// Opaque call payload.
    pub data: Bytes,
}

/// A lane merge: `[lane, nonce]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Merge {
    /// Lane being merged.
    pub lane: u64,
    /// Nonce the merged lane is redeemed at.
    pub nonce: u64,
}

impl Serialize for SignedVoucher {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(11)?;
        tuple.serialize_element(&self.channel)?;
        tuple.serialize_element(&self.time_lock_min)?;
        tuple.serialize_element(&self.time_lock_max)?;
        tuple.serialize_element(&self.secret_preimage)?;
        tuple.serialize_element(&self.extra)?;
        tuple.serialize_element(&self.lane)?;
        tuple.serialize_element(&self.nonce)?;
        tuple.serialize_element(&self.amount)?;
        tuple.serialize_element(&self.min_settle_height)?;
        tuple.serialize_element(&self.merges)?;
        tuple.serialize_element(&self.signature)?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for SignedVoucher {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TupleVisitor;

        impl<'de> de::Visitor<'de> for TupleVisitor {
            type Value = SignedVoucher;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a signed voucher tuple of 11 elements")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                macro_rules! element {
                    ($idx:expr) => {
                        seq.next_element()?
                            .ok_or_else(|| de::Error::invalid_length($idx, &"11 elements"))?
                    };
                }
                Ok(SignedVoucher {
                    channel: element!(0),
                    time_lock_min: element!(1),
                    time_lock_max: element!(2),
                    secret_preimage: element!(3),
                    extra: element!(4),
                    lane: element!(5),
                    nonce: element!(6),
                    amount: element!(7),
                    min_settle_height: element!(8),
                    merges: element!(9),
                    signature: element!(10),
                })
            }
        }

        deserializer.deserialize_tuple(11, TupleVisitor)
    }
}

impl Serialize for ModVerifyParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.actor)?;
        tuple.serialize_element(&self.method)?;
        tuple.serialize_element(&self.data)?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for ModVerifyParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TupleVisitor;

        impl<'de> de::Visitor<'de> for TupleVisitor {
            type Value = ModVerifyParams;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a verify-params tuple of 3 elements")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                Ok(ModVerifyParams {
                    actor: seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(0, &"3 elements"))?,
                    method: seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(1, &"3 elements"))?,
                    data: seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(2, &"3 elements"))?,
                })
            }
        }

        deserializer.deserialize_tuple(3, TupleVisitor)
    }
}

impl Serialize for Merge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.lane)?;
        tuple.serialize_element(&self.nonce)?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for Merge {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TupleVisitor;

        impl<'de> de::Visitor<'de> for TupleVisitor {
            type Value = Merge;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a merge tuple of 2 elements")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                Ok(Merge {
                    lane: seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(0, &"2 elements"))?,
                    nonce: seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(1, &"2 elements"))?,
                })
            }
        }

        deserializer.deserialize_tuple(2, TupleVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_voucher() -> SignedVoucher {
        SignedVoucher {
            channel: PaymentAddress::repeat_byte(0x11),
            time_lock_min: 10,
            time_lock_max: 200,
            secret_preimage: Bytes::from_static(b"preimage"),
            extra: Some(ModVerifyParams {
                actor: PaymentAddress::repeat_byte(0x22),
                method: 3,
                data: Bytes::from_static(b"verify"),
            }),
            lane: 5,
            nonce: 7,
            amount: TokenAmount::from_atto(123_456),
            min_settle_height: 42,
            merges: vec![Merge { lane: 1, nonce: 2 }],
            signature: Some(Bytes::from_static(&[0xab; 65])),
        }
    }

    #[test]
    fn test_tuple_roundtrip() {
        let voucher = test_voucher();
        let encoded = serde_cbor::to_vec(&voucher).unwrap();
        let decoded: SignedVoucher = serde_cbor::from_slice(&encoded).unwrap();
        assert_eq!(decoded, voucher);
    }

    #[test]
    fn test_roundtrip_is_byte_exact() {
        let encoded = serde_cbor::to_vec(&test_voucher()).unwrap();
        let decoded: SignedVoucher = serde_cbor::from_slice(&encoded).unwrap();
        let reencoded = serde_cbor::to_vec(&decoded).unwrap();
        assert_eq!(encoded, reencoded);
    }

    #[test]
    fn test_optional_fields_use_null_marker() {
        let voucher = SignedVoucher {
            extra: None,
            signature: None,
            ..test_voucher()
        };
        let encoded = serde_cbor::to_vec(&voucher).unwrap();
        let decoded: SignedVoucher = serde_cbor::from_slice(&encoded).unwrap();
        assert_eq!(decoded.extra, None);
        assert_eq!(decoded.signature, None);
    }

    #[test]
    fn test_truncated_tuple_rejected() {
        // a 2-element array is not a voucher
        let encoded = serde_cbor::to_vec(&(1u64, 2u64)).unwrap();
        assert!(serde_cbor::from_slice::<SignedVoucher>(&encoded).is_err());
    }
}
