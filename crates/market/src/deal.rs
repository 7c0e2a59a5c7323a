//! Typed deal payloads carried inside a generic transfer transport.
//!
//! Each payload declares a stable type tag and a schema string; the transport
//! moves them as untyped nodes, and [`Voucher::decode_node`] validates shape
//! before any field is trusted. A malformed node is rejected whole with a
//! descriptive error, never partially applied and never a panic.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_cbor::Value;
use turnstile_primitives::{PayloadAddress, PaymentAddress, TokenAmount};

use crate::{DealId, DealStatus, MarketError, Params, SignedVoucher};

/// A typed payload exchanged over the transfer transport.
pub trait Voucher: Serialize + DeserializeOwned {
    /// Stable type tag identifying the payload kind on the wire.
    const TYPE_TAG: &'static str;

    /// Top-level field names, in wire order.
    const FIELDS: &'static [&'static str];

    /// Declared schema for the serialized form.
    fn schema() -> &'static str;

    /// Decode and validate an untyped node.
    fn decode_node(node: Option<&Value>) -> Result<Self, MarketError> {
        let node = match node {
            None | Some(Value::Null) => {
                return Err(MarketError::Schema("empty voucher".into()));
            }
            Some(node) => node,
        };
        let Value::Map(fields) = node else {
            return Err(MarketError::Schema(format!(
                "invalid {}: expected a map",
                Self::TYPE_TAG
            )));
        };
        if fields.len() != Self::FIELDS.len() {
            return Err(MarketError::Schema(format!(
                "invalid {}: expected {} fields, got {}",
                Self::TYPE_TAG,
                Self::FIELDS.len(),
                fields.len()
            )));
        }
        let bytes = serde_cbor::to_vec(node)
            .map_err(|e| MarketError::Schema(format!("invalid {}: {e}", Self::TYPE_TAG)))?;
        serde_cbor::from_slice(&bytes)
            .map_err(|e| MarketError::Schema(format!("invalid {}: {e}", Self::TYPE_TAG)))
    }

    /// Encode to the canonical byte form.
    fn encode(&self) -> Result<Vec<u8>, MarketError> {
        serde_cbor::to_vec(self)
            .map_err(|e| MarketError::Schema(format!("encoding {}: {e}", Self::TYPE_TAG)))
    }

    /// Decode the canonical byte form, validating shape.
    fn decode(bytes: &[u8]) -> Result<Self, MarketError> {
        if bytes.is_empty() {
            return Err(MarketError::Schema("empty voucher".into()));
        }
        let node: Value = serde_cbor::from_slice(bytes)
            .map_err(|e| MarketError::Schema(format!("invalid {}: {e}", Self::TYPE_TAG)))?;
        Self::decode_node(Some(&node))
    }
}

/// A proposal for a new retrieval deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DealProposal {
    /// Payload being retrieved.
    pub payload: PayloadAddress,
    /// Consumer-chosen deal identifier.
    pub id: DealId,
    /// Agreed price terms.
    pub params: Params,
}

impl Voucher for DealProposal {
    const TYPE_TAG: &'static str = "RetrievalDealProposal/1";
    const FIELDS: &'static [&'static str] = &["Payload", "Id", "Params"];

    fn schema() -> &'static str {
        r#"
        type DealProposal struct {
            Payload Bytes
            Id Int
            Params Params
        }
        "#
    }
}

/// A response to a deal proposal or a payment demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DealResponse {
    /// Where the deal stands.
    pub status: DealStatus,
    /// Deal being answered.
    pub id: DealId,
    /// Payment required to proceed.
    pub payment_owed: TokenAmount,
    /// Human-readable context, required on terminal error statuses.
    pub message: String,
}

impl Voucher for DealResponse {
    const TYPE_TAG: &'static str = "RetrievalDealResponse/1";
    const FIELDS: &'static [&'static str] = &["Status", "Id", "PaymentOwed", "Message"];

    fn schema() -> &'static str {
        r#"
        type DealResponse struct {
            Status Int
            Id Int
            PaymentOwed Bytes
            Message String
        }
        "#
    }
}

/// A payment for an in-progress retrieval deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DealPayment {
    /// Deal being paid for.
    pub id: DealId,
    /// Channel the payment draws on.
    pub payment_channel: PaymentAddress,
    /// Signed voucher covering the payment; opaque pass-through.
    pub payment_voucher: Option<SignedVoucher>,
}

impl Voucher for DealPayment {
    const TYPE_TAG: &'static str = "RetrievalDealPayment/1";
    const FIELDS: &'static [&'static str] = &["Id", "PaymentChannel", "PaymentVoucher"];

    fn schema() -> &'static str {
        r#"
        type DealPayment struct {
            Id Int
            PaymentChannel Bytes
            PaymentVoucher nullable SignedVoucher
        }

        type SignedVoucher struct {
            Channel Bytes
            TimeLockMin Int
            TimeLockMax Int
            SecretPreimage Bytes
            Extra nullable ModVerifyParams
            Lane Int
            Nonce Int
            Amount Bytes
            MinSettleHeight Int
            Merges [Merge]
            Signature nullable Bytes
        } representation tuple

        type ModVerifyParams struct {
            Actor Bytes
            Method Int
            Data Bytes
        } representation tuple

        type Merge struct {
            Lane Int
            Nonce Int
        } representation tuple
        "#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_cbor::Value;

    fn test_proposal() -> DealProposal {
        DealProposal {
            payload: PayloadAddress::from([3u8; 32]),
            id: DealId(9),
            params: Params::new_v1(
                TokenAmount::from_atto(10),
                100,
                50,
                Value::Text("all".into()),
                Some(turnstile_primitives::PieceAddress::from([4u8; 32])),
                TokenAmount::zero(),
            ),
        }
    }

    #[test]
    fn test_proposal_roundtrip() {
        let proposal = test_proposal();
        let bytes = proposal.encode().unwrap();
        let decoded = DealProposal::decode(&bytes).unwrap();
        assert_eq!(decoded, proposal);
    }

    #[test]
    fn test_proposal_roundtrip_null_selector_present_piece() {
        let mut proposal = test_proposal();
        proposal.params.selector = None;

        let bytes = proposal.encode().unwrap();
        let decoded = DealProposal::decode(&bytes).unwrap();

        // the null marker survives; it does not become a zero-value selector
        assert!(decoded.params.selector.is_none());
        assert!(!decoded.params.selector_specified());
        assert!(decoded.params.piece.is_some());
        assert_eq!(decoded, proposal);
    }

    #[test]
    fn test_decode_empty_payload_fails() {
        assert_matches!(
            DealResponse::decode_node(None),
            Err(MarketError::Schema(msg)) if msg == "empty voucher"
        );
        assert_matches!(
            DealResponse::decode_node(Some(&Value::Null)),
            Err(MarketError::Schema(msg)) if msg == "empty voucher"
        );
        assert_matches!(DealResponse::decode(&[]), Err(MarketError::Schema(_)));
    }

    #[test]
    fn test_decode_wrong_shape_fails() {
        // not a map
        let node = Value::Array(vec![Value::Integer(1)]);
        assert_matches!(
            DealProposal::decode_node(Some(&node)),
            Err(MarketError::Schema(_))
        );

        // wrong field count
        let response = DealResponse {
            status: DealStatus::Accepted,
            id: DealId(1),
            payment_owed: TokenAmount::zero(),
            message: String::new(),
        };
        let bytes = response.encode().unwrap();
        let Value::Map(mut fields) = serde_cbor::from_slice::<Value>(&bytes).unwrap() else {
            panic!("expected map encoding");
        };
        fields.remove(&Value::Text("Message".into()));
        let err = DealResponse::decode_node(Some(&Value::Map(fields))).unwrap_err();
        assert_matches!(err, MarketError::Schema(msg) if msg.contains("expected 4 fields"));
    }

    #[test]
    fn test_decode_wrong_field_type_fails() {
        let response = DealResponse {
            status: DealStatus::Accepted,
            id: DealId(1),
            payment_owed: TokenAmount::zero(),
            message: String::new(),
        };
        let bytes = response.encode().unwrap();
        let Value::Map(mut fields) = serde_cbor::from_slice::<Value>(&bytes).unwrap() else {
            panic!("expected map encoding");
        };
        fields.insert(Value::Text("Id".into()), Value::Text("not an int".into()));
        assert_matches!(
            DealResponse::decode_node(Some(&Value::Map(fields))),
            Err(MarketError::Schema(_))
        );
    }

    #[test]
    fn test_payment_carries_voucher_unchanged() {
        let payment = DealPayment {
            id: DealId(12),
            payment_channel: PaymentAddress::repeat_byte(0x33),
            payment_voucher: Some(SignedVoucher {
                lane: 2,
                nonce: 8,
                amount: TokenAmount::from_atto(777),
                ..SignedVoucher::default()
            }),
        };
        let bytes = payment.encode().unwrap();
        let decoded = DealPayment::decode(&bytes).unwrap();
        assert_eq!(decoded, payment);

        let reencoded = decoded.encode().unwrap();
        assert_eq!(reencoded, bytes);
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(DealProposal::TYPE_TAG, "RetrievalDealProposal/1");
        assert_eq!(DealResponse::TYPE_TAG, "RetrievalDealResponse/1");
        assert_eq!(DealPayment::TYPE_TAG, "RetrievalDealPayment/1");
    }
}
