//! Deal state snapshots.
//!
//! Each side of a deal keeps one snapshot as its durable record between
//! protocol events. Snapshots are single-writer: exactly one driver (client
//! or provider, never both) mutates a given snapshot, and once the status is
//! terminal the snapshot is an immutable record of outcome. This module only
//! defines the shapes; serialization of mutation is the driver's job.

use alloy_primitives::B256;
use libp2p_identity::PeerId;
use serde::{Deserialize, Serialize};
use std::fmt;
use turnstile_primitives::{PaymentAddress, PieceInfo, TokenAmount};

use crate::{DealId, DealProposal, DealStatus};

/// Serialize a [`PeerId`] as its canonical byte form (base58 text for
/// human-readable formats).
mod peer_serde {
    use super::PeerId;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(peer: &PeerId, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&peer.to_base58())
        } else {
            serializer.serialize_bytes(&peer.to_bytes())
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PeerId, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            text.parse().map_err(D::Error::custom)
        } else {
            struct BytesVisitor;

            impl serde::de::Visitor<'_> for BytesVisitor {
                type Value = PeerId;

                fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                    f.write_str("peer id bytes")
                }

                fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                    PeerId::from_bytes(v).map_err(E::custom)
                }

                fn visit_byte_buf<E: serde::de::Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
                    PeerId::from_bytes(&v).map_err(E::custom)
                }
            }

            deserializer.deserialize_bytes(BytesVisitor)
        }
    }
}

/// The payment channel and lane a deal pays through, once set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    /// Payment channel address.
    pub channel: PaymentAddress,
    /// Lane within the channel allocated to this deal.
    pub lane: u64,
}

/// Identifier of the transfer channel moving the deal's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferChannelId {
    /// Peer that opened the channel.
    #[serde(with = "peer_serde")]
    pub initiator: PeerId,
    /// Peer that accepted it.
    #[serde(with = "peer_serde")]
    pub responder: PeerId,
    /// Channel ordinal, unique per initiator.
    pub id: u64,
}

/// Funds available in a payment channel, as reported by the channel
/// authority. Consumed by the client driver when resolving shortfalls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChannelAvailableFunds {
    /// Funds confirmed on chain for the channel.
    pub confirmed: TokenAmount,
    /// Funds pending on-chain confirmation.
    pub pending: TokenAmount,
    /// Reference to wait on for confirmation of pending funds.
    pub pending_wait_sentinel: Option<B256>,
    /// Funds queued behind a pending request.
    pub queued: TokenAmount,
    /// Funds already redeemed by vouchers.
    pub voucher_redeemed: TokenAmount,
}

/// Current state of a deal from the consumer's point of view.
///
/// Mutated only by the client deal driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientDealState {
    /// The proposal this deal was opened with.
    pub proposal: DealProposal,
    /// Local store the received blocks land in.
    pub store_id: Option<u64>,
    /// Set once the data transfer starts.
    pub channel_id: Option<TransferChannelId>,
    /// Provider has demanded the final payment.
    pub last_payment_requested: bool,
    /// Every expected block has arrived.
    pub all_blocks_received: bool,
    /// Total funds reserved for the deal.
    pub total_funds: TokenAmount,
    /// Consumer's paying wallet.
    pub client_wallet: PaymentAddress,
    /// Provider's receiving wallet.
    pub provider_wallet: PaymentAddress,
    /// Channel and lane, once the payment channel is ready.
    pub payment_info: Option<PaymentInfo>,
    /// Where the deal stands.
    pub status: DealStatus,
    /// Provider peer serving the deal.
    #[serde(with = "peer_serde")]
    pub sender: PeerId,
    /// Bytes received so far.
    pub total_received: u64,
    /// Human-readable context, set on failure paths.
    pub message: String,
    /// Bytes already paid for.
    pub bytes_paid_for: u64,
    /// Current payment checkpoint.
    pub current_interval: u64,
    /// Amount demanded by the provider's last payment request.
    pub payment_requested: TokenAmount,
    /// Funds spent so far.
    pub funds_spent: TokenAmount,
    /// Portion of spent funds that covered unsealing.
    pub unseal_funds_paid: TokenAmount,
    /// Chain message the deal is waiting on, if any.
    pub pending_message: Option<B256>,
    /// Amount the last voucher fell short by, per the channel authority.
    pub voucher_shortfall: TokenAmount,
    /// Deal is running over the legacy protocol.
    pub legacy_protocol: bool,
}

impl ClientDealState {
    /// Fresh state for a proposed deal, before any bytes or funds move.
    pub fn new(
        proposal: DealProposal,
        client_wallet: PaymentAddress,
        provider_wallet: PaymentAddress,
        total_funds: TokenAmount,
        sender: PeerId,
    ) -> Self {
        Self {
            proposal,
            store_id: None,
            channel_id: None,
            last_payment_requested: false,
            all_blocks_received: false,
            total_funds,
            client_wallet,
            provider_wallet,
            payment_info: None,
            status: DealStatus::New,
            sender,
            total_received: 0,
            message: String::new(),
            bytes_paid_for: 0,
            current_interval: 0,
            payment_requested: TokenAmount::zero(),
            funds_spent: TokenAmount::zero(),
            unseal_funds_paid: TokenAmount::zero(),
            pending_message: None,
            voucher_shortfall: TokenAmount::zero(),
            legacy_protocol: false,
        }
    }

    /// The checkpoint at which the provider will next demand payment.
    pub fn next_interval(&self) -> u64 {
        self.proposal.params.next_interval(self.current_interval)
    }
}

/// Current state of a deal from the provider's point of view.
///
/// Mutated only by the provider deal driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDealState {
    /// The proposal this deal was opened with.
    pub proposal: DealProposal,
    /// Local store the served blocks are read from.
    pub store_id: u64,
    /// Set once the data transfer starts.
    pub channel_id: Option<TransferChannelId>,
    /// Where the requested payload physically lives.
    pub piece_info: Option<PieceInfo>,
    /// Where the deal stands.
    pub status: DealStatus,
    /// Consumer peer the deal is with.
    #[serde(with = "peer_serde")]
    pub receiver: PeerId,
    /// Funds received so far.
    pub funds_received: TokenAmount,
    /// Human-readable context, set on failure paths.
    pub message: String,
    /// Current payment checkpoint.
    pub current_interval: u64,
    /// Bytes sent so far.
    pub total_sent: u64,
}

impl ProviderDealState {
    /// Fresh state for an accepted proposal.
    pub fn new(proposal: DealProposal, store_id: u64, receiver: PeerId) -> Self {
        Self {
            proposal,
            store_id,
            channel_id: None,
            piece_info: None,
            status: DealStatus::New,
            receiver,
            funds_received: TokenAmount::zero(),
            message: String::new(),
            current_interval: 0,
            total_sent: 0,
        }
    }

    /// The globally unique identity of this deal.
    pub fn identifier(&self) -> ProviderDealIdentifier {
        ProviderDealIdentifier {
            receiver: self.receiver,
            deal: self.proposal.id,
        }
    }
}

/// Unique identity of a deal from the provider's perspective.
///
/// Deal identifiers are only unique per consumer; pairing with the consumer's
/// peer identity disambiguates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderDealIdentifier {
    /// Consumer peer that proposed the deal.
    pub receiver: PeerId,
    /// The consumer-chosen deal identifier.
    pub deal: DealId,
}

impl fmt::Display for ProviderDealIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.receiver, self.deal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Params;
    use turnstile_primitives::PayloadAddress;

    fn test_proposal() -> DealProposal {
        DealProposal {
            payload: PayloadAddress::from([1u8; 32]),
            id: DealId(77),
            params: Params::new_v0(TokenAmount::from_atto(10), 100, 50),
        }
    }

    fn test_peer() -> PeerId {
        libp2p_identity::Keypair::generate_ed25519()
            .public()
            .to_peer_id()
    }

    #[test]
    fn test_identifier_format() {
        let peer = test_peer();
        let state = ProviderDealState::new(test_proposal(), 1, peer);
        let id = state.identifier();
        assert_eq!(id.to_string(), format!("{peer}/77"));
        assert_eq!(id.deal, DealId(77));
    }

    #[test]
    fn test_client_state_next_interval() {
        let mut state = ClientDealState::new(
            test_proposal(),
            PaymentAddress::repeat_byte(0x01),
            PaymentAddress::repeat_byte(0x02),
            TokenAmount::from_atto(100_000),
            test_peer(),
        );
        assert_eq!(state.next_interval(), 100);

        state.current_interval = 100;
        assert_eq!(state.next_interval(), 250);
    }

    #[test]
    fn test_client_state_roundtrip() {
        let state = ClientDealState::new(
            test_proposal(),
            PaymentAddress::repeat_byte(0x01),
            PaymentAddress::repeat_byte(0x02),
            TokenAmount::from_atto(100_000),
            test_peer(),
        );
        let encoded = serde_cbor::to_vec(&state).unwrap();
        let decoded: ClientDealState = serde_cbor::from_slice(&encoded).unwrap();
        assert_eq!(decoded.sender, state.sender);
        assert_eq!(decoded.proposal, state.proposal);
        assert_eq!(decoded.status, DealStatus::New);
        assert!(decoded.payment_info.is_none());
    }
}
