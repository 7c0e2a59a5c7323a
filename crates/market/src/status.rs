//! Deal identity and lifecycle status.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier for a retrieval deal, unique per consumer.
///
/// Only the pair (consumer peer, `DealId`) is globally unique; see
/// [`ProviderDealIdentifier`](crate::ProviderDealIdentifier).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
    derive_more::Into,
)]
#[serde(transparent)]
pub struct DealId(pub u64);

/// Lifecycle status of a retrieval deal.
///
/// Status values are carried on the wire as unsigned integers; the
/// discriminants are part of the protocol contract and must not be
/// renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::Display, strum::FromRepr)]
#[repr(u64)]
pub enum DealStatus {
    /// Deal was proposed and is awaiting processing.
    #[default]
    New = 0,
    /// Provider is unsealing the piece holding the payload.
    Unsealing = 1,
    /// Unsealing finished; data is readable.
    Unsealed = 2,
    /// Proposal sent, waiting for the provider's decision.
    WaitForAcceptance = 3,
    /// Consumer is creating a payment channel.
    PaymentChannelCreating = 4,
    /// Consumer is adding funds to the payment channel.
    PaymentChannelAddingFunds = 5,
    /// Provider accepted the proposal.
    Accepted = 6,
    /// Provider demands the unseal fee before any data moves.
    FundsNeededUnseal = 7,
    /// Deal hit an unrecoverable error and is winding down.
    Failing = 8,
    /// Provider rejected the proposal.
    Rejected = 9,
    /// Provider demands payment for bytes already sent.
    FundsNeeded = 10,
    /// Consumer is sending a mid-transfer payment.
    SendFunds = 11,
    /// Consumer is sending the final payment.
    SendFundsLastPayment = 12,
    /// Bytes are flowing and payments are current.
    Ongoing = 13,
    /// Provider demands the final payment.
    FundsNeededLastPayment = 14,
    /// All data sent and all payments cleared.
    Completed = 15,
    /// Provider has no record of the referenced deal.
    DealNotFound = 16,
    /// Deal failed; terminal bookkeeping state on the legacy path.
    Errored = 17,
    /// All blocks received; payments may still be outstanding.
    BlocksComplete = 18,
    /// Last payment requested; transfer wrapping up.
    Finalizing = 19,
    /// Finalization done on one side, waiting for the other.
    Completing = 20,
    /// Verifying that the transfer completed cleanly.
    CheckComplete = 21,
    /// Consumer is checking channel funds against the amount owed.
    CheckFunds = 22,
    /// Channel funds do not cover the amount owed.
    InsufficientFunds = 23,
    /// Consumer is allocating a payment-channel lane.
    PaymentChannelAllocatingLane = 24,
    /// Cancellation requested; shutting the transfer down.
    Cancelling = 25,
    /// Deal was cancelled before completion.
    Cancelled = 26,
    /// Consumer is retrying the deal over the legacy protocol.
    RetryLegacy = 27,
    /// Proposal re-sent over the legacy protocol, awaiting a decision.
    WaitForAcceptanceLegacy = 28,
    /// Final payment made, waiting for remaining blocks.
    ClientWaitingForLastBlocks = 29,
    /// Consumer is funding the channel before the deal starts.
    PaymentChannelAddingInitialFunds = 30,
}

impl DealStatus {
    /// True if processing finished with an error.
    pub fn is_terminal_error(self) -> bool {
        matches!(
            self,
            DealStatus::DealNotFound | DealStatus::Failing | DealStatus::Rejected
        )
    }

    /// True if processing finished successfully.
    pub fn is_terminal_success(self) -> bool {
        matches!(self, DealStatus::Completed)
    }

    /// True if processing finished, either way.
    ///
    /// A terminal snapshot is an immutable record of outcome; drivers must
    /// not mutate it further.
    pub fn is_terminal(self) -> bool {
        self.is_terminal_error() || self.is_terminal_success()
    }
}

impl Serialize for DealStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(*self as u64)
    }
}

impl<'de> Deserialize<'de> for DealStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u64::deserialize(deserializer)?;
        DealStatus::from_repr(raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown deal status {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deal_id_display() {
        assert_eq!(DealId(42).to_string(), "42");
    }

    #[test]
    fn test_terminal_classification() {
        let terminal = [
            DealStatus::DealNotFound,
            DealStatus::Failing,
            DealStatus::Rejected,
            DealStatus::Completed,
        ];
        for status in terminal {
            assert!(status.is_terminal(), "{status} should be terminal");
        }

        assert!(DealStatus::DealNotFound.is_terminal_error());
        assert!(DealStatus::Completed.is_terminal_success());
        assert!(!DealStatus::Completed.is_terminal_error());

        // mid-transfer statuses are not terminal
        for status in [
            DealStatus::New,
            DealStatus::Ongoing,
            DealStatus::FundsNeeded,
            DealStatus::FundsNeededLastPayment,
            DealStatus::Finalizing,
            DealStatus::BlocksComplete,
            DealStatus::Cancelling,
        ] {
            assert!(!status.is_terminal(), "{status} should not be terminal");
        }
    }

    #[test]
    fn test_status_roundtrip_as_integer() {
        let encoded = serde_cbor::to_vec(&DealStatus::Ongoing).unwrap();
        let decoded: DealStatus = serde_cbor::from_slice(&encoded).unwrap();
        assert_eq!(decoded, DealStatus::Ongoing);

        // unknown discriminants are rejected, not mapped to a default
        let encoded = serde_cbor::to_vec(&999u64).unwrap();
        assert!(serde_cbor::from_slice::<DealStatus>(&encoded).is_err());
    }
}
