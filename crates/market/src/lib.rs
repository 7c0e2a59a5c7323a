//! Accounting and wire contracts for pay-per-byte retrieval deals.
//!
//! A consumer streams content from a provider and pays for bytes already
//! received at escalating checkpoints before more data is released. This
//! crate holds what both peers must agree on byte-for-byte and
//! cent-for-cent:
//!
//! - [`Params`] - price terms plus the payment schedule (checkpoint
//!   recurrence and [`Params::outstanding_balance`], the single source of
//!   truth for what is owed)
//! - [`Query`] / [`QueryResponse`] - the pre-deal price discovery protocol
//! - [`DealProposal`] / [`DealResponse`] / [`DealPayment`] - typed transfer
//!   payloads with stable tags and validated decoding
//! - [`ClientDealState`] / [`ProviderDealState`] - per-side durable snapshots
//! - [`Ask`] / [`PricingInput`] - the pricing policy boundary
//!
//! The transport that moves these messages, the state machine that drives
//! deals, and the payment-channel authority that signs vouchers all live
//! elsewhere; their boundary shapes live here.

mod ask;
mod deal;
mod error;
mod params;
mod query;
mod state;
mod status;
mod voucher;

#[cfg(feature = "cli")]
mod args;

pub use ask::{Ask, DEFAULT_PAYMENT_INTERVAL, DEFAULT_PAYMENT_INTERVAL_INCREASE, PricingInput};
pub use deal::{DealPayment, DealProposal, DealResponse, Voucher};
pub use error::MarketError;
pub use params::Params;
pub use query::{QUERY_PROTOCOL, Query, QueryItemStatus, QueryResponse, QueryResponseStatus, RetrievalPeer};
pub use state::{
    ChannelAvailableFunds, ClientDealState, PaymentInfo, ProviderDealIdentifier, ProviderDealState,
    TransferChannelId,
};
pub use status::{DealId, DealStatus};
pub use voucher::{Merge, ModVerifyParams, SignedVoucher};

#[cfg(feature = "cli")]
pub use args::AskArgs;
