//! Core primitive types for the Turnstile retrieval market.
//!
//! This crate provides fundamental types used across the market stack,
//! kept separate to avoid circular dependencies.

mod address;
mod piece;
mod token;

pub use address::{PayloadAddress, PaymentAddress, PieceAddress};
pub use piece::{PieceInfo, SectorLocation};
pub use token::{DECIMALS, ParseAmountError, TokenAmount};
