//! Locating a readable copy of a piece among redundant storage locations.
//!
//! A piece may live in several sealed sectors; reading it means either
//! opening an unsealed copy that already exists or paying the unseal cost on
//! one of the sealed ones. [`PieceMount`] encodes the preference order:
//! already-unsealed first, unseal-on-demand second, first success wins.
//!
//! # Components
//!
//! - [`PieceCatalog`] - the piece-index boundary (which sectors hold what)
//! - [`SectorAccess`] - the unseal/read boundary (slow, cancellable)
//! - [`PieceMount`] - the two-pass fallback reader over both

mod error;
mod mount;
mod traits;

pub use error::LocatorError;
pub use mount::PieceMount;
pub use traits::{PieceCatalog, PieceStream, SectorAccess};
