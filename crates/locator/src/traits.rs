//! External boundaries the locator reads through.

use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;
use turnstile_primitives::{PieceAddress, PieceInfo, SectorLocation};

use crate::LocatorError;

/// A readable stream of piece bytes.
pub type PieceStream = Box<dyn AsyncRead + Send + Unpin>;

/// The narrow piece-index interface: which sectors hold a piece.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait PieceCatalog: Send + Sync + 'static {
    /// Known locations for a piece, in index order.
    async fn piece_info(&self, piece: &PieceAddress) -> Result<PieceInfo, LocatorError>;
}

/// Access to sealed sector contents.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait SectorAccess: Send + Sync + 'static {
    /// True if an unsealed copy of the located range is already on disk,
    /// readable without further work.
    async fn is_unsealed(&self, location: &SectorLocation) -> Result<bool, LocatorError>;

    /// Open the located range for reading, unsealing first if necessary.
    ///
    /// Unsealing can take true disk latency; implementations must watch
    /// `cancel` and bail out with [`LocatorError::Cancelled`] when it fires.
    /// Opening a range that another call is already opening must be safe.
    async fn unseal(
        &self,
        location: &SectorLocation,
        cancel: &CancellationToken,
    ) -> Result<PieceStream, LocatorError>;
}
