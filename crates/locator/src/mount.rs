//! Two-pass fallback reader.
//!
//! Pass one walks the known locations asking only "is an unsealed copy
//! already there?" and returns the first one that opens; no unseal work is
//! started. Pass two, reached only if pass one opened nothing, unseals
//! locations in order and returns the first success. The passes are explicit
//! loops so the tie-break order stays auditable.

use tokio_util::sync::CancellationToken;
use tracing::debug;
use turnstile_primitives::PieceAddress;

use crate::{LocatorError, PieceCatalog, PieceStream, SectorAccess};

/// Fallback reader over the redundant copies of a piece.
///
/// May be used concurrently for different pieces; concurrent fetches of the
/// same piece are not deduplicated and rely on [`SectorAccess::unseal`] being
/// safe to attempt redundantly.
#[derive(Debug, Clone)]
pub struct PieceMount<C, A> {
    catalog: C,
    sectors: A,
}

impl<C: PieceCatalog, A: SectorAccess> PieceMount<C, A> {
    /// Create a mount over the given piece index and sector access.
    pub fn new(catalog: C, sectors: A) -> Self {
        Self { catalog, sectors }
    }

    /// Find and open a readable stream for `piece`.
    ///
    /// Prefers a copy that is already unsealed; falls back to unsealing on
    /// demand. Fails with [`LocatorError::NoLocations`] when the index knows
    /// of no copies, with [`LocatorError::Cancelled`] as soon as `cancel`
    /// fires, and otherwise with the last unseal error seen.
    pub async fn fetch_piece(
        &self,
        piece: &PieceAddress,
        cancel: &CancellationToken,
    ) -> Result<PieceStream, LocatorError> {
        let info = self.catalog.piece_info(piece).await?;
        if info.locations.is_empty() {
            return Err(LocatorError::NoLocations(*piece));
        }

        // Pass one: a copy that is already unsealed costs nothing extra.
        // Availability-check failures only disqualify that location.
        for location in &info.locations {
            if cancel.is_cancelled() {
                return Err(LocatorError::Cancelled);
            }
            match self.sectors.is_unsealed(location).await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    debug!(%piece, sector = location.sector, %err, "skipping unsealed-copy check");
                    continue;
                }
            }
            match self.sectors.unseal(location, cancel).await {
                Ok(stream) => return Ok(stream),
                Err(LocatorError::Cancelled) => return Err(LocatorError::Cancelled),
                Err(err) => {
                    debug!(%piece, sector = location.sector, %err, "unsealed copy failed to open");
                }
            }
        }

        // Pass two: unseal on demand, first success wins.
        let mut last_err = LocatorError::Unseal("no sectors found to unseal from".to_string());
        for location in &info.locations {
            if cancel.is_cancelled() {
                return Err(LocatorError::Cancelled);
            }
            match self.sectors.unseal(location, cancel).await {
                Ok(stream) => return Ok(stream),
                Err(LocatorError::Cancelled) => return Err(LocatorError::Cancelled),
                Err(err) => {
                    debug!(%piece, sector = location.sector, %err, "unseal failed");
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }

    /// Declared length of the piece, from the first known location.
    ///
    /// This reads the index, not the sectors; no copy is opened.
    pub async fn piece_size(&self, piece: &PieceAddress) -> Result<u64, LocatorError> {
        let info = self.catalog.piece_info(piece).await?;
        match info.locations.first() {
            Some(location) => Ok(location.length),
            None => Err(LocatorError::NoLocations(*piece)),
        }
    }
}
