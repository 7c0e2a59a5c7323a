//! Piece location facts.
//!
//! A narrow snapshot of the piece index: which sealed sectors hold a copy of
//! a piece and where inside each sector it lives. Produced by an external
//! index, consumed read-only by the provider deal state and the content
//! locator.

use serde::{Deserialize, Serialize};

use crate::PieceAddress;

/// One physical copy of a piece inside a sealed sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorLocation {
    /// Storage deal that placed the copy.
    pub deal: u64,
    /// Sector holding the copy.
    pub sector: u64,
    /// Byte offset of the piece within the unsealed sector.
    pub offset: u64,
    /// Byte length of the piece.
    pub length: u64,
}

/// Known locations for one piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceInfo {
    /// The piece these locations hold.
    pub piece: PieceAddress,
    /// Redundant physical copies, in index order.
    pub locations: Vec<SectorLocation>,
}

impl PieceInfo {
    /// Snapshot for a piece with the given locations.
    pub fn new(piece: PieceAddress, locations: Vec<SectorLocation>) -> Self {
        Self { piece, locations }
    }
}
