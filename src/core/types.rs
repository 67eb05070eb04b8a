//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Index of a cell in the row-major map grid
pub type CellIndex = usize;

/// Monotonic stamp identifying one recomputation snapshot
pub type TurnSlice = i64;

/// Unique identifier for a faction (player, city state, barbarians)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactionId(pub u32);

/// Team identifier - factions on the same team share vision and wars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub u32);

/// Settlement (city) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SettlementId(pub u32);

/// Landmass / water body identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AreaId(pub i32);

/// Movement domain of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Land,
    Sea,
    Air,
}

impl Domain {
    /// Whether a unit of this domain fits a zone of the given kind.
    /// Air units fit everywhere.
    pub fn matches_zone(&self, zone_is_water: bool) -> bool {
        match self {
            Domain::Air => true,
            Domain::Land => !zone_is_water,
            Domain::Sea => zone_is_water,
        }
    }
}
