//! Persisted form of a tactical map
//!
//! Scalars first, then the per-cell zone ids, then the zones, each in a
//! fixed field order. The id lookup table is not stored; it is rebuilt
//! on load. The configuration is supplied by the loader.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::core::config::TacticalMapConfig;
use crate::core::error::{Result, TacticalError};
use crate::core::types::{FactionId, TurnSlice};
use crate::tactical::map::TacticalAnalysisMap;
use crate::tactical::zone::{Zone, ZoneId};
use crate::world::view::WorldView;

/// Serializable state of a [`TacticalAnalysisMap`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub dominance_percent: i32,
    pub unit_strength_multiplier: i32,
    pub tactical_range: i32,
    pub faction: FactionId,
    pub turn_slice_built: Option<TurnSlice>,
    pub cell_zone_ids: Vec<Option<ZoneId>>,
    pub zones: Vec<Zone>,
}

impl TacticalAnalysisMap {
    pub fn to_snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            dominance_percent: self.dominance_percent,
            unit_strength_multiplier: self.unit_strength_multiplier,
            tactical_range: self.tactical_range,
            faction: self.faction,
            turn_slice_built: self.turn_slice_built,
            cell_zone_ids: self.cell_zone_ids.clone(),
            zones: self.zones.clone(),
        }
    }

    /// Restore a map; the lookup table is rebuilt from the zone order
    pub fn from_snapshot(snapshot: MapSnapshot, config: TacticalMapConfig) -> Self {
        let mut map = Self::new(snapshot.faction, config);
        map.dominance_percent = snapshot.dominance_percent;
        map.unit_strength_multiplier = snapshot.unit_strength_multiplier;
        map.tactical_range = snapshot.tactical_range;
        map.turn_slice_built = snapshot.turn_slice_built;
        map.cell_zone_ids = snapshot.cell_zone_ids;
        map.zones = snapshot.zones;
        map.rebuild_lookup();
        map
    }

    /// Write the map as JSON
    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, &self.to_snapshot())?;
        Ok(())
    }

    pub fn save_to_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_snapshot())?)
    }

    /// Read a map written by [`save`](Self::save)
    pub fn load<R: Read>(reader: R, config: TacticalMapConfig) -> Result<Self> {
        let snapshot: MapSnapshot = serde_json::from_reader(reader)?;
        Ok(Self::from_snapshot(snapshot, config))
    }

    pub fn load_from_str(json: &str, config: TacticalMapConfig) -> Result<Self> {
        let snapshot: MapSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot, config))
    }

    /// Check that a loaded map was built for a grid of this world's size
    pub fn check_world(&self, world: &dyn WorldView) -> Result<()> {
        let world_cells = world.num_cells();
        if self.cell_zone_ids.len() != world_cells {
            return Err(TacticalError::SnapshotSizeMismatch {
                snapshot: self.cell_zone_ids.len(),
                world: world_cells,
            });
        }
        Ok(())
    }
}
