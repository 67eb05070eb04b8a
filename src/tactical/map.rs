//! Tactical analysis map - per-faction dominance zones over the whole grid
//!
//! Owns every zone and the cell-to-zone assignment. The whole structure is
//! rebuilt from scratch on each refresh; a turn-slice stamp tells the
//! scheduler whether a rebuild is needed at all.

use ahash::AHashMap;
use rayon::prelude::*;

use crate::core::config::TacticalMapConfig;
use crate::core::types::{CellIndex, FactionId, SettlementId, TurnSlice};
use crate::tactical::zone::{DominanceFlag, Zone, ZoneId};
use crate::world::view::WorldView;

/// Dominance zones for one faction
#[derive(Debug, Clone, PartialEq)]
pub struct TacticalAnalysisMap {
    pub(crate) dominance_percent: i32,
    pub(crate) unit_strength_multiplier: i32,
    pub(crate) tactical_range: i32,
    pub(crate) faction: FactionId,
    pub(crate) turn_slice_built: Option<TurnSlice>,
    pub(crate) cell_zone_ids: Vec<Option<ZoneId>>,
    pub(crate) zones: Vec<Zone>,
    pub(crate) id_lookup: AHashMap<ZoneId, usize>,
    pub(crate) config: TacticalMapConfig,
}

impl TacticalAnalysisMap {
    /// Create an empty map for a faction; nothing is computed until refresh
    pub fn new(faction: FactionId, config: TacticalMapConfig) -> Self {
        Self {
            dominance_percent: config.dominance_percent,
            unit_strength_multiplier: config.unit_strength_multiplier,
            tactical_range: config.tactical_range,
            faction,
            turn_slice_built: None,
            cell_zone_ids: Vec::new(),
            zones: Vec::new(),
            id_lookup: AHashMap::new(),
            config,
        }
    }

    /// Reset to an empty map sized for the world
    pub fn init(&mut self, world: &dyn WorldView) {
        self.cell_zone_ids = vec![None; world.num_cells()];
        self.zones.clear();
        self.id_lookup.clear();
        self.dominance_percent = self.config.dominance_percent;
        self.unit_strength_multiplier = self.config.unit_strength_multiplier;
        self.tactical_range = self.config.tactical_range;
        self.turn_slice_built = None;
    }

    pub fn config(&self) -> &TacticalMapConfig {
        &self.config
    }

    /// Replace the tunables; takes effect on the next refresh
    pub fn set_config(&mut self, config: TacticalMapConfig) {
        self.config = config;
        self.invalidate();
    }

    pub fn faction(&self) -> FactionId {
        self.faction
    }

    pub fn dominance_percent(&self) -> i32 {
        self.dominance_percent
    }

    pub fn unit_strength_multiplier(&self) -> i32 {
        self.unit_strength_multiplier
    }

    pub fn tactical_range(&self) -> i32 {
        self.tactical_range
    }

    pub fn turn_slice_built(&self) -> Option<TurnSlice> {
        self.turn_slice_built
    }

    /// Built for the world's current turn slice and grid size
    pub fn is_up_to_date(&self, world: &dyn WorldView) -> bool {
        self.turn_slice_built == Some(world.turn_slice())
            && self.cell_zone_ids.len() == world.num_cells()
    }

    /// Force the next `refresh_if_stale` to rebuild
    pub fn invalidate(&mut self) {
        self.turn_slice_built = None;
    }

    /// Rebuild only when stale. Returns whether a rebuild happened.
    pub fn refresh_if_stale(&mut self, world: &dyn WorldView) -> bool {
        self.refresh(world, false)
    }

    /// Recompute all zones for the current world state
    pub fn refresh(&mut self, world: &dyn WorldView, force: bool) -> bool {
        if !force && self.is_up_to_date(world) {
            return false;
        }

        if self.cell_zone_ids.len() != world.num_cells() {
            self.init(world);
        }

        self.turn_slice_built = Some(world.turn_slice());
        self.tactical_range = self.config.tactical_range_for_era(world.current_era());
        self.unit_strength_multiplier = self.config.unit_strength_multiplier;
        self.dominance_percent = self.config.dominance_percent;

        self.zones.clear();
        self.id_lookup.clear();

        match world.team_of(self.faction) {
            Some(team) => {
                for index in 0..self.cell_zone_ids.len() {
                    self.cell_zone_ids[index] = if world.is_revealed(index, team)
                        && !world.is_impassable(index, team)
                    {
                        self.add_cell_to_zones(world, team, index)
                    } else {
                        None
                    };
                }
            }
            None => {
                tracing::warn!("Faction {:?} unknown to the world, map left empty", self.faction);
                self.cell_zone_ids.iter_mut().for_each(|z| *z = None);
            }
        }

        self.update_zone_ids(world);

        // barbarians don't care about tactical dominance
        if !world.is_barbarian(self.faction) {
            self.build_neighbor_graph(world);
            self.accumulate_strengths(world);
            self.classify_all_zones();
            self.update_postures(world);
            self.prioritize_zones(world);
        }

        tracing::debug!(
            "Tactical map for faction {} refreshed: turn slice {}, {} zones, range {}",
            self.faction.0,
            world.turn_slice(),
            self.zones.len(),
            self.tactical_range
        );

        true
    }

    /// Rebuild the id -> slot table from the zone list
    pub(crate) fn rebuild_lookup(&mut self) {
        self.id_lookup.clear();
        for (slot, zone) in self.zones.iter().enumerate() {
            self.id_lookup.insert(zone.id, slot);
        }
    }

    pub(crate) fn slot_of(&self, id: ZoneId) -> Option<usize> {
        let slot = *self.id_lookup.get(&id)?;
        if slot >= self.zones.len() {
            debug_assert!(false, "zone {id} maps to missing slot {slot}");
            tracing::warn!("Zone {} maps to missing slot {}", id, slot);
            return None;
        }
        Some(slot)
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// All zones, highest priority first after a refresh
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone_by_index(&self, index: usize) -> Option<&Zone> {
        self.zones.get(index)
    }

    pub fn zone_by_id(&self, id: ZoneId) -> Option<&Zone> {
        self.slot_of(id).and_then(|slot| self.zones.get(slot))
    }

    /// Zone controlled by a settlement, land or water side
    pub fn zone_by_settlement(&self, settlement: SettlementId, water: bool) -> Option<&Zone> {
        self.zone_by_id(ZoneId::for_settlement(settlement, water)?)
    }

    pub fn zone_by_cell(&self, cell: CellIndex) -> Option<&Zone> {
        self.dominance_zone_id(cell)
            .and_then(|id| self.zone_by_id(id))
    }

    /// Zone id of a cell; `None` for unrevealed, impassable or unknown cells
    pub fn dominance_zone_id(&self, cell: CellIndex) -> Option<ZoneId> {
        self.cell_zone_ids.get(cell).copied().flatten()
    }

    /// Per-cell zone assignment in cell index order
    pub fn cell_zone_ids(&self) -> &[Option<ZoneId>] {
        &self.cell_zone_ids
    }

    /// Is this cell in a settlement zone the enemy dominates?
    ///
    /// Zones without a settlement never count, which keeps the large open
    /// ocean zones out.
    pub fn is_in_enemy_dominated_zone(&self, cell: CellIndex) -> bool {
        match self.zone_by_cell(cell) {
            Some(zone) if zone.settlement.is_some() => zone.dominance == DominanceFlag::Enemy,
            _ => false,
        }
    }

    /// Classify every zone with the current strengths
    pub(crate) fn classify_all_zones(&mut self) {
        let percent = self.dominance_percent;
        for zone in &mut self.zones {
            zone.dominance = zone.classify(percent);
        }
    }
}

/// Refresh the stale maps of several factions against one world
///
/// Maps share nothing but the read-only world, so they are rebuilt in
/// parallel. Returns how many were rebuilt.
pub fn refresh_all(maps: &mut [TacticalAnalysisMap], world: &(dyn WorldView + Sync)) -> usize {
    maps.par_iter_mut()
        .map(|map| map.refresh_if_stale(world))
        .filter(|rebuilt| *rebuilt)
        .count()
}
