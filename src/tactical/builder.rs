//! Zone building - assign every revealed cell to a dominance zone
//!
//! Cells are classified by controlling faction and territory type, then
//! merged into the first compatible zone or seed a new one.

use ahash::{AHashMap, AHashSet};

use crate::core::types::{AreaId, CellIndex, FactionId, SettlementId, TeamId};
use crate::tactical::map::TacticalAnalysisMap;
use crate::tactical::zone::{settlement_magnitude, TerritoryType, Zone, ZoneId};
use crate::world::grid::{GridCoord, MapDims};
use crate::world::view::WorldView;

/// What a single cell would look like as a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneCandidate {
    pub coord: GridCoord,
    pub is_water: bool,
    pub area: AreaId,
    pub owner: Option<FactionId>,
    pub settlement: Option<SettlementId>,
    pub territory: TerritoryType,
}

/// Territory type of an owner team relative to ours
pub fn territory_type(
    world: &dyn WorldView,
    our_team: TeamId,
    owner_team: Option<TeamId>,
) -> TerritoryType {
    match owner_team {
        None => TerritoryType::Unclaimed,
        Some(team) if team == our_team => TerritoryType::Friendly,
        Some(team) if world.is_at_war(our_team, team) => TerritoryType::Enemy,
        Some(_) => TerritoryType::Neutral,
    }
}

impl TacticalAnalysisMap {
    /// Describe a cell as a zone candidate
    pub fn classify_cell(
        &self,
        world: &dyn WorldView,
        our_team: TeamId,
        index: CellIndex,
    ) -> Option<ZoneCandidate> {
        let cell = world.cell(index)?;
        let mut area = cell.area;

        let closest = world.closest_settlement(index);
        let capture_radius = self.config.city_capture_radius;

        let (owner, settlement) = match closest {
            Some((sid, distance)) if distance <= capture_radius => match world.settlement(sid) {
                Some(s) => {
                    // tiny islands next to a city join the city's area
                    if world.area_tile_count(cell.area) < self.config.small_area_tiles {
                        if let Some(city_cell) = world.cell(s.cell) {
                            area = city_cell.area;
                        }
                    }
                    (Some(s.owner), Some(sid))
                }
                None => (cell.owner, None),
            },
            other => {
                // far from any city the cell owner decides, and the
                // closest city only counts if it shares that owner
                let settlement = other.map(|(sid, _)| sid).filter(|sid| {
                    world
                        .settlement(*sid)
                        .is_some_and(|s| Some(s.owner) == cell.owner)
                });
                (cell.owner, settlement)
            }
        };

        let owner_team = owner.and_then(|f| world.team_of(f));

        Some(ZoneCandidate {
            coord: cell.coord,
            is_water: cell.is_water,
            area,
            owner,
            settlement,
            territory: territory_type(world, our_team, owner_team),
        })
    }

    /// Add a cell to the zone set and return the zone it ended up in
    pub(crate) fn add_cell_to_zones(
        &mut self,
        world: &dyn WorldView,
        our_team: TeamId,
        index: CellIndex,
    ) -> Option<ZoneId> {
        let candidate = self.classify_cell(world, our_team, index)?;
        let dims = world.dims();

        if let Some(slot) = self.find_merge_target(&candidate, &dims) {
            let zone = &mut self.zones[slot];
            zone.extend(candidate.coord, &dims);
            return Some(zone.id);
        }

        Some(self.add_new_zone(&candidate, &dims))
    }

    /// First existing zone the candidate may join
    pub fn find_merge_target(&self, candidate: &ZoneCandidate, dims: &MapDims) -> Option<usize> {
        let frontier = matches!(
            candidate.territory,
            TerritoryType::Unclaimed | TerritoryType::Neutral
        );

        for (slot, zone) in self.zones.iter().enumerate() {
            // land and water never mix
            if zone.is_water() != candidate.is_water {
                continue;
            }

            // unowned or neutral cells join anything close enough
            if frontier && dims.plot_distance(candidate.coord, zone.center()) <= self.tactical_range
            {
                return Some(slot);
            }

            // one wilderness zone per area
            if zone.territory == TerritoryType::Unclaimed
                && candidate.territory == TerritoryType::Unclaimed
                && zone.area == candidate.area
            {
                return Some(slot);
            }

            if zone.territory == candidate.territory
                && zone.owner == candidate.owner
                && zone.area == candidate.area
                && zone.settlement == candidate.settlement
            {
                return Some(slot);
            }
        }

        None
    }

    fn add_new_zone(&mut self, candidate: &ZoneCandidate, dims: &MapDims) -> ZoneId {
        let slot = self.zones.len();
        let id = ZoneId::signed(slot as i32 + 1, candidate.is_water);

        let mut zone = Zone::new(id, candidate.area);
        zone.territory = candidate.territory;
        zone.owner = candidate.owner;
        zone.settlement = candidate.settlement;
        zone.extend(candidate.coord, dims);

        self.id_lookup.insert(id, slot);
        self.zones.push(zone);
        id
    }

    /// Renumber zones so settlement zones carry the settlement's id
    ///
    /// Zones without a settlement, and the second claimant of a
    /// settlement id, get ids above every settlement-derived id.
    pub(crate) fn update_zone_ids(&mut self, world: &dyn WorldView) {
        let base = world
            .settlements()
            .iter()
            .filter_map(|s| settlement_magnitude(s.id))
            .max()
            .unwrap_or(0);

        // range ids must stay above every settlement id and inside i32
        let zone_count = i32::try_from(self.zones.len()).unwrap_or(i32::MAX);
        let (base, settlement_ids) = match base.checked_add(zone_count) {
            Some(_) => (base, true),
            None => {
                tracing::warn!(
                    "Settlement ids up to {} leave no room for {} zones, ids stay in build order",
                    base,
                    self.zones.len()
                );
                (0, false)
            }
        };

        let mut taken: AHashSet<ZoneId> = AHashSet::new();
        let mut old_to_new: AHashMap<ZoneId, ZoneId> = AHashMap::new();

        for (slot, zone) in self.zones.iter().enumerate() {
            let water = zone.is_water();
            // slot < zone_count, so this cannot overflow
            let mut new_id = ZoneId::signed(base + slot as i32 + 1, water);
            if let Some(settlement) = zone.settlement.filter(|_| settlement_ids) {
                match ZoneId::for_settlement(settlement, water) {
                    Some(settlement_id) => {
                        if taken.insert(settlement_id) {
                            new_id = settlement_id;
                        }
                    }
                    None => tracing::warn!(
                        "Settlement {} has no representable zone id, zone keeps {}",
                        settlement.0,
                        new_id
                    ),
                }
            }
            old_to_new.insert(zone.id, new_id);
        }

        let remap = |id: ZoneId| old_to_new.get(&id).copied().unwrap_or(id);
        for zone in &mut self.zones {
            zone.remap_ids(remap);
        }
        for cell in &mut self.cell_zone_ids {
            if let Some(id) = cell {
                *id = remap(*id);
            }
        }

        self.rebuild_lookup();
    }
}
