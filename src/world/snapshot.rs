//! In-memory world snapshot
//!
//! A plain-data implementation of [`WorldView`]. Used by the diagnostic
//! binary and by tests; host games can also serialize their state into it
//! once per turn and hand it to the tactical map.

use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::OnceLock;

use crate::core::error::Result;
use crate::core::types::{AreaId, CellIndex, Domain, FactionId, SettlementId, TeamId, TurnSlice};
use crate::world::grid::{GridCoord, MapDims};
use crate::world::view::{
    Approach, CellInfo, FactionInfo, FactionKind, Opinion, SettlementInfo, UnitInfo, WarState,
    WorldView,
};

/// Directed diplomatic relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub from: FactionId,
    pub towards: FactionId,
    pub approach: Approach,
    /// What `towards` believes the approach is
    pub visible_approach: Approach,
    pub opinion: Opinion,
}

/// Complete world state for one turn slice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub dims: MapDims,
    pub turn_slice: TurnSlice,
    #[serde(default)]
    pub era: i32,
    cells: Vec<CellInfo>,
    #[serde(default)]
    pub settlements: Vec<SettlementInfo>,
    #[serde(default)]
    pub units: Vec<UnitInfo>,
    #[serde(default)]
    pub factions: Vec<FactionInfo>,
    #[serde(default)]
    pub wars: Vec<(TeamId, TeamId)>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub focus_cells: Vec<(FactionId, CellIndex)>,
    #[serde(default)]
    pub operation_targets: Vec<(FactionId, SettlementId)>,
    #[serde(skip)]
    area_tiles: OnceLock<AHashMap<AreaId, u32>>,
}

impl WorldSnapshot {
    /// All-land map, one area, nothing revealed
    pub fn new(dims: MapDims) -> Self {
        let cells = (0..dims.num_cells())
            .filter_map(|i| dims.coord_of(i))
            .map(|coord| CellInfo::new(coord, AreaId(1), false))
            .collect();

        Self {
            dims,
            turn_slice: 0,
            era: 0,
            cells,
            settlements: Vec::new(),
            units: Vec::new(),
            factions: Vec::new(),
            wars: Vec::new(),
            relations: Vec::new(),
            focus_cells: Vec::new(),
            operation_targets: Vec::new(),
            area_tiles: OnceLock::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn cells(&self) -> &[CellInfo] {
        &self.cells
    }

    /// Mutable access to a cell; drops cached area sizes
    pub fn cell_mut(&mut self, index: CellIndex) -> Option<&mut CellInfo> {
        self.area_tiles = OnceLock::new();
        self.cells.get_mut(index)
    }

    /// Index of an in-map coordinate, for building fixtures
    ///
    /// Panics when the coordinate lies outside a non-wrapping map.
    pub fn index(&self, x: i32, y: i32) -> CellIndex {
        self.dims
            .index_of(GridCoord::new(x, y))
            .unwrap_or_else(|| panic!("cell ({x}, {y}) outside the map"))
    }

    pub fn set_water(&mut self, index: CellIndex, is_water: bool) {
        if let Some(c) = self.cell_mut(index) {
            c.is_water = is_water;
        }
    }

    pub fn set_owner(&mut self, index: CellIndex, owner: Option<FactionId>) {
        if let Some(c) = self.cell_mut(index) {
            c.owner = owner;
        }
    }

    pub fn reveal_all(&mut self, team: TeamId) {
        for c in &mut self.cells {
            if !c.revealed_to.contains(&team) {
                c.revealed_to.push(team);
            }
        }
    }

    pub fn set_all_visible(&mut self, team: TeamId) {
        self.reveal_all(team);
        for c in &mut self.cells {
            if !c.visible_to.contains(&team) {
                c.visible_to.push(team);
            }
        }
    }

    pub fn add_faction(&mut self, id: FactionId, team: TeamId, kind: FactionKind) {
        self.factions.push(FactionInfo {
            id,
            team,
            kind,
            ally: None,
            war_state: WarState::Neutral,
        });
    }

    pub fn faction_mut(&mut self, id: FactionId) -> Option<&mut FactionInfo> {
        self.factions.iter_mut().find(|f| f.id == id)
    }

    pub fn declare_war(&mut self, a: TeamId, b: TeamId) {
        if !self.is_at_war(a, b) {
            self.wars.push((a, b));
        }
    }

    /// Add a settlement and claim its cell for the owner
    pub fn add_settlement(&mut self, settlement: SettlementInfo) -> SettlementId {
        let id = settlement.id;
        let (cell, owner) = (settlement.cell, settlement.owner);
        self.settlements.push(settlement);
        self.set_owner(cell, Some(owner));
        id
    }

    pub fn settlement_mut(&mut self, id: SettlementId) -> Option<&mut SettlementInfo> {
        self.settlements.iter_mut().find(|s| s.id == id)
    }

    pub fn add_unit(&mut self, unit: UnitInfo) {
        self.units.push(unit);
    }

    pub fn set_relation(&mut self, relation: Relation) {
        self.relations
            .retain(|r| !(r.from == relation.from && r.towards == relation.towards));
        self.relations.push(relation);
    }

    pub fn advance_turn_slice(&mut self) {
        self.turn_slice += 1;
    }

    /// Assign area ids by flood-filling connected land and water regions
    pub fn recompute_areas(&mut self) {
        let mut assigned: Vec<Option<AreaId>> = vec![None; self.cells.len()];
        let mut next_area = 1;
        let mut queue = VecDeque::new();

        for start in 0..self.cells.len() {
            if assigned[start].is_some() {
                continue;
            }
            let area = AreaId(next_area);
            next_area += 1;
            let is_water = self.cells[start].is_water;
            assigned[start] = Some(area);
            queue.push_back(start);

            while let Some(cur) = queue.pop_front() {
                let coord = self.cells[cur].coord;
                for n in self.dims.neighbors(coord) {
                    let Some(ni) = self.dims.index_of(n) else {
                        continue;
                    };
                    if assigned[ni].is_none() && self.cells[ni].is_water == is_water {
                        assigned[ni] = Some(area);
                        queue.push_back(ni);
                    }
                }
            }
        }

        for (cell, area) in self.cells.iter_mut().zip(assigned) {
            cell.area = area.unwrap_or(AreaId(0));
        }
        self.area_tiles = OnceLock::new();
    }

    fn relation(&self, from: FactionId, towards: FactionId) -> Option<&Relation> {
        self.relations
            .iter()
            .find(|r| r.from == from && r.towards == towards)
    }

    /// Random world for demos: blob continents, two warring majors, a minor
    pub fn generate(width: i32, height: i32, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let dims = MapDims::new(width, height).with_wrap(true, false);
        let mut world = Self::new(dims);

        // Land is everything close to one of a few blob centres
        let blob_count = ((width * height) / 120).max(2);
        let blobs: Vec<(GridCoord, i32)> = (0..blob_count)
            .map(|_| {
                let c = GridCoord::new(rng.gen_range(0..width), rng.gen_range(0..height));
                (c, rng.gen_range(3..=6))
            })
            .collect();
        for i in 0..world.cells.len() {
            let coord = world.cells[i].coord;
            let land = blobs
                .iter()
                .any(|(c, r)| dims.plot_distance(coord, *c) <= *r);
            world.cells[i].is_water = !land;
            world.cells[i].terrain = if land { rng.gen_range(1..5) } else { 0 };
        }
        world.recompute_areas();

        let factions = [
            (FactionId(0), TeamId(0), FactionKind::Major),
            (FactionId(1), TeamId(1), FactionKind::Major),
            (FactionId(2), TeamId(2), FactionKind::Minor),
        ];
        for (id, team, kind) in factions {
            world.add_faction(id, team, kind);
            world.reveal_all(team);
        }
        world.declare_war(TeamId(0), TeamId(1));
        if let Some(minor) = world.faction_mut(FactionId(2)) {
            minor.ally = Some(FactionId(1));
        }

        // Settlements on land, spaced apart
        let land: Vec<CellIndex> = (0..world.cells.len())
            .filter(|&i| !world.cells[i].is_water)
            .collect();
        let mut next_settlement = 0;
        for (faction, _, kind) in factions {
            let count = if kind == FactionKind::Major { 2 } else { 1 };
            let mut placed = 0;
            let mut attempts = 0;
            while placed < count && attempts < 200 && !land.is_empty() {
                attempts += 1;
                let cell = land[rng.gen_range(0..land.len())];
                let too_close = world.settlements.iter().any(|s| {
                    world.plot_distance(cell, s.cell).is_some_and(|d| d < 4)
                });
                if too_close {
                    continue;
                }
                world.add_settlement(SettlementInfo {
                    id: SettlementId(next_settlement),
                    name: format!("City {next_settlement}"),
                    owner: faction,
                    cell,
                    max_hit_points: 200,
                    damage: rng.gen_range(0..80),
                    strength_value: rng.gen_range(150..300),
                    economic_value: rng.gen_range(50..500),
                    in_danger_of_falling: false,
                });
                next_settlement += 1;
                placed += 1;
            }
        }

        // Territory: cells within two steps of a settlement
        for i in 0..world.cells.len() {
            if let Some((sid, d)) = world.closest_settlement(i) {
                if d <= 2 {
                    let owner = world.settlement(sid).map(|s| s.owner);
                    world.cells[i].owner = owner;
                }
            }
        }

        // Units around each settlement
        let settlements = world.settlements.clone();
        for s in &settlements {
            let center = world.cells[s.cell].coord;
            for _ in 0..rng.gen_range(2..6) {
                let target = GridCoord::new(
                    center.x + rng.gen_range(-3..=3),
                    center.y + rng.gen_range(-3..=3),
                );
                let Some(cell) = dims.index_of(target) else {
                    continue;
                };
                let is_water = world.cells[cell].is_water;
                let is_ranged = rng.gen_bool(0.4);
                world.add_unit(UnitInfo {
                    owner: s.owner,
                    cell: Some(cell),
                    domain: if is_water { Domain::Sea } else { Domain::Land },
                    is_combat: true,
                    is_ranged,
                    is_embarked: false,
                    attack_strength: rng.gen_range(8..30),
                    ranged_strength: if is_ranged { rng.gen_range(8..30) } else { 0 },
                });
            }
        }

        // Vision: two steps around own units and settlements
        let mut eyes: Vec<(TeamId, CellIndex)> = Vec::new();
        for u in &world.units {
            if let (Some(team), Some(cell)) = (world.team_of(u.owner), u.cell) {
                eyes.push((team, cell));
            }
        }
        for s in &world.settlements {
            if let Some(team) = world.team_of(s.owner) {
                eyes.push((team, s.cell));
            }
        }
        for i in 0..world.cells.len() {
            let coord = world.cells[i].coord;
            let teams: Vec<TeamId> = eyes
                .iter()
                .filter(|(_, c)| dims.plot_distance(coord, world.cells[*c].coord) <= 2)
                .map(|(t, _)| *t)
                .collect();
            for t in teams {
                if !world.cells[i].visible_to.contains(&t) {
                    world.cells[i].visible_to.push(t);
                }
            }
        }

        world.factions[0].war_state = WarState::Winning;
        world.factions[1].war_state = WarState::Losing;
        world.area_tiles = OnceLock::new();
        world
    }
}

impl WorldView for WorldSnapshot {
    fn dims(&self) -> MapDims {
        self.dims
    }

    fn turn_slice(&self) -> TurnSlice {
        self.turn_slice
    }

    fn current_era(&self) -> i32 {
        self.era
    }

    fn cell(&self, index: CellIndex) -> Option<&CellInfo> {
        self.cells.get(index)
    }

    fn settlements(&self) -> &[SettlementInfo] {
        &self.settlements
    }

    fn units(&self) -> &[UnitInfo] {
        &self.units
    }

    fn faction(&self, id: FactionId) -> Option<&FactionInfo> {
        self.factions.iter().find(|f| f.id == id)
    }

    fn is_at_war(&self, a: TeamId, b: TeamId) -> bool {
        self.wars
            .iter()
            .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    fn approach(&self, from: FactionId, towards: FactionId) -> Approach {
        self.relation(from, towards)
            .map(|r| r.approach)
            .unwrap_or_default()
    }

    fn visible_approach(&self, from: FactionId, towards: FactionId) -> Approach {
        self.relation(from, towards)
            .map(|r| r.visible_approach)
            .unwrap_or_default()
    }

    fn opinion(&self, from: FactionId, of: FactionId) -> Opinion {
        self.relation(from, of).map(|r| r.opinion).unwrap_or_default()
    }

    fn is_in_focus_area(&self, faction: FactionId, cell: CellIndex) -> bool {
        self.focus_cells.contains(&(faction, cell))
    }

    fn is_operation_target(&self, faction: FactionId, settlement: SettlementId) -> bool {
        self.operation_targets.contains(&(faction, settlement))
    }

    fn area_tile_count(&self, area: AreaId) -> u32 {
        let counts = self.area_tiles.get_or_init(|| {
            let mut counts = AHashMap::new();
            for c in &self.cells {
                *counts.entry(c.area).or_insert(0) += 1;
            }
            counts
        });
        counts.get(&area).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_world_is_land() {
        let world = WorldSnapshot::new(MapDims::new(5, 4));
        assert_eq!(world.cells().len(), 20);
        assert!(world.cells().iter().all(|c| !c.is_water));
        assert_eq!(world.area_tile_count(AreaId(1)), 20);
    }

    #[test]
    fn test_recompute_areas_splits_land_and_water() {
        let mut world = WorldSnapshot::new(MapDims::new(6, 3));
        for y in 0..3 {
            let i = world.index(3, y);
            world.set_water(i, true);
        }
        world.recompute_areas();

        let left = world.cells()[world.index(0, 0)].area;
        let right = world.cells()[world.index(5, 0)].area;
        let water = world.cells()[world.index(3, 1)].area;
        assert_ne!(left, right);
        assert_ne!(left, water);
        assert_eq!(world.area_tile_count(water), 3);
        assert_eq!(world.area_tile_count(left), 9);
    }

    #[test]
    fn test_area_cache_invalidated_on_mutation() {
        let mut world = WorldSnapshot::new(MapDims::new(4, 4));
        assert_eq!(world.area_tile_count(AreaId(1)), 16);
        let i = world.index(0, 0);
        world.cell_mut(i).unwrap().area = AreaId(2);
        assert_eq!(world.area_tile_count(AreaId(1)), 15);
        assert_eq!(world.area_tile_count(AreaId(2)), 1);
    }

    #[test]
    fn test_closest_settlement_and_adjacent_visibility() {
        let mut world = WorldSnapshot::new(MapDims::new(10, 10));
        world.add_faction(FactionId(0), TeamId(0), FactionKind::Major);
        let cell = world.index(5, 5);
        world.add_settlement(SettlementInfo {
            id: SettlementId(3),
            name: "Ur".into(),
            owner: FactionId(0),
            cell,
            max_hit_points: 100,
            damage: 0,
            strength_value: 10,
            economic_value: 1,
            in_danger_of_falling: false,
        });
        assert_eq!(world.closest_settlement(cell), Some((SettlementId(3), 0)));
        assert_eq!(world.cells()[cell].owner, Some(FactionId(0)));

        let probe = world.index(5, 6);
        assert!(!world.is_adjacent_visible(probe, TeamId(0)));
        world.cell_mut(cell).unwrap().visible_to.push(TeamId(0));
        assert!(world.is_adjacent_visible(probe, TeamId(0)));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = WorldSnapshot::generate(24, 16, 7);
        let b = WorldSnapshot::generate(24, 16, 7);
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
        assert!(!a.settlements.is_empty());
        assert!(a.is_at_war(TeamId(0), TeamId(1)));
    }

    #[test]
    fn test_json_round_trip() {
        let world = WorldSnapshot::generate(16, 12, 3);
        let json = world.to_json().unwrap();
        let loaded = WorldSnapshot::from_json(&json).unwrap();
        assert_eq!(loaded.cells(), world.cells());
        assert_eq!(loaded.settlements, world.settlements);
    }
}
