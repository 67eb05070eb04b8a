//! Read-only query interface onto the game world
//!
//! The tactical map never owns world data. Everything it needs about cells,
//! units, settlements and diplomacy is pulled through [`WorldView`], which
//! must stay stable for the duration of one refresh.

use serde::{Deserialize, Serialize};

use crate::core::types::{AreaId, CellIndex, Domain, FactionId, SettlementId, TeamId, TurnSlice};
use crate::world::grid::{GridCoord, MapDims};

/// Static facts about one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellInfo {
    pub coord: GridCoord,
    pub area: AreaId,
    pub is_water: bool,
    pub owner: Option<FactionId>,
    #[serde(default)]
    pub terrain: u16,
    #[serde(default)]
    pub impassable: bool,
    /// Teams that have ever seen this cell
    #[serde(default)]
    pub revealed_to: Vec<TeamId>,
    /// Teams that currently see this cell
    #[serde(default)]
    pub visible_to: Vec<TeamId>,
}

impl CellInfo {
    pub fn new(coord: GridCoord, area: AreaId, is_water: bool) -> Self {
        Self {
            coord,
            area,
            is_water,
            owner: None,
            terrain: 0,
            impassable: false,
            revealed_to: Vec::new(),
            visible_to: Vec::new(),
        }
    }
}

/// A settlement as seen by the tactical map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementInfo {
    pub id: SettlementId,
    pub name: String,
    pub owner: FactionId,
    pub cell: CellIndex,
    pub max_hit_points: u32,
    pub damage: u32,
    /// Combat strength at full health
    pub strength_value: u32,
    pub economic_value: i32,
    #[serde(default)]
    pub in_danger_of_falling: bool,
}

impl SettlementInfo {
    pub fn current_hit_points(&self) -> u32 {
        self.max_hit_points.saturating_sub(self.damage)
    }

    /// Strength scaled by remaining hit points
    pub fn effective_strength(&self) -> u64 {
        if self.max_hit_points == 0 {
            return 0;
        }
        u64::from(self.strength_value) * u64::from(self.current_hit_points())
            / u64::from(self.max_hit_points)
    }
}

/// A unit as seen by the tactical map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitInfo {
    pub owner: FactionId,
    pub cell: Option<CellIndex>,
    pub domain: Domain,
    #[serde(default = "default_true")]
    pub is_combat: bool,
    #[serde(default)]
    pub is_ranged: bool,
    #[serde(default)]
    pub is_embarked: bool,
    pub attack_strength: u32,
    #[serde(default)]
    pub ranged_strength: u32,
}

fn default_true() -> bool {
    true
}

/// What kind of faction this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactionKind {
    Major,
    Minor,
    Barbarian,
}

/// Aggregate state of all wars a faction is fighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WarState {
    #[default]
    Neutral,
    Winning,
    Losing,
}

/// Diplomatic approach of one faction towards another (worst first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Approach {
    War,
    Hostile,
    Deceptive,
    Guarded,
    Afraid,
    Friendly,
    #[default]
    Neutral,
}

impl Approach {
    pub fn is_guarded_or_worse(&self) -> bool {
        *self <= Approach::Guarded
    }
}

/// Opinion of one faction about another (worst first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Opinion {
    Unforgivable,
    Enemy,
    Competitor,
    #[default]
    Neutral,
    Favorable,
    Friend,
    Ally,
}

/// Faction facts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionInfo {
    pub id: FactionId,
    pub team: TeamId,
    pub kind: FactionKind,
    /// Protecting major faction, for minor factions
    #[serde(default)]
    pub ally: Option<FactionId>,
    #[serde(default)]
    pub war_state: WarState,
}

/// Query interface onto the live world
///
/// Implementors supply the raw data; the provided methods derive the
/// geometry and lookups the tactical map needs.
pub trait WorldView {
    fn dims(&self) -> MapDims;
    fn turn_slice(&self) -> TurnSlice;
    fn current_era(&self) -> i32;

    fn cell(&self, index: CellIndex) -> Option<&CellInfo>;
    fn settlements(&self) -> &[SettlementInfo];
    fn units(&self) -> &[UnitInfo];
    fn faction(&self, id: FactionId) -> Option<&FactionInfo>;

    fn is_at_war(&self, a: TeamId, b: TeamId) -> bool;

    /// Diplomatic approach of `from` towards `towards`
    fn approach(&self, from: FactionId, towards: FactionId) -> Approach;

    /// Approach of `from` towards `towards` as `towards` perceives it
    fn visible_approach(&self, from: FactionId, towards: FactionId) -> Approach;

    fn opinion(&self, from: FactionId, of: FactionId) -> Opinion;

    fn is_in_focus_area(&self, faction: FactionId, cell: CellIndex) -> bool;
    fn is_operation_target(&self, faction: FactionId, settlement: SettlementId) -> bool;

    fn num_cells(&self) -> usize {
        self.dims().num_cells()
    }

    fn cell_at(&self, coord: GridCoord) -> Option<CellIndex> {
        self.dims().index_of(coord)
    }

    fn plot_distance(&self, a: CellIndex, b: CellIndex) -> Option<i32> {
        let dims = self.dims();
        Some(dims.plot_distance(dims.coord_of(a)?, dims.coord_of(b)?))
    }

    fn team_of(&self, faction: FactionId) -> Option<TeamId> {
        self.faction(faction).map(|f| f.team)
    }

    fn settlement(&self, id: SettlementId) -> Option<&SettlementInfo> {
        self.settlements().iter().find(|s| s.id == id)
    }

    /// Number of cells in an area (landmass or water body)
    fn area_tile_count(&self, area: AreaId) -> u32 {
        (0..self.num_cells())
            .filter_map(|i| self.cell(i))
            .filter(|c| c.area == area)
            .count() as u32
    }

    fn is_revealed(&self, cell: CellIndex, team: TeamId) -> bool {
        self.cell(cell).is_some_and(|c| c.revealed_to.contains(&team))
    }

    fn is_visible(&self, cell: CellIndex, team: TeamId) -> bool {
        self.cell(cell).is_some_and(|c| c.visible_to.contains(&team))
    }

    fn is_impassable(&self, cell: CellIndex, _team: TeamId) -> bool {
        self.cell(cell).is_some_and(|c| c.impassable)
    }

    /// True if any adjacent cell is visible to the team
    fn is_adjacent_visible(&self, cell: CellIndex, team: TeamId) -> bool {
        let dims = self.dims();
        let Some(coord) = dims.coord_of(cell) else {
            return false;
        };
        dims.neighbors(coord)
            .into_iter()
            .filter_map(|n| dims.index_of(n))
            .any(|n| self.is_visible(n, team))
    }

    /// Nearest settlement of any owner, with its distance
    ///
    /// Ties go to the settlement listed first.
    fn closest_settlement(&self, cell: CellIndex) -> Option<(SettlementId, i32)> {
        let mut best: Option<(SettlementId, i32)> = None;
        for s in self.settlements() {
            let Some(d) = self.plot_distance(cell, s.cell) else {
                continue;
            };
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((s.id, d));
            }
        }
        best
    }

    fn is_settlement_visible(&self, settlement: SettlementId, team: TeamId) -> bool {
        self.settlement(settlement)
            .is_some_and(|s| self.is_visible(s.cell, team))
    }

    /// Whether the settlement sits in, or next to, the given area
    fn is_adjacent_to_area(&self, settlement: SettlementId, area: AreaId) -> bool {
        let Some(s) = self.settlement(settlement) else {
            return false;
        };
        if self.cell(s.cell).is_some_and(|c| c.area == area) {
            return true;
        }
        let dims = self.dims();
        let Some(coord) = dims.coord_of(s.cell) else {
            return false;
        };
        dims.neighbors(coord)
            .into_iter()
            .filter_map(|n| dims.index_of(n))
            .filter_map(|n| self.cell(n))
            .any(|c| c.area == area)
    }

    fn is_minor(&self, faction: FactionId) -> bool {
        self.faction(faction)
            .is_some_and(|f| f.kind == FactionKind::Minor)
    }

    fn is_major(&self, faction: FactionId) -> bool {
        self.faction(faction)
            .is_some_and(|f| f.kind == FactionKind::Major)
    }

    fn is_barbarian(&self, faction: FactionId) -> bool {
        self.faction(faction)
            .is_some_and(|f| f.kind == FactionKind::Barbarian)
    }

    fn war_state(&self, faction: FactionId) -> WarState {
        self.faction(faction).map(|f| f.war_state).unwrap_or_default()
    }
}
