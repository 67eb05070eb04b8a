//! Dominance zone record
//!
//! One contiguous region of cells sharing ownership and territory type,
//! with the military strength aggregated into it and its classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::{AreaId, FactionId, SettlementId};
use crate::world::grid::{GridCoord, MapDims};

/// Centroid coordinates are kept in thousandths of a cell
const CENTROID_SCALE: i32 = 1000;

/// Zone identifier. Negative ids are water zones, positive ids land zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(pub i32);

impl ZoneId {
    /// Build an id from a positive magnitude and the water flag
    pub fn signed(magnitude: i32, is_water: bool) -> Self {
        debug_assert!(magnitude > 0, "zone id magnitude must be positive");
        if is_water {
            Self(-magnitude)
        } else {
            Self(magnitude)
        }
    }

    /// Id of the zone controlled by a settlement, if the settlement id
    /// fits the id range
    pub fn for_settlement(settlement: SettlementId, is_water: bool) -> Option<Self> {
        let magnitude = settlement_magnitude(settlement)?;
        Some(Self::signed(magnitude, is_water))
    }

    pub fn is_water(&self) -> bool {
        self.0 < 0
    }
}

/// Unsigned part of a settlement-derived zone id
pub(crate) fn settlement_magnitude(settlement: SettlementId) -> Option<i32> {
    i32::try_from(settlement.0).ok()?.checked_add(1)
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relationship of a zone's owner to the computing faction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TerritoryType {
    #[default]
    Unclaimed,
    Friendly,
    Enemy,
    Neutral,
}

/// Who holds the upper hand in a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DominanceFlag {
    #[default]
    NoUnitsVisible,
    Friendly,
    Enemy,
    Even,
}

impl fmt::Display for DominanceFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DominanceFlag::NoUnitsVisible => "No Units Visible",
            DominanceFlag::Friendly => "Friendly",
            DominanceFlag::Enemy => "Enemy",
            DominanceFlag::Even => "Even",
        };
        f.write_str(s)
    }
}

/// Tactical stance for a zone, consumed by unit orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Posture {
    #[default]
    None,
    AttritFromRange,
    ExploitFlanks,
    Steamroll,
    SurgicalCityStrike,
    Hedgehog,
    Counterattack,
    Withdraw,
}

impl fmt::Display for Posture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Posture::None => "NoPosture",
            Posture::AttritFromRange => "Attrit from Range",
            Posture::ExploitFlanks => "Exploit Flanks",
            Posture::Steamroll => "Steamroll",
            Posture::SurgicalCityStrike => "Surgical City Strike",
            Posture::Hedgehog => "Hedgehog",
            Posture::Counterattack => "Counterattack",
            Posture::Withdraw => "Withdraw",
        };
        f.write_str(s)
    }
}

/// A single dominance zone
///
/// Field order is the persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub territory: TerritoryType,
    pub dominance: DominanceFlag,
    pub posture: Posture,
    pub owner: Option<FactionId>,
    pub settlement: Option<SettlementId>,
    pub area: AreaId,

    pub friendly_melee_strength: u64,
    pub enemy_melee_strength: u64,
    pub friendly_ranged_strength: u64,
    pub enemy_ranged_strength: u64,
    pub friendly_naval_strength: u64,
    pub enemy_naval_strength: u64,
    pub friendly_naval_ranged_strength: u64,
    pub enemy_naval_ranged_strength: u64,
    pub friendly_unit_count: u32,
    pub enemy_unit_count: u32,
    pub neutral_unit_count: u32,
    pub neutral_strength: u64,
    pub enemy_naval_unit_count: u32,
    pub friendly_naval_unit_count: u32,

    /// Priority score from the last ranking
    pub value: i64,
    /// Distance from the zone's settlement to the closest enemy unit
    pub closest_enemy_distance: Option<i32>,

    avg_x: i32,
    avg_y: i32,
    plot_count: u32,

    neighbors: Vec<ZoneId>,
}

impl Zone {
    pub fn new(id: ZoneId, area: AreaId) -> Self {
        Self {
            id,
            territory: TerritoryType::Unclaimed,
            dominance: DominanceFlag::NoUnitsVisible,
            posture: Posture::None,
            owner: None,
            settlement: None,
            area,
            friendly_melee_strength: 0,
            enemy_melee_strength: 0,
            friendly_ranged_strength: 0,
            enemy_ranged_strength: 0,
            friendly_naval_strength: 0,
            enemy_naval_strength: 0,
            friendly_naval_ranged_strength: 0,
            enemy_naval_ranged_strength: 0,
            friendly_unit_count: 0,
            enemy_unit_count: 0,
            neutral_unit_count: 0,
            neutral_strength: 0,
            enemy_naval_unit_count: 0,
            friendly_naval_unit_count: 0,
            value: 0,
            closest_enemy_distance: None,
            avg_x: 0,
            avg_y: 0,
            plot_count: 0,
            neighbors: Vec::new(),
        }
    }

    pub fn is_water(&self) -> bool {
        self.id.is_water()
    }

    pub fn num_plots(&self) -> u32 {
        self.plot_count
    }

    /// Centroid in thousandths of a cell
    pub fn centroid_milli(&self) -> (i32, i32) {
        (self.avg_x, self.avg_y)
    }

    /// Cell nearest to the running centroid
    pub fn center(&self) -> GridCoord {
        GridCoord::new(self.avg_x / CENTROID_SCALE, self.avg_y / CENTROID_SCALE)
    }

    /// Add a cell to the running centroid
    ///
    /// Deltas longer than half the map in a wrapping dimension are taken
    /// the short way round, and the result is folded back onto the map.
    pub fn extend(&mut self, coord: GridCoord, dims: &MapDims) {
        let px = coord.x * CENTROID_SCALE;
        let py = coord.y * CENTROID_SCALE;

        if self.plot_count == 0 {
            self.plot_count = 1;
            self.avg_x = px;
            self.avg_y = py;
            return;
        }

        let full_width = dims.width * CENTROID_SCALE;
        let full_height = dims.height * CENTROID_SCALE;
        let half_width = full_width / 2;
        let half_height = full_height / 2;

        let mut dx = px - self.avg_x;
        let mut dy = py - self.avg_y;

        if dims.wrap_x {
            if dx < -half_width {
                dx += full_width;
            } else if dx > half_width {
                dx -= full_width;
            }
        }
        if dims.wrap_y {
            if dy < -half_height {
                dy += full_height;
            } else if dy > half_height {
                dy -= full_height;
            }
        }

        self.plot_count += 1;
        self.avg_x += dx / self.plot_count as i32;
        self.avg_y += dy / self.plot_count as i32;

        if self.avg_x < 0 {
            self.avg_x += full_width;
        } else if self.avg_x >= full_width {
            self.avg_x -= full_width;
        }
        if self.avg_y < 0 {
            self.avg_y += full_height;
        } else if self.avg_y >= full_height {
            self.avg_y -= full_height;
        }
    }

    pub fn neighbors(&self) -> &[ZoneId] {
        &self.neighbors
    }

    /// Record a neighbour; ignores self and duplicates
    pub fn add_neighbor(&mut self, other: ZoneId) {
        if other == self.id || self.neighbors.contains(&other) {
            return;
        }
        self.neighbors.push(other);
    }

    pub fn clear_neighbors(&mut self) {
        self.neighbors.clear();
    }

    /// Rewrite own id and neighbour ids after renumbering
    pub(crate) fn remap_ids(&mut self, map: impl Fn(ZoneId) -> ZoneId) {
        self.id = map(self.id);
        for n in &mut self.neighbors {
            *n = map(*n);
        }
    }

    pub fn overall_friendly_strength(&self) -> u64 {
        self.friendly_melee_strength
            .saturating_add(self.friendly_ranged_strength)
            .saturating_add(self.friendly_naval_strength)
            .saturating_add(self.friendly_naval_ranged_strength)
    }

    pub fn overall_enemy_strength(&self) -> u64 {
        self.enemy_melee_strength
            .saturating_add(self.enemy_ranged_strength)
            .saturating_add(self.enemy_naval_strength)
            .saturating_add(self.enemy_naval_ranged_strength)
    }

    pub fn total_friendly_unit_count(&self) -> u32 {
        self.friendly_unit_count + self.friendly_naval_unit_count
    }

    pub fn total_enemy_unit_count(&self) -> u32 {
        self.enemy_unit_count + self.enemy_naval_unit_count
    }

    /// Reset all aggregated strength before a new accumulation pass
    pub fn clear_strengths(&mut self) {
        self.friendly_melee_strength = 0;
        self.enemy_melee_strength = 0;
        self.friendly_ranged_strength = 0;
        self.enemy_ranged_strength = 0;
        self.friendly_naval_strength = 0;
        self.enemy_naval_strength = 0;
        self.friendly_naval_ranged_strength = 0;
        self.enemy_naval_ranged_strength = 0;
        self.friendly_unit_count = 0;
        self.enemy_unit_count = 0;
        self.neutral_unit_count = 0;
        self.neutral_strength = 0;
        self.enemy_naval_unit_count = 0;
        self.friendly_naval_unit_count = 0;
        self.closest_enemy_distance = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_id_sign_encodes_water() {
        assert!(ZoneId::signed(4, true).is_water());
        assert!(!ZoneId::signed(4, false).is_water());
        assert_eq!(ZoneId::for_settlement(SettlementId(0), true), Some(ZoneId(-1)));
        assert_eq!(ZoneId::for_settlement(SettlementId(0), false), Some(ZoneId(1)));
    }

    #[test]
    fn test_settlement_id_out_of_range() {
        let last = SettlementId(i32::MAX as u32 - 1);
        assert_eq!(ZoneId::for_settlement(last, true), Some(ZoneId(-i32::MAX)));
        assert_eq!(ZoneId::for_settlement(SettlementId(i32::MAX as u32), false), None);
        assert_eq!(ZoneId::for_settlement(SettlementId(u32::MAX), true), None);
    }

    #[test]
    fn test_neighbors_exclude_self_and_duplicates() {
        let mut zone = Zone::new(ZoneId(3), AreaId(1));
        zone.add_neighbor(ZoneId(3));
        zone.add_neighbor(ZoneId(5));
        zone.add_neighbor(ZoneId(-2));
        zone.add_neighbor(ZoneId(5));
        assert_eq!(zone.neighbors(), &[ZoneId(5), ZoneId(-2)]);
    }

    #[test]
    fn test_centroid_average() {
        let dims = MapDims::new(20, 20);
        let mut zone = Zone::new(ZoneId(1), AreaId(1));
        zone.extend(GridCoord::new(2, 4), &dims);
        zone.extend(GridCoord::new(4, 4), &dims);
        assert_eq!(zone.num_plots(), 2);
        assert_eq!(zone.centroid_milli(), (3000, 4000));
        assert_eq!(zone.center(), GridCoord::new(3, 4));
    }

    #[test]
    fn test_centroid_wraps_x() {
        let dims = MapDims::new(20, 10).with_wrap(true, false);
        let mut zone = Zone::new(ZoneId(1), AreaId(1));
        zone.extend(GridCoord::new(0, 5), &dims);
        zone.extend(GridCoord::new(19, 5), &dims);
        // half way between 19 and 20 (== 0), folded into the map
        assert_eq!(zone.centroid_milli(), (19500, 5000));
    }

    #[test]
    fn test_centroid_wraps_y_symmetrically() {
        let dims = MapDims::new(10, 20).with_wrap(false, true);
        let mut zone = Zone::new(ZoneId(1), AreaId(1));
        zone.extend(GridCoord::new(5, 19), &dims);
        zone.extend(GridCoord::new(5, 0), &dims);
        // 19 -> 20 is one step; midpoint 19.5 stays on the map
        assert_eq!(zone.centroid_milli(), (5000, 19500));

        let mut zone = Zone::new(ZoneId(1), AreaId(1));
        zone.extend(GridCoord::new(5, 0), &dims);
        zone.extend(GridCoord::new(5, 19), &dims);
        // 0 -> -1 is one step; -0.5 folds to 19.5
        assert_eq!(zone.centroid_milli(), (5000, 19500));
    }

    #[test]
    fn test_overall_totals() {
        let mut zone = Zone::new(ZoneId(1), AreaId(1));
        zone.friendly_melee_strength = 10;
        zone.friendly_ranged_strength = 5;
        zone.friendly_naval_strength = 3;
        zone.friendly_naval_ranged_strength = 2;
        zone.enemy_naval_ranged_strength = u64::MAX;
        zone.enemy_melee_strength = 1;
        zone.friendly_unit_count = 2;
        zone.friendly_naval_unit_count = 1;
        assert_eq!(zone.overall_friendly_strength(), 20);
        assert_eq!(zone.overall_enemy_strength(), u64::MAX);
        assert_eq!(zone.total_friendly_unit_count(), 3);
    }
}
