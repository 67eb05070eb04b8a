//! Zone neighbourhood - which zones touch each other on the grid
//!
//! Rebuilt every refresh because zone ids are not stable between refreshes.

use crate::core::types::{Domain, FactionId, SettlementId};
use crate::tactical::map::TacticalAnalysisMap;
use crate::tactical::zone::{TerritoryType, Zone, ZoneId};
use crate::world::grid::{GridCoord, MapDims};
use crate::world::view::{Opinion, WorldView};

impl TacticalAnalysisMap {
    /// Record every pair of zones sharing a cell edge
    ///
    /// Each cell is compared with the next row and the next column only,
    /// which covers every undirected pair once. Two wilderness zones are
    /// never neighbours.
    pub(crate) fn build_neighbor_graph(&mut self, world: &dyn WorldView) {
        for zone in &mut self.zones {
            zone.clear_neighbors();
        }

        let dims = world.dims();
        for y in 0..dims.height {
            for x in 0..dims.width {
                let a = self.zone_at(&dims, GridCoord::new(x, y));
                let b = self.zone_at(&dims, GridCoord::new(x, y + 1));
                let c = self.zone_at(&dims, GridCoord::new(x + 1, y));

                if let (Some(a), Some(b)) = (a, b) {
                    self.link_zones(a, b);
                }
                if let (Some(a), Some(c)) = (a, c) {
                    self.link_zones(a, c);
                }
            }
        }
    }

    fn zone_at(&self, dims: &MapDims, coord: GridCoord) -> Option<ZoneId> {
        dims.index_of(coord)
            .and_then(|index| self.dominance_zone_id(index))
    }

    fn link_zones(&mut self, a: ZoneId, b: ZoneId) {
        if a == b {
            return;
        }
        let (Some(slot_a), Some(slot_b)) = (self.slot_of(a), self.slot_of(b)) else {
            return;
        };
        if self.zones[slot_a].territory == TerritoryType::Unclaimed
            && self.zones[slot_b].territory == TerritoryType::Unclaimed
        {
            return;
        }
        self.zones[slot_a].add_neighbor(b);
        self.zones[slot_b].add_neighbor(a);
    }

    /// Neighbour zones of a zone, skipping ids that no longer resolve
    pub fn neighbor_zones<'a>(&'a self, zone: &'a Zone) -> impl Iterator<Item = &'a Zone> + 'a {
        zone.neighbors()
            .iter()
            .filter_map(move |id| self.zone_by_id(*id))
    }

    /// Does any neighbour zone belong to the given faction?
    pub fn has_neighbor_zone(&self, zone: &Zone, owner: FactionId) -> bool {
        self.neighbor_zones(zone).any(|n| n.owner == Some(owner))
    }

    /// How threatening the zone's surroundings are
    ///
    /// Returns the summed score over all neighbours large enough to matter
    /// (optionally of one domain only) and the settlement of the worst one.
    pub fn border_score(
        &self,
        world: &dyn WorldView,
        zone: &Zone,
        domain: Option<Domain>,
    ) -> (i32, Option<SettlementId>) {
        let mut sum = 0;
        let mut worst_score = 0;
        let mut worst_settlement = None;

        let friendly_units = zone.total_friendly_unit_count().max(1) as i32;

        for neighbor in self.neighbor_zones(zone) {
            if neighbor.num_plots() < self.config.border_min_zone_plots {
                continue;
            }
            if let Some(domain) = domain {
                let neighbor_domain = if neighbor.is_water() {
                    Domain::Sea
                } else {
                    Domain::Land
                };
                if neighbor_domain != domain {
                    continue;
                }
            }

            let mut score = 0;
            match neighbor.territory {
                TerritoryType::Enemy => score += 8,
                TerritoryType::Neutral => {
                    score += 2;
                    if let Some(other) = neighbor.owner.filter(|o| world.is_major(*o)) {
                        if world.visible_approach(other, self.faction).is_guarded_or_worse() {
                            score += 1;
                        }
                        if world.approach(self.faction, other).is_guarded_or_worse() {
                            score += 1;
                        }
                        if world.opinion(self.faction, other) == Opinion::Enemy {
                            score += 1;
                        }
                    }
                }
                TerritoryType::Unclaimed => score += 1,
                TerritoryType::Friendly => {}
            }

            // relative strength
            score += (neighbor.total_enemy_unit_count() + neighbor.neutral_unit_count) as i32
                / friendly_units;

            if score > worst_score {
                worst_score = score;
                worst_settlement = neighbor.settlement;
            }
            sum += score;
        }

        (sum, worst_settlement)
    }
}
