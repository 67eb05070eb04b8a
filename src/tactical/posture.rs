//! Posture selection
//!
//! Two passes over the zones. The first looks at each zone on its own,
//! the second lets neighbouring zones override that choice once. There is
//! no iteration to a fixed point.

use crate::tactical::map::TacticalAnalysisMap;
use crate::tactical::zone::{DominanceFlag, Posture, TerritoryType, Zone};
use crate::world::view::WorldView;

impl Zone {
    /// Our forces are mostly ranged and the enemy brings a lot of melee
    pub fn in_danger_of_counterattack(&self) -> bool {
        let (enemy_melee, friendly_melee, friendly_ranged) = if self.is_water() {
            (
                self.enemy_naval_strength,
                self.friendly_naval_strength,
                self.friendly_naval_ranged_strength,
            )
        } else {
            (
                self.enemy_melee_strength,
                self.friendly_melee_strength,
                self.friendly_ranged_strength,
            )
        };
        let doubled = friendly_melee.saturating_mul(2);
        enemy_melee > doubled && friendly_ranged > doubled
    }

    /// Posture from the zone's own territory and dominance
    ///
    /// `city_in_danger` tells whether the zone's settlement may fall soon.
    pub fn select_posture_single_zone(
        &self,
        dominance_percent: i32,
        city_in_danger: bool,
    ) -> Posture {
        let overall = self.dominance;
        let ranged = self.domain_ranged_dominance(dominance_percent);
        let ranged_friendly = ranged == DominanceFlag::Friendly;

        match self.territory {
            TerritoryType::Enemy => {
                if overall == DominanceFlag::Enemy || self.in_danger_of_counterattack() {
                    // grab it while it's weak, else get out
                    if city_in_danger {
                        Posture::SurgicalCityStrike
                    } else {
                        Posture::Withdraw
                    }
                } else if overall == DominanceFlag::Even {
                    if self.enemy_melee_strength > self.friendly_melee_strength {
                        if ranged_friendly {
                            Posture::AttritFromRange
                        } else {
                            Posture::ExploitFlanks
                        }
                    } else if ranged_friendly {
                        Posture::Steamroll
                    } else {
                        Posture::ExploitFlanks
                    }
                } else if overall == DominanceFlag::Friendly {
                    Posture::Steamroll
                } else {
                    Posture::AttritFromRange
                }
            }
            TerritoryType::Neutral | TerritoryType::Unclaimed => {
                if overall == DominanceFlag::Enemy {
                    let outmatched = self.enemy_melee_strength > self.friendly_melee_strength;
                    match (outmatched, ranged_friendly) {
                        (true, true) => Posture::AttritFromRange,
                        (false, true) => Posture::ExploitFlanks,
                        (_, false) => Posture::Withdraw,
                    }
                } else if ranged_friendly {
                    Posture::AttritFromRange
                } else {
                    Posture::ExploitFlanks
                }
            }
            TerritoryType::Friendly => {
                if overall == DominanceFlag::Enemy {
                    Posture::Hedgehog
                } else {
                    Posture::Counterattack
                }
            }
        }
    }

    /// Override the single-zone posture from the neighbours
    ///
    /// Each neighbour comes with whether its settlement is in danger of
    /// falling. Returns the adjusted posture without changing the zone.
    pub fn select_posture_multi_zone<'a>(
        &self,
        neighbors: impl IntoIterator<Item = (&'a Zone, bool)>,
    ) -> Posture {
        let mut posture = self.posture;

        for (neighbor, neighbor_city_in_danger) in neighbors {
            // a strong land battery next to our fleet
            if self.is_water()
                && posture == Posture::Steamroll
                && !neighbor.is_water()
                && neighbor.dominance == DominanceFlag::Enemy
                && neighbor.enemy_ranged_strength > self.friendly_naval_ranged_strength
            {
                posture = Posture::ExploitFlanks;
            }

            // pull back to support a friendly zone under pressure
            if self.territory != TerritoryType::Friendly
                && self.is_water() == neighbor.is_water()
                && neighbor.territory == TerritoryType::Friendly
                && neighbor.dominance == DominanceFlag::Enemy
                && !neighbor_city_in_danger
            {
                posture = Posture::Withdraw;
            }
        }

        posture
    }
}

impl TacticalAnalysisMap {
    fn city_in_danger(world: &dyn WorldView, zone: &Zone) -> bool {
        zone.settlement
            .and_then(|id| world.settlement(id))
            .is_some_and(|s| s.in_danger_of_falling)
    }

    /// Assign a posture to every zone
    pub(crate) fn update_postures(&mut self, world: &dyn WorldView) {
        let percent = self.dominance_percent;

        for zone in &mut self.zones {
            let in_danger = Self::city_in_danger(world, zone);
            zone.posture = zone.select_posture_single_zone(percent, in_danger);
        }

        // the second pass only reads neighbour fields the first pass never writes
        let adjusted: Vec<Posture> = self
            .zones
            .iter()
            .map(|zone| {
                let neighbors = self
                    .neighbor_zones(zone)
                    .map(|n| (n, Self::city_in_danger(world, n)));
                zone.select_posture_multi_zone(neighbors)
            })
            .collect();

        for (zone, posture) in self.zones.iter_mut().zip(adjusted) {
            zone.posture = posture;
            tracing::trace!(
                "Zone {}, {}, {}, {}",
                zone.id,
                if zone.is_water() { "Water" } else { "Land" },
                zone.settlement
                    .and_then(|id| world.settlement(id))
                    .map_or("none", |s| s.name.as_str()),
                zone.posture
            );
        }
    }
}
