//! Strength aggregation - fold every combat unit and settlement into zones
//!
//! A settlement zone sees units within the tactical range of its
//! settlement, weighted by distance. Zones without a settlement only see
//! units standing inside them.

use crate::core::types::Domain;
use crate::tactical::map::TacticalAnalysisMap;
use crate::tactical::zone::TerritoryType;
use crate::world::view::{UnitInfo, WorldView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Allegiance {
    Enemy,
    Friendly,
    Neutral,
}

/// A combat unit with its per-refresh facts resolved once
struct Contender<'a> {
    unit: &'a UnitInfo,
    cell: usize,
    allegiance: Allegiance,
    visible: bool,
}

/// Weight of a unit at `distance` from the zone centre
///
/// Full weight up to `bias`, then decaying by one per cell, never below 1.
pub fn distance_weight(distance: i32, max_distance: i32, bias: i32) -> i32 {
    let effective = (distance - bias).max(0);
    (max_distance - effective).max(1)
}

impl TacticalAnalysisMap {
    /// Recompute every zone's strength pools and unit counts
    pub(crate) fn accumulate_strengths(&mut self, world: &dyn WorldView) {
        for zone in &mut self.zones {
            zone.clear_strengths();
        }

        let Some(our_team) = world.team_of(self.faction) else {
            return;
        };

        let contenders: Vec<Contender> = world
            .units()
            .iter()
            .filter(|unit| unit.is_combat)
            .filter_map(|unit| {
                let cell = unit.cell?;
                let team = world.team_of(unit.owner)?;
                let allegiance = if world.is_at_war(our_team, team) {
                    Allegiance::Enemy
                } else if team == our_team {
                    Allegiance::Friendly
                } else {
                    Allegiance::Neutral
                };
                // units we can't see still count, at reduced strength
                let visible =
                    world.is_visible(cell, our_team) || world.is_adjacent_visible(cell, our_team);
                Some(Contender {
                    unit,
                    cell,
                    allegiance,
                    visible,
                })
            })
            .collect();

        let max_distance = self.tactical_range;
        let bias = self.config.distance_bias;
        let unit_multiplier = self.unit_strength_multiplier.max(0) as u64;
        let cell_zone_ids = &self.cell_zone_ids;

        for zone in &mut self.zones {
            let city = zone.settlement.and_then(|id| world.settlement(id));

            if let Some(city) = city {
                let strength = city.effective_strength();
                match zone.territory {
                    TerritoryType::Friendly => zone.friendly_ranged_strength += strength,
                    TerritoryType::Enemy => zone.enemy_ranged_strength += strength,
                    _ => zone.neutral_strength += strength,
                }
            }

            for c in &contenders {
                let domain_match = c.unit.domain.matches_zone(zone.is_water());
                if !domain_match && !c.unit.is_ranged {
                    continue;
                }
                let reduced = c.unit.is_embarked || !c.visible || !domain_match;

                let distance = match city {
                    Some(city) => match world.plot_distance(c.cell, city.cell) {
                        Some(d) if d <= max_distance => d,
                        _ => continue,
                    },
                    None => {
                        if cell_zone_ids.get(c.cell).copied().flatten() != Some(zone.id) {
                            continue;
                        }
                        0
                    }
                };

                let weight = distance_weight(distance, max_distance, bias) as u64;
                let mut strength = u64::from(c.unit.attack_strength) * weight * unit_multiplier;
                let mut ranged = u64::from(c.unit.ranged_strength) * weight * unit_multiplier;
                if reduced {
                    strength /= 2;
                    ranged /= 2;
                }

                let naval = c.unit.domain == Domain::Sea;
                match c.allegiance {
                    Allegiance::Enemy => {
                        if naval {
                            zone.enemy_naval_strength += strength;
                            zone.enemy_naval_ranged_strength += ranged;
                            zone.enemy_naval_unit_count += 1;
                        } else {
                            zone.enemy_melee_strength += strength;
                            zone.enemy_ranged_strength += ranged;
                            zone.enemy_unit_count += 1;
                        }
                        if zone.closest_enemy_distance.map_or(true, |d| distance < d) {
                            zone.closest_enemy_distance = Some(distance);
                        }
                    }
                    Allegiance::Friendly => {
                        if naval {
                            zone.friendly_naval_strength += strength;
                            zone.friendly_naval_ranged_strength += ranged;
                            zone.friendly_naval_unit_count += 1;
                        } else {
                            zone.friendly_melee_strength += strength;
                            zone.friendly_ranged_strength += ranged;
                            zone.friendly_unit_count += 1;
                        }
                    }
                    // neutrals only get a headcount and a lump sum
                    Allegiance::Neutral => {
                        zone.neutral_strength += strength;
                        zone.neutral_unit_count += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TacticalMapConfig;
    use crate::core::types::{FactionId, SettlementId, TeamId};
    use crate::world::grid::MapDims;
    use crate::world::snapshot::WorldSnapshot;
    use crate::world::view::{FactionKind, SettlementInfo};

    fn unit(owner: u32, cell: usize, attack: u32) -> UnitInfo {
        UnitInfo {
            owner: FactionId(owner),
            cell: Some(cell),
            domain: Domain::Land,
            is_combat: true,
            is_ranged: false,
            is_embarked: false,
            attack_strength: attack,
            ranged_strength: 0,
        }
    }

    /// Our city at (5,5) on an open 20x10 map, at war with faction 1
    fn front_world() -> WorldSnapshot {
        let mut world = WorldSnapshot::new(MapDims::new(20, 10));
        world.add_faction(FactionId(0), TeamId(0), FactionKind::Major);
        world.add_faction(FactionId(1), TeamId(1), FactionKind::Major);
        world.add_faction(FactionId(2), TeamId(2), FactionKind::Major);
        world.declare_war(TeamId(0), TeamId(1));
        world.reveal_all(TeamId(0));
        world.set_all_visible(TeamId(0));
        let cell = world.index(5, 5);
        world.add_settlement(SettlementInfo {
            id: SettlementId(0),
            name: "Home".into(),
            owner: FactionId(0),
            cell,
            max_hit_points: 200,
            damage: 100,
            strength_value: 80,
            economic_value: 10,
            in_danger_of_falling: false,
        });
        world
    }

    fn refreshed(world: &WorldSnapshot) -> TacticalAnalysisMap {
        let mut map = TacticalAnalysisMap::new(FactionId(0), TacticalMapConfig::default());
        map.refresh(world, false);
        map
    }

    #[test]
    fn test_distance_weight() {
        assert_eq!(distance_weight(0, 6, 2), 6);
        assert_eq!(distance_weight(2, 6, 2), 6);
        assert_eq!(distance_weight(4, 6, 2), 4);
        assert_eq!(distance_weight(6, 6, 2), 2);
        assert_eq!(distance_weight(20, 6, 2), 1);
    }

    #[test]
    fn test_settlement_adds_ranged_by_hit_points() {
        let world = front_world();
        let map = refreshed(&world);
        let home = map.zone_by_settlement(SettlementId(0), false).unwrap();
        // half health, half strength
        assert_eq!(home.friendly_ranged_strength, 40);
        assert_eq!(home.enemy_ranged_strength, 0);
    }

    #[test]
    fn test_enemy_at_city_full_weight_far_enemy_excluded() {
        let mut world = front_world();
        let home_cell = world.index(5, 5);
        let far_cell = world.index(13, 5);
        world.add_unit(unit(1, home_cell, 10));
        world.add_unit(unit(1, far_cell, 10));

        let map = refreshed(&world);
        let home = map.zone_by_settlement(SettlementId(0), false).unwrap();
        assert_eq!(home.enemy_melee_strength, 60);
        assert_eq!(home.enemy_unit_count, 1);
        assert_eq!(home.closest_enemy_distance, Some(0));

        // the far unit still counts where it stands
        let wild = map.zone_by_cell(far_cell).unwrap();
        assert_eq!(wild.enemy_unit_count, 1);
        assert_eq!(wild.enemy_melee_strength, 60);
    }

    #[test]
    fn test_distance_decay_and_closest_enemy() {
        let mut world = front_world();
        let near = world.index(9, 5);
        world.add_unit(unit(1, near, 10));

        let map = refreshed(&world);
        let home = map.zone_by_settlement(SettlementId(0), false).unwrap();
        assert_eq!(home.enemy_melee_strength, 40);
        assert_eq!(home.closest_enemy_distance, Some(4));
    }

    #[test]
    fn test_embarked_unit_halved() {
        let mut world = front_world();
        let home_cell = world.index(5, 5);
        let mut embarked = unit(0, home_cell, 10);
        embarked.is_embarked = true;
        world.add_unit(embarked);

        let map = refreshed(&world);
        let home = map.zone_by_settlement(SettlementId(0), false).unwrap();
        assert_eq!(home.friendly_melee_strength, 30);
        assert_eq!(home.friendly_unit_count, 1);
    }

    #[test]
    fn test_invisible_unit_halved() {
        let mut world = WorldSnapshot::new(MapDims::new(20, 10));
        world.add_faction(FactionId(0), TeamId(0), FactionKind::Major);
        world.add_faction(FactionId(1), TeamId(1), FactionKind::Major);
        world.declare_war(TeamId(0), TeamId(1));
        world.reveal_all(TeamId(0));
        let cell = world.index(5, 5);
        world.add_unit(unit(1, cell, 10));

        let map = refreshed(&world);
        let zone = map.zone_by_cell(cell).unwrap();
        assert_eq!(zone.enemy_melee_strength, 30);
    }

    #[test]
    fn test_land_unit_skips_water_zone_ranged_does_not() {
        let mut world = front_world();
        let sea = world.index(6, 5);
        world.set_water(sea, true);
        world.recompute_areas();
        let home_cell = world.index(5, 5);
        world.add_unit(unit(1, home_cell, 10));
        let mut archer = unit(1, home_cell, 4);
        archer.is_ranged = true;
        archer.ranged_strength = 10;
        world.add_unit(archer);

        let map = refreshed(&world);
        let water = map.zone_by_settlement(SettlementId(0), true).unwrap();
        assert_eq!(water.enemy_unit_count, 1);
        // mismatched domain halves the archer
        assert_eq!(water.enemy_ranged_strength, 30);
        assert_eq!(water.enemy_melee_strength, 12);
    }

    #[test]
    fn test_neutral_and_non_combat_units() {
        let mut world = front_world();
        let home_cell = world.index(5, 5);
        world.add_unit(unit(2, home_cell, 10));
        let mut worker = unit(1, home_cell, 0);
        worker.is_combat = false;
        world.add_unit(worker);
        let mut lost = unit(1, home_cell, 10);
        lost.cell = None;
        world.add_unit(lost);

        let map = refreshed(&world);
        let home = map.zone_by_settlement(SettlementId(0), false).unwrap();
        assert_eq!(home.neutral_unit_count, 1);
        assert_eq!(home.neutral_strength, 60);
        assert_eq!(home.total_enemy_unit_count(), 0);
        assert_eq!(home.closest_enemy_distance, None);
    }
}
