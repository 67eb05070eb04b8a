//! Zone priority - which zones the tactical layer should look at first
//!
//! The score is a base value from the zone's settlement times a
//! multiplier from the fighting situation. Zones are then stable-sorted
//! by descending score.

use crate::core::types::FactionId;
use crate::tactical::map::TacticalAnalysisMap;
use crate::tactical::zone::{DominanceFlag, TerritoryType, Zone};
use crate::world::view::{WarState, WorldView};

/// Damage above this fraction of max hit points makes a city juicier
const MAX_DAMAGE_DIVISOR: u32 = 10;

/// Highest economic value among the zones' settlements, floored at 1
pub fn most_valuable_settlement(world: &dyn WorldView, zones: &[Zone]) -> i32 {
    zones
        .iter()
        .filter_map(|z| z.settlement.and_then(|id| world.settlement(id)))
        .map(|s| s.economic_value)
        .fold(1, i32::max)
}

/// Is this minor faction protected by someone we are fighting?
fn allied_with_our_enemy(world: &dyn WorldView, minor: FactionId, us: FactionId) -> bool {
    let (Some(ally), Some(our_team)) = (
        world.faction(minor).and_then(|f| f.ally),
        world.team_of(us),
    ) else {
        return false;
    };
    world
        .team_of(ally)
        .is_some_and(|ally_team| world.is_at_war(our_team, ally_team))
}

impl TacticalAnalysisMap {
    /// Settlement-derived value of a zone, before the fighting multiplier
    fn base_value(&self, world: &dyn WorldView, zone: &Zone, most_valuable: i32) -> i64 {
        let mut base: i64 = 1;

        let city = zone
            .settlement
            .and_then(|id| world.settlement(id))
            .filter(|s| world.is_adjacent_to_area(s.id, zone.area));

        if let Some(city) = city {
            let share =
                100.0 * f64::from(city.economic_value.max(0)) / f64::from(most_valuable.max(1));
            base += share.sqrt() as i64;

            if world.is_in_focus_area(self.faction, city.cell) {
                base *= 3;
            }

            let visible = world
                .team_of(self.faction)
                .is_some_and(|team| world.is_settlement_visible(city.id, team));
            if visible {
                base *= 2;

                let badly_damaged = city.damage > city.max_hit_points / MAX_DAMAGE_DIVISOR;
                if city.max_hit_points > 0 && badly_damaged {
                    base *= i64::from((city.damage + 1) * 10 / city.max_hit_points);
                }
            }

            if world.is_operation_target(self.faction, city.id) {
                base *= 2;
            }

            // protected by someone we fight: not worth the trouble
            if world.is_minor(city.owner) && allied_with_our_enemy(world, city.owner, self.faction)
            {
                base = 1;
            }
        }

        if !zone.is_water() {
            base *= 3;
        }

        base
    }

    /// Multiplier from the zone's dominance, territory and our war state
    fn situation_multiplier(&self, world: &dyn WorldView, zone: &Zone) -> i64 {
        let mut multiplier = match (zone.dominance, zone.territory) {
            (DominanceFlag::Enemy, TerritoryType::Friendly) => 8,
            (DominanceFlag::Friendly, TerritoryType::Enemy) => 8,
            // make sure there's an actual fight going on
            (DominanceFlag::Even, TerritoryType::Enemy | TerritoryType::Friendly)
                if zone.total_enemy_unit_count() > 1 =>
            {
                4
            }
            _ => 1,
        };

        if !world.is_minor(self.faction) {
            match (world.war_state(self.faction), zone.territory) {
                (WarState::Winning, TerritoryType::Enemy) => multiplier *= 4,
                (WarState::Losing, TerritoryType::Friendly) => multiplier *= 4,
                _ => {}
            }
        }

        multiplier
    }

    /// Priority score of one zone from its current dominance verdict
    pub fn compute_priority(
        &self,
        world: &dyn WorldView,
        zone: &Zone,
        most_valuable: i32,
    ) -> i64 {
        self.base_value(world, zone, most_valuable) * self.situation_multiplier(world, zone)
    }

    /// Score every zone and sort the zone list, highest score first
    ///
    /// Zones with equal scores keep their relative order.
    pub(crate) fn prioritize_zones(&mut self, world: &dyn WorldView) {
        self.classify_all_zones();

        let most_valuable = most_valuable_settlement(world, &self.zones);
        let values: Vec<i64> = self
            .zones
            .iter()
            .map(|zone| self.compute_priority(world, zone, most_valuable))
            .collect();
        for (zone, value) in self.zones.iter_mut().zip(values) {
            zone.value = value;
        }

        self.zones.sort_by(|a, b| b.value.cmp(&a.value));
        self.rebuild_lookup();
    }
}
