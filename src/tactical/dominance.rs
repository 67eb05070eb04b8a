//! Dominance classification
//!
//! Every verdict - overall, ranged, naval ranged and unit count - comes
//! from the same friendly/enemy ratio test against a percentage threshold.

use crate::tactical::zone::{DominanceFlag, Zone};

/// Rounded percentage of friendly over enemy, computed in floating point
///
/// The denominator is floored at 1 so an absent enemy never divides by zero.
pub fn ratio_percent(friendly: u64, enemy: u64) -> i64 {
    (0.5 + 100.0 * (friendly as f64 / enemy.max(1) as f64)) as i64
}

/// Threshold test on a precomputed ratio
pub fn dominance_from_ratio(ratio: i64, dominance_percent: i32) -> DominanceFlag {
    let percent = i64::from(dominance_percent);
    if ratio > 100 + percent {
        DominanceFlag::Friendly
    } else if ratio < 100 - percent {
        DominanceFlag::Enemy
    } else {
        DominanceFlag::Even
    }
}

/// Shared ratio verdict: friendly when the enemy has nothing, else the
/// threshold test on the rounded ratio
pub fn ratio_dominance(friendly: u64, enemy: u64, dominance_percent: i32) -> DominanceFlag {
    if enemy == 0 && friendly > 0 {
        return DominanceFlag::Friendly;
    }
    dominance_from_ratio(ratio_percent(friendly, enemy), dominance_percent)
}

impl Zone {
    /// Overall verdict from all strength pools
    pub fn classify(&self, dominance_percent: i32) -> DominanceFlag {
        let friendly = self.overall_friendly_strength();
        let enemy = self.overall_enemy_strength();

        if friendly.saturating_add(enemy) == 0 {
            return DominanceFlag::NoUnitsVisible;
        }
        if enemy == 0 && self.total_friendly_unit_count() > 0 {
            return DominanceFlag::Friendly;
        }
        // one unit either way could tip it
        if self.total_enemy_unit_count() == 1 && self.total_friendly_unit_count() <= 1 {
            return DominanceFlag::Even;
        }
        dominance_from_ratio(ratio_percent(friendly, enemy), dominance_percent)
    }

    pub fn ranged_dominance(&self, dominance_percent: i32) -> DominanceFlag {
        ratio_dominance(
            self.friendly_ranged_strength,
            self.enemy_ranged_strength,
            dominance_percent,
        )
    }

    pub fn naval_ranged_dominance(&self, dominance_percent: i32) -> DominanceFlag {
        ratio_dominance(
            self.friendly_naval_ranged_strength,
            self.enemy_naval_ranged_strength,
            dominance_percent,
        )
    }

    /// Ranged verdict for the zone's own domain
    pub fn domain_ranged_dominance(&self, dominance_percent: i32) -> DominanceFlag {
        if self.is_water() {
            self.naval_ranged_dominance(dominance_percent)
        } else {
            self.ranged_dominance(dominance_percent)
        }
    }

    pub fn unit_count_dominance(&self, dominance_percent: i32) -> DominanceFlag {
        ratio_dominance(
            u64::from(self.total_friendly_unit_count()),
            u64::from(self.total_enemy_unit_count()),
            dominance_percent,
        )
    }

    pub fn naval_unit_count_dominance(&self, dominance_percent: i32) -> DominanceFlag {
        ratio_dominance(
            u64::from(self.friendly_naval_unit_count),
            u64::from(self.enemy_naval_unit_count),
            dominance_percent,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AreaId;
    use crate::tactical::zone::ZoneId;

    fn zone_with(friendly: u64, enemy: u64, friendly_units: u32, enemy_units: u32) -> Zone {
        let mut zone = Zone::new(ZoneId(1), AreaId(1));
        zone.friendly_melee_strength = friendly;
        zone.enemy_melee_strength = enemy;
        zone.friendly_unit_count = friendly_units;
        zone.enemy_unit_count = enemy_units;
        zone
    }

    #[test]
    fn test_ratio_boundary() {
        assert_eq!(zone_with(125, 100, 2, 2).classify(25), DominanceFlag::Even);
        assert_eq!(zone_with(126, 100, 2, 2).classify(25), DominanceFlag::Friendly);
        assert_eq!(zone_with(75, 100, 2, 2).classify(25), DominanceFlag::Even);
        assert_eq!(zone_with(74, 100, 2, 2).classify(25), DominanceFlag::Enemy);
    }

    #[test]
    fn test_no_units_visible() {
        assert_eq!(zone_with(0, 0, 0, 0).classify(25), DominanceFlag::NoUnitsVisible);
        // units present but contributing nothing still count as nothing seen
        assert_eq!(zone_with(0, 0, 3, 3).classify(25), DominanceFlag::NoUnitsVisible);
    }

    #[test]
    fn test_zero_enemy_shortcut() {
        assert_eq!(zone_with(1, 0, 1, 0).classify(25), DominanceFlag::Friendly);
        assert_eq!(zone_with(1_000_000, 0, 1, 0).classify(90), DominanceFlag::Friendly);
    }

    #[test]
    fn test_weak_units_are_even() {
        assert_eq!(zone_with(1, 500, 1, 1).classify(25), DominanceFlag::Even);
        assert_eq!(zone_with(500, 1, 0, 1).classify(25), DominanceFlag::Even);
        assert_eq!(zone_with(500, 1, 2, 1).classify(25), DominanceFlag::Friendly);
    }

    #[test]
    fn test_huge_strengths_do_not_overflow() {
        let zone = zone_with(u64::MAX / 2, u64::MAX / 4, 5, 5);
        assert_eq!(zone.classify(25), DominanceFlag::Friendly);
        // float to int casts saturate
        assert_eq!(ratio_percent(u64::MAX, 1), i64::MAX);
    }

    #[test]
    fn test_sub_flags() {
        let mut zone = Zone::new(ZoneId(-2), AreaId(3));
        zone.friendly_ranged_strength = 10;
        zone.enemy_ranged_strength = 40;
        zone.friendly_naval_ranged_strength = 40;
        zone.enemy_naval_ranged_strength = 0;
        zone.friendly_naval_unit_count = 3;
        zone.enemy_naval_unit_count = 2;

        assert_eq!(zone.ranged_dominance(25), DominanceFlag::Enemy);
        assert_eq!(zone.naval_ranged_dominance(25), DominanceFlag::Friendly);
        assert_eq!(zone.domain_ranged_dominance(25), DominanceFlag::Friendly);
        // 150% of the enemy count
        assert_eq!(zone.unit_count_dominance(25), DominanceFlag::Friendly);
        assert_eq!(zone.naval_unit_count_dominance(60), DominanceFlag::Even);
    }

    #[test]
    fn test_ratio_dominance_with_nothing_either_side() {
        assert_eq!(ratio_dominance(0, 0, 25), DominanceFlag::Enemy);
        assert_eq!(ratio_dominance(0, 0, 100), DominanceFlag::Even);
    }
}
