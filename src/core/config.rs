//! Tactical map configuration with documented constants
//!
//! All tunables of the dominance-zone analysis are collected here.
//! Values can be overridden from a TOML file; missing keys keep defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{Result, TacticalError};

/// Configuration for the tactical analysis map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticalMapConfig {
    // === CLASSIFICATION ===
    /// Percentage by which one side must exceed the other to dominate
    ///
    /// At 25, a friendly/enemy ratio above 125% is friendly dominance and
    /// below 75% is enemy dominance. Everything in between is even.
    pub dominance_percent: i32,

    /// Global multiplier applied to every unit contribution
    ///
    /// Kept at 1 so units and cities are on the same scale.
    pub unit_strength_multiplier: i32,

    // === RANGE ===
    /// Maximum cell distance at which a unit counts for a settlement zone
    ///
    /// Also the radius for pulling unclaimed and neutral cells into an
    /// existing zone while building.
    pub tactical_range: i32,

    /// When set, the tactical range is recomputed on every refresh as
    /// `(recruit_range + current_era) / 2`, so later eras look further.
    pub recruit_range: Option<i32>,

    /// Distance around the zone centre that still gets full weight
    pub distance_bias: i32,

    // === ZONE BUILDING ===
    /// Cells within this distance of a settlement belong to that settlement
    pub city_capture_radius: i32,

    /// Landmasses with fewer tiles adopt the nearby settlement's area id
    ///
    /// Prevents every tiny island next to a city from becoming its own zone.
    pub small_area_tiles: u32,

    // === BORDER SCORING ===
    /// Neighbour zones with fewer plots are ignored by border scoring
    pub border_min_zone_plots: u32,
}

impl Default for TacticalMapConfig {
    fn default() -> Self {
        Self {
            dominance_percent: 25,
            unit_strength_multiplier: 1,
            tactical_range: 6,
            recruit_range: None,
            distance_bias: 2,
            city_capture_radius: 2,
            small_area_tiles: 7,
            border_min_zone_plots: 7,
        }
    }
}

impl TacticalMapConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Tactical range for the given era
    pub fn tactical_range_for_era(&self, era: i32) -> i32 {
        match self.recruit_range {
            Some(recruit) => ((recruit + era) / 2).max(1),
            None => self.tactical_range,
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(0..=100).contains(&self.dominance_percent) {
            return Err(TacticalError::InvalidConfig(format!(
                "dominance_percent ({}) must be within 0..=100",
                self.dominance_percent
            )));
        }

        if self.tactical_range <= 0 {
            return Err(TacticalError::InvalidConfig(format!(
                "tactical_range ({}) must be positive",
                self.tactical_range
            )));
        }

        if self.unit_strength_multiplier <= 0 {
            return Err(TacticalError::InvalidConfig(format!(
                "unit_strength_multiplier ({}) must be positive",
                self.unit_strength_multiplier
            )));
        }

        if self.distance_bias < 0 || self.city_capture_radius < 0 {
            return Err(TacticalError::InvalidConfig(
                "distance_bias and city_capture_radius must not be negative".into(),
            ));
        }

        Ok(())
    }

    /// Parse and validate a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TacticalMapConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

/// Default location of the config file
pub fn default_config_path() -> PathBuf {
    PathBuf::from("data").join("tactical_map.toml")
}
