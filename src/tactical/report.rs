//! Human-readable dump of a tactical map
//!
//! One line per revealed cell, a separator, then one line per zone that
//! has any friendly or enemy strength. Meant for eyeballing, not parsing.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::error::Result;
use crate::tactical::map::TacticalAnalysisMap;
use crate::tactical::zone::Zone;
use crate::world::view::WorldView;

/// Written in the zone id column for cells outside every zone
const NO_ZONE: i32 = 0;

/// File name for a faction's dump at a turn slice
pub fn report_file_name(faction: u32, turn_slice: i64) -> String {
    format!("DominanceZones_{faction}_{turn_slice:03}.txt")
}

impl TacticalAnalysisMap {
    /// Write the dump to any writer
    pub fn write_report<W: Write>(&self, world: &dyn WorldView, mut out: W) -> Result<()> {
        writeln!(out, "#x,y,terrain,owner,zoneid")?;

        let team = world.team_of(self.faction);
        for (index, zone_id) in self.cell_zone_ids.iter().enumerate() {
            if !team.is_some_and(|t| world.is_revealed(index, t)) {
                continue;
            }
            let Some(cell) = world.cell(index) else {
                continue;
            };
            writeln!(
                out,
                "{},{},{},{},{}",
                cell.coord.x,
                cell.coord.y,
                cell.terrain,
                cell.owner.map_or(-1, |f| f.0 as i64),
                zone_id.map_or(NO_ZONE, |id| id.0)
            )?;
        }

        writeln!(out, "#------------------")?;

        for zone in &self.zones {
            // don't blow up the dump with empty zones
            if zone.overall_friendly_strength() == 0 && zone.overall_enemy_strength() == 0 {
                continue;
            }
            writeln!(out, "{}", self.zone_line(world, zone))?;
        }

        out.flush()?;
        Ok(())
    }

    fn zone_line(&self, world: &dyn WorldView, zone: &Zone) -> String {
        let city = zone.settlement.and_then(|id| world.settlement(id));
        let domain = if zone.is_water() { "Water" } else { "Land" };

        let mut line = format!(
            "Zone ID: {}, {}, Size: {}, City: {}, Area ID: {}, Value: {}, \
             FRIENDLY Str: {} ({}), Ranged: {} (naval {}), \
             ENEMY Str: {} ({}), Ranged: {} (naval {}), Closest Enemy: {}, {}, {}",
            zone.id,
            domain,
            zone.num_plots(),
            city.map_or("none", |c| c.name.as_str()),
            zone.area.0,
            zone.value,
            zone.overall_friendly_strength(),
            zone.total_friendly_unit_count(),
            zone.friendly_ranged_strength,
            zone.friendly_naval_ranged_strength,
            zone.overall_enemy_strength(),
            zone.total_enemy_unit_count(),
            zone.enemy_ranged_strength,
            zone.enemy_naval_ranged_strength,
            zone.closest_enemy_distance.unwrap_or(-1),
            zone.dominance,
            domain,
        );

        if city.is_some_and(|c| world.is_in_focus_area(self.faction, c.cell)) {
            line.push_str(" (Focus)");
        }
        line
    }

    /// Write the dump into `dir`, named after the faction and turn slice
    pub fn dump_to_file(&self, world: &dyn WorldView, dir: &Path) -> Result<PathBuf> {
        let turn_slice = self.turn_slice_built.unwrap_or(world.turn_slice());
        let path = dir.join(report_file_name(self.faction.0, turn_slice));
        let file = File::create(&path)?;
        self.write_report(world, BufWriter::new(file))?;
        tracing::info!("Wrote dominance zone dump to {}", path.display());
        Ok(path)
    }
}
