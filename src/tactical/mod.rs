//! Tactical analysis - per-faction dominance zones
//!
//! A [`TacticalAnalysisMap`] partitions the revealed map into zones,
//! aggregates the military strength around each one, judges who
//! dominates it and assigns a posture and a priority. The map is rebuilt
//! whole on every refresh.

pub mod adjacency;
pub mod builder;
pub mod dominance;
pub mod map;
pub mod posture;
pub mod priority;
pub mod report;
pub mod snapshot;
pub mod strength;
pub mod zone;

pub use builder::{territory_type, ZoneCandidate};
pub use dominance::ratio_dominance;
pub use map::{refresh_all, TacticalAnalysisMap};
pub use snapshot::MapSnapshot;
pub use strength::distance_weight;
pub use zone::{DominanceFlag, Posture, TerritoryType, Zone, ZoneId};
