//! World access - the data the tactical map reads but never owns
//!
//! Grid geometry, the [`WorldView`] query trait and a plain-data
//! [`WorldSnapshot`] implementation of it.

pub mod grid;
pub mod snapshot;
pub mod view;

pub use grid::{GridCoord, MapDims};
pub use snapshot::{Relation, WorldSnapshot};
pub use view::{
    Approach, CellInfo, FactionInfo, FactionKind, Opinion, SettlementInfo, UnitInfo, WarState,
    WorldView,
};
