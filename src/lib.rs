//! Tactical map - per-faction dominance zones for a turn-based strategy AI

pub mod core;
pub mod tactical;
pub mod world;
