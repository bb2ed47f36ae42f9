//! `tv-core`: foundational types for the `threadviz` concurrency simulator.
//!
//! This crate is a dependency of every other `tv-*` crate.  It has no `tv-*`
//! dependencies and minimal external ones (`rand`, `glam`, `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `ThreadId`, `ResourceId`, `EventId`, `NodeRef`        |
//! | [`geo`]         | `Viewport`, `Placement`, circle helper                |
//! | [`time`]        | `Tick`, `SimClock`                                    |
//! | [`config`]      | `SimConfig`, `PatternKind`, `Probabilities`           |
//! | [`rng`]         | `SimRng` (the single seeded decision source)          |
//! | [`error`]       | `TvError`, `InvariantViolation`, `TvResult`           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public data types.   |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{PatternKind, Probabilities, SimConfig};
pub use error::{InvariantViolation, TvError, TvResult};
pub use geo::{Placement, Viewport, on_circle};
pub use ids::{EventId, NodeRef, ResourceId, ThreadId};
pub use rng::SimRng;
pub use time::{SimClock, Tick};

pub use glam::Vec2;
