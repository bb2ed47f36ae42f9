//! `tv-entity`: the simulated world for `threadviz`.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`thread`]     | `Thread`, `ThreadState`, `Role`                            |
//! | [`resource`]   | `Resource`, `ResourceKind`, `ResourceState`, `WaitQueue`   |
//! | [`event`]      | `SimulationEvent`, `EventKind`, bounded `EventLog`         |
//! | [`world`]      | `World` arena, `Placements`, invariant checking            |
//!
//! Threads and resources reference each other by id only; every id is an
//! index into the owning `World`'s arenas.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on all public types.     |

pub mod event;
pub mod resource;
pub mod thread;
pub mod world;


pub use event::{EventKind, EventLog, SimulationEvent};
pub use resource::{Resource, ResourceKind, ResourceState, WaitQueue};
pub use thread::{Role, Thread, ThreadState};
pub use world::{Placements, World};
