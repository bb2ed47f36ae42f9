//! `tv-pattern`: the six concurrency patterns and the factory that builds them.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`model`]      | `Pattern` trait, `Attempt` outcome                         |
//! | [`context`]    | `StepContext<'a>`: mutable per-tick view of the world     |
//! | [`patterns`]   | `ProducerConsumer`, `DiningPhilosophers`, `ReaderWriter`, `Barrier`, `SleepingBarber`, `CigaretteSmokers` |
//! | [`factory`]    | config validation, `build` → `Blueprint`                   |
//!
//! # Design notes
//!
//! The thread state machine (RUNNING / WAITING / BLOCKED) is shared by every
//! pattern and lives in `tv-sim`.  A pattern only supplies the predicates
//! the machine consults, so adding a pattern never touches the engine.

pub mod context;
pub mod factory;
pub mod model;
pub mod patterns;

#[cfg(test)]
mod tests;

pub use context::StepContext;
pub use factory::{Blueprint, MAX_THREADS, build, validate};
pub use model::{Attempt, Pattern};
