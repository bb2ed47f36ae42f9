//! `tv-layout`: the per-frame layout engine.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                 |
//! |-------------|----------------------------------------------------------|
//! | [`params`]  | `LayoutParams`: every tunable constant                  |
//! | [`forces`]  | The individual passes, each a free function               |
//! | [`engine`]  | `LayoutEngine`: composes the passes for one frame        |
//!
//! # One frame
//!
//! ```text
//! ① approach    position → target, exponential smoothing, snap within ε
//! ② repulsion   every pair closer than min_distance pushed apart
//! ③ boundary    spring back into the padded viewport + weak center pull
//! ④ attraction  resources ↔ the threads holding or waiting on them,
//!               then the pattern's bespoke arrangement, if any
//! ⑤ settle      non-finite values reset, positions kept on the canvas
//! ```
//!
//! The engine reads `&[Thread]` and `&[Resource]` and writes only
//! [`Placements`][tv_entity::Placements], so it cannot touch semantic state.
//! Zero elapsed time leaves every placement unchanged.

pub mod engine;
pub mod forces;
pub mod params;


pub use engine::LayoutEngine;
pub use params::LayoutParams;
