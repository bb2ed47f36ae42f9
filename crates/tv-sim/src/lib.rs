//! `tv-sim`: the step engine and session lifecycle for the `threadviz`
//! concurrency simulator.
//!
//! # Two cadences
//!
//! ```text
//! tick  (every tick_interval_ms):  Session::step
//!         ① state machine over threads in ascending ThreadId order
//!         ② invariant check (debug builds)
//!         ③ budgets: max_steps, all terminated, max_duration_ms
//! frame (every display frame):     layout over Session::layout_view
//! ```
//!
//! Both are driven by the caller; the session owns no timers and spawns no
//! threads.  Semantic state changes only inside `step` and the lifecycle
//! methods.
//!
//! # Cargo features
//!
//! | Feature | Effect                                                  |
//! |---------|---------------------------------------------------------|
//! | `serde` | `Snapshot` and `TickReport` become (de)serializable.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tv_core::PatternKind;
//! use tv_sim::{NoopObserver, SessionBuilder};
//!
//! let mut session = SessionBuilder::new(PatternKind::ProducerConsumer)
//!     .seed(42)
//!     .build()?;
//! session.start()?;
//! session.run_ticks(100, &mut NoopObserver);
//! println!("{} events", session.events().len());
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod session;
pub mod snapshot;

mod engine;


pub use builder::SessionBuilder;
pub use engine::TickReport;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use session::{Session, StepOutcome};
pub use snapshot::Snapshot;
