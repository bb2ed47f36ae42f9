//! Session observer trait for progress reporting and event export.

use tv_core::Tick;
use tv_entity::SimulationEvent;

use crate::TickReport;

/// Callbacks invoked by [`Session::run_ticks`][crate::Session::run_ticks]
/// around every tick.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: blocked-thread printer
///
/// ```rust,ignore
/// struct BlockedPrinter;
///
/// impl SimObserver for BlockedPrinter {
///     fn on_tick_end(&mut self, report: &TickReport) {
///         if report.blocked > 0 {
///             println!("{}: {} threads blocked", report.tick, report.blocked);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called before the tick runs.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per event appended during the tick, in causal order,
    /// including events the log bound has already evicted.
    fn on_event(&mut self, _event: &SimulationEvent) {}

    /// Called after the tick, budget handling included.
    fn on_tick_end(&mut self, _report: &TickReport) {}

    /// Called once when the session stops during `run_ticks`.
    fn on_stop(&mut self, _final_tick: Tick, _reason: &str) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
