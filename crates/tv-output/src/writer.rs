//! The `EventWriter` trait implemented by all backend writers.

use crate::{EventRow, OutputResult, TickSummaryRow};

/// Trait implemented by output backends.
///
/// All methods are infallible from the observer's perspective: errors are
/// stored internally and retrieved with
/// [`EventLogObserver::take_error`][crate::EventLogObserver::take_error].
pub trait EventWriter {
    /// Write a batch of events, oldest first.
    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
