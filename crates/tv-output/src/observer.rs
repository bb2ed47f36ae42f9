//! `EventLogObserver<W>`: bridges `SimObserver` to an `EventWriter`.

use tv_core::Tick;
use tv_entity::SimulationEvent;
use tv_sim::{SimObserver, TickReport};

use crate::row::{EventRow, TickSummaryRow};
use crate::writer::EventWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes every event and one summary row per tick
/// to any [`EventWriter`] backend.
///
/// Events are buffered for the duration of a tick and written as one batch
/// when it ends.  Errors from the writer are stored internally because
/// `SimObserver` methods have no return value; check them with
/// [`take_error`][Self::take_error] once the run is over.
pub struct EventLogObserver<W: EventWriter> {
    writer:     W,
    pending:    Vec<EventRow>,
    last_error: Option<OutputError>,
}

impl<W: EventWriter> EventLogObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, pending: Vec::new(), last_error: None }
    }

    /// Write events appended outside `run_ticks`, e.g. those emitted by
    /// `Session::start` or an explicit `stop`.
    pub fn write_backlog<'a>(&mut self, events: impl IntoIterator<Item = &'a SimulationEvent>) {
        let rows: Vec<EventRow> = events.into_iter().map(EventRow::from).collect();
        if !rows.is_empty() {
            let result = self.writer.write_events(&rows);
            self.store_err(result);
        }
    }

    /// Flush anything pending and close the writer.  Idempotent.
    pub fn finish(&mut self) {
        self.flush_pending();
        let result = self.writer.finish();
        self.store_err(result);
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let rows = std::mem::take(&mut self.pending);
        let result = self.writer.write_events(&rows);
        self.store_err(result);
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: EventWriter> SimObserver for EventLogObserver<W> {
    fn on_event(&mut self, event: &SimulationEvent) {
        self.pending.push(EventRow::from(event));
    }

    fn on_tick_end(&mut self, report: &TickReport) {
        self.flush_pending();
        let result = self.writer.write_tick_summary(&TickSummaryRow::from(report));
        self.store_err(result);
    }

    fn on_stop(&mut self, _final_tick: Tick, _reason: &str) {
        self.finish();
    }
}
