//! `tv-output`: simulation export for the `threadviz` simulator.
//!
//! | Backend | Files created                          |
//! |---------|----------------------------------------|
//! | CSV     | `events.csv`, `tick_summaries.csv`     |
//!
//! Backends implement [`EventWriter`] and are driven by
//! [`EventLogObserver`], which implements `tv_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tv_output::{CsvEventWriter, EventLogObserver};
//!
//! let writer = CsvEventWriter::new(Path::new("./output"))?;
//! let mut obs = EventLogObserver::new(writer);
//! session.start()?;
//! obs.write_backlog(session.events().iter());
//! session.run_ticks(500, &mut obs);
//! obs.finish();
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvEventWriter;
pub use error::{OutputError, OutputResult};
pub use observer::EventLogObserver;
pub use row::{EventRow, TickSummaryRow};
pub use writer::EventWriter;
