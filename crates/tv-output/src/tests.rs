//! Integration tests for tv-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::CsvEventWriter;
    use crate::row::{EventRow, TickSummaryRow};
    use crate::writer::EventWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn event_row(event_id: u64, thread_id: Option<u32>) -> EventRow {
        EventRow {
            event_id,
            tick:        event_id / 2,
            kind:        "THREAD_BLOCKED",
            thread_id,
            resource_id: None,
            description: format!("event {event_id}, with a comma"),
        }
    }

    fn headers(dir: &TempDir, file: &str) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvEventWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("events.csv").exists());
        assert!(dir.path().join("tick_summaries.csv").exists());
    }

    #[test]
    fn csv_creates_missing_directory() {
        let dir = tmp();
        let nested = dir.path().join("runs").join("first");
        let _w = CsvEventWriter::new(&nested).unwrap();
        assert!(nested.join("events.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvEventWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(
            headers(&dir, "events.csv"),
            ["event_id", "tick", "kind", "thread_id", "resource_id", "description"]
        );
        assert_eq!(headers(&dir, "tick_summaries.csv"), ["tick", "events", "blocked_threads"]);
    }

    #[test]
    fn csv_event_rows() {
        let dir = tmp();
        let mut w = CsvEventWriter::new(dir.path()).unwrap();
        w.write_events(&[event_row(0, Some(3)), event_row(1, None)]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("events.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "THREAD_BLOCKED");
        assert_eq!(&rows[0][3], "3");
        assert_eq!(&rows[0][4], "");
        assert_eq!(&rows[0][5], "event 0, with a comma");
        assert_eq!(&rows[1][0], "1");
        assert_eq!(&rows[1][3], "");
    }

    #[test]
    fn csv_tick_summary_row() {
        let dir = tmp();
        let mut w = CsvEventWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow { tick: 7, events: 4, blocked_threads: 2 }).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "7");
        assert_eq!(&rows[0][1], "4");
        assert_eq!(&rows[0][2], "2");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvEventWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

#[cfg(test)]
mod observer_tests {
    use tempfile::TempDir;
    use tv_core::PatternKind;
    use tv_sim::SessionBuilder;

    use crate::{CsvEventWriter, EventLogObserver, EventWriter};

    fn count_rows(dir: &TempDir, file: &str) -> usize {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.records().map(|r| r.unwrap()).count()
    }

    #[test]
    fn integration_csv() {
        let mut session = SessionBuilder::new(PatternKind::DiningPhilosophers)
            .seed(5)
            .max_steps(20)
            .max_events(10_000)
            .build()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut obs = EventLogObserver::new(CsvEventWriter::new(dir.path()).unwrap());
        session.start().unwrap();
        obs.write_backlog(session.events().iter());
        let ran = session.run_ticks(50, &mut obs);
        obs.finish();
        assert!(obs.take_error().is_none(), "no write errors expected");

        assert_eq!(ran, 20);
        assert_eq!(count_rows(&dir, "events.csv") as u64, session.events().total_appended());
        assert_eq!(count_rows(&dir, "tick_summaries.csv"), 20);

        let mut rdr = csv::Reader::from_path(dir.path().join("events.csv")).unwrap();
        let last = rdr.records().map(|r| r.unwrap()).last().unwrap();
        assert_eq!(&last[2], "SIMULATION_STOPPED");
    }

    #[test]
    fn export_is_complete_with_a_small_log() {
        let mut session = SessionBuilder::new(PatternKind::DiningPhilosophers)
            .threads(32)
            .max_events(40)
            .max_steps(1)
            .build()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut obs = EventLogObserver::new(CsvEventWriter::new(dir.path()).unwrap());
        session.start().unwrap();
        obs.write_backlog(session.events().iter());
        session.run_ticks(1, &mut obs);
        assert!(obs.take_error().is_none());

        let total = session.events().total_appended();
        assert!(total > 40);
        assert_eq!(count_rows(&dir, "events.csv") as u64, total);
    }

    #[test]
    fn stop_finishes_the_writer() {
        let mut session = SessionBuilder::new(PatternKind::Barrier).seed(1).max_steps(3).build().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut obs = EventLogObserver::new(CsvEventWriter::new(dir.path()).unwrap());
        session.start().unwrap();
        session.run_ticks(10, &mut obs);

        // on_stop already flushed and finished; finishing again is harmless.
        let mut writer = obs.into_writer();
        writer.finish().unwrap();
        assert_eq!(count_rows(&dir, "tick_summaries.csv"), 3);
        assert!(count_rows(&dir, "events.csv") > 0);
    }
}
