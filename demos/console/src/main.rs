//! threadviz: headless driver for the concurrency-pattern simulator.
//!
//! Stands in for the interactive front end: runs one session with a tick
//! timer and a layout frame loop, optionally exporting the event log as CSV
//! and the final snapshot as JSON.
//!
//! ```text
//! threadviz --pattern dining --threads 5 --seed 7 --steps 200 \
//!           --output output/dining --snapshot output/dining/final.json
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, ensure};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use tv_core::{PatternKind, Probabilities, SimConfig, Tick};
use tv_entity::{SimulationEvent, ThreadState};
use tv_layout::LayoutEngine;
use tv_output::{CsvEventWriter, EventLogObserver};
use tv_sim::{SessionBuilder, SimObserver, TickReport};

// ── Arguments ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PatternArg {
    ProducerConsumer,
    Dining,
    ReaderWriter,
    Barrier,
    Barber,
    Smokers,
}

impl From<PatternArg> for PatternKind {
    fn from(p: PatternArg) -> Self {
        match p {
            PatternArg::ProducerConsumer => PatternKind::ProducerConsumer,
            PatternArg::Dining           => PatternKind::DiningPhilosophers,
            PatternArg::ReaderWriter     => PatternKind::ReaderWriter,
            PatternArg::Barrier          => PatternKind::Barrier,
            PatternArg::Barber           => PatternKind::SleepingBarber,
            PatternArg::Smokers          => PatternKind::CigaretteSmokers,
        }
    }
}

/// Run one concurrency-pattern simulation headlessly.
#[derive(Parser, Debug)]
#[command(name = "threadviz", version)]
struct Args {
    /// Pattern to simulate (overrides the config file)
    #[arg(long, value_enum)]
    pattern: Option<PatternArg>,

    /// JSON config file; missing fields take the pattern defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of threads
    #[arg(long)]
    threads: Option<usize>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Step budget
    #[arg(long)]
    steps: Option<u64>,

    /// Override probabilities as DEMAND,WORK,FINISH
    #[arg(long, value_parser = parse_probabilities)]
    probabilities: Option<Probabilities>,

    /// Layout frames run between two ticks
    #[arg(long, default_value_t = 4)]
    frames_per_tick: u32,

    /// Sleep for the tick interval between ticks
    #[arg(long)]
    realtime: bool,

    /// Print every event as it is appended
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Directory for events.csv and tick_summaries.csv
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write the final snapshot as JSON to this path
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_probabilities(s: &str) -> Result<Probabilities, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<Result<_, _>>()?;
    match parts[..] {
        [demand, work, finish] => Ok(Probabilities::new(demand, work, finish)),
        _ => Err(format!("expected DEMAND,WORK,FINISH, got {} values", parts.len())),
    }
}

fn init_log(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("failed to init logger: {e}");
    }
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            let mut raw: serde_json::Value = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("parsing {}", path.display()))?;
            // The pattern decides the defaults of every field the file leaves out.
            if let Some(p) = args.pattern {
                let fields = raw.as_object_mut().context("config file must hold a JSON object")?;
                fields.insert("pattern".into(), serde_json::to_value(PatternKind::from(p))?);
            }
            serde_json::from_value(raw).with_context(|| format!("reading {}", path.display()))?
        }
        None => SimConfig::new(args.pattern.map_or(PatternKind::ProducerConsumer, Into::into)),
    };

    if let Some(n) = args.threads {
        config.thread_count = n;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(steps) = args.steps {
        config.max_steps = Some(steps);
    }
    if let Some(p) = args.probabilities {
        config.probabilities = Some(p);
    }
    ensure!(
        config.max_steps.is_some() || config.max_duration_ms.is_some(),
        "an unbounded run never ends; pass --steps or set max_duration_ms",
    );
    Ok(config)
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Optional CSV export plus console echo and a blocked-thread high-water mark.
struct ConsoleObserver {
    export:       Option<EventLogObserver<CsvEventWriter>>,
    verbose:      bool,
    peak_blocked: usize,
    stop_reason:  Option<String>,
}

impl SimObserver for ConsoleObserver {
    fn on_tick_start(&mut self, tick: Tick) {
        if let Some(export) = &mut self.export {
            export.on_tick_start(tick);
        }
    }

    fn on_event(&mut self, event: &SimulationEvent) {
        if self.verbose {
            println!("{event}");
        }
        if let Some(export) = &mut self.export {
            export.on_event(event);
        }
    }

    fn on_tick_end(&mut self, report: &TickReport) {
        self.peak_blocked = self.peak_blocked.max(report.blocked);
        if let Some(export) = &mut self.export {
            export.on_tick_end(report);
        }
    }

    fn on_stop(&mut self, final_tick: Tick, reason: &str) {
        self.stop_reason = Some(reason.to_string());
        if let Some(export) = &mut self.export {
            export.on_stop(final_tick, reason);
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_log(&args.log_level);

    let config = load_config(&args)?;
    let tick_interval = Duration::from_millis(config.tick_interval_ms);
    let frame_secs = tick_interval.as_secs_f32() / args.frames_per_tick.max(1) as f32;

    println!("=== threadviz: {} ===", config.pattern);
    println!(
        "Threads: {}  |  Seed: {}  |  Step budget: {}",
        config.thread_count,
        config.seed,
        config.max_steps.map_or("none".to_string(), |n| n.to_string()),
    );
    println!();

    let layout = LayoutEngine::new(config.viewport);
    let mut session = SessionBuilder::from_config(config).build()?;

    let export = match &args.output {
        Some(dir) => Some(EventLogObserver::new(CsvEventWriter::new(dir)?)),
        None => None,
    };
    let mut obs = ConsoleObserver { export, verbose: args.verbose, peak_blocked: 0, stop_reason: None };

    let mark = session.events().total_appended();
    session.start()?;
    if args.verbose {
        session.events().since(mark).for_each(|e| println!("{e}"));
    }
    if let Some(export) = &mut obs.export {
        export.write_backlog(session.events().since(mark));
    }

    let t0 = Instant::now();
    while session.is_running() {
        session.run_ticks(1, &mut obs);
        let kind = session.kind();
        for _ in 0..args.frames_per_tick {
            let (threads, resources, placements) = session.layout_view();
            layout.frame(kind, threads, resources, placements, frame_secs);
        }
        if args.realtime {
            std::thread::sleep(tick_interval);
        }
    }
    let elapsed = t0.elapsed();
    tracing::info!(ticks = session.step_count(), elapsed_ms = elapsed.as_millis() as u64, "run finished");

    if let Some(export) = &mut obs.export {
        export.finish();
        if let Some(e) = export.take_error() {
            eprintln!("output error: {e}");
        }
    }

    // Summary.
    println!();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  ticks          : {}", session.step_count());
    println!("  events         : {}", session.events().total_appended());
    println!("  peak blocked   : {}", obs.peak_blocked);
    if let Some(reason) = &obs.stop_reason {
        println!("  stopped        : {reason}");
    }
    if let Some(dir) = &args.output {
        println!("  events.csv     : {}", dir.join("events.csv").display());
    }
    println!();

    let snapshot = session.snapshot();
    println!("{:<16} {:<12} {:<11} {:>5} {:>14}", "Thread", "Role", "Final", "Held", "Position");
    println!("{}", "-".repeat(62));
    for (t, p) in snapshot.threads.iter().zip(&snapshot.placements.threads) {
        let blocked_marker = if t.state == ThreadState::Blocked { "*" } else { "" };
        println!(
            "{:<16} {:<12} {:<11} {:>5} {:>6.0},{:>6.0}",
            t.name,
            format!("{:?}", t.role),
            format!("{}{blocked_marker}", t.state),
            t.held.len(),
            p.position.x,
            p.position.y,
        );
    }

    println!();
    println!("{:<16} {:<10} {:>6} {:>8} {:>8}", "Resource", "State", "Fill", "Holders", "Waiting");
    println!("{}", "-".repeat(52));
    for r in &snapshot.resources {
        println!(
            "{:<16} {:<10} {:>6} {:>8} {:>8}",
            r.name,
            r.state.to_string(),
            r.fill_label(),
            r.holders.len(),
            r.waiting.len(),
        );
    }

    if let Some(path) = &args.snapshot {
        write_snapshot(path, &snapshot)?;
        println!();
        println!("Snapshot written to {}", path.display());
    }
    Ok(())
}

fn write_snapshot(path: &Path, snapshot: &tv_sim::Snapshot) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), snapshot)?;
    Ok(())
}
