use std::{
    process,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use addsub::{
    args::{convert_filter, Args, Backend},
    capture::{read_stimulus, Source, Stimulus},
    exfil::{resolve_output, BeatWriter},
    monitoring::{monitor, REPORT_DEPTH},
    scoreboard::Scoreboard,
    sim::run_cycle,
    stream::run_threaded,
    Error,
};
use clap::Parser;
use crossbeam_channel::bounded;
use tracing::{error, info};

fn main() -> Result<(), Error> {
    // Get the CLI options
    let args = Args::parse();
    // Set the log level
    tracing_subscriber::fmt()
        .with_max_level(convert_filter(args.verbose.log_level_filter()))
        .init();

    // Ctrl-C stops the source, everything downstream drains
    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || handler_stop.store(true, Ordering::Release))?;

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, backend = ?args.backend, "Starting addsub testbench");

    // Setup the stimulus
    let source: Source = match &args.input {
        Some(path) => Box::new(read_stimulus(path)?.into_iter()),
        None => Box::new(Stimulus::new(seed, args.frame_len, args.beats)),
    };

    // Setup the checker and its monitor
    let (report_tx, report_rx) = bounded(REPORT_DEPTH);
    let report_every = args.report_every;
    let monitor_handle = thread::Builder::new()
        .name("monitor".into())
        .spawn(move || monitor(report_rx, report_every))?;
    let mut scoreboard = Scoreboard::new()
        .with_reports(report_tx)
        .fail_fast(args.fail_fast);
    if let Some(path) = &args.output {
        scoreboard = scoreboard.with_writer(BeatWriter::create(resolve_output(path))?);
    }

    // Run
    let summary = match args.backend {
        Backend::Threaded => run_threaded(source, args.capacity, scoreboard, stop)?,
        Backend::Cycle => {
            let (summary, stats) = run_cycle(source, scoreboard, args.stall, seed, &stop)?;
            info!(
                cycles = stats.cycles,
                input_stalls = stats.input_stalls,
                min_latency = stats.min_latency,
                max_latency = stats.max_latency,
                "Cycle timing"
            );
            summary
        }
    };
    monitor_handle
        .join()
        .map_err(|_| Error::ThreadPanicked("monitor"))?;

    summary.log();
    if !summary.passed() {
        error!(mismatches = summary.mismatches, "Unit output did not match the golden model");
        process::exit(1);
    }
    Ok(())
}
