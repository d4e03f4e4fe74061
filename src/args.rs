//! Argument parsing for running from the command line

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// How the unit is driven
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// One thread per stage, every port a lock-free ring
    Threaded,
    /// Single-threaded, cycle by cycle, with injected stalls
    Cycle,
}

#[derive(Parser, Debug)]
#[clap(author, version, about = "Drive and check the complex add/subtract unit", long_about = None)]
pub struct Args {
    /// Number of beats to generate (0 runs until Ctrl-C). Not allowed with --input
    #[clap(short = 'n', long, default_value_t = 1 << 20, conflicts_with = "input")]
    pub beats: u64,
    /// Beats per frame; `a.last` marks the final beat of each. Not allowed with --input,
    /// where the recorded `a.last` bits frame the run
    #[clap(short, long, default_value_t = 256, conflicts_with = "input")]
    #[clap(value_parser = clap::value_parser!(u64).range(1..))]
    pub frame_len: u64,
    /// Ring buffer capacity per port (threaded backend)
    #[clap(short, long, default_value_t = 256, value_parser = nonzero)]
    pub capacity: usize,
    /// RNG seed for stimulus and stall injection (random if unset)
    #[clap(short, long)]
    pub seed: Option<u64>,
    /// Replay a recorded stimulus file instead of generating one
    #[clap(short, long)]
    pub input: Option<PathBuf>,
    /// Write observed results to this file ("auto" picks a timestamped name)
    #[clap(short, long)]
    pub output: Option<PathBuf>,
    #[clap(short, long, value_enum, default_value = "threaded")]
    pub backend: Backend,
    /// Probability a handshake wire is held low in any cycle (cycle backend)
    #[clap(long, default_value_t = 0.0, value_parser = probability)]
    pub stall: f64,
    /// Frames between progress reports
    #[clap(long, default_value_t = 64)]
    pub report_every: u64,
    /// Stop at the first mismatching beat
    #[clap(long)]
    pub fail_fast: bool,
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,
}

/// Match verbosity filter with tracing subscriber log levels
pub fn convert_filter(filter: log::LevelFilter) -> tracing_subscriber::filter::LevelFilter {
    match filter {
        log::LevelFilter::Off => tracing_subscriber::filter::LevelFilter::OFF,
        log::LevelFilter::Error => tracing_subscriber::filter::LevelFilter::ERROR,
        log::LevelFilter::Warn => tracing_subscriber::filter::LevelFilter::WARN,
        log::LevelFilter::Info => tracing_subscriber::filter::LevelFilter::INFO,
        log::LevelFilter::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
        log::LevelFilter::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
    }
}

fn nonzero(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn probability(s: &str) -> Result<f64, String> {
    let p: f64 = s.parse().map_err(|_| "Invalid probability".to_string())?;
    if (0.0..1.0).contains(&p) {
        Ok(p)
    } else {
        Err("must be in [0, 1)".to_string())
    }
}
