//! In this module, we implement all the monitoring logic for a testbench run.
//! The scoreboard emits one report per frame; a monitor thread folds them into
//! running totals and logs progress every so often.

use std::time::Instant;

use crossbeam_channel::Receiver;
use tracing::{info, warn};

/// Depth of the report channel. Reports are dropped (not blocked on) when it's full.
pub const REPORT_DEPTH: usize = 1024;

/// Per-frame outcome from the scoreboard
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    pub beats: u64,
    pub mismatches: u64,
    /// Beats where at least one component of `add` or `sub` wrapped
    pub wraps: u64,
    /// False for the trailing frame of a run that ended before `a.last`
    pub complete: bool,
}

/// Totals for a run
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Summary {
    pub beats: u64,
    /// Completed frames, i.e. beats with `a.last` set
    pub frames: u64,
    pub mismatches: u64,
    pub wraps: u64,
}

impl Summary {
    pub fn absorb(&mut self, report: &FrameReport) {
        self.beats += report.beats;
        self.mismatches += report.mismatches;
        self.wraps += report.wraps;
        if report.complete {
            self.frames += 1;
        }
    }

    pub fn passed(&self) -> bool {
        self.mismatches == 0
    }

    pub fn log(&self) {
        if self.passed() {
            info!(
                beats = self.beats,
                frames = self.frames,
                wraps = self.wraps,
                "All beats matched"
            );
        } else {
            warn!(
                beats = self.beats,
                frames = self.frames,
                mismatches = self.mismatches,
                "Run FAILED"
            );
        }
    }
}

/// Consume frame reports until every sender is gone, logging every `report_every` frames
pub fn monitor(receiver: Receiver<FrameReport>, report_every: u64) -> Summary {
    let start = Instant::now();
    let mut seen = Summary::default();
    let report_every = report_every.max(1);
    for report in receiver {
        seen.absorb(&report);
        if report.mismatches != 0 {
            warn!(frame = report.frame, mismatches = report.mismatches, "Frame had mismatches");
        }
        if report.complete && seen.frames % report_every == 0 {
            let rate = seen.beats as f64 / start.elapsed().as_secs_f64();
            info!(
                frames = seen.frames,
                beats = seen.beats,
                "{:.3} Mbeat/s",
                rate / 1e6
            );
        }
    }
    seen
}
