//! Golden-model checking of every beat that leaves the unit

use crossbeam_channel::Sender;
use tracing::{debug, warn};

use crate::{
    axis::{AxisCplx, Operands, Results},
    complex::ComplexShort,
    error::{Error, Result},
    exfil::BeatWriter,
    monitoring::{FrameReport, Summary},
};

// Past this many, mismatches only show up at debug level
const LOGGED_MISMATCHES: u64 = 16;

/// Reference results, computed on the raw `i16` fields without going through
/// the unit or the `Complex` operators it is built from
pub fn golden(ops: Operands) -> Results {
    let (a, b) = (ops.a.data, ops.b.data);
    let add = ComplexShort {
        re: i16::wrapping_add(a.re, b.re),
        im: i16::wrapping_add(a.im, b.im),
    };
    let sub = ComplexShort {
        re: i16::wrapping_sub(a.re, b.re),
        im: i16::wrapping_sub(a.im, b.im),
    };
    Results {
        add: AxisCplx {
            data: add,
            last: ops.a.last,
        },
        sub: AxisCplx {
            data: sub,
            last: ops.a.last,
        },
    }
}

#[derive(Debug, Default)]
pub struct Scoreboard {
    beat: u64,
    frame: FrameReport,
    totals: Summary,
    writer: Option<BeatWriter>,
    reports: Option<Sender<FrameReport>>,
    fail_fast: bool,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dump every observed result beat
    pub fn with_writer(mut self, writer: BeatWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Send a [`FrameReport`] at the end of every frame
    pub fn with_reports(mut self, reports: Sender<FrameReport>) -> Self {
        self.reports = Some(reports);
        self
    }

    /// Return [`Error::Mismatch`] on the first bad beat instead of counting it
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn totals(&self) -> Summary {
        self.totals
    }

    /// Check one observed result beat against the operands that produced it
    pub fn check(&mut self, ops: Operands, got: Results) -> Result<()> {
        let expected = golden(ops);
        if let Some(writer) = self.writer.as_mut() {
            writer.write(&got)?;
        }
        if ops.a.data.overflows_add(&ops.b.data) || ops.a.data.overflows_sub(&ops.b.data) {
            self.frame.wraps += 1;
        }
        if got != expected {
            self.frame.mismatches += 1;
            if self.fail_fast {
                return Err(Error::Mismatch {
                    beat: self.beat,
                    expected,
                    got,
                });
            }
            if self.totals.mismatches + self.frame.mismatches <= LOGGED_MISMATCHES {
                warn!(beat = self.beat, ?expected, ?got, "Mismatch");
            } else {
                debug!(beat = self.beat, ?expected, ?got, "Mismatch");
            }
        }
        self.beat += 1;
        self.frame.beats += 1;
        if ops.a.last {
            self.close_frame(true);
        }
        Ok(())
    }

    fn close_frame(&mut self, complete: bool) {
        let report = FrameReport {
            complete,
            ..self.frame
        };
        self.totals.absorb(&report);
        if let Some(reports) = &self.reports {
            // Monitoring is best-effort, we don't care if this errors
            let _ = reports.try_send(report);
        }
        self.frame = FrameReport {
            frame: report.frame + 1,
            ..Default::default()
        };
    }

    /// Flush any partial frame and the result file, returning the run totals
    pub fn finish(mut self) -> Result<Summary> {
        if self.frame.beats != 0 {
            self.close_frame(false);
        }
        if let Some(writer) = self.writer.take() {
            writer.finish()?;
        }
        Ok(self.totals)
    }
}
