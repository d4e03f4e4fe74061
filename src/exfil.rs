//! This module is responsible for getting results out of the unit: checking them
//! against the golden model and dumping them to disk

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use byte_slice_cast::AsByteSlice;
use chrono::{DateTime, Datelike, Timelike, Utc};
use tracing::{debug, info};

use crate::{
    axis::{AxisCplx, Operands, Results},
    error::Result,
    monitoring::Summary,
    scoreboard::Scoreboard,
    stream::pop_blocking,
    BEAT_WORDS,
};

/// Magic value of `--output` that asks for a timestamped file name
pub const AUTO_OUTPUT: &str = "auto";

/// Convert a chrono DateTime into a file-name-friendly timestamp string
fn file_timestamp(time: &DateTime<Utc>) -> String {
    format!(
        "{}-{:02}-{:02}-{:02}:{:02}:{:02}",
        time.year(),
        time.month(),
        time.day(),
        time.hour(),
        time.minute(),
        time.second()
    )
}

pub fn timestamped_name(time: &DateTime<Utc>) -> PathBuf {
    PathBuf::from(format!("addsub-{}.bin", file_timestamp(time)))
}

/// Resolve the `--output` argument, expanding [`AUTO_OUTPUT`]
pub fn resolve_output(path: &Path) -> PathBuf {
    if path == Path::new(AUTO_OUTPUT) {
        timestamped_name(&Utc::now())
    } else {
        path.to_path_buf()
    }
}

fn write_words<W: Write>(out: &mut W, words: [u32; BEAT_WORDS]) -> Result<()> {
    out.write_all(words.map(u32::to_le).as_byte_slice())?;
    Ok(())
}

/// Streams result beats to a file as little-endian words
#[derive(Debug)]
pub struct BeatWriter {
    path: PathBuf,
    out: BufWriter<File>,
    beats: u64,
}

impl BeatWriter {
    pub fn create(path: PathBuf) -> Result<Self> {
        let out = BufWriter::new(File::create(&path)?);
        info!(path = %path.display(), "Writing results");
        Ok(Self { path, out, beats: 0 })
    }

    pub fn write(&mut self, results: &Results) -> Result<()> {
        write_words(&mut self.out, results.to_words())?;
        self.beats += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.out.flush()?;
        debug!(path = %self.path.display(), beats = self.beats, "Closed result file");
        Ok(())
    }
}

/// Record operands in the format [`crate::capture::read_stimulus`] reads back
pub fn write_stimulus(path: &Path, beats: &[Operands]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for ops in beats {
        write_words(&mut out, ops.to_words())?;
    }
    out.flush()?;
    Ok(())
}

/// Drain the egress rings through the scoreboard until the unit shuts down.
/// This doesn't need to be realtime; the rings give us cushion.
pub fn exfil_results(
    add_port: &mut rtrb::Consumer<AxisCplx>,
    sub_port: &mut rtrb::Consumer<AxisCplx>,
    expected: &mut rtrb::Consumer<Operands>,
    mut scoreboard: Scoreboard,
) -> Result<Summary> {
    loop {
        let (add, sub) = match (pop_blocking(add_port), pop_blocking(sub_port)) {
            (Some(add), Some(sub)) => (add, sub),
            _ => break,
        };
        // The source pushes the expectation before the operands, so this can't run dry first
        let ops = match pop_blocking(expected) {
            Some(ops) => ops,
            None => break,
        };
        scoreboard.check(ops, Results { add, sub })?;
    }
    scoreboard.finish()
}
