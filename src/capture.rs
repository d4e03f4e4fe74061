//! This module contains all the stimulus logic

// The source thread does one thing, as fast as possible: produce operand pairs
// and push them onto the `a` and `b` port rings. A copy of every pair goes to
// the scoreboard ring so the sink can check what comes out the other end.

use std::{
    fs,
    path::Path,
    sync::atomic::{AtomicBool, Ordering},
};

use byte_slice_cast::AsMutByteSlice;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info};

use crate::{
    axis::{AxisCplx, Operands},
    error::{Error, Result},
    stream::push_blocking,
    BEAT_SIZE, BEAT_WORDS, WORD_SIZE,
};

/// Anything that can feed operands to the unit
pub type Source = Box<dyn Iterator<Item = Operands> + Send>;

/// Seeded random operands, framed by `a.last` every `frame_len` beats.
///
/// `b.last` is drawn at random, since the unit must ignore it.
#[derive(Debug)]
pub struct Stimulus {
    rng: StdRng,
    frame_len: u64,
    beat: u64,
    /// `None` runs forever
    limit: Option<u64>,
}

impl Stimulus {
    /// `beats == 0` never ends
    pub fn new(seed: u64, frame_len: u64, beats: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            frame_len: frame_len.max(1),
            beat: 0,
            limit: (beats != 0).then_some(beats),
        }
    }
}

impl Iterator for Stimulus {
    type Item = Operands;

    fn next(&mut self) -> Option<Operands> {
        if self.limit.map_or(false, |n| self.beat >= n) {
            return None;
        }
        let last = self.beat % self.frame_len == self.frame_len - 1;
        self.beat += 1;
        Some(Operands {
            a: AxisCplx::new(self.rng.gen(), self.rng.gen(), last),
            b: AxisCplx::new(self.rng.gen(), self.rng.gen(), self.rng.gen()),
        })
    }
}

/// Load a recorded stimulus file (see [`crate::exfil::write_stimulus`])
pub fn read_stimulus(path: &Path) -> Result<Vec<Operands>> {
    let bytes = fs::read(path)?;
    if bytes.len() % BEAT_SIZE != 0 {
        return Err(Error::TruncatedStimulus { len: bytes.len() });
    }
    if bytes.is_empty() {
        return Err(Error::EmptyStimulus);
    }
    let mut words = vec![0u32; bytes.len() / WORD_SIZE];
    words.as_mut_byte_slice().copy_from_slice(&bytes);
    let beats: Vec<_> = words
        .chunks_exact(BEAT_WORDS)
        .map(|w| Operands::from_words(&[u32::from_le(w[0]), u32::from_le(w[1]), u32::from_le(w[2])]))
        .collect();
    info!(path = %path.display(), beats = beats.len(), "Loaded stimulus");
    Ok(beats)
}

/// Drive the ingress rings until the source runs dry or `stop` is raised.
/// Returns the number of beats pushed.
pub fn capture_stimulus(
    source: Source,
    a_port: &mut rtrb::Producer<AxisCplx>,
    b_port: &mut rtrb::Producer<AxisCplx>,
    expected: &mut rtrb::Producer<Operands>,
    stop: &AtomicBool,
) -> u64 {
    let mut beats = 0u64;
    for ops in source {
        if stop.load(Ordering::Acquire) {
            info!(beats, "Stop requested, closing ingress");
            break;
        }
        // Scoreboard first, so the sink never sees a result it can't check
        if !push_blocking(expected, ops, stop)
            || !push_blocking(a_port, ops.a, stop)
            || !push_blocking(b_port, ops.b, stop)
        {
            break;
        }
        beats += 1;
    }
    debug!(beats, "Source finished");
    beats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing() {
        let beats: Vec<_> = Stimulus::new(7, 4, 12).collect();
        assert_eq!(beats.len(), 12);
        let lasts: Vec<_> = beats.iter().map(|o| o.a.last).collect();
        assert_eq!(lasts.iter().filter(|l| **l).count(), 3);
        assert!(lasts[3] && lasts[7] && lasts[11]);
        assert!(!lasts[0] && !lasts[4]);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let x: Vec<_> = Stimulus::new(42, 8, 32).collect();
        let y: Vec<_> = Stimulus::new(42, 8, 32).collect();
        assert_eq!(x, y);
    }

    #[test]
    fn test_read_stimulus_words() {
        // Two beats laid out by hand: a, b, flags per beat, little-endian
        let words: [u32; 2 * BEAT_WORDS] = [0x0004_0003, 0x0002_0001, 0b01, 0xffff_8000, 0x0000_7fff, 0b10];
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        assert_eq!(bytes.len(), 2 * BEAT_WORDS * WORD_SIZE);
        let path = std::env::temp_dir().join(format!("addsub-{}-words.bin", std::process::id()));
        fs::write(&path, &bytes).unwrap();
        let beats = read_stimulus(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(
            beats,
            [
                Operands {
                    a: AxisCplx::new(3, 4, true),
                    b: AxisCplx::new(1, 2, false),
                },
                Operands {
                    a: AxisCplx::new(i16::MIN, -1, false),
                    b: AxisCplx::new(i16::MAX, 0, true),
                },
            ]
        );
    }

    #[test]
    fn test_unbounded() {
        assert_eq!(Stimulus::new(1, 16, 0).take(1000).count(), 1000);
    }
}
