//! Testbench errors. The unit itself is total and never fails.

use std::io;

use thiserror::Error;

use crate::axis::Results;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("stimulus file is {len} bytes, not a whole number of 12-byte beats")]
    TruncatedStimulus { len: usize },

    #[error("stimulus file contains no beats")]
    EmptyStimulus,

    #[error("beat {beat}: expected {expected:?}, got {got:?}")]
    Mismatch {
        beat: u64,
        expected: Results,
        got: Results,
    },

    #[error("failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("stall probability {0} is outside [0, 1)")]
    InvalidStall(f64),

    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
}
