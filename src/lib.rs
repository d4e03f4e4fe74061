pub mod addsub;
pub mod args;
pub mod axis;
pub mod capture;
pub mod complex;
pub mod error;
pub mod exfil;
pub mod monitoring;
pub mod scoreboard;
pub mod sim;
pub mod stream;

pub use addsub::{addsub, evaluate, AddSubUnit, PortsIn, PortsOut};
pub use axis::{AxisCplx, Operands, Results};
pub use complex::{Complex, ComplexShort};
pub use error::{Error, Result};

/// Bits per complex component
pub const DATA_WIDTH: u32 = 16;
/// Bytes in one packed TDATA word
pub const WORD_SIZE: usize = 4;
/// Words per beat in stimulus and result files (two TDATA words, one flag word)
pub const BEAT_WORDS: usize = 3;
pub const BEAT_SIZE: usize = BEAT_WORDS * WORD_SIZE;
