//! AXI-Stream items carried on the four ports of the unit

use crate::complex::ComplexShort;

/// One stream item: a packed complex sample plus TLAST
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct AxisCplx {
    pub data: ComplexShort,
    pub last: bool,
}

impl AxisCplx {
    pub fn new(re: i16, im: i16, last: bool) -> Self {
        Self {
            data: ComplexShort::new(re, im),
            last,
        }
    }

    /// TDATA as it appears on the wire
    pub fn tdata(&self) -> u32 {
        self.data.to_word()
    }

    pub fn from_wire(tdata: u32, tlast: bool) -> Self {
        Self {
            data: ComplexShort::from_word(tdata),
            last: tlast,
        }
    }
}

/// What the `a` and `b` ports deliver in one activation
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Operands {
    pub a: AxisCplx,
    pub b: AxisCplx,
}

/// What the `add` and `sub` ports produce in one activation
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Results {
    pub add: AxisCplx,
    pub sub: AxisCplx,
}

const FIRST_LAST: u32 = 0b01;
const SECOND_LAST: u32 = 0b10;

/// Pack both TLAST bits of a beat into the flag word of a beat file
fn pack_flags(first: bool, second: bool) -> u32 {
    (if first { FIRST_LAST } else { 0 }) | (if second { SECOND_LAST } else { 0 })
}

fn unpack_flags(flags: u32) -> (bool, bool) {
    (flags & FIRST_LAST != 0, flags & SECOND_LAST != 0)
}

impl Operands {
    pub fn to_words(&self) -> [u32; 3] {
        [self.a.tdata(), self.b.tdata(), pack_flags(self.a.last, self.b.last)]
    }

    pub fn from_words(words: &[u32; 3]) -> Self {
        let (a_last, b_last) = unpack_flags(words[2]);
        Self {
            a: AxisCplx::from_wire(words[0], a_last),
            b: AxisCplx::from_wire(words[1], b_last),
        }
    }
}

impl Results {
    pub fn to_words(&self) -> [u32; 3] {
        [self.add.tdata(), self.sub.tdata(), pack_flags(self.add.last, self.sub.last)]
    }

    pub fn from_words(words: &[u32; 3]) -> Self {
        let (add_last, sub_last) = unpack_flags(words[2]);
        Self {
            add: AxisCplx::from_wire(words[0], add_last),
            sub: AxisCplx::from_wire(words[1], sub_last),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_bits() {
        let ops = Operands {
            a: AxisCplx::new(1, 2, false),
            b: AxisCplx::new(3, 4, true),
        };
        let words = ops.to_words();
        assert_eq!(words[2], 0b10);
        assert_eq!(Operands::from_words(&words), ops);
    }

    #[test]
    fn test_wire_tdata() {
        let item = AxisCplx::new(-1, 0, true);
        assert_eq!(item.tdata(), 0x0000_ffff);
        assert_eq!(AxisCplx::from_wire(item.tdata(), true), item);
    }
}
