//! Fixed-width complex samples

use std::ops::{Add, Sub};

use num_traits::{CheckedAdd, CheckedSub, WrappingAdd, WrappingSub};

use crate::DATA_WIDTH;

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl<T> Complex<T> {
    pub fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

impl<T: WrappingAdd> Complex<T> {
    /// Componentwise two's-complement addition, wrapping on overflow
    pub fn wrapping_add(&self, rhs: &Self) -> Self {
        Self {
            re: self.re.wrapping_add(&rhs.re),
            im: self.im.wrapping_add(&rhs.im),
        }
    }
}

impl<T: WrappingSub> Complex<T> {
    /// Componentwise two's-complement subtraction, wrapping on overflow
    pub fn wrapping_sub(&self, rhs: &Self) -> Self {
        Self {
            re: self.re.wrapping_sub(&rhs.re),
            im: self.im.wrapping_sub(&rhs.im),
        }
    }
}

impl<T: CheckedAdd> Complex<T> {
    /// True if either component of `self + rhs` wraps
    pub fn overflows_add(&self, rhs: &Self) -> bool {
        self.re.checked_add(&rhs.re).is_none() || self.im.checked_add(&rhs.im).is_none()
    }
}

impl<T: CheckedSub> Complex<T> {
    /// True if either component of `self - rhs` wraps
    pub fn overflows_sub(&self, rhs: &Self) -> bool {
        self.re.checked_sub(&rhs.re).is_none() || self.im.checked_sub(&rhs.im).is_none()
    }
}

// The hardware adders have no carry out, so the operators wrap like the fixed-width type does
impl<T: WrappingAdd> Add for Complex<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.wrapping_add(&rhs)
    }
}

impl<T: WrappingSub> Sub for Complex<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.wrapping_sub(&rhs)
    }
}

/// The sample type carried on every port of the unit
pub type ComplexShort = Complex<i16>;

impl ComplexShort {
    /// Pack into a 32-bit TDATA word, real part in the low half
    pub fn to_word(self) -> u32 {
        (self.re as u16 as u32) | ((self.im as u16 as u32) << DATA_WIDTH)
    }

    /// Unpack a 32-bit TDATA word
    pub fn from_word(word: u32) -> Self {
        Self {
            re: word as u16 as i16,
            im: (word >> DATA_WIDTH) as u16 as i16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapping_add() {
        let a = ComplexShort::new(i16::MAX, -1);
        let b = ComplexShort::new(1, 1);
        assert_eq!(a + b, ComplexShort::new(i16::MIN, 0));
        assert!(a.overflows_add(&b));
        assert!(!b.overflows_add(&b));
    }

    #[test]
    fn test_wrapping_sub() {
        let a = ComplexShort::new(0, i16::MIN);
        let b = ComplexShort::new(1, 1);
        assert_eq!(a - b, ComplexShort::new(-1, i16::MAX));
        assert!(a.overflows_sub(&b));
    }

    #[test]
    fn test_word_layout() {
        let c = ComplexShort::new(-2, 3);
        assert_eq!(c.to_word(), 0x0003_fffe);
        assert_eq!(ComplexShort::from_word(0x8000_7fff), ComplexShort::new(i16::MAX, i16::MIN));
    }

    #[test]
    fn test_word_roundtrip_extremes() {
        for re in [i16::MIN, -1, 0, 1, i16::MAX] {
            for im in [i16::MIN, -1, 0, 1, i16::MAX] {
                let c = ComplexShort::new(re, im);
                assert_eq!(ComplexShort::from_word(c.to_word()), c);
            }
        }
    }
}
