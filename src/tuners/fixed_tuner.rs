//! `FixedTuner` always answers with the same digit width, regardless of input. It is what
//! `with_digit_bits` installs.

use crate::tuner::{Tuner, TuningParams};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FixedTuner(pub u32);

impl Tuner for FixedTuner {
    #[inline]
    fn pick_digit_bits(&self, _p: &TuningParams) -> u32 {
        self.0
    }
}
