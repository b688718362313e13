//! `StandardTuner` is the default digit-width choice.
//!
//! Narrow digits keep the per-pass histogram and scan tiny at the cost of more passes. Once
//! the input is large enough that a pass over the data dwarfs a 256-entry table, wide digits
//! halve the number of passes.
//!
//! StandardTuner digit choice is:
//!  * 4 bits below 2^20 elements
//!  * 8 bits otherwise
//!  * never wider than the key

use crate::tuner::{Tuner, TuningParams};

pub struct StandardTuner;
impl Tuner for StandardTuner {
    #[inline]
    fn pick_digit_bits(&self, p: &TuningParams) -> u32 {
        let bits = if p.input_len < 1 << 20 { 4 } else { 8 };

        bits.min(p.key_bits)
    }
}
