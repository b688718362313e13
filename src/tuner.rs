#[derive(Clone, Debug)]
pub struct TuningParams {
    pub input_len: usize,
    /// Number of low key bits that take part in the sort.
    pub key_bits: u32,
}

/// Picks the digit width, and with it the pass count, for one sort.
pub trait Tuner {
    fn pick_digit_bits(&self, p: &TuningParams) -> u32;
}
