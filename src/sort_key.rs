/// An unsigned fixed-width key that can be split into digit groups.
///
/// Only unsigned integers implement this. Signed or floating-point values must be mapped to an
/// order-preserving unsigned representation by the caller before sorting.
pub trait SortKey: Copy + Send + Sync + 'static {
    /// Total width of the key in bits.
    const BITS: u32;

    /// Returns `(self >> shift) & mask`. `shift` is always below `Self::BITS`.
    fn digit(&self, shift: u32, mask: u32) -> u32;
}

impl SortKey for u8 {
    const BITS: u32 = 8;

    #[inline]
    fn digit(&self, shift: u32, mask: u32) -> u32 {
        (*self >> shift) as u32 & mask
    }
}

impl SortKey for u16 {
    const BITS: u32 = 16;

    #[inline]
    fn digit(&self, shift: u32, mask: u32) -> u32 {
        (*self >> shift) as u32 & mask
    }
}

impl SortKey for u32 {
    const BITS: u32 = 32;

    #[inline]
    fn digit(&self, shift: u32, mask: u32) -> u32 {
        (*self >> shift) & mask
    }
}

impl SortKey for u64 {
    const BITS: u32 = 64;

    #[inline]
    fn digit(&self, shift: u32, mask: u32) -> u32 {
        (*self >> shift) as u32 & mask
    }
}

#[cfg(target_pointer_width = "32")]
impl SortKey for usize {
    const BITS: u32 = 32;

    #[inline]
    fn digit(&self, shift: u32, mask: u32) -> u32 {
        (*self >> shift) as u32 & mask
    }
}

#[cfg(target_pointer_width = "64")]
impl SortKey for usize {
    const BITS: u32 = 64;

    #[inline]
    fn digit(&self, shift: u32, mask: u32) -> u32 {
        (*self >> shift) as u32 & mask
    }
}

/// A fixed-width bit slice of a key, used as the bucket selector for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitGroup {
    pub shift: u32,
    pub bits: u32,
}

impl DigitGroup {
    pub fn new(shift: u32, bits: u32) -> Self {
        debug_assert!((1..=16).contains(&bits));

        Self { shift, bits }
    }

    /// Number of buckets, `2^bits`.
    #[inline]
    pub fn radix(&self) -> usize {
        1 << self.bits
    }

    #[inline]
    pub fn mask(&self) -> u32 {
        (1u32 << self.bits) - 1
    }

    #[inline]
    pub fn extract<K: SortKey>(&self, key: &K) -> u32 {
        key.digit(self.shift, self.mask())
    }
}
