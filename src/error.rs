//! Configuration errors. Every variant is raised before the first dispatch of a sort; once
//! passes start running the only way a sort can fail is an internal assertion.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SortError {
    #[error("length mismatch: keys={keys}, payload={payload}")]
    LengthMismatch { keys: usize, payload: usize },

    #[error("double buffer too small: need {required} slots, have {available}")]
    InsufficientCapacity { required: usize, available: usize },

    #[error("unsupported key width: {key_bits} bits (key type holds {max})")]
    UnsupportedKeyWidth { key_bits: u32, max: u32 },

    #[error("unsupported digit width: {digit_bits} bits for a {key_bits}-bit key")]
    UnsupportedDigitWidth { digit_bits: u32, key_bits: u32 },

    #[error("{digit_bits}-bit digits over {groups} groups need more than {limit} group histogram entries; use narrower digits or a larger workgroup")]
    GroupTableTooLarge {
        digit_bits: u32,
        groups: usize,
        limit: usize,
    },

    #[error("workgroup size {0} must be a power of two between 2 and 4096")]
    InvalidWorkgroupSize(usize),

    #[error("subgroup size {subgroup_size} must be a power of two <= 64 dividing workgroup size {workgroup_size}")]
    InvalidSubgroupSize {
        subgroup_size: usize,
        workgroup_size: usize,
    },

    #[error("{0} elements do not fit 32-bit counters")]
    TooManyElements(usize),
}

pub type Result<T> = std::result::Result<T, SortError>;
