//! The three data-parallel building blocks of a pass, plus the histogram built from them.

mod histogram;
mod reduce;
mod scan;
mod scatter;

pub use histogram::{
    build_histogram, prefix_offsets, Counts, GroupHistograms, HistogramTable, PrefixOffsetTable,
};
pub use reduce::{merge_counts, reduce, ReduceOp};
pub use scan::{exclusive_scan, exclusive_scan_in_place};
pub use scatter::{bucket_sort, scatter};
