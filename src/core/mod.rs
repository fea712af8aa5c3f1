// mod.rs - Core logic module

pub mod compare;
pub mod distance;
pub mod filter;
pub mod matrix;
pub mod pipeline;
pub mod stats;

// Re-export main types for convenience
pub use compare::{compare, ComparisonKernel};
pub use distance::{corrected_distance, jukes_cantor, Distance, SaturationPolicy};
pub use filter::{apply_core_filter, core_columns, full_identity_set, CoreFilterSummary};
pub use matrix::DistanceMatrix;
pub use pipeline::{
    process_blocks, process_stream, PipelineOptions, StreamResult, StreamSummary, DEFAULT_BATCH_SIZE,
};
pub use stats::ComparisonStat;
