// lib.rs - mafdist library root

//! # mafdist - Pairwise Jukes-Cantor distances from multiple alignments
//!
//! Reads alignment blocks in MAF format, compares every pair of aligned
//! sequences column by column, and turns the accumulated mismatch counts into a
//! symmetric Jukes-Cantor corrected distance matrix, one identity per genome.
//!
//! ## Features
//!
//! - **Streaming**: blocks are parsed one at a time and compared in parallel batches
//! - **Core columns**: optional complete-deletion filter over blocks holding every identity
//! - **Vectorized comparison**: AVX2 and word-at-a-time kernels with a scalar reference
//! - **Multiple formats**: PHYLIP, TSV, CSV, NEXUS and JSON output
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use mafdist::prelude::*;
//!
//! let file = std::fs::File::open("alignment.maf").map_err(|e| MafError::io("alignment.maf", e))?;
//! let result = process_stream(
//!     std::io::BufReader::new(file),
//!     "alignment.maf",
//!     &PipelineOptions::default(),
//! )?;
//! let rows = result.distances(SaturationPolicy::default())?;
//! for (name, row) in result.identities().iter().zip(&rows) {
//!     println!("{} {:?}", name, row);
//! }
//! # Ok::<(), MafError>(())
//! ```

pub mod cli;
pub mod core;
pub mod data;
pub mod error;
pub mod output;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, Config, ValidationResult};
    pub use crate::core::{process_blocks, process_stream, PipelineOptions, StreamResult};
    pub use crate::core::{ComparisonKernel, ComparisonStat, DistanceMatrix, SaturationPolicy};
    pub use crate::data::{Block, BlockReader, IdentityRegistry, SequenceRecord};
    pub use crate::error::{MafError, Result};
    pub use crate::output::{write_matrix, OutputFormat};
}

// Re-export main types at the root level for convenience
pub use crate::core::{DistanceMatrix, PipelineOptions, SaturationPolicy, StreamResult};
pub use crate::data::{Block, BlockReader, IdentityRegistry};
pub use crate::error::{MafError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "mafdist v{} - Jukes-Cantor distance matrices from MAF alignments",
        VERSION
    )
}
