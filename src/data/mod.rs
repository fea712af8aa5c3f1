// mod.rs - Data structures module

pub mod block;
pub mod identity;
pub mod reader;

// Re-export main types for convenience
pub use block::{Block, SequenceRecord, GAP};
pub use identity::{strip_name, IdentityId, IdentityRegistry, PairKey};
pub use reader::{BlockReader, ReaderState};
