// pipeline.rs - One MAF stream in, one distance matrix out

use std::io::BufRead;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::info;

use crate::core::compare::ComparisonKernel;
use crate::core::distance::SaturationPolicy;
use crate::core::filter::core_columns;
use crate::core::matrix::DistanceMatrix;
use crate::data::block::Block;
use crate::data::identity::IdentityRegistry;
use crate::data::reader::BlockReader;
use crate::error::{MafError, Result};

/// Blocks handed to the thread pool at once in streaming mode
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Settings for processing one stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    /// Keep only blocks with every identity and drop gapped columns
    pub core: bool,
    pub kernel: ComparisonKernel,
    pub batch_size: usize,
    pub progress: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            core: false,
            kernel: ComparisonKernel::detect(),
            batch_size: DEFAULT_BATCH_SIZE,
            progress: false,
        }
    }
}

/// Counters reported after a stream has been processed
#[derive(Debug, Clone, Default)]
pub struct StreamSummary {
    pub blocks_read: usize,
    pub blocks_used: usize,
    pub columns_masked: usize,
    pub elapsed: Duration,
}

/// Identities and accumulated statistics of one stream
#[derive(Debug, Clone)]
pub struct StreamResult {
    pub registry: IdentityRegistry,
    pub matrix: DistanceMatrix,
    pub summary: StreamSummary,
}

impl StreamResult {
    /// Identity names in emission order
    pub fn identities(&self) -> &[String] {
        self.registry.names()
    }

    /// Dense symmetric matrix of corrected distances, in identity order
    pub fn distances(&self, policy: SaturationPolicy) -> Result<Vec<Vec<f64>>> {
        let n = self.registry.len();
        let mut rows = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..i {
                let value = self.matrix.distance(i, j).resolve(policy).ok_or_else(|| {
                    MafError::SaturatedDistance {
                        a: self.registry.names()[i].clone(),
                        b: self.registry.names()[j].clone(),
                        raw: self.matrix.stat(i, j).raw().unwrap_or(1.0),
                    }
                })?;
                rows[i][j] = value;
                rows[j][i] = value;
            }
        }
        Ok(rows)
    }
}

fn progress_bar(enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} blocks ({per_sec}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb
}

/// Read, optionally filter, and accumulate every block of `reader`.
///
/// Without the core filter blocks are streamed in batches of
/// `options.batch_size`; each batch is mapped to partial matrices in parallel
/// and reduced into the stream matrix. The core filter needs the full identity
/// set, so in that mode the whole stream is buffered first.
pub fn process_blocks<R: BufRead>(
    mut reader: BlockReader<R>,
    options: &PipelineOptions,
) -> Result<StreamResult> {
    let start = Instant::now();
    let pb = progress_bar(options.progress);
    let batch_size = options.batch_size.max(1);
    let mut summary = StreamSummary::default();
    let mut matrix = DistanceMatrix::new();

    if options.core {
        let mut blocks = Vec::new();
        for block in reader.by_ref() {
            blocks.push(block?);
            pb.inc(1);
        }
        summary.blocks_read = blocks.len();
        let (kept, filter) = core_columns(blocks);
        summary.blocks_used = filter.blocks_kept;
        summary.columns_masked = filter.columns_masked;
        info!(
            "🧹 Core columns: kept {}/{} blocks, masked {} gapped columns",
            filter.blocks_kept, filter.blocks_in, filter.columns_masked
        );
        matrix = DistanceMatrix::from_blocks(&kept, options.kernel)?;
    } else {
        let mut batch: Vec<Block> = Vec::with_capacity(batch_size);
        for block in reader.by_ref() {
            batch.push(block?);
            pb.inc(1);
            if batch.len() == batch_size {
                matrix.merge(DistanceMatrix::from_blocks(&batch, options.kernel)?);
                summary.blocks_used += batch.len();
                batch.clear();
            }
        }
        if !batch.is_empty() {
            matrix.merge(DistanceMatrix::from_blocks(&batch, options.kernel)?);
            summary.blocks_used += batch.len();
        }
        summary.blocks_read = summary.blocks_used;
    }

    pb.finish_and_clear();
    summary.elapsed = start.elapsed();

    let registry = reader.into_registry();
    info!(
        "✅ {} blocks read, {} used, {} identities, {} pairs in {:.2}s",
        summary.blocks_read,
        summary.blocks_used,
        registry.len(),
        matrix.len(),
        summary.elapsed.as_secs_f64()
    );

    Ok(StreamResult {
        registry,
        matrix,
        summary,
    })
}

/// Convenience wrapper: build the reader for `input` and process it
pub fn process_stream<R: BufRead>(
    input: R,
    source: &str,
    options: &PipelineOptions,
) -> Result<StreamResult> {
    info!("📂 Reading {} ({} kernel)", source, options.kernel);
    process_blocks(BlockReader::with_source(input, source), options)
}
