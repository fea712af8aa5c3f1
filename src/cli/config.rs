// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{MafError, Result};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    // Filtering
    pub core: Option<bool>,

    // Output
    pub format: Option<String>,
    pub precision: Option<usize>,
    pub output: Option<String>,

    // Distance transform
    pub saturation: Option<String>,
    pub saturated_distance: Option<f64>,

    // Performance
    pub threads: Option<usize>,
    pub kernel: Option<String>,
    pub batch_size: Option<usize>,

    // Reporting
    pub verbose: Option<bool>,
    pub progress: Option<bool>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            MafError::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| MafError::Config(format!("'{}': {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("failed to parse: {}", e))
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| MafError::Config(format!("failed to serialize: {}", e)))?;
        fs::write(path, content).map_err(|e| MafError::io(path.display().to_string(), e))?;
        info!("📄 Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# mafdist.toml - Configuration file for mafdist
# Command line arguments override these settings

# =============================================================================
# FILTERING
# =============================================================================

# Use only blocks containing every sequence, and ignore columns with a gap
# in any sequence of the block (complete deletion)
core = false

# =============================================================================
# OUTPUT
# =============================================================================

# Output format: phylip, tsv, csv, nexus, json
format = "phylip"

# Digits after the decimal point
precision = 4

# Write matrices to a file instead of standard output
# output = "distances.phy"

# =============================================================================
# DISTANCE TRANSFORM
# =============================================================================

# Pairs whose mismatch fraction reaches 0.75 have no Jukes-Cantor distance.
# sentinel: report saturated_distance instead; fail: abort with an error
saturation = "sentinel"
saturated_distance = -1.0

# =============================================================================
# PERFORMANCE
# =============================================================================

# Number of threads (omit for auto-detection)
# threads = 8

# Comparison kernel: auto, scalar, chunked, avx2
kernel = "auto"

# Blocks compared in parallel per batch
batch_size = 256

# =============================================================================
# REPORTING
# =============================================================================

verbose = false
progress = false
"#
        .to_string()
    }
}
