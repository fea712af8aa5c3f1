// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};
use crate::error::Result;

impl Args {
    /// Load a TOML file and merge it under the command line values
    pub fn with_config_file(self, path: &str) -> Result<Self> {
        let config = Config::from_file(path)?;
        Ok(self.merge_with_config(config))
    }

    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Filtering (a flag can only be switched on)
        if !self.core {
            self.core = config.core.unwrap_or(false);
        }

        // Output
        if self.format.is_none() {
            self.format = config.format;
        }
        if self.precision.is_none() {
            self.precision = config.precision;
        }
        if self.output.is_none() {
            self.output = config.output;
        }

        // Distance transform
        if self.saturation.is_none() {
            self.saturation = config.saturation;
        }
        if self.saturated_distance.is_none() {
            self.saturated_distance = config.saturated_distance;
        }

        // Performance
        if self.threads.is_none() {
            self.threads = config.threads;
        }
        if self.kernel.is_none() {
            self.kernel = config.kernel;
        }
        if self.batch_size.is_none() {
            self.batch_size = config.batch_size;
        }

        // Reporting
        if !self.verbose {
            self.verbose = config.verbose.unwrap_or(false);
        }
        if !self.progress {
            self.progress = config.progress.unwrap_or(false);
        }

        self
    }
}
