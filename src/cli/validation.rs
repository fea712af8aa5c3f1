// validation.rs - Resolve and validate merged settings

use std::str::FromStr;

use crate::cli::args::Args;
use crate::core::{ComparisonKernel, PipelineOptions, SaturationPolicy, DEFAULT_BATCH_SIZE};
use crate::error::{MafError, Result};
use crate::output::{OutputFormat, DEFAULT_PRECISION};

/// Largest precision that still carries meaning for an f64
pub const MAX_PRECISION: usize = 17;

/// Typed settings for one run, defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub format: OutputFormat,
    pub precision: usize,
    pub saturation: SaturationPolicy,
    pub pipeline: PipelineOptions,
    pub threads: Option<usize>,
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult> {
    let format = match args.format.as_deref() {
        Some(name) => OutputFormat::from_str(name).map_err(MafError::InvalidArgument)?,
        None => OutputFormat::Phylip,
    };

    let precision = args.precision.unwrap_or(DEFAULT_PRECISION);
    if precision > MAX_PRECISION {
        return Err(MafError::InvalidArgument(format!(
            "Precision must be at most {}, got {}",
            MAX_PRECISION, precision
        )));
    }

    let saturation = SaturationPolicy::from_name(
        args.saturation.as_deref().unwrap_or("sentinel"),
        args.saturated_distance,
    )
    .map_err(MafError::InvalidArgument)?;

    let kernel = match args.kernel.as_deref() {
        Some(name) => ComparisonKernel::from_str(name).map_err(MafError::InvalidArgument)?,
        None => ComparisonKernel::detect(),
    };
    if !kernel.is_supported() {
        return Err(MafError::InvalidArgument(format!(
            "Kernel '{}' is not supported on this CPU",
            kernel
        )));
    }

    let batch_size = args.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
    if batch_size == 0 {
        return Err(MafError::InvalidArgument(
            "Batch size must be at least 1".to_string(),
        ));
    }

    if args.threads == Some(0) {
        return Err(MafError::InvalidArgument(
            "Thread count must be at least 1".to_string(),
        ));
    }

    Ok(ValidationResult {
        format,
        precision,
        saturation,
        pipeline: PipelineOptions {
            core: args.core,
            kernel,
            batch_size,
            progress: args.progress,
        },
        threads: args.threads,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(argv: &[&str]) -> Result<ValidationResult> {
        let mut full = vec!["mafdist"];
        full.extend_from_slice(argv);
        validate_args(&Args::try_parse_from(full).unwrap())
    }

    #[test]
    fn test_defaults() {
        let v = validate(&[]).unwrap();
        assert_eq!(v.format, OutputFormat::Phylip);
        assert_eq!(v.precision, DEFAULT_PRECISION);
        assert_eq!(v.saturation, SaturationPolicy::Sentinel(-1.0));
        assert_eq!(v.pipeline.batch_size, DEFAULT_BATCH_SIZE);
        assert!(!v.pipeline.core);
        assert!(v.pipeline.kernel.is_supported());
        assert!(v.threads.is_none());
    }

    #[test]
    fn test_explicit_values() {
        let v = validate(&[
            "-c",
            "-f",
            "json",
            "--kernel",
            "scalar",
            "--saturation",
            "fail",
            "--batch-size",
            "8",
        ])
        .unwrap();
        assert_eq!(v.format, OutputFormat::Json);
        assert_eq!(v.saturation, SaturationPolicy::Fail);
        assert_eq!(v.pipeline.kernel, ComparisonKernel::Scalar);
        assert_eq!(v.pipeline.batch_size, 8);
        assert!(v.pipeline.core);
    }

    #[test]
    fn test_sentinel_value() {
        let v = validate(&["--saturated-distance", "9.5"]).unwrap();
        assert_eq!(v.saturation, SaturationPolicy::Sentinel(9.5));
    }

    #[test]
    fn test_rejections() {
        for argv in [
            vec!["-f", "xml"],
            vec!["-p", "18"],
            vec!["--batch-size", "0"],
            vec!["-t", "0"],
            vec!["--kernel", "gpu"],
            vec!["--saturation", "ignore"],
        ] {
            let err = validate(&argv).unwrap_err();
            assert!(matches!(err, MafError::InvalidArgument(_)), "{:?}", argv);
        }
    }
}
