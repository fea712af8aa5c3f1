// args.rs - Command line arguments definition

use std::ffi::OsString;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

/// Raw command line values; unset options fall back to the config file, then to defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    /// MAF files to convert; empty or `-` means standard input
    pub files: Vec<String>,
    /// keep only blocks with every identity and drop gapped columns
    pub core: bool,
    /// output format: phylip, tsv, csv, nexus, json (default: phylip)
    pub format: Option<String>,
    /// digits after the decimal point (default: 4)
    pub precision: Option<usize>,
    /// write matrices to this file instead of stdout
    pub output: Option<String>,
    /// number of threads (default: auto-detect)
    pub threads: Option<usize>,
    /// comparison kernel: auto, scalar, chunked, avx2 (default: auto)
    pub kernel: Option<String>,
    /// saturation policy: sentinel, fail (default: sentinel)
    pub saturation: Option<String>,
    /// value reported for saturated pairs under the sentinel policy (default: -1)
    pub saturated_distance: Option<f64>,
    /// blocks per parallel batch (default: 256)
    pub batch_size: Option<usize>,
    /// path to TOML configuration file
    pub config: Option<String>,
    /// print a sample configuration file and exit
    pub generate_config: bool,
    pub verbose: bool,
    pub progress: bool,
}

/// clap definition of the `mafdist` command line
pub fn build_command() -> Command {
    Command::new("mafdist")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compute a Jukes-Cantor distance matrix from a multiple alignment (MAF).")
        .after_help("With no FILE, or when FILE is -, read standard input.")
        .arg(Arg::new("files")
            .value_name("FILE")
            .num_args(0..)
            .action(ArgAction::Append)
            .help("MAF files to convert, one matrix each"))
        .arg(Arg::new("core")
            .short('c')
            .long("core")
            .visible_alias("complete-deletion")
            .action(ArgAction::SetTrue)
            .help("Use only blocks containing every sequence and delete columns with gaps"))
        .arg(Arg::new("format")
            .short('f')
            .long("format")
            .value_name("FORMAT")
            .help("Output format: phylip, tsv, csv, nexus, json (default: phylip)"))
        .arg(Arg::new("precision")
            .short('p')
            .long("precision")
            .value_name("DIGITS")
            .value_parser(value_parser!(usize))
            .help("Digits after the decimal point (default: 4)"))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("FILE")
            .help("Write matrices to FILE instead of standard output"))
        .arg(Arg::new("threads")
            .short('t')
            .long("threads")
            .value_name("N")
            .value_parser(value_parser!(usize))
            .help("Number of threads (default: auto-detect)"))
        .arg(Arg::new("kernel")
            .long("kernel")
            .value_name("KERNEL")
            .help("Comparison kernel: auto, scalar, chunked, avx2 (default: auto)"))
        .arg(Arg::new("saturation")
            .long("saturation")
            .value_name("POLICY")
            .help("Pairs with p >= 0.75: sentinel or fail (default: sentinel)"))
        .arg(Arg::new("saturated-distance")
            .long("saturated-distance")
            .value_name("X")
            .allow_negative_numbers(true)
            .value_parser(value_parser!(f64))
            .help("Distance reported for saturated pairs (default: -1)"))
        .arg(Arg::new("batch-size")
            .long("batch-size")
            .value_name("N")
            .value_parser(value_parser!(usize))
            .help("Blocks compared in parallel per batch (default: 256)"))
        .arg(Arg::new("config")
            .long("config")
            .value_name("FILE")
            .help("Path to TOML configuration file"))
        .arg(Arg::new("generate-config")
            .long("generate-config")
            .action(ArgAction::SetTrue)
            .help("Print a sample configuration file and exit"))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::SetTrue)
            .help("Report per-file statistics on standard error"))
        .arg(Arg::new("progress")
            .long("progress")
            .action(ArgAction::SetTrue)
            .help("Show a progress spinner on standard error"))
}

impl Args {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            files: matches
                .get_many::<String>("files")
                .map(|v| v.cloned().collect())
                .unwrap_or_default(),
            core: matches.get_flag("core"),
            format: matches.get_one::<String>("format").cloned(),
            precision: matches.get_one::<usize>("precision").copied(),
            output: matches.get_one::<String>("output").cloned(),
            threads: matches.get_one::<usize>("threads").copied(),
            kernel: matches.get_one::<String>("kernel").cloned(),
            saturation: matches.get_one::<String>("saturation").cloned(),
            saturated_distance: matches.get_one::<f64>("saturated-distance").copied(),
            batch_size: matches.get_one::<usize>("batch-size").copied(),
            config: matches.get_one::<String>("config").cloned(),
            generate_config: matches.get_flag("generate-config"),
            verbose: matches.get_flag("verbose"),
            progress: matches.get_flag("progress"),
        }
    }

    /// Parse an explicit argument list (program name first)
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = build_command().try_get_matches_from(args)?;
        Ok(Self::from_matches(&matches))
    }

    /// True when input should come from standard input
    pub fn reads_stdin(&self) -> bool {
        self.files.is_empty() || self.files.iter().any(|f| f == "-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unset() {
        let args = Args::try_parse_from(["mafdist"]).unwrap();
        assert!(args.files.is_empty());
        assert!(!args.core);
        assert!(args.format.is_none());
        assert!(args.reads_stdin());
    }

    #[test]
    fn test_core_spellings() {
        for flag in ["-c", "--core", "--complete-deletion"] {
            let args = Args::try_parse_from(["mafdist", flag, "a.maf"]).unwrap();
            assert!(args.core, "{}", flag);
            assert_eq!(args.files, vec!["a.maf".to_string()]);
        }
    }

    #[test]
    fn test_dash_is_a_file_operand() {
        let args = Args::try_parse_from(["mafdist", "a.maf", "-", "b.maf"]).unwrap();
        assert_eq!(args.files, vec!["a.maf", "-", "b.maf"]);
        assert!(args.reads_stdin());
    }

    #[test]
    fn test_typed_options() {
        let args = Args::try_parse_from([
            "mafdist",
            "-f",
            "tsv",
            "-p",
            "6",
            "-t",
            "3",
            "--saturated-distance",
            "-2.5",
            "--kernel",
            "scalar",
        ])
        .unwrap();
        assert_eq!(args.format.as_deref(), Some("tsv"));
        assert_eq!(args.precision, Some(6));
        assert_eq!(args.threads, Some(3));
        assert_eq!(args.saturated_distance, Some(-2.5));
        assert_eq!(args.kernel.as_deref(), Some("scalar"));
    }

    #[test]
    fn test_rejects_unknown_flags_and_bad_numbers() {
        assert!(Args::try_parse_from(["mafdist", "--bogus"]).is_err());
        assert!(Args::try_parse_from(["mafdist", "-p", "many"]).is_err());
    }
}
