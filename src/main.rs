// main.rs - CLI entry point

use std::fs::File;
use std::io::{self, BufReader, BufWriter, IsTerminal, Write};

use tracing::info;
use tracing_subscriber::EnvFilter;

use mafdist::cli::{build_command, validate_args, Args, Config, ValidationResult};
use mafdist::core::{process_stream, StreamResult};
use mafdist::error::{MafError, Result};
use mafdist::output::write_matrix;

const STDIN_NAME: &str = "-";

fn main() {
    let args = match Args::try_parse_from(std::env::args_os()) {
        Ok(args) => args,
        // help and version exit 0, usage errors exit 2
        Err(e) => e.exit(),
    };

    if let Err(e) = run_main(args) {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run_main(mut args: Args) -> Result<()> {
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if args.generate_config {
        print!("{}", Config::generate_sample());
        return Ok(());
    }

    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }
    init_logging(args.verbose);
    if let Some(config_path) = &args.config {
        info!("📄 Loaded configuration from: {}", config_path);
    }

    if args.files.is_empty() && io::stdin().is_terminal() {
        eprintln!("{}", build_command().render_help());
        return Err(MafError::InvalidArgument(
            "no input files given and standard input is a terminal".to_string(),
        ));
    }

    let settings = validate_args(&args)?;

    if let Some(n) = settings.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| MafError::InvalidArgument(format!("thread pool: {}", e)))?;
        info!("🧵 Threads: {}", n);
    } else {
        info!("🧵 Threads: {} (auto-detected)", rayon::current_num_threads());
    }
    info!("⚙️  Kernel: {}", settings.pipeline.kernel.description());

    let mut sink: BufWriter<Box<dyn Write>> = match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| MafError::io(path.as_str(), e))?;
            BufWriter::new(Box::new(file))
        }
        None => BufWriter::new(Box::new(io::stdout().lock())),
    };

    let inputs = if args.files.is_empty() {
        vec![STDIN_NAME.to_string()]
    } else {
        args.files.clone()
    };

    // Matrices already written stay written when a later input fails
    let outcome = emit_all(&mut sink, &inputs, &settings, &command_line);
    sink.flush()?;
    outcome?;

    if let Some(path) = &args.output {
        info!("💾 Matrices written to: {}", path);
    }
    Ok(())
}

fn read_input(path: &str, settings: &ValidationResult) -> Result<StreamResult> {
    if path == STDIN_NAME {
        return process_stream(io::stdin().lock(), "<stdin>", &settings.pipeline);
    }
    let file = File::open(path).map_err(|e| MafError::io(path, e))?;
    process_stream(BufReader::new(file), path, &settings.pipeline)
}

fn emit_all(
    sink: &mut dyn Write,
    inputs: &[String],
    settings: &ValidationResult,
    command_line: &str,
) -> Result<()> {
    for path in inputs {
        let result = read_input(path, settings)?;
        write_matrix(
            sink,
            settings.format,
            &result,
            settings.saturation,
            settings.precision,
            command_line,
        )?;
    }
    Ok(())
}
