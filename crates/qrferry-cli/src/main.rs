use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, ArgGroup, Parser};
use glob::glob;
use qrferry_core::symbol::naming::parse_symbol_index;
use qrferry_core::{AggregateDecodeFailure, CodecConfig, EcLevel, PipelineError};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("QRFERRY_BUILD_COMMIT"),
    ", ",
    env!("QRFERRY_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "qrferry")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Move a file through a sequence of QR code images and back.",
    long_about = None,
    after_help = "Examples:\n  qrferry --encode --file secret.bin --directory symbols\n  qrferry --decode --file restored.bin --directory symbols\n  qrferry -e -f secret.bin -p symbols --ec-level M --parallel"
)]
#[command(group(ArgGroup::new("mode").required(true).args(["encode", "decode"])))]
struct Cli {
    /// Encode a file into QR code images
    #[arg(short = 'e', long)]
    encode: bool,

    /// Rebuild a file from a directory of QR code images
    #[arg(short = 'd', long)]
    decode: bool,

    /// File to encode, or name of the rebuilt file inside the directory
    #[arg(short = 'f', long)]
    file: Option<PathBuf>,

    /// Directory the QR code images are written to or read from
    #[arg(short = 'p', long)]
    directory: PathBuf,

    /// Error-correction level: L, M, Q or H
    #[arg(long)]
    ec_level: Option<EcLevel>,

    /// QR version used for every symbol (1-40)
    #[arg(long)]
    symbol_version: Option<u8>,

    /// Pixel size of one QR module
    #[arg(long)]
    module_size: Option<u32>,

    /// Quiet-zone width in modules
    #[arg(long)]
    border: Option<u32>,

    /// Characters of encoded text per symbol (defaults to the level's capacity)
    #[arg(long)]
    max_chunk: Option<NonZeroUsize>,

    /// Render or scan symbols on all cores
    #[arg(long)]
    parallel: bool,

    /// JSON file with default settings; flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a JSON summary to stdout
    #[arg(long)]
    json: bool,

    /// Suppress non-error output
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,

    /// Increase log detail (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let result = if cli.encode {
        cmd_encode(&cli)
    } else {
        cmd_decode(&cli)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(quiet: bool, verbose: u8) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

impl From<PipelineError> for CliError {
    fn from(err: PipelineError) -> Self {
        let hint = match &err {
            PipelineError::SourceNotFound(_) | PipelineError::SourceNotFile(_) => {
                Some("check the path passed to --file".to_string())
            }
            PipelineError::DirectoryNotFound(_) => {
                Some("pass the directory holding the qrcode_<N>.png images".to_string())
            }
            PipelineError::Config(_) => Some("see --help for accepted ranges".to_string()),
            PipelineError::Misordered { .. } => Some(
                "rename the symbols so every index has the same number of digits".to_string(),
            ),
            PipelineError::Payload(_) => Some(
                "a trailing symbol may be missing, or the directory mixes symbols from different runs"
                    .to_string(),
            ),
            _ => None,
        };
        CliError::new(err.to_string(), hint)
    }
}

fn cmd_encode(cli: &Cli) -> Result<(), CliError> {
    let file = cli.file.as_ref().ok_or_else(|| {
        CliError::new(
            "missing input file",
            Some("use -f/--file to name the file to encode".to_string()),
        )
    })?;
    let source = resolve_input_path(file)?;
    validate_input_file(&source)?;
    let config = resolve_config(cli)?;
    config.symbol.validate().map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("see --help for accepted ranges".to_string()),
        )
    })?;

    let summary = qrferry_core::encode_file(&source, &cli.directory, &config)?;

    if cli.json {
        print_json(&summary)?;
    }
    if !cli.quiet {
        eprintln!(
            "OK: {} symbol(s) written -> {}",
            summary.symbols.len(),
            cli.directory.display()
        );
    }
    Ok(())
}

fn cmd_decode(cli: &Cli) -> Result<(), CliError> {
    let output = cli.file.as_ref().ok_or_else(|| {
        CliError::new(
            "missing output file name",
            Some("use -f/--file to name the rebuilt file".to_string()),
        )
    })?;
    if !cli.directory.is_dir() {
        return Err(CliError::new(
            format!("directory not found: {}", cli.directory.display()),
            Some("pass the directory holding the qrcode_<N>.png images".to_string()),
        ));
    }
    validate_output_name(output)?;
    let config = resolve_config(cli)?;

    let summary = match qrferry_core::decode_directory(&cli.directory, output, &config) {
        Ok(summary) => summary,
        Err(PipelineError::Symbols(failure)) => {
            print_failures(&failure);
            return Err(CliError::new(
                format!(
                    "{} symbol failure(s); nothing written",
                    failure.failures.len()
                ),
                Some("rescan the listed symbols and run --decode again".to_string()),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    if cli.json {
        print_json(&summary)?;
    }
    if !cli.quiet {
        eprintln!(
            "OK: {} symbol(s) decoded -> {}",
            summary.symbols, summary.output
        );
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<CodecConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => CodecConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => CodecConfig::default(),
    };
    if let Some(level) = cli.ec_level {
        config.symbol.ec_level = level;
    }
    if let Some(version) = cli.symbol_version {
        config.symbol.version = version;
    }
    if let Some(module_size) = cli.module_size {
        config.symbol.module_size = module_size;
    }
    if let Some(border) = cli.border {
        config.symbol.border = border;
    }
    if cli.max_chunk.is_some() {
        config.symbol.max_chunk = cli.max_chunk;
    }
    if cli.parallel {
        config.parallel = true;
    }
    tracing::debug!(?config, "resolved configuration");
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{}", json);
    Ok(())
}

fn print_failures(failure: &AggregateDecodeFailure) {
    eprintln!("Symbol failures:");
    for entry in &failure.failures {
        eprintln!("  {}", entry);
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("check the path passed to --file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("only regular files can be encoded".to_string()),
        ));
    }
    Ok(())
}

fn validate_output_name(output: &Path) -> Result<(), CliError> {
    let name = output.file_name().and_then(|name| name.to_str()).ok_or_else(|| {
        CliError::new(
            format!("invalid output file name: {}", output.display()),
            Some("pass a file name such as restored.bin".to_string()),
        )
    })?;
    if parse_symbol_index(name).is_some() {
        return Err(CliError::new(
            format!("output would overwrite a symbol image: {}", output.display()),
            Some("choose a name that does not look like qrcode_<N>.png".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let more = if count > 3 { ", ..." } else { "" };
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}{}",
                    pattern, count, listed, more
                ),
                Some("encode one file per run, e.g. archive them together first".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
