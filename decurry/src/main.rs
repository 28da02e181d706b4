use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use decurry_core::batch::{SourceFile, run_batch};
use decurry_core::config::{InlineLists, ObjectUpdateMode, Transforms};
use decurry_core::convention::WrapperConvention;
use decurry_core::diags::{DiagnosticsSink, InlineReport, LogSink, to_json};
use decurry_core::Compiler;
use log::{debug, error};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;
use thiserror::Error;

/// Naming convention of the runtime's curry and apply helpers
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Convention {
    /// wrap<N> / apply<N>
    Generic,
    /// F<N> / A<N>, as emitted by the Elm compiler
    Elm,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Lists {
    Objects,
    Cons,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Update {
    Spread,
    Assign,
}

/// Times the execution of a closure and prints the elapsed time if verbose.
fn time<T, F: FnOnce() -> T>(name: &str, verbose: bool, f: F) -> T {
    let start = Instant::now();
    let result = f();
    if verbose {
        let elapsed = start.elapsed().as_millis();
        eprintln!("{}: {}ms", name, elapsed);
    }
    result
}

#[derive(Parser)]
#[command(name = "decurry")]
#[command(about = "Specializes curried-call dispatch in generated JavaScript", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite generated JavaScript files
    Transform {
        /// Input files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (single input only; defaults to <stem>.transformed.js beside the input)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// JSON configuration of the passes
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Wrapper naming convention, overriding the configuration
        #[arg(long)]
        convention: Option<Convention>,

        /// Worker threads (defaults to the available parallelism)
        #[arg(short, long)]
        jobs: Option<NonZeroUsize>,

        /// Write the per-file diagnostics reports as JSON
        #[arg(long, value_name = "FILE")]
        report_json: Option<PathBuf>,

        #[command(flatten)]
        passes: PassFlags,
    },

    /// Parse a file and print it back without rewriting
    Print {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Command-line overrides of the configured pass set
#[derive(Args, Debug, Default)]
struct PassFlags {
    #[arg(long)]
    no_variant_shapes: bool,

    /// Disable declaration splitting and call specialization
    #[arg(long)]
    no_inline_functions: bool,

    #[arg(long)]
    no_inline_equality: bool,

    #[arg(long)]
    no_number_to_string: bool,

    #[arg(long)]
    no_list_literals: bool,

    #[arg(long)]
    no_unused_locals: bool,

    /// Representation of inlined list literals
    #[arg(long)]
    lists: Option<Lists>,

    /// Rewrite record updates with object spread or Object.assign
    #[arg(long)]
    object_update: Option<Update>,

    /// Turn eligible function expressions into arrow functions
    #[arg(long)]
    arrow_fns: bool,
}

impl PassFlags {
    fn apply(&self, transforms: &mut Transforms) {
        if self.no_variant_shapes {
            transforms.variant_shapes = false;
        }
        if self.no_inline_functions {
            transforms.inline_functions = false;
        }
        if self.no_inline_equality {
            transforms.inline_equality = false;
        }
        if self.no_number_to_string {
            transforms.inline_number_to_string = false;
        }
        if self.no_unused_locals {
            transforms.unused_values = false;
        }
        if let Some(lists) = self.lists {
            transforms.list_literals = Some(match lists {
                Lists::Objects => InlineLists::AsObjects,
                Lists::Cons => InlineLists::AsCons,
            });
        }
        if self.no_list_literals {
            transforms.list_literals = None;
        }
        if let Some(update) = self.object_update {
            transforms.object_update = Some(match update {
                Update::Spread => ObjectUpdateMode::UseSpread,
                Update::Assign => ObjectUpdateMode::UseAssign,
            });
        }
        if self.arrow_fns {
            transforms.arrow_fns = true;
        }
    }
}

#[derive(Debug, Error)]
enum DriverError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Compilation error: {0}")]
    CompilationError(#[from] decurry_core::error::CompilerError),

    #[error("Report error: {0}")]
    ReportError(#[from] serde_json::Error),

    #[error("--output needs exactly one input file, got {0}")]
    OutputWithManyInputs(usize),

    #[error("{failed} of {total} file(s) failed")]
    FilesFailed { failed: usize, total: usize },
}

/// Per-file summaries are logged at `info`, so they show on every run; `-v`
/// adds the per-call decisions logged at `debug`.
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_log_filter(cli.verbose)))
        .init();

    match cli.command {
        Commands::Transform {
            inputs,
            output,
            config,
            convention,
            jobs,
            report_json,
            passes,
        } => {
            let transforms = load_transforms(config.as_deref(), convention, &passes)?;
            let jobs = jobs
                .or_else(|| thread::available_parallelism().ok())
                .map_or(1, NonZeroUsize::get);
            transform_files(&inputs, output, &transforms, jobs, report_json.as_deref(), cli.verbose)?;
        }
        Commands::Print { input, output } => {
            print_file(&input, output.as_deref(), cli.verbose)?;
        }
    }

    Ok(())
}

fn load_transforms(
    config: Option<&Path>,
    convention: Option<Convention>,
    passes: &PassFlags,
) -> anyhow::Result<Transforms> {
    let mut transforms = match config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading configuration {}", path.display()))?;
            Transforms::from_json(&content)
                .map_err(DriverError::from)
                .with_context(|| format!("in configuration {}", path.display()))?
        }
        None => Transforms::default(),
    };
    if let Some(convention) = convention {
        transforms.convention = match convention {
            Convention::Generic => WrapperConvention::default(),
            Convention::Elm => WrapperConvention::elm(),
        };
    }
    passes.apply(&mut transforms);
    Ok(transforms)
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}.transformed.js", stem))
}

fn transform_files(
    inputs: &[PathBuf],
    output: Option<PathBuf>,
    transforms: &Transforms,
    jobs: usize,
    report_json: Option<&Path>,
    verbose: bool,
) -> anyhow::Result<()> {
    if output.is_some() && inputs.len() != 1 {
        return Err(DriverError::OutputWithManyInputs(inputs.len()).into());
    }

    let mut failed = 0;
    let mut files = Vec::with_capacity(inputs.len());
    let mut paths = Vec::with_capacity(inputs.len());
    time("read", verbose, || {
        for input in inputs {
            match fs::read_to_string(input) {
                Ok(source) => {
                    files.push(SourceFile::new(input.display().to_string(), source));
                    paths.push(input);
                }
                Err(e) => {
                    error!("{}: {}", input.display(), DriverError::from(e));
                    failed += 1;
                }
            }
        }
    });

    let outcomes = time("transform", verbose, || run_batch(&files, transforms, jobs)).map_err(DriverError::from)?;

    let mut sink = LogSink;
    let mut reports: Vec<InlineReport> = Vec::new();
    for (outcome, input) in outcomes.into_iter().zip(paths) {
        let printed = match outcome.result {
            Ok(printed) => printed,
            Err(e) => {
                error!("{}: {}", outcome.file_id, DriverError::from(e));
                failed += 1;
                continue;
            }
        };

        let output_path = output.clone().unwrap_or_else(|| default_output_path(input));
        if let Err(e) = fs::write(&output_path, &printed.code)
            .with_context(|| format!("writing {}", output_path.display()))
        {
            error!("{}: {:#}", outcome.file_id, e);
            failed += 1;
            continue;
        }
        debug!("{}: wrote {}", outcome.file_id, output_path.display());
        sink.report(&printed.report);
        reports.push(printed.report);
    }

    if let Some(path) = report_json {
        let json = to_json(&reports).map_err(DriverError::from)?;
        fs::write(path, json).with_context(|| format!("writing report {}", path.display()))?;
    }

    if failed > 0 {
        return Err(DriverError::FilesFailed {
            failed,
            total: inputs.len(),
        }
        .into());
    }
    Ok(())
}

fn print_file(input: &Path, output: Option<&Path>, verbose: bool) -> anyhow::Result<()> {
    let source = fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let file_id = input.display().to_string();
    let parsed = time("parse", verbose, || Compiler::parse(&source, &file_id)).map_err(DriverError::from)?;
    let code = time("print", verbose, || parsed.print());

    match output {
        Some(path) => fs::write(path, code).with_context(|| format!("writing {}", path.display()))?,
        None => print!("{}", code),
    }
    Ok(())
}
