//! CLI entry point for the Hack assembler binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use hack_assembler::assembler::{assemble_batch, AssembleOptions, BatchReport};
use hack_assembler::emitter::{format_word, parse_hack_text};
use hack_assembler::errors::AssembleError;
use hack_assembler::source::discover_sources;
use hack_isa::disassemble;
#[cfg(test)]
use proptest as _;
#[cfg(test)]
use tempfile as _;
use thiserror as _;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Positional argument that selects every `.asm` file in the working
/// directory.
const ALL_SOURCES_ARG: &str = "*";

#[derive(Parser, Debug)]
#[command(
    name = "hack-asm",
    version,
    about = "Two-pass assembler for the Hack 16-bit computer"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Log every instruction analyzed and every symbol bound.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Assemble `.asm` sources into `.hack` images.
    Build(BuildArgs),
    /// Print the disassembly of a `.hack` image.
    Disasm {
        /// The `.hack` file to read.
        file: PathBuf,
    },
}

#[derive(Args, Debug, PartialEq, Eq)]
struct BuildArgs {
    /// Source files. A single `*` selects every `.asm` file in the
    /// current directory.
    #[arg(required_unless_present = "all")]
    files: Vec<PathBuf>,
    /// Assemble every `.asm` file in DIR (default: current directory).
    /// The directory must be attached with `=`, as in `--all=progs`.
    #[arg(
        long,
        value_name = "DIR",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "."
    )]
    all: Option<PathBuf>,
    /// Write `.hack` files into DIR instead of next to each source.
    #[arg(short = 'o', long = "out-dir", value_name = "DIR")]
    out_dir: Option<PathBuf>,
    /// Print the slot/word/source listing to stderr.
    #[arg(long)]
    listing: bool,
    /// Assemble without writing any output.
    #[arg(long)]
    check: bool,
}

impl BuildArgs {
    fn options(&self) -> AssembleOptions {
        AssembleOptions {
            out_dir: self.out_dir.clone(),
            listing: self.listing,
            check_only: self.check,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "hack_assembler=debug,hack_asm=debug"
    } else {
        "hack_assembler=info,hack_asm=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

/// Expands the positional files and `--all` into the list of inputs.
fn collect_inputs(args: &BuildArgs) -> Result<Vec<PathBuf>, AssembleError> {
    let mut inputs = Vec::new();
    for file in &args.files {
        if file.as_os_str() == ALL_SOURCES_ARG {
            inputs.extend(discover(Path::new("."))?);
        } else {
            inputs.push(file.clone());
        }
    }
    if let Some(dir) = &args.all {
        inputs.extend(discover(dir)?);
    }
    Ok(inputs)
}

fn discover(dir: &Path) -> Result<Vec<PathBuf>, AssembleError> {
    let found = discover_sources(dir).map_err(|e| AssembleError::io(dir, &e))?;
    debug!(dir = %dir.display(), count = found.len(), "discovered sources");
    Ok(found)
}

fn report(batch: &BatchReport, options: &AssembleOptions) {
    for outcome in &batch.outcomes {
        if let Some(error) = outcome.error() {
            eprintln!("{}", error.format_for_stderr());
            continue;
        }
        let Some(result) = outcome.result() else {
            continue;
        };
        for warning in &result.warnings {
            eprintln!(
                "{}:{}: warning: {warning}",
                outcome.input.display(),
                warning.line
            );
        }
        if options.listing {
            for entry in &result.listing {
                eprintln!("{entry}");
            }
        }
    }
}

fn run_build(args: &BuildArgs) -> Result<(), i32> {
    let inputs = collect_inputs(args).map_err(|e| {
        eprintln!("{}", e.format_for_stderr());
        1
    })?;
    if inputs.is_empty() {
        eprintln!("warning: no .asm files found");
        return Ok(());
    }

    let options = args.options();
    let batch = assemble_batch(&inputs, &options);
    report(&batch, &options);

    if batch.all_succeeded() {
        Ok(())
    } else {
        eprintln!(
            "{} of {} files failed to assemble",
            batch.failed_count(),
            batch.outcomes.len()
        );
        Err(1)
    }
}

fn run_disasm(file: &Path) -> Result<(), i32> {
    let text = fs::read_to_string(file).map_err(|e| {
        eprintln!("{}", AssembleError::io(file, &e).format_for_stderr());
        1
    })?;
    let words = parse_hack_text(&text).map_err(|e| {
        eprintln!("{}", AssembleError::from(e).in_file(file).format_for_stderr());
        1
    })?;

    for row in disassemble(&words) {
        println!(
            "{:05}: {}  {}",
            row.address,
            format_word(row.raw_word),
            row.text
        );
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match &cli.command {
        Command::Build(args) => run_build(args),
        Command::Disasm { file } => run_disasm(file),
    };

    process::exit(outcome.err().unwrap_or(0));
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("hack-asm").chain(args.iter().copied()))
    }

    fn build_args(args: &[&str]) -> BuildArgs {
        match parse(args).expect("valid build args should parse").command {
            Command::Build(build) => build,
            Command::Disasm { .. } => panic!("expected build command"),
        }
    }

    #[test]
    fn parses_build_command() {
        let cli = parse(&["build", "Add.asm", "Max.asm", "-o", "out", "--listing", "-v"])
            .expect("valid build args should parse");

        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            Command::Build(BuildArgs {
                files: vec![PathBuf::from("Add.asm"), PathBuf::from("Max.asm")],
                all: None,
                out_dir: Some(PathBuf::from("out")),
                listing: true,
                check: false,
            })
        );
    }

    #[rstest]
    #[case(&["build", "--all"], Some("."))]
    #[case(&["build", "--all=progs"], Some("progs"))]
    #[case(&["build", "x.asm"], None)]
    fn all_takes_optional_directory(#[case] args: &[&str], #[case] expected: Option<&str>) {
        assert_eq!(build_args(args).all, expected.map(PathBuf::from));
    }

    #[test]
    fn file_after_all_stays_a_file() {
        let args = build_args(&["build", "--all", "Add.asm"]);
        assert_eq!(args.all, Some(PathBuf::from(".")));
        assert_eq!(args.files, [PathBuf::from("Add.asm")]);
    }

    #[test]
    fn build_requires_inputs() {
        assert!(parse(&["build"]).is_err());
    }

    #[test]
    fn parses_disasm_command() {
        let cli = parse(&["disasm", "Add.hack"]).expect("disasm should parse");
        assert_eq!(
            cli.command,
            Command::Disasm {
                file: PathBuf::from("Add.hack")
            }
        );
    }

    #[test]
    fn rejects_unknown_command() {
        assert!(parse(&["link", "a.asm"]).is_err());
    }

    #[test]
    fn options_follow_flags() {
        let options = build_args(&["build", "a.asm", "--check", "--out-dir", "bin"]).options();
        assert_eq!(
            options,
            AssembleOptions {
                out_dir: Some(PathBuf::from("bin")),
                listing: false,
                check_only: true,
            }
        );
    }

    #[test]
    fn explicit_files_pass_through() {
        let inputs = collect_inputs(&build_args(&["build", "b.asm", "a.asm"])).unwrap();
        assert_eq!(inputs, [PathBuf::from("b.asm"), PathBuf::from("a.asm")]);
    }
}
