// Command-line front end for Oxideflate.
//
// Subcommands:
//   compress  stream stdin/file into a zlib or raw DEFLATE stream
//   config    print build/configuration details

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::io::{CompressStats, compress_stream};
use crate::params::{DeflateOptions, Level, MEM_LEVEL, Strategy, WINDOW_BITS};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const DEFAULT_LEVEL: u32 = 6;

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// DEFLATE stream compressor.
#[derive(Parser, Debug)]
#[command(
    name = "oxideflate",
    version,
    about = "DEFLATE stream compressor",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress an input stream.
    Compress(CompressArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Default,
    Filtered,
    HuffmanOnly,
    Rle,
    Fixed,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Default => Strategy::Default,
            StrategyArg::Filtered => Strategy::Filtered,
            StrategyArg::HuffmanOnly => Strategy::HuffmanOnly,
            StrategyArg::Rle => Strategy::Rle,
            StrategyArg::Fixed => Strategy::Fixed,
        }
    }
}

#[derive(Args, Debug)]
struct CompressArgs {
    /// Input file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Compress and report sizes only (do not write output).
    #[arg(long = "check-only")]
    no_output: bool,

    /// Compression level (0-9).
    #[arg(long, short = 'l', value_parser = clap::value_parser!(u32).range(0..=9), default_value_t = DEFAULT_LEVEL)]
    level: u32,

    /// Compression strategy.
    #[arg(long, value_enum, default_value_t = StrategyArg::Default)]
    strategy: StrategyArg,

    /// Emit raw DEFLATE (no zlib header or trailer).
    #[arg(long)]
    raw: bool,

    /// Preset dictionary file.
    #[arg(long, short = 'D', value_hint = ValueHint::FilePath)]
    dictionary: Option<PathBuf>,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Compress,
    Config,
}

#[derive(Debug)]
struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    no_output: bool,
    deflate: DeflateOptions,
    dictionary_file: Option<PathBuf>,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    json_output: bool,
}

fn resolve_options(cli: Cli) -> Options {
    let quiet = cli.quiet;
    let verbose = cli.verbose.min(2);
    let force = cli.force;
    let json_output = cli.json_output;

    match cli.command {
        Cmd::Compress(args) => Options {
            command: Command::Compress,
            use_stdout: args.stdout,
            force,
            quiet,
            verbose,
            no_output: args.no_output,
            deflate: DeflateOptions {
                level: Level::from(args.level),
                strategy: args.strategy.into(),
                raw: args.raw,
            },
            dictionary_file: args.dictionary,
            input_file: args.input.or(args.input_pos),
            output_file: args.output.or(args.output_pos),
            json_output,
        },
        Cmd::Config => Options {
            command: Command::Config,
            use_stdout: false,
            force,
            quiet,
            verbose,
            no_output: false,
            deflate: DeflateOptions::default(),
            dictionary_file: None,
            input_file: None,
            output_file: None,
            json_output,
        },
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("oxideflate version {version} (Rust), Copyright (C) oxideflate contributors");
    eprintln!("Licensed under {}", env!("CARGO_PKG_LICENSE"));

    let adler32 = cfg!(feature = "adler32") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("CODEC_VERSION={}", crate::codec_version());
    eprintln!("ADLER32={adler32}");
    eprintln!("DEFAULT_LEVEL={DEFAULT_LEVEL}");
    eprintln!("WINDOW_BITS={WINDOW_BITS}");
    eprintln!("MEM_LEVEL={MEM_LEVEL}");
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Compress command
// ---------------------------------------------------------------------------

fn cmd_compress(opts: &Options) -> i32 {
    let dictionary = match &opts.dictionary_file {
        Some(path) => match std::fs::read(path) {
            Ok(data) => Some(data),
            Err(e) => {
                eprintln!("oxideflate: dictionary file: {}: {e}", path.display());
                return 1;
            }
        },
        None => None,
    };

    // Open input: file or stdin.
    let reader: Box<dyn Read> = match &opts.input_file {
        Some(path) => match File::open(path) {
            Ok(f) => Box::new(BufReader::with_capacity(BUF_SIZE, f)),
            Err(e) => {
                eprintln!("oxideflate: input file: {}: {e}", path.display());
                return 1;
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    };

    // Open output: sink, file or stdout.
    let writer: Box<dyn Write> = if opts.no_output {
        Box::new(io::sink())
    } else {
        match (opts.use_stdout, &opts.output_file) {
            (true, _) | (_, None) => {
                Box::new(BufWriter::with_capacity(BUF_SIZE, io::stdout().lock()))
            }
            (false, Some(path)) => {
                if path.exists() && !opts.force {
                    eprintln!(
                        "oxideflate: output file exists, use -f to overwrite: {}",
                        path.display()
                    );
                    return 1;
                }
                match File::create(path) {
                    Ok(f) => Box::new(BufWriter::with_capacity(BUF_SIZE, f)),
                    Err(e) => {
                        eprintln!("oxideflate: output file: {}: {e}", path.display());
                        return 1;
                    }
                }
            }
        }
    };

    let stats = match compress_stream(reader, writer, &opts.deflate, dictionary.as_deref()) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("oxideflate: compress error: {e}");
            return 1;
        }
    };

    if (opts.verbose > 0 || opts.no_output) && !opts.quiet {
        eprintln!(
            "oxideflate: input size: {}, output size: {}, ratio: {:.3}",
            stats.input_size,
            stats.output_size,
            stats.ratio()
        );
    }
    if opts.verbose > 1 && !opts.quiet {
        if let Some(sum) = stats.input_adler32 {
            eprintln!("oxideflate: input adler32: {sum:08x}");
        }
    }

    if opts.json_output {
        eprintln!("{}", stats_json(opts, &stats));
    }

    0
}

fn stats_json(opts: &Options, stats: &CompressStats) -> String {
    let json = serde_json::json!({
        "command": "compress",
        "input_size": stats.input_size,
        "output_size": stats.output_size,
        "level": opts.deflate.level.get(),
        "strategy": format!("{:?}", opts.deflate.strategy),
        "raw": opts.deflate.raw,
        "checksum": stats.checksum,
        "input_adler32": stats.input_adler32,
    });
    serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    // Warn if -c overrides output filename.
    if opts.use_stdout {
        if let Some(path) = opts.output_file.take() {
            if !opts.quiet {
                eprintln!(
                    "oxideflate: warning: -c option overrides output filename: {}",
                    path.display()
                );
            }
        }
    }

    let exit_code = match opts.command {
        Command::Compress => cmd_compress(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
