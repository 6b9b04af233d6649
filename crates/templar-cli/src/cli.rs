use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "Templar CLI - Selects structural templates for protein domains and refines their boundaries against the chosen structure.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Number of domain units processed in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Select and refine structural templates for every query in a catalog.
    Select(SelectArgs),
    /// Report identity, coverage, score and boundary extensions for an aligned FASTA file.
    Score(ScoreArgs),
}

/// Arguments for the `select` subcommand.
#[derive(Args, Debug)]
pub struct SelectArgs {
    // --- Core Arguments ---
    /// Path to the TOML catalog with sequences, domains, contacts, chains and queries.
    #[arg(long, required = true, value_name = "PATH")]
    pub catalog: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory that receives one template file per query.
    #[arg(short, long, default_value = "templates", value_name = "DIR")]
    pub output: PathBuf,

    /// Root directory for per-worker scratch and staged alignments.
    /// Defaults to `<output>/workspace`.
    #[arg(short, long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    // --- Refinement Overrides ---
    /// Override the maximum number of boundary refinement iterations (at most 5).
    #[arg(long, value_name = "INT")]
    pub max_iterations: Option<usize>,

    /// Override `refinement.trim-loners` from the config file.
    #[command(flatten)]
    pub trim_loners: TrimLoners,

    // --- Aligner Overrides ---
    /// Maximum number of alignments running at the same time.
    #[arg(long, value_name = "INT")]
    pub max_concurrent: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S refinement.max-iterations=3
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Mutually exclusive flags for the stranded-residue trimming stage.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct TrimLoners {
    /// Trim stranded query residues when refining the chosen template.
    #[arg(long)]
    pub trim_loners: bool,
    /// Never trim stranded query residues.
    #[arg(long)]
    pub no_trim_loners: bool,
}

/// Arguments for the `score` subcommand.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Path to an aligned FASTA file holding exactly two sequences.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub alignment: PathBuf,

    /// Coverage denominator; defaults to the ungapped length of the second sequence.
    #[arg(short, long, value_name = "INT")]
    pub max_domain_length: Option<usize>,
}
