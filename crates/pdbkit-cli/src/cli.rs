use clap::{Args, Parser, Subcommand, ValueEnum};
use pdbkit::workflows::symmetry::OperatorSet;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "pdbkit CLI - Load PDB structure files and work with their symmetry operators.",
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

    /// Path to a TOML configuration file.
    /// Defaults to `config.toml` in the platform configuration directory, if present.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a structure and print a summary of its chains, entities and operators.
    Inspect(InspectArgs),
    /// List the bonds of a structure as a drawing style would render them.
    Bonds(BondsArgs),
    /// Apply one of a structure's operator lists to its coordinates.
    Symmetry(SymmetryArgs),
    /// Build the matrix for a symmetry operation string such as '-x,y+1/2,-z'.
    Symop(SymopArgs),
}

/// Loader options shared by every command that reads a structure.
#[derive(Args, Debug, Clone, Default)]
pub struct LoaderArgs {
    /// Read every MODEL block, giving each model its own chains.
    #[arg(long)]
    pub models_as_subunits: bool,

    /// Ignore CONECT records.
    #[arg(long)]
    pub no_connectivity: bool,

    /// Override the decompressed-to-compressed size ratio used for gzip progress.
    #[arg(long, value_name = "INT")]
    pub gzip_size_factor: Option<u64>,

    /// Override the User-Agent sent with network requests.
    #[arg(long, value_name = "STRING")]
    pub user_agent: Option<String>,

    /// Override the network timeout, in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S loader.read-connectivity=false
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum SummaryFormat {
    #[default]
    Text,
    Toml,
    /// One row per chain.
    Csv,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// A path, `file:` URL or http(s) URL naming a .pdb or .ent file (optionally gzipped).
    #[arg(required = true, value_name = "SOURCE")]
    pub source: String,

    #[command(flatten)]
    pub loader: LoaderArgs,

    /// Output format of the summary.
    #[arg(short, long, value_enum, default_value_t = SummaryFormat::Text)]
    pub format: SummaryFormat,
}

/// Arguments for the `bonds` subcommand.
#[derive(Args, Debug)]
pub struct BondsArgs {
    #[arg(required = true, value_name = "SOURCE")]
    pub source: String,

    #[command(flatten)]
    pub loader: LoaderArgs,

    /// Bond drawing style: simple, split or order. Defaults to the registry default.
    #[arg(long, value_name = "NAME")]
    pub form: Option<String>,

    /// Drawn atom radius as a fraction of the element radius.
    #[arg(long, value_name = "FLOAT", default_value_t = 0.25)]
    pub atom_scale: f32,
}

/// Arguments for the `symmetry` subcommand.
#[derive(Args, Debug)]
pub struct SymmetryArgs {
    #[arg(required = true, value_name = "SOURCE")]
    pub source: String,

    #[command(flatten)]
    pub loader: LoaderArgs,

    /// Operator list to apply: crystallographic, biological or ncs.
    #[arg(short, long, value_name = "SET", default_value = "crystallographic")]
    pub operators: OperatorSet,

    /// Print every transformed coordinate as CSV instead of a per-operator summary.
    #[arg(long)]
    pub coordinates: bool,
}

/// Arguments for the `symop` subcommand.
#[derive(Args, Debug)]
pub struct SymopArgs {
    /// The operation, e.g. '-x,y+1/2,-z' or '1/2-X,Y,Z'.
    #[arg(required = true, allow_hyphen_values = true, value_name = "OPERATION")]
    pub operation: String,

    /// Unit cell as 'a,b,c,alpha,beta,gamma' to also print the Cartesian operator.
    #[arg(long, value_name = "CELL")]
    pub cell: Option<String>,

    /// A point 'x,y,z' to transform with the operator.
    #[arg(long, value_name = "POINT", allow_hyphen_values = true)]
    pub apply: Option<String>,
}
