mod cmd;
mod completions;
mod logging;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::engine::ArgValueCompleter;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mdi", version, about = "Schema-driven metadata intake")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print resolved paths
    Doctor,

    /// Check schema files for structural and type problems
    Lint(LintArgs),

    /// Validate a record against a schema without storing it
    Validate(ValidateArgs),

    /// Validate a record and store it
    Submit(SubmitArgs),

    /// Show the fields of a schema grouped by section
    Show(ShowArgs),

    /// Show the filter a query string parses into
    Parse(ParseArgs),

    /// Search stored records
    Search(SearchArgs),

    /// Count stored records per collection
    Stats,

    /// Write the configured collection as a JSON array
    Export(ExportArgs),

    /// Load records written by `export` into the configured collection
    Import(ImportArgs),

    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Output format for record listings.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct LintArgs {
    /// Schema files to lint (defaults to every schema in schema_dir)
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Schema name (e.g. "ID3A") or path to a schema file
    #[arg(long, add = ArgValueCompleter::new(completions::complete_schemas))]
    pub schema: String,

    /// Record JSON file; reads stdin when omitted
    pub record: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Schema name (e.g. "ID3A") or path to a schema file
    #[arg(long, add = ArgValueCompleter::new(completions::complete_schemas))]
    pub schema: String,

    /// Record JSON file; reads stdin when omitted
    pub record: Option<PathBuf>,

    /// Submitting user (defaults to $USER)
    #[arg(long)]
    pub user: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Schema name (e.g. "ID3A") or path to a schema file
    #[arg(add = ArgValueCompleter::new(completions::complete_schemas))]
    pub schema: String,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Query string: JSON object, key:value pairs or free text
    pub query: String,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Query string: JSON object, key:value pairs or free text
    pub query: String,

    /// Number of matching records to skip
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Maximum number of records to print
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Shorthand for --output json
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output file; prints to stdout when omitted
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// JSON array of records; reads stdin when omitted
    pub file: Option<PathBuf>,
}

fn main() {
    clap_complete::CompleteEnv::with_factory(Cli::command).complete();

    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Doctor => cmd::doctor::run(config, profile),
        Commands::Lint(args) => cmd::lint::run(config, profile, args),
        Commands::Validate(args) => cmd::validate::run(config, profile, args),
        Commands::Submit(args) => cmd::submit::run(config, profile, args),
        Commands::Show(args) => cmd::show::run(config, profile, args),
        Commands::Parse(args) => cmd::parse::run(config, profile, args),
        Commands::Search(args) => cmd::search::run(config, profile, args),
        Commands::Stats => cmd::stats::run(config, profile),
        Commands::Export(args) => cmd::export::run(config, profile, args),
        Commands::Import(args) => cmd::import::run(config, profile, args),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "mdi", &mut std::io::stdout());
        }
    }
}
