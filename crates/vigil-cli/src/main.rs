mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    cache::CacheSubcommand, config::ConfigSubcommand, metadata::MetadataArgs, pray::PrayArgs,
    show::ShowSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "vigil",
    about = "Daily prayer pipeline: headlines in, prayer record and publish metadata out",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: nearest directory holding .vigil/)
    #[arg(long, global = true, env = "VIGIL_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daily pipeline and overwrite the prayer record
    Pray(PrayArgs),

    /// Produce the next metadata record for the current prayer's slot
    Metadata(MetadataArgs),

    /// Print persisted records
    Show {
        #[command(subcommand)]
        subcommand: ShowSubcommand,
    },

    /// Inspect and prune the headline cache
    Cache {
        #[command(subcommand)]
        subcommand: CacheSubcommand,
    },

    /// Create, show, and validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Pray(_) | Commands::Metadata(_) => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Pray(args) => cmd::pray::run(&root, args, cli.json),
        Commands::Metadata(args) => cmd::metadata::run(&root, args, cli.json),
        Commands::Show { subcommand } => cmd::show::run(&root, subcommand, cli.json),
        Commands::Cache { subcommand } => cmd::cache::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
