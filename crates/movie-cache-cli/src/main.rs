use clap::{ArgAction, Parser, Subcommand};
use commands::context::AppContext;
use commands::{clear, config, movies};
use movie_cache_models::MovieId;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "movies")]
#[command(about = "Browse top-rated movies with a local cache and favorites")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one page of the discovery listing
    #[command(long_about = "Fetch one page of top-rated movies from TMDB, merge it into the local store and print it with local favorite flags.")]
    Page {
        /// Page number (1-based)
        #[arg(default_value_t = 1)]
        page: u32,
    },
    /// Fetch and show one movie's details
    Detail {
        /// TMDB movie id
        id: MovieId,
    },
    /// Toggle the favorite flag of a stored movie
    #[command(long_about = "Flip the local favorite flag of a movie. The movie must already be in the local store, so list or open it first.")]
    Favorite {
        /// TMDB movie id
        id: MovieId,
    },
    /// Show whether a movie is a favorite
    Status {
        /// TMDB movie id
        id: MovieId,
    },
    /// Load several pages the way a scrolling list would
    Browse {
        /// Number of pages to load
        #[arg(long, default_value_t = 2)]
        pages: u32,
    },
    /// Manage configuration and the API key
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Remove every stored movie, favorites included
    Clear,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a default config file and optionally store the API key
    Init {
        /// TMDB API key to store in the credentials file
        #[arg(long)]
        api_key: Option<String>,

        /// Overwrite an existing config file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Show the effective configuration (masks the API key)
    Show,
}

/// Load the context and start logging with its configured log file.
fn prepare(cli: &Cli) -> color_eyre::Result<AppContext> {
    let ctx = AppContext::load()?;
    logging::init_logging(cli.verbose, cli.quiet, ctx.config.logging.file.clone())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    Ok(ctx)
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let output = output::Output::new(cli.output, cli.quiet);

    match &cli.command {
        Commands::Config { cmd } => {
            // Config commands run without loading config.toml
            logging::init_logging(cli.verbose, cli.quiet, None).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
            config::run_config(cmd, &output).await
        }
        Commands::Page { page } => movies::run_page(&prepare(&cli)?, *page, &output).await,
        Commands::Detail { id } => movies::run_detail(&prepare(&cli)?, *id, &output).await,
        Commands::Favorite { id } => movies::run_favorite(&prepare(&cli)?, *id, &output).await,
        Commands::Status { id } => movies::run_status(&prepare(&cli)?, *id, &output).await,
        Commands::Browse { pages } => movies::run_browse(&prepare(&cli)?, *pages, &output).await,
        Commands::Clear => clear::run_clear(&prepare(&cli)?, &output).await,
    }
}
