mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use alchemy_cli::output::OutputFormat;
use alchemy_lib::SearchAlgorithm;

use commands::batch::{handle_batch_command, BatchCommandArgs};
use commands::parse_algorithm;
use commands::recipes::handle_recipes_command;
use commands::search::{handle_search_command, SearchCommandArgs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Find crafting paths through a tiered recipe graph")]
struct Cli {
    /// Override the dataset directory or file path.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find a crafting path (or several) for one element.
    Search {
        /// Element to craft.
        target: String,
        /// Traversal order: bfs or dfs.
        #[arg(long, default_value = "bfs", value_parser = parse_algorithm)]
        algorithm: SearchAlgorithm,
        /// Search forward from the base elements and backward from the target.
        #[arg(long)]
        bidirectional: bool,
        /// Enumerate up to this many distinct paths.
        #[arg(long)]
        max_paths: Option<usize>,
        /// Enumerate several paths without giving a count.
        #[arg(long, conflicts_with = "max_paths")]
        multi: bool,
        /// Depth limit for the search.
        #[arg(long)]
        max_depth: Option<usize>,
        /// Comma-separated elements to start from instead of the base elements.
        #[arg(long, value_delimiter = ',')]
        start: Vec<String>,
    },
    /// Search several targets concurrently on the worker pool.
    Batch {
        /// Elements to craft.
        #[arg(required = true)]
        targets: Vec<String>,
        /// Traversal order: bfs or dfs.
        #[arg(long, default_value = "bfs", value_parser = parse_algorithm)]
        algorithm: SearchAlgorithm,
        /// Enumerate up to this many distinct paths per target.
        #[arg(long)]
        max_paths: Option<usize>,
        /// Worker count; defaults to ALCHEMY_WORKERS or the CPU count.
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Show an element's tier, its recipes, and what it is used in.
    Recipes {
        /// Element name.
        element: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let data_dir = cli.data_dir.as_deref();

    match cli.command {
        Command::Search {
            target,
            algorithm,
            bidirectional,
            max_paths,
            multi,
            max_depth,
            start,
        } => {
            let args = SearchCommandArgs {
                target,
                algorithm,
                bidirectional,
                max_paths,
                multi,
                max_depth,
                start,
            };
            tokio::task::block_in_place(|| handle_search_command(&args, cli.format, data_dir))
        }
        Command::Batch {
            targets,
            algorithm,
            max_paths,
            workers,
        } => {
            let args = BatchCommandArgs {
                targets,
                algorithm,
                max_paths,
                workers,
            };
            handle_batch_command(&args, cli.format, data_dir).await
        }
        Command::Recipes { element } => handle_recipes_command(&element, cli.format, data_dir),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
