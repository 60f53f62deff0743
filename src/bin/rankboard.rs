//! CLI entry point for the `rankboard` command-line tool.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use rankboard::cli::commands;
use rankboard::{load_config, BoardConfig, BoardError};

#[derive(Parser)]
#[command(
    name = "rankboard",
    about = "Rankboard CLI: inspect and edit live event board snapshots"
)]
struct Cli {
    /// Output format: "text" (default) or "json"
    #[arg(long, default_value = "text")]
    format: String,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new snapshot file for an event with no posts
    Create {
        /// Path to the snapshot file to create
        file: PathBuf,
        /// Event title
        #[arg(long, default_value = "Default Event Title")]
        title: String,
        /// Event start, Unix epoch milliseconds (default: now)
        #[arg(long)]
        start: Option<i64>,
    },
    /// Display information about a snapshot
    Info {
        /// Path to the snapshot file
        file: PathBuf,
    },
    /// Add a post to the board
    Post {
        /// Path to the snapshot file
        file: PathBuf,
        /// Post text
        text: String,
        /// Author display name
        #[arg(long, default_value = "default name")]
        author: String,
        /// Author affiliation
        #[arg(long, default_value = "nowhere")]
        affiliation: String,
        /// Author user id
        #[arg(long)]
        author_id: Option<String>,
    },
    /// Print posts in rank order
    Rank {
        /// Path to the snapshot file
        file: PathBuf,
        /// Show at most this many posts
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Vote on a post
    Vote {
        /// Path to the snapshot file
        file: PathBuf,
        /// Post ID
        post_id: String,
        /// Voter user id (omit for an anonymous vote)
        #[arg(long)]
        voter: Option<String>,
        /// Vote time, Unix epoch milliseconds (default: now)
        #[arg(long)]
        at: Option<i64>,
    },
    /// Promote a post
    Promote {
        /// Path to the snapshot file
        file: PathBuf,
        /// Post ID
        post_id: String,
        /// Promotion time, Unix epoch milliseconds (default: now)
        #[arg(long)]
        at: Option<i64>,
    },
    /// Check a user's name and affiliation lengths
    ValidateUser {
        /// Display name
        name: String,
        /// Affiliation
        affiliation: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let json = match cli.format.as_str() {
        "json" => true,
        "text" => false,
        other => {
            eprintln!("Invalid format: {}", other);
            process::exit(3);
        }
    };

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(2);
            }
        },
        None => BoardConfig::default(),
    };

    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Create { file, title, start } => {
            commands::cmd_create(&file, &title, start, &config, json)
        }
        Commands::Info { file } => commands::cmd_info(&file, &config, json),
        Commands::Post {
            file,
            text,
            author,
            affiliation,
            author_id,
        } => commands::cmd_post(
            &file,
            &text,
            &author,
            &affiliation,
            author_id.as_deref(),
            &config,
            json,
        ),
        Commands::Rank { file, limit } => commands::cmd_rank(&file, limit, &config, json),
        Commands::Vote {
            file,
            post_id,
            voter,
            at,
        } => commands::cmd_vote(&file, &post_id, voter.as_deref(), at, &config, json),
        Commands::Promote { file, post_id, at } => {
            commands::cmd_promote(&file, &post_id, at, &config, json)
        }
        Commands::ValidateUser { name, affiliation } => {
            commands::cmd_validate_user(&name, &affiliation, json)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let code = match &e {
            BoardError::Io(_) => 1,
            BoardError::Json(_) | BoardError::Config(_) => 2,
            BoardError::Validation(_) => 3,
            BoardError::PostNotFound(_) => 4,
            _ => 5,
        };
        process::exit(code);
    }
}
