//! Scrivener CLI: the main entry point.
//!
//! Commands:
//! - `init`: Create config, prompt template and data folder
//! - `run`: Send one prompt and log the transcript
//! - `chat`: Interactive refactoring session

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "scrivener",
    about = "Scrivener — prompt orchestration with tool-calling agents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration, prompt template and data folder
    Init,

    /// Send a single prompt
    Run {
        /// The prompt text
        #[arg(short, long)]
        prompt: String,

        /// Extra instructions appended to the system prompt template
        #[arg(short, long)]
        system: Option<String>,

        /// Agent mode: none or refactor
        #[arg(short, long)]
        mode: Option<String>,

        /// Transcript file name (without .txt); defaults to the timestamp
        #[arg(short, long)]
        output: Option<String>,

        /// Attach a file's contents as a code block
        #[arg(long)]
        code_file: Option<PathBuf>,

        /// Skip the model call and answer from the data folder
        #[arg(long)]
        dry_run: bool,
    },

    /// Start an interactive chat session in refactor mode
    Chat {
        /// Show tool calls and results in the conversation
        #[arg(long)]
        show_tools: bool,

        /// Skip model calls and answer from the data folder
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Run {
            prompt,
            system,
            mode,
            output,
            code_file,
            dry_run,
        } => {
            commands::run::run(commands::run::RunArgs {
                prompt,
                system,
                mode,
                output,
                code_file,
                dry_run,
            })
            .await?
        }
        Commands::Chat {
            show_tools,
            dry_run,
        } => commands::chat::run(show_tools, dry_run).await?,
    }

    Ok(())
}
