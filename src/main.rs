//! `file-center` — upload a document to the dashboard backend and talk
//! about it from the terminal.
//!
//! ```bash
//! file-center --config ./file-center.toml chat ./report.pdf
//! file-center ask ./report.pdf "What is the summary?"
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use file_center::commands::chat::{render, run_chat, upload_path};
use file_center::notify::{ConsoleNotifier, TracingNotifier};
use file_center::{Config, SessionError};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "file-center", version, about = "Ask questions about uploaded documents")]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session, optionally uploading FILE first.
    Chat {
        file: Option<PathBuf>,
    },
    /// Upload FILE, ask one QUESTION and print the answer.
    Ask {
        file: PathBuf,
        question: String,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("file_center=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(masked) = config.api.masked_token() {
        tracing::debug!(token = %masked, "using inline credential");
    }

    match cli.command {
        Commands::Chat { file } => {
            let center = file_center::connect(&config, ConsoleNotifier)
                .context("failed to build HTTP client")?;
            tracing::info!(base_url = %config.api.base_url, session = %center.session_id(), "session started");

            if let Some(path) = file {
                match upload_path(&center, &path).await {
                    Ok(document) => println!("Active document: {}", document.id),
                    Err(err) => eprintln!("{}", err),
                }
            }
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            run_chat(&center, &config.export.dir, stdin, &mut stdout)
                .await
                .context("terminal I/O failed")?;
        }
        Commands::Ask { file, question } => {
            let center = file_center::connect(&config, TracingNotifier)
                .context("failed to build HTTP client")?;
            tracing::info!(base_url = %config.api.base_url, session = %center.session_id(), "session started");

            upload_path(&center, &file)
                .await
                .with_context(|| format!("failed to upload {}", file.display()))?;
            match center.send(&question).await {
                Ok(answer) => println!("{}", render(&answer)),
                Err(SessionError::Transport(err)) => bail!("no answer: {}", err.detail()),
                Err(err) => return Err(err.into()),
            }
        }
    }
    Ok(())
}
