//! # prodspec-server
//!
//! Runs the extraction pipeline either as a webhook server (`serve`) or
//! once against a notification file (`invoke`).

use clap::{Parser, Subcommand};
use prodspec_server::{config::get_config, init_tracing, invoke, start};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a YAML config file. Defaults to `config.yml` next to this crate.
    #[arg(long, global = true, env = "PRODSPEC_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve `POST /events` for bucket notifications (the default)
    Serve,
    /// Process one notification document and print the batch response
    Invoke(InvokeArgs),
}

#[derive(Parser, Debug)]
struct InvokeArgs {
    /// Path to a JSON notification document (`{"Records": [...]}`)
    #[arg(long)]
    event: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            start(cli.config.as_deref()).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Invoke(args) => {
            let config = get_config(cli.config.as_deref())?;
            let response = invoke(config, &args.event).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            if response.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
