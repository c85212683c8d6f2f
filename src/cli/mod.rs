use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod auth;
pub mod sync;

use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Authorize access to Gmail, Drive, Docs and Sheets and store the token
    Auth {},
    /// Copy the messages of a date window into Drive documents and spreadsheets
    Sync {
        /// First day of the window, YYYY/MM/DD
        #[arg(long)]
        start: Option<String>,
        /// Day after the last day of the window, YYYY/MM/DD
        #[arg(long)]
        end: Option<String>,
        /// Sync today's messages instead of the default window
        #[arg(long, action, default_value = "false", conflicts_with_all = ["start", "end"])]
        today: bool,
        /// Name of the top level Drive folder
        #[arg(long)]
        root: Option<String>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    init_tracing();

    let config = AppConfig::default();

    match args.command {
        Some(Command::Auth {}) => {
            auth::run(&config).await?;
        }
        Some(Command::Sync {
            start,
            end,
            today,
            root,
        }) => {
            let window = sync::Window::from_args(start, end, today);
            sync::run(&config, window, root).await?;
        }
        // No subcommand runs the default sync
        None => {
            sync::run(&config, sync::Window::default(), None).await?;
        }
    }

    Ok(())
}
