use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::env;

mod api;
mod config;
mod feed;
mod init;
mod output;
mod refresh;
mod telemetry;

#[derive(Parser)]
#[command(name = "reader", about = "RSS feed refresher and JSON API")]
struct Cli {
    #[arg(global = true, short, long)]
    dsn: Option<String>,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Init(init::InitCmd),
    /// Manage feeds
    Feed(feed::FeedCmd),
    /// Refresh one feed or all active feeds
    Refresh(refresh::RefreshCmd),
    /// Serve the HTTP API
    Serve(api::ServeCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    telemetry::config::mark_start();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // logs go to stderr; respects RUST_LOG and READER_LOG_FORMAT
    telemetry::config::init_tracing();
    let dsn = cli
        .dsn
        .or_else(|| env::var("DATABASE_URL").ok())
        .context("Please provide --dsn or set DATABASE_URL in .env")?;

    let pool = init::connect(&dsn).await?;

    match cli.command {
        Commands::Init(args) => init::run(&pool, args).await?,
        Commands::Feed(args) => feed::run(&pool, args).await?,
        Commands::Refresh(args) => refresh::run(&pool, args).await?,
        Commands::Serve(args) => api::run(&pool, args).await?,
    }

    Ok(())
}
