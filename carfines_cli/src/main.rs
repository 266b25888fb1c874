mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "car-tickets-notifier")]
#[command(about = "Look up traffic tickets for a plate and send the report to Telegram")]
struct Cli {
    #[command(flatten)]
    args: commands::notify::NotifyArgs,
}

/// `RUST_LOG` plus info-level defaults for the library crates and this binary.
fn env_filter() -> Result<EnvFilter> {
    Ok(EnvFilter::from_default_env()
        .add_directive("carfines=info".parse()?)
        .add_directive("car_tickets_notifier=info".parse()?))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter()?)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    commands::notify::run(&cli.args).await
}
