mod client_setup;
mod commands;
mod config;
mod logging;
mod render;

use clap::Parser;
use client_setup::build_queries;
use commands::Cli;
use config::Config;
use logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config.api_url = url.trim_end_matches('/').to_string();
    }

    let queries = build_queries(&config)?;
    let gc = (!config.gc_time.is_zero()).then(|| queries.cache().spawn_gc(config.gc_time));
    let outcome = commands::run(cli.command, &queries, &config).await;
    if let Some(gc) = gc {
        gc.abort();
    }
    outcome
}
