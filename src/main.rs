mod api;
mod config;
mod provider;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use provider::vercel::VercelClient;

#[derive(Parser, Debug)]
#[command(name = "vercel-domains")]
#[command(about = "A small service for managing custom domains on a Vercel project")]
struct Args {
    /// Path to the configuration file (defaults to config.toml if present;
    /// environment variables override it)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // .env is optional
    dotenvy::dotenv().ok();

    // Load configuration first (before logger init)
    let config = config::Config::load_with_env(args.config.as_deref())?;

    // Initialize logger with config log level (env var takes precedence)
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.server.log_level)
    ).init();

    info!(
        "Loaded configuration from: {}",
        args.config
            .as_deref()
            .map_or(config::DEFAULT_CONFIG_PATH.into(), |p| p.display().to_string())
    );
    info!(
        "Project {} ({} protected domain(s): {:?})",
        config.vercel.project_id,
        config.vercel.site_domains.len(),
        config.vercel.site_domains
    );

    let client = VercelClient::new(config.vercel.clone())
        .context("Failed to build HTTP client")?;

    // Create router
    let app = api::create_router(config.clone(), client);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Domain endpoints: /domains/{{domain}}[/dns|/verify], POST /redeploy");

    axum::serve(listener, app).await?;

    Ok(())
}
