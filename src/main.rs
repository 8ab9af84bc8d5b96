//! webcat - a text file and a handful of database query results on one page.

mod cli;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use cli::Cli;
use tracing::{error, info, warn};
use webcat::config::Config;
use webcat::error::WebcatError;
use webcat::logging;
use webcat::web::{self, AppContext};

fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    match &cli.log_file {
        Some(path) => logging::init_file_logging(path),
        None => logging::init_stderr_logging(),
    }

    if let Err(e) = run(cli) {
        match e.downcast_ref::<WebcatError>() {
            Some(err) => error!("{}: {}", err.category(), err),
            None => error!("{e:#}"),
        }
        std::process::exit(1);
    }
}

#[tokio::main]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    cli.apply_overrides(&mut config);

    let ctx = AppContext::from_config(&config)?;

    if config.is_synthetic() {
        warn!("No servers configured, serving synthetic data");
    } else {
        for (name, server) in &config.servers {
            info!("Server '{}': {}", name, server.display_string());
        }
    }

    if cli.check {
        println!("Configuration OK: {}", config_path.display());
        println!(
            "  {} queries, {} servers, {} mode",
            config.queries.len(),
            config.servers.len(),
            if ctx.is_streaming() { "streaming" } else { "eager" }
        );
        return Ok(());
    }

    let addr: SocketAddr = config
        .http
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.http.bind))?;

    web::serve(Arc::new(ctx), addr).await?;
    Ok(())
}
