use clap::Parser;
use numrot_gateway::adapter::inbound::cli::{self, command::Cli};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(2);
        }
    };

    config.init_logging();
    info!(version = env!("CARGO_PKG_VERSION"), "numrot-gateway starting");

    if let Err(e) = cli::execute(&cli, &config).await {
        error!(error = %e, status = e.http_status(), "Command failed");
        return Err(e.into());
    }
    Ok(())
}
