use clap::Parser;
use infrastructure::config::Config;
use presentation::cli::{Cli, CliApp};
use shared::telemetry::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = Config::load();
    tracing::debug!("Loaded configuration: {:?}", config);
    let app = CliApp::new(config);
    app.run(cli).await
}
