use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use bmcp_app::McpServer;
use bmcp_app::STARTUP_FAILURE_EXIT_CODE;
use bmcp_app::ServerConfig;
use bmcp_app::cli::Cli;
use bmcp_app::shutdown_handler;
use bmcp_app::tracing_setup;
use bmcp_http::BinanceClient;
use bmcp_http::ExchangeClient;
use bmcp_tools::tools::server_info::SERVER_NAME;
use clap::Parser;
use tokio::io::BufReader;
use tracing::error;
use tracing::info;
use tracing::warn;

/// Everything up to the first served request; any failure here exits with 84
async fn startup(cli: &Cli) -> anyhow::Result<(McpServer, tokio::sync::watch::Receiver<bool>)> {
    let mut config = ServerConfig::load().context("Configuration error")?;
    if cli.testnet {
        config.testnet = true;
    }

    let client = BinanceClient::builder().testnet(config.testnet).api_key(config.api_key.clone()).build().context("Failed to build Binance client")?;

    info!(testnet = config.testnet, spot = client.spot_url(), futures = client.futures_url(), "Binance client ready");
    if !client.can_sign() {
        warn!("No request signer configured, signed account and order tools will return tool_error");
    }

    client.ping().await.context("Failed to reach Binance")?;
    info!("Connectivity check passed");

    let shutdown = shutdown_handler::setup().context("Failed to install Ctrl+C handler")?;
    let server = McpServer::from_config(&config, Arc::new(client));

    info!(tools = server.registry().names().len(), validate_symbols = config.mcp_validate_symbol_exists, "Server initialized");

    Ok((server, shutdown))
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Keep guard alive for the entire application lifetime
    let _guard = tracing_setup::init(SERVER_NAME, cli.log_level, cli.log_dir.as_deref());

    let (server, shutdown) = match startup(&cli).await {
        Ok(ready) => ready,
        Err(err) => {
            error!("{err:#}");
            return ExitCode::from(STARTUP_FAILURE_EXIT_CODE);
        }
    };

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    match server.run(stdin, stdout, shutdown).await {
        Ok(()) => {
            info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "Server I/O failure");
            ExitCode::FAILURE
        }
    }
}
