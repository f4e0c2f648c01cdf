//! cw-gateway: WhatsApp to Chatwoot relay binary
//!
//! Usage:
//!   cw-gateway                  - Start the relay server
//!   cw-gateway --config <path>  - Start with an explicit TOML config
//!   cw-gateway --check-config   - Validate the configuration and exit
//!   cw-gateway --help           - Show help

use std::sync::Arc;

use cw_api::AppState;
use cw_chatwoot::{ChatwootApi, ChatwootGateway};
use cw_core::{Config, ContactDirectory};
use cw_relay::WebhookDispatcher;
use cw_whatsapp::CloudApiClient;
use tracing_subscriber::EnvFilter;

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// Relay server
    Server,
    /// Load and validate the configuration only
    CheckConfig,
    /// Show help
    Help,
    /// Show version
    Version,
}

/// Parsed command line
#[derive(Debug, PartialEq, Eq)]
struct Args {
    mode: RunMode,
    config_path: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    match args.mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("cw-gateway {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load(args.config_path.as_deref())
        .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    if args.mode == RunMode::CheckConfig {
        println!("Configuration OK");
        println!("  Meta API URL:     {}", config.meta.api_url);
        println!("  Chatwoot URL:     {}", config.chatwoot.base_url);
        println!("  Chatwoot account: {}", config.chatwoot.account_id);
        println!("  Chatwoot inbox:   {}", config.chatwoot.inbox_id);
        println!("  Port:             {}", config.server.port);
        return Ok(());
    }

    run_server(config).await
}

/// Parse command line arguments
fn parse_args<I>(args: I) -> anyhow::Result<Args>
where
    I: IntoIterator<Item = String>,
{
    let mut mode = RunMode::Server;
    let mut config_path = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Args { mode: RunMode::Help, config_path }),
            "--version" | "-v" => return Ok(Args { mode: RunMode::Version, config_path }),
            "--check-config" => mode = RunMode::CheckConfig,
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a path"))?;
                config_path = Some(path);
            }
            // Logging is not initialized yet
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
    }

    Ok(Args { mode, config_path })
}

/// Print help message
fn print_help() {
    println!("cw-gateway - WhatsApp to Chatwoot relay");
    println!();
    println!("Usage:");
    println!("  cw-gateway                  Start the relay server");
    println!("  cw-gateway --config <path>  Load configuration from a TOML file");
    println!("  cw-gateway --check-config   Validate the configuration and exit");
    println!("  cw-gateway --help           Show this help message");
    println!("  cw-gateway --version        Show version");
    println!();
    println!(
        "Without --config, {} is used when present, else the environment.",
        cw_core::config::DEFAULT_CONFIG_FILE
    );
    println!();
    println!("Environment Variables:");
    println!("  META_VERIFY_TOKEN    Webhook verification token (required)");
    println!("  META_API_TOKEN       WhatsApp Cloud API bearer token (required)");
    println!("  META_API_URL         Cloud API messages endpoint (required)");
    println!("  CHATWOOT_URL         Chatwoot base URL (required)");
    println!("  CHATWOOT_API_TOKEN   Chatwoot api_access_token (required)");
    println!("  CHATWOOT_ACCOUNT_ID  Chatwoot account id (required)");
    println!("  CHATWOOT_INBOX_ID    Chatwoot inbox id (required)");
    println!("  PORT                 HTTP port (default: 5000)");
    println!("  AUTO_REPLY_MESSAGE   Auto-reply text (default: Obrigado pela sua mensagem!)");
}

/// Run the relay server until Ctrl+C
async fn run_server(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting cw-gateway...");

    let directory = ContactDirectory::in_memory();

    let whatsapp = CloudApiClient::from_config(&config.meta)
        .map_err(|e| anyhow::anyhow!("Failed to create WhatsApp client: {}", e))?;
    let chatwoot_api = ChatwootApi::from_config(&config.chatwoot)
        .map_err(|e| anyhow::anyhow!("Failed to create Chatwoot client: {}", e))?;
    let chatwoot = ChatwootGateway::new(chatwoot_api, directory.clone());

    let dispatcher = WebhookDispatcher::new(
        Arc::new(whatsapp),
        Arc::new(chatwoot),
        directory,
        config.relay.auto_reply.clone(),
    );
    let state = AppState::new(dispatcher, config.meta.verify_token.clone());

    let port = config.server.port;
    let handle = tokio::spawn(async move {
        if let Err(e) = cw_api::start_server(port, state).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tracing::info!("cw-gateway initialized successfully");
    tracing::info!("Press Ctrl+C to exit");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    handle.abort();

    Ok(())
}
