mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, warn};

use chatvault_storage::{
    DriveConfig, FolderId, GoogleDriveStore, MemoryStore, ObjectStore, PathResolver,
};
use chatvault_transcribe::{Transcriber, TranscriberConfig};
use chatvault_webhook::{webhook_router, Archiver, LineClient, WebhookConfig, WebhookState};

use config::Config;

#[derive(Parser)]
#[command(name = "chatvault")]
#[command(about = "chatvault: webhook receiver that archives chat messages to cloud storage")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show server health
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init_logger(&config.log_dir, &config.log_level);

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { port } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Status => {
            let client = reqwest::Client::new();
            match client
                .get(format!("http://localhost:{}/webhook", config.port))
                .send()
                .await
            {
                Ok(resp) => {
                    let body: serde_json::Value = resp.json().await?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                Err(_) => {
                    println!("chatvault is not running on port {}", config.port);
                }
            }
        }
    }

    Ok(())
}

fn build_store(config: &Config) -> Result<(Arc<dyn ObjectStore>, FolderId)> {
    match config.storage_backend.as_str() {
        "drive" => {
            let drive = GoogleDriveStore::new(DriveConfig {
                client_id: config
                    .google_client_id
                    .clone()
                    .context("GOOGLE_CLIENT_ID is required for the drive backend")?,
                client_secret: config
                    .google_client_secret
                    .clone()
                    .context("GOOGLE_CLIENT_SECRET is required for the drive backend")?,
                refresh_token: config
                    .google_refresh_token
                    .clone()
                    .context("GOOGLE_REFRESH_TOKEN is required for the drive backend")?,
                root_folder_id: config
                    .google_drive_folder_id
                    .clone()
                    .context("GOOGLE_DRIVE_FOLDER_ID is required for the drive backend")?,
            });
            let root = drive.root();
            Ok((Arc::new(drive), root))
        }
        "memory" => {
            warn!("Using the in-memory store; archived content is lost on restart");
            let store = MemoryStore::new();
            let root = store.root();
            Ok((Arc::new(store), root))
        }
        other => bail!("unknown storage backend '{other}' (expected 'drive' or 'memory')"),
    }
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        backend = %config.storage_backend,
        "Starting chatvault"
    );

    let (store, root) = build_store(&config)?;
    let resolver = PathResolver::new(store.clone(), root);
    let mut archiver = Archiver::new(store, resolver);

    if let Some(token) = &config.line_access_token {
        archiver = archiver.with_platform(Arc::new(LineClient::new(token.clone())));
    } else {
        warn!("No LINE access token; binary attachments and replies are disabled");
    }

    if let Some(api_key) = &config.openai_api_key {
        archiver = archiver.with_transcriber(Arc::new(Transcriber::new(TranscriberConfig {
            api_key: api_key.clone(),
            ..TranscriberConfig::default()
        })));
        info!("Voice transcription enabled");
    }

    let channel_secret = config.line_channel_secret.clone().unwrap_or_default();
    if channel_secret.is_empty() && !config.allow_unsigned {
        bail!("LINE_CHANNEL_SECRET is unset; set it or opt in with CHATVAULT_ALLOW_UNSIGNED=1");
    }
    if config.allow_unsigned {
        warn!("Signature verification is DISABLED (CHATVAULT_ALLOW_UNSIGNED)");
    }

    let state = WebhookState {
        archiver: Arc::new(archiver),
        config: WebhookConfig {
            channel_secret,
            allow_unsigned: config.allow_unsigned,
        },
    };

    let app = webhook_router(state);
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .context("invalid bind address")?;
    info!("Webhook server listening on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
