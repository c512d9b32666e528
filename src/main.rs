//! Demo echo server.
//!
//! ```text
//!   browser / demo-client
//!        │  input-text-{i}, input-image-{i}, socket-id
//!        ▼
//!   ┌──────────────┐   text/images    ┌─────────────┐
//!   │ DemoRequest  │ ───────────────▶ │ echo handler│
//!   │ (extraction) │                  └──────┬──────┘
//!   └──────────────┘                         │ send_*
//!                                            ▼
//!                          ┌──────────── Dispatcher ────────────┐
//!                          │ no socket-id      │ socket-id      │
//!                          ▼                   ▼                │
//!                   JSON response     POST relay /event ────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use vision_relay::config::loader::load_config;
use vision_relay::config::{DemoConfig, DeploymentToken};
use vision_relay::http::{bind, DemoServer};
use vision_relay::observability::{logging, metrics};
use vision_relay::{DemoRequest, DemoResult, ExtractionMode, Finished};

#[derive(Parser)]
#[command(name = "vision-relay")]
#[command(about = "Echo demo: returns or relays the texts and images it receives", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Deployment token; overrides the listener address.
    #[arg(short, long)]
    token: Option<String>,

    /// Route the demo handler is registered on.
    #[arg(short, long, default_value = "/event")]
    route: String,
}

/// Echo every text (and image, if any) back through the dispatcher.
async fn echo(mut req: DemoRequest) -> DemoResult<Finished> {
    let texts = req.text_array()?;
    req.cache().save_text_array(&texts)?;
    req.send_text_array(&texts).await?;

    if req.image_count()? > 0 {
        let images = req.image_array(ExtractionMode::FilePath)?;
        req.send_image_array(&images).await?;
    }

    Ok(req.finish())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DemoConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("vision-relay v{} starting", env!("CARGO_PKG_VERSION"));

    if let Some(raw) = &cli.token {
        let token = DeploymentToken::parse(raw)?;
        config.listener.bind_address = token.bind_address();
        tracing::info!(
            target_kind = %token.target,
            port = token.port,
            "Deployment token accepted"
        );
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        relay = %config.relay.server_base,
        cache_root = %config.cache.root,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = bind(&config).await?;
    let server = DemoServer::new(config)?.listen(&cli.route, echo);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
