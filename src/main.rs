//! Invoice Relay Server
//!
//! Renders invoices to PDF, emails them, and verifies provider
//! delivery-status webhooks.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use invoice_relay::config::AppConfig;
use invoice_relay::email::{EmailSender, NoopSender, ResendClient};
use invoice_relay::pipeline::InvoicePipeline;
use invoice_relay::server::{app_router, AppState};

/// Invoice Relay Server
#[derive(Parser, Debug)]
#[command(name = "invoice-relay")]
#[command(version)]
#[command(about = "Invoice rendering and delivery service")]
struct Args {
    /// Port to listen on (falls back to PORT env, then 3000)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    if config.signing_secret.is_none() {
        tracing::warn!("WEBHOOK_SIGNING_SECRET not set; webhook verification will answer 401");
    }

    let sender: Arc<dyn EmailSender> = match &config.api_key {
        Some(key) => Arc::new(ResendClient::new(key.clone())),
        None => {
            tracing::warn!("RESEND_API_KEY not set; emails will be logged, not sent");
            Arc::new(NoopSender)
        }
    };

    let port = args.port.or(config.port).unwrap_or(3000);
    let addr = format!("{}:{}", args.host, port);

    let pipeline = InvoicePipeline::new(config.clone(), sender);
    let app = app_router(Arc::new(AppState { config, pipeline }));

    tracing::info!(%addr, "invoice-relay listening");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
