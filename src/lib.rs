//! Invoice Relay - Invoice Rendering & Delivery Service
//!
//! This crate provides a small HTTP service that accepts structured
//! invoice requests, renders them into PDF documents, emails them to
//! clients, and verifies the email provider's signed delivery-status
//! webhooks.
//!
//! # Features
//!
//! - **Document Layout Engine**: deterministic cursor-based rendering of
//!   line-item tables into fixed-page PDF documents
//! - **Signed Webhooks**: timestamped HMAC-SHA256 verification with
//!   constant-time comparison and replay protection
//! - **Event Routing**: total classification of delivery events into
//!   severity-mapped outcomes
//! - **Injected Email Capability**: the provider client is constructed at
//!   startup and passed into the pipeline, never a hidden singleton
//!
//! # Architecture
//!
//! ```text
//! POST /invoice ──▶ InvoicePipeline ──▶ DocumentLayoutEngine ──▶ PDF bytes
//!                        │                                         │
//!                        ▼                                         ▼
//!                   EmailSender ◀──────────── attachment ──────────┘
//!
//! POST /webhooks/resend ──▶ SignatureVerifier ──▶ VerifiedEvent ──▶ route()
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use invoice_relay::config::AppConfig;
//! use invoice_relay::email::NoopSender;
//! use invoice_relay::pipeline::InvoicePipeline;
//! use invoice_relay::server::{app_router, AppState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let pipeline = InvoicePipeline::new(config.clone(), Arc::new(NoopSender));
//!     let app = app_router(Arc::new(AppState { config, pipeline }));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod document;
pub mod email;
pub mod error;
pub mod invoice;
pub mod pipeline;
pub mod server;
pub mod webhook;

// Re-exports for convenience
pub use config::AppConfig;
pub use document::{DocumentLayoutEngine, RenderedDocument};
pub use error::{Error, Result};
pub use invoice::{Invoice, InvoiceId, LineItem};
pub use pipeline::{InvoicePipeline, InvoiceRequest, PipelineResult};
pub use webhook::{EventKind, SignatureVerifier, VerifiedEvent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
