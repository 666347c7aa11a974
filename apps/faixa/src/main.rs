//! # Faixa - Academy Graduation Server
//!
//! The main binary for the Faixa belt-graduation rules engine.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for registration, attendance, eligibility, and promotions
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │               apps/faixa (THE BINARY)            │
//! │                                                  │
//! │     ┌─────────────┐        ┌─────────────┐       │
//! │     │   CLI       │        │   HTTP API  │       │
//! │     │  (clap)     │        │   (axum)    │       │
//! │     └──────┬──────┘        └──────┬──────┘       │
//! │            │                      │              │
//! │            └──────────┬───────────┘              │
//! │                       ▼                          │
//! │               ┌──────────────┐                   │
//! │               │  faixa-core  │                   │
//! │               │ (THE RULES)  │                   │
//! │               └──────────────┘                   │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! faixa server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! faixa register -s 17 -p adult -e 2026-02-01
//! faixa attend -s 17 -d 2026-03-04
//! faixa evaluate -s 17
//! ```

use clap::Parser;
use faixa::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — FAIXA_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("FAIXA_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "faixa=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Faixa startup banner.
fn print_banner() {
    println!(
        r#"
  ███████╗ █████╗ ██╗██╗  ██╗ █████╗
  ██╔════╝██╔══██╗██║╚██╗██╔╝██╔══██╗
  █████╗  ███████║██║ ╚███╔╝ ███████║
  ██╔══╝  ██╔══██║██║ ██╔██╗ ██╔══██║
  ██║     ██║  ██║██║██╔╝ ██╗██║  ██║
  ╚═╝     ╚═╝  ╚═╝╚═╝╚═╝  ╚═╝╚═╝  ╚═╝

  Academy Graduation Server v{}

  Deterministic • Auditable • Advisory
"#,
        env!("CARGO_PKG_VERSION")
    );
}
