//! Example: Watching a sync run through `tracing`.
//!
//! The IMAP layer emits spans for connecting, login, select, listing and
//! logout. [`TracingReporter`] adds an event per message.
//!
//! # Usage
//!
//! ```bash
//! export IMAP_SERVER="imap.example.com:993"
//! export IMAP_USER="you@example.com"
//! export IMAP_PASSWORD="your-app-password"
//! # Set log level (trace, debug, info, warn, error)
//! export RUST_LOG=imap_folder_sync=debug
//!
//! cargo run --example with_tracing
//! ```

use imap_folder_sync::{ImapProvider, SyncConfig, SyncEngine, TracingReporter};
use std::env;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> imap_folder_sync::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("imap_folder_sync=info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .init();

    let server = env::var("IMAP_SERVER").expect("IMAP_SERVER environment variable required");
    let user = env::var("IMAP_USER").expect("IMAP_USER environment variable required");
    let password = env::var("IMAP_PASSWORD").expect("IMAP_PASSWORD environment variable required");

    let config = SyncConfig::builder()
        .server(server)
        .username(&user)
        .password(password)
        .mailbox("INBOX")
        .messages_dir("messages")
        .build()?;

    tracing::info!(user = %user, "Starting sync example");

    let result = SyncEngine::new(ImapProvider)
        .with_reporter(TracingReporter)
        .sync(&config)
        .await?;

    tracing::info!(total = result.total(), "Example completed successfully");

    Ok(())
}
