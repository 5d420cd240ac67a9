//! Example: Download one folder into a local directory.
//!
//! # Usage
//!
//! ```bash
//! export IMAP_SERVER="imap.example.com:993"
//! export IMAP_USER="you@example.com"
//! export IMAP_PASSWORD="your-app-password"
//! export IMAP_MAILBOX="INBOX"          # optional
//! export IMAP_PROXY="127.0.0.1:1080"   # optional SOCKS5 proxy
//!
//! cargo run --example sync_folder -- ./messages
//! ```

use imap_folder_sync::{Socks5Proxy, SyncConfig};
use std::env;

#[tokio::main(flavor = "current_thread")]
async fn main() -> imap_folder_sync::Result<()> {
    let server = env::var("IMAP_SERVER").expect("IMAP_SERVER environment variable required");
    let user = env::var("IMAP_USER").expect("IMAP_USER environment variable required");
    let password = env::var("IMAP_PASSWORD").expect("IMAP_PASSWORD environment variable required");
    let mailbox = env::var("IMAP_MAILBOX").unwrap_or_else(|_| "INBOX".to_string());
    let messages_dir = env::args().nth(1).unwrap_or_else(|| "messages".to_string());

    let mut builder = SyncConfig::builder()
        .server(server)
        .username(user)
        .password(password)
        .mailbox(mailbox)
        .messages_dir(messages_dir);

    if let Ok(proxy) = env::var("IMAP_PROXY") {
        builder = builder.proxy(proxy.parse::<Socks5Proxy>()?);
    }

    let config = builder.build()?;
    println!("Syncing {} from {}...", config.mailbox(), config.server());

    let result = imap_folder_sync::sync(&config).await?;

    for path in &result.new_emails {
        println!("  new: {}", path.display());
    }
    println!(
        "\n{} new, {} already downloaded",
        result.new_emails.len(),
        result.existing_emails.len()
    );

    Ok(())
}
