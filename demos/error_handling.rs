//! Example: Handling errors by category.
//!
//! A failed run can be started again: files already written are skipped.
//! This example retries network failures with backoff and gives up on
//! everything else.
//!
//! # Usage
//!
//! ```bash
//! export IMAP_SERVER="imap.example.com:993"
//! export IMAP_USER="you@example.com"
//! export IMAP_PASSWORD="your-app-password"
//! cargo run --example error_handling
//! ```

use imap_folder_sync::{Error, ErrorCategory, SyncConfig, SyncResult};
use std::env;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Runs the sync, retrying network failures.
async fn sync_with_retry(config: &SyncConfig) -> Result<SyncResult, Error> {
    let mut backoff = INITIAL_BACKOFF;
    let mut attempt = 1;

    loop {
        println!("Sync attempt {attempt}/{MAX_ATTEMPTS}...");

        match imap_folder_sync::sync(config).await {
            Ok(result) => return Ok(result),
            Err(e) => {
                println!("  Error: {e}");
                println!("  Category: {}", e.category());

                let transient = matches!(
                    e.category(),
                    ErrorCategory::Network | ErrorCategory::Stream
                );
                if !transient || attempt == MAX_ATTEMPTS {
                    return Err(e);
                }

                println!("  Retrying in {backoff:?}...");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                attempt += 1;
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let server = env::var("IMAP_SERVER").expect("IMAP_SERVER environment variable required");
    let user = env::var("IMAP_USER").expect("IMAP_USER environment variable required");
    let password = env::var("IMAP_PASSWORD").expect("IMAP_PASSWORD environment variable required");

    let config = match SyncConfig::builder()
        .server(server)
        .username(user)
        .password(password)
        .mailbox("INBOX")
        .connect_timeout(Duration::from_secs(10))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    match sync_with_retry(&config).await {
        Ok(result) => println!(
            "\nDone: {} new, {} already downloaded",
            result.new_emails.len(),
            result.existing_emails.len()
        ),
        Err(e) => {
            match e.category() {
                ErrorCategory::Authentication => {
                    eprintln!("\nLogin rejected. Check the user name and app password.");
                }
                ErrorCategory::Folder => {
                    eprintln!("\nFolder not found: {}", config.mailbox());
                }
                ErrorCategory::Directory | ErrorCategory::Write => {
                    eprintln!("\nLocal disk problem: {e}");
                }
                _ => eprintln!("\nSync failed: {e}"),
            }
            std::process::exit(1);
        }
    }
}
