//! Integration tests for imap-folder-sync.
//!
//! The tests talking to a real IMAP server are ignored by default.
//! To run them:
//!
//! ```bash
//! # Set environment variables (or put them in .env)
//! export IMAP_SYNC_TEST_SERVER="imap.example.com:993"
//! export IMAP_SYNC_TEST_USER="you@example.com"
//! export IMAP_SYNC_TEST_PASSWORD="your-app-password"
//! export IMAP_SYNC_TEST_MAILBOX="INBOX"   # optional
//!
//! # Optional: proxy configuration
//! export IMAP_SYNC_TEST_PROXY_HOST="proxy.example.com"
//! export IMAP_SYNC_TEST_PROXY_PORT="1080"
//!
//! cargo test --features integration-tests -- --ignored
//! ```

use imap_folder_sync::{
    ErrorCategory, ImapProvider, Socks5Proxy, SyncConfig, SyncEngine, TracingReporter,
};
use std::env;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

// ─────────────────────────────────────────────────────────────────────────────
// Test Configuration Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn get_test_proxy() -> Option<Socks5Proxy> {
    let host = env::var("IMAP_SYNC_TEST_PROXY_HOST").ok()?;
    let port: u16 = env::var("IMAP_SYNC_TEST_PROXY_PORT").ok()?.parse().ok()?;

    let proxy = Socks5Proxy::new(host, port);
    let proxy = match (
        env::var("IMAP_SYNC_TEST_PROXY_USER").ok(),
        env::var("IMAP_SYNC_TEST_PROXY_PASS").ok(),
    ) {
        (Some(user), Some(pass)) => proxy.authenticated(user, pass),
        _ => proxy,
    };

    Some(proxy)
}

fn get_test_config(messages_dir: &Path, mailbox: Option<&str>) -> Option<SyncConfig> {
    dotenvy::dotenv().ok();
    let server = env::var("IMAP_SYNC_TEST_SERVER").ok()?;
    let user = env::var("IMAP_SYNC_TEST_USER").ok()?;
    let password = env::var("IMAP_SYNC_TEST_PASSWORD").ok()?;
    let mailbox = match mailbox {
        Some(mailbox) => mailbox.to_string(),
        None => env::var("IMAP_SYNC_TEST_MAILBOX").unwrap_or_else(|_| "INBOX".to_string()),
    };

    let mut builder = SyncConfig::builder()
        .server(server)
        .username(user)
        .password(password)
        .mailbox(mailbox)
        .messages_dir(messages_dir)
        .connect_timeout(Duration::from_secs(15));

    if let Some(proxy) = get_test_proxy() {
        builder = builder.proxy(proxy);
    }

    builder.build().ok()
}

// ─────────────────────────────────────────────────────────────────────────────
// Live Server Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore = "requires real IMAP server"]
async fn test_sync_twice_downloads_nothing_new() {
    let tmp = TempDir::new().unwrap();
    let config =
        get_test_config(tmp.path(), None).expect("Test config from environment variables");
    let engine = SyncEngine::new(ImapProvider).with_reporter(TracingReporter);

    let first = engine.sync(&config).await.expect("First sync failed");
    println!(
        "First run: {} new, {} existing",
        first.new_emails.len(),
        first.existing_emails.len()
    );
    for path in &first.new_emails {
        assert!(path.is_file());
    }

    let second = engine.sync(&config).await.expect("Second sync failed");
    assert!(second.new_emails.is_empty());
    assert_eq!(second.existing_emails.len(), first.total());
}

#[tokio::test]
#[ignore = "requires real IMAP server"]
async fn test_missing_folder() {
    let tmp = TempDir::new().unwrap();
    let config = get_test_config(tmp.path(), Some("ThisFolderDoesNotExist-7f3a"))
        .expect("Test config from environment variables");

    let err = imap_folder_sync::sync(&config).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Folder);
}

#[tokio::test]
#[ignore = "requires real IMAP server"]
async fn test_invalid_credentials() {
    dotenvy::dotenv().ok();
    let server = env::var("IMAP_SYNC_TEST_SERVER").expect("IMAP_SYNC_TEST_SERVER");
    let tmp = TempDir::new().unwrap();

    let config = SyncConfig::builder()
        .server(server)
        .username("nobody@example.com")
        .password("wrong-password")
        .mailbox("INBOX")
        .messages_dir(tmp.path().join("messages"))
        .build()
        .expect("valid config structure");

    let err = imap_folder_sync::sync(&config).await.unwrap_err();

    println!("Connection error: {err}");
    assert_eq!(err.category(), ErrorCategory::Authentication);
    assert_eq!(std::fs::read_dir(tmp.path().join("messages")).unwrap().count(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Offline Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unresolvable_server_is_network_error() {
    let tmp = TempDir::new().unwrap();
    let config = SyncConfig::builder()
        .server("imap.invalid:993")
        .username("alice")
        .password("secret")
        .mailbox("INBOX")
        .messages_dir(tmp.path().join("messages"))
        .connect_timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let err = imap_folder_sync::sync(&config).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Network);
    assert!(tmp.path().join("messages").is_dir());
}

#[test]
fn test_missing_required_fields() {
    let result = SyncConfig::builder()
        .username("alice")
        .password("secret")
        .mailbox("INBOX")
        .build();
    assert!(result.is_err());

    let result = SyncConfig::builder()
        .server("imap.example.com")
        .password("secret")
        .mailbox("INBOX")
        .build();
    assert!(result.is_err());

    let result = SyncConfig::builder()
        .server("imap.example.com")
        .username("alice")
        .password("secret")
        .build();
    assert!(result.is_err());
}

#[test]
fn test_invalid_server_port() {
    let result = SyncConfig::builder()
        .server("imap.example.com:imaps")
        .username("alice")
        .password("secret")
        .mailbox("INBOX")
        .build();

    assert_eq!(
        result.unwrap_err().category(),
        ErrorCategory::Configuration
    );
}
