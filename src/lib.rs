//! # imap-folder-sync
//!
//! Download one IMAP folder to a local directory, one `.eml` file per message.
//! Repeat runs only write messages that are not on disk yet.
//!
//! Each message is named after a truncated SHA-512 digest of its Message-ID
//! (see [`fingerprint`]), so the same message always lands on the same path
//! and an existing file is proof enough that it was downloaded before.
//!
//! ## Quick Start
//!
//! ```no_run
//! use imap_folder_sync::SyncConfig;
//!
//! # async fn example() -> imap_folder_sync::Result<()> {
//! let config = SyncConfig::builder()
//!     .server("mail.example.com:993")
//!     .username("alice")
//!     .password("app-password")
//!     .mailbox("INBOX")
//!     .messages_dir("messages")
//!     .build()?;
//!
//! let result = imap_folder_sync::sync(&config).await?;
//! println!(
//!     "{} new, {} already downloaded",
//!     result.new_emails.len(),
//!     result.existing_emails.len()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Reporting
//!
//! The engine has no global logger. Pass a [`SyncReporter`] to observe a run;
//! [`TracingReporter`] forwards events to `tracing`:
//!
//! ```no_run
//! use imap_folder_sync::{ImapProvider, SyncConfig, SyncEngine, TracingReporter};
//!
//! # async fn example(config: SyncConfig) -> imap_folder_sync::Result<()> {
//! let result = SyncEngine::new(ImapProvider)
//!     .with_reporter(TracingReporter)
//!     .sync(&config)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Sessions
//!
//! [`SessionProvider`] and [`MailboxSession`] separate the loop from IMAP.
//! Implement them to feed the engine from another source, or from memory in
//! tests.
//!
//! ## Error Handling
//!
//! All errors implement `std::error::Error`. [`Error::category`] tells which
//! phase of the run failed. Nothing is retried; a failed run can simply be
//! started again and will skip what it already wrote.
//!
//! ## Observability
//!
//! The IMAP layer emits `tracing` spans:
//!
//! - `SyncEngine::sync` - a whole run
//! - `ImapProvider::connect` - connection and login
//! - `connection::establish_tls` - TCP and TLS
//! - `session::authenticate` - IMAP LOGIN
//! - `session::select`, `session::stream_messages`, `session::logout`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod mailbox;
pub mod proxy;
pub mod reporter;
pub mod store;

// Internal modules
mod connection;
mod parser;
mod session;

// Re-exports for ergonomic API
pub use config::{ServerAddress, SyncConfig, SyncConfigBuilder, TimeoutConfig};
pub use engine::{SyncEngine, SyncResult};
pub use error::{Error, ErrorCategory, Result};
pub use fingerprint::{message_path, Fingerprint};
pub use mailbox::{
    FolderInfo, MailboxSession, MessageIdentity, MessageStream, RemoteMessage, SessionProvider,
};
pub use proxy::{ProxyAuth, Socks5Proxy};
pub use reporter::{NoopReporter, SyncReporter, TracingReporter};
pub use session::{ImapMailboxSession, ImapProvider};
pub use store::{LocalMessage, MessageStore, WriteOutcome};

/// Synchronizes `config.mailbox()` into `config.messages_dir()` over IMAP.
///
/// Shorthand for `SyncEngine::new(ImapProvider).sync(config)`, with no
/// reporting.
///
/// # Errors
///
/// See [`SyncEngine::sync`].
pub async fn sync(config: &SyncConfig) -> Result<SyncResult> {
    SyncEngine::new(ImapProvider).sync(config).await
}
