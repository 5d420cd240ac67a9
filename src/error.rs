//! Error types for the imap-folder-sync crate.
//!
//! All errors implement [`std::error::Error`] and provide context about what went wrong.
//! Errors are grouped by the phase of a sync run that produced them - see [`Error::category`].
//! Nothing in this crate retries on its own; the caller decides whether to re-run.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while synchronizing a folder.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration / validation errors (detected before any network activity)
    // ─────────────────────────────────────────────────────────────────────────
    /// Invalid configuration provided.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid DNS name for TLS.
    #[error("invalid DNS name for host '{host}'")]
    InvalidDnsName {
        /// The invalid hostname.
        host: String,
        /// The underlying DNS name error.
        #[source]
        source: rustls::client::InvalidDnsNameError,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Local directory errors (abort before connecting)
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to create the messages directory.
    #[error("failed to create messages directory {}", .path.display())]
    CreateDirectory {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Network / handshake errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to establish TCP connection.
    #[error("failed to connect to {target}")]
    TcpConnect {
        /// The target address that failed.
        target: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to establish TLS connection.
    #[error("failed to establish TLS connection to {target}")]
    TlsConnect {
        /// The target address that failed.
        target: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to connect via SOCKS5 proxy.
    #[error("failed to connect via SOCKS5 proxy {proxy_host} to {target}")]
    Socks5Connect {
        /// The SOCKS5 proxy hostname.
        proxy_host: String,
        /// The target address.
        target: String,
        /// The underlying SOCKS5 error.
        #[source]
        source: tokio_socks::Error,
    },

    /// Connection timeout (TCP and TLS).
    #[error("connection timeout to {target} after {timeout:?}")]
    ConnectTimeout {
        /// The target address.
        target: String,
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Authentication errors
    // ─────────────────────────────────────────────────────────────────────────
    /// IMAP login failed.
    ///
    /// If closing the rejected connection also failed, that error is kept
    /// in `disconnect` and appended to the message.
    #[error(
        "IMAP login failed for {user} on {target}{}",
        disconnect_suffix(.disconnect)
    )]
    ImapLogin {
        /// The user name used for login.
        user: String,
        /// The target address.
        target: String,
        /// The underlying IMAP error.
        #[source]
        source: async_imap::error::Error,
        /// Error raised while shutting the connection down after the rejection.
        disconnect: Option<std::io::Error>,
    },

    /// Authentication timeout.
    #[error("authentication timeout for {user} after {timeout:?}")]
    AuthTimeout {
        /// The user name used for authentication.
        user: String,
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Folder errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to select mailbox.
    #[error("failed to select mailbox '{mailbox}'")]
    SelectMailbox {
        /// The mailbox name.
        mailbox: String,
        /// The underlying IMAP error.
        #[source]
        source: async_imap::error::Error,
    },

    /// Mailbox selection timeout.
    #[error("mailbox selection timeout for '{mailbox}' after {timeout:?}")]
    SelectTimeout {
        /// The mailbox name.
        mailbox: String,
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Listing errors (fatal to the run)
    // ─────────────────────────────────────────────────────────────────────────
    /// IMAP FETCH command failed.
    #[error("IMAP fetch failed for mailbox '{mailbox}'")]
    ImapFetch {
        /// The mailbox being listed.
        mailbox: String,
        /// The underlying IMAP error.
        #[source]
        source: async_imap::error::Error,
    },

    /// Failed to read a message from the fetch stream.
    #[error("failed to fetch message from stream")]
    FetchMessage {
        /// The underlying IMAP error.
        #[source]
        source: async_imap::error::Error,
    },

    /// Timed out waiting for the next message of the listing.
    #[error("message fetch timeout after {timeout:?}")]
    FetchTimeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Local write errors (fatal to the run, no rollback)
    // ─────────────────────────────────────────────────────────────────────────
    /// Could not determine whether a message file already exists.
    #[error("failed to check for existing message file {}", .path.display())]
    CheckExisting {
        /// The message file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a message file.
    #[error("failed to write message file {}", .path.display())]
    WriteMessage {
        /// The message file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Teardown errors (reported, never change a sync result)
    // ─────────────────────────────────────────────────────────────────────────
    /// IMAP logout failed.
    #[error("IMAP logout failed")]
    ImapLogout {
        /// The underlying IMAP error.
        #[source]
        source: async_imap::error::Error,
    },

    /// Logout timeout.
    #[error("logout timeout after {timeout:?}")]
    LogoutTimeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },
}

fn disconnect_suffix(disconnect: &Option<std::io::Error>) -> String {
    match disconnect {
        Some(error) => format!(" (disconnect error: {error})"),
        None => String::new(),
    }
}

impl Error {
    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidConfig { .. } | Error::InvalidDnsName { .. } => {
                ErrorCategory::Configuration
            }

            Error::CreateDirectory { .. } => ErrorCategory::Directory,

            Error::TcpConnect { .. }
            | Error::TlsConnect { .. }
            | Error::Socks5Connect { .. }
            | Error::ConnectTimeout { .. } => ErrorCategory::Network,

            Error::ImapLogin { .. } | Error::AuthTimeout { .. } => ErrorCategory::Authentication,

            Error::SelectMailbox { .. } | Error::SelectTimeout { .. } => ErrorCategory::Folder,

            Error::ImapFetch { .. } | Error::FetchMessage { .. } | Error::FetchTimeout { .. } => {
                ErrorCategory::Stream
            }

            Error::CheckExisting { .. } | Error::WriteMessage { .. } => ErrorCategory::Write,

            Error::ImapLogout { .. } | Error::LogoutTimeout { .. } => ErrorCategory::Logout,
        }
    }

    /// Returns `true` if the error was raised before any connection attempt.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Configuration | ErrorCategory::Directory
        )
    }
}

/// Error categories for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Missing or invalid parameters.
    Configuration,
    /// The messages directory could not be created.
    Directory,
    /// Connection, proxy or TLS failures.
    Network,
    /// Credentials rejected.
    Authentication,
    /// Folder missing or inaccessible.
    Folder,
    /// The listing or a message could not be read.
    Stream,
    /// A message file could not be checked or written.
    Write,
    /// Session teardown failed.
    Logout,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Directory => write!(f, "directory"),
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Authentication => write!(f, "authentication"),
            ErrorCategory::Folder => write!(f, "folder"),
            ErrorCategory::Stream => write!(f, "stream"),
            ErrorCategory::Write => write!(f, "write"),
            ErrorCategory::Logout => write!(f, "logout"),
        }
    }
}
