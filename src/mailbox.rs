//! The session seam between the sync engine and a mail server.
//!
//! [`SessionProvider`] opens an authenticated [`MailboxSession`]; the session
//! selects a folder and streams its listing one message at a time. The IMAP
//! implementation lives in [`ImapProvider`](crate::ImapProvider); tests drive
//! the engine with in-memory implementations.

use crate::config::SyncConfig;
use crate::error::Result;
use futures::stream::BoxStream;
use std::fmt;

/// Server-derived identifier of a message, stable across sync runs.
///
/// Usually the message's `Message-ID`. The empty identity is allowed; every
/// message without one maps to the same file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MessageIdentity(String);

impl MessageIdentity {
    /// Wraps an identifier.
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the degenerate empty identity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for MessageIdentity {
    fn from(identity: String) -> Self {
        Self(identity)
    }
}

impl From<&str> for MessageIdentity {
    fn from(identity: &str) -> Self {
        Self(identity.to_string())
    }
}

impl fmt::Display for MessageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State of a selected folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderInfo {
    /// Folder name as selected.
    pub name: String,
    /// Number of messages the server reports in the folder.
    pub exists: u32,
    /// `UIDVALIDITY`, if the server announced one.
    pub uid_validity: Option<u32>,
}

/// One element of a folder listing.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteMessage {
    /// Message sequence number within the folder.
    pub sequence: u32,
    /// UID, if the server returned one.
    pub uid: Option<u32>,
    /// Stable identity used for deduplication.
    pub identity: MessageIdentity,
    /// Envelope subject, for diagnostics only.
    pub subject: Option<String>,
    /// Full raw message (header block and body) as delivered.
    pub content: Vec<u8>,
}

impl fmt::Debug for RemoteMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteMessage")
            .field("sequence", &self.sequence)
            .field("uid", &self.uid)
            .field("identity", &self.identity)
            .field("subject", &self.subject)
            .field("content_len", &self.content.len())
            .finish()
    }
}

/// A one-pass listing of a folder, in server order.
pub type MessageStream<'a> = BoxStream<'a, Result<RemoteMessage>>;

/// Opens authenticated sessions.
#[allow(async_fn_in_trait)]
pub trait SessionProvider {
    /// The session type produced.
    type Session: MailboxSession;

    /// Connects and authenticates with the server and credentials in `config`.
    ///
    /// # Errors
    ///
    /// Network, handshake and authentication failures. A rejected login
    /// must not leave the connection open.
    async fn connect(&self, config: &SyncConfig) -> Result<Self::Session>;
}

/// An authenticated session.
#[allow(async_fn_in_trait)]
pub trait MailboxSession {
    /// Selects a folder.
    ///
    /// # Errors
    ///
    /// The folder does not exist or is not accessible.
    async fn select(&mut self, mailbox: &str) -> Result<FolderInfo>;

    /// Streams the selected folder's messages.
    ///
    /// The stream is lazy and cannot be restarted; each item is produced as
    /// the server sends it and must be consumed before the next one.
    ///
    /// # Errors
    ///
    /// The listing could not be started. Per-message failures are stream items.
    async fn stream_messages(&mut self, folder: &FolderInfo) -> Result<MessageStream<'_>>;

    /// Ends the session.
    ///
    /// # Errors
    ///
    /// Teardown failures. Callers report these and carry on.
    async fn logout(&mut self) -> Result<()>;
}
