//! The fetch-and-deduplicate loop.
//!
//! [`SyncEngine::sync`] selects a folder, walks its listing in server order
//! and writes every message whose file is not yet on disk. Messages are
//! handled strictly one at a time: the next listing item is only requested
//! once the current one has been classified and, if new, written.

use crate::config::SyncConfig;
use crate::error::Result;
use crate::mailbox::{MailboxSession, SessionProvider};
use crate::reporter::{NoopReporter, SyncReporter};
use crate::store::{MessageStore, WriteOutcome};
use futures::StreamExt;
use std::path::PathBuf;
use tracing::instrument;

/// Files touched by a sync run, in listing order.
///
/// Every message in the listing adds exactly one entry to one of the two
/// lists. Messages sharing an identity share a path: the first lands in
/// `new_emails`, later ones in `existing_emails` under the same path.
/// Messages deleted on the server since an earlier run appear in neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncResult {
    /// Messages whose file was already present before this run.
    pub existing_emails: Vec<PathBuf>,
    /// Messages written during this run.
    pub new_emails: Vec<PathBuf>,
}

impl SyncResult {
    /// Number of messages in the listing.
    #[must_use]
    pub fn total(&self) -> usize {
        self.existing_emails.len() + self.new_emails.len()
    }

    /// Returns `true` if the folder was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Drives a [`SessionProvider`] to mirror one folder into a directory.
///
/// # Example
///
/// ```no_run
/// use imap_folder_sync::{ImapProvider, SyncConfig, SyncEngine, TracingReporter};
///
/// # async fn example() -> imap_folder_sync::Result<()> {
/// let config = SyncConfig::builder()
///     .server("mail.example.com:993")
///     .username("alice")
///     .password("app-password")
///     .mailbox("INBOX")
///     .build()?;
///
/// let result = SyncEngine::new(ImapProvider)
///     .with_reporter(TracingReporter)
///     .sync(&config)
///     .await?;
/// println!("{} new, {} existing", result.new_emails.len(), result.existing_emails.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SyncEngine<P, R = NoopReporter> {
    provider: P,
    reporter: R,
}

impl<P: SessionProvider> SyncEngine<P> {
    /// Creates an engine that reports nothing.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            reporter: NoopReporter,
        }
    }
}

impl<P: SessionProvider, R: SyncReporter> SyncEngine<P, R> {
    /// Replaces the reporter.
    pub fn with_reporter<R2: SyncReporter>(self, reporter: R2) -> SyncEngine<P, R2> {
        SyncEngine {
            provider: self.provider,
            reporter,
        }
    }

    /// The session provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Downloads every message of `config.mailbox()` not yet present in
    /// `config.messages_dir()`.
    ///
    /// The session is logged out whether or not the listing succeeded; a
    /// logout failure is reported and otherwise ignored.
    ///
    /// # Errors
    ///
    /// - [`Error::CreateDirectory`](crate::Error::CreateDirectory) before connecting
    /// - connection and authentication errors from the provider
    /// - folder selection, listing and write errors; files written before
    ///   the failure stay on disk
    #[instrument(
        name = "SyncEngine::sync",
        skip_all,
        fields(
            server = %config.server(),
            user = %config.username(),
            mailbox = %config.mailbox()
        )
    )]
    pub async fn sync(&self, config: &SyncConfig) -> Result<SyncResult> {
        let store = MessageStore::open(config.messages_dir())?;

        let mut session = self.provider.connect(config).await?;

        let outcome = self.download(&mut session, config.mailbox(), &store).await;

        if let Err(err) = session.logout().await {
            self.reporter.logout_failed(&err);
        }

        let result = outcome?;
        self.reporter.finished(&result);
        Ok(result)
    }

    async fn download<S: MailboxSession>(
        &self,
        session: &mut S,
        mailbox: &str,
        store: &MessageStore,
    ) -> Result<SyncResult> {
        let folder = session.select(mailbox).await?;
        self.reporter.folder_selected(&folder);

        let mut result = SyncResult::default();
        let mut messages = session.stream_messages(&folder).await?;

        while let Some(message) = messages.next().await {
            let message = message?;
            let record = store.locate(&message.identity)?;

            if record.exists {
                self.reporter.message_existing(&message, &record.path);
                result.existing_emails.push(record.path);
                continue;
            }

            match store.write_new(&record, &message.content)? {
                WriteOutcome::Written => {
                    self.reporter.message_written(&message, &record.path);
                    result.new_emails.push(record.path);
                }
                WriteOutcome::AlreadyPresent => {
                    self.reporter.message_existing(&message, &record.path);
                    result.existing_emails.push(record.path);
                }
            }
        }

        Ok(result)
    }
}
