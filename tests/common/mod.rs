//! In-memory mail server and helpers shared by the engine tests.

#![allow(dead_code)]

use futures::StreamExt;
use imap_folder_sync::{
    Error, FolderInfo, MailboxSession, MessageStream, RemoteMessage, Result, SessionProvider,
    SyncConfig, SyncReporter, SyncResult,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// One element the fake server hands out while listing.
#[derive(Debug, Clone)]
pub enum Listed {
    Message(RemoteMessage),
    /// The connection broke while reading this element.
    Broken(&'static str),
}

/// Build a listed message.
pub fn message(sequence: u32, identity: &str, content: &str) -> Listed {
    Listed::Message(RemoteMessage {
        sequence,
        uid: Some(1000 + sequence),
        identity: identity.into(),
        subject: Some(format!("Message {sequence}")),
        content: content.as_bytes().to_vec(),
    })
}

/// What happened on the fake server during a run.
#[derive(Debug, Default)]
pub struct ServerLog {
    pub connects: AtomicU32,
    pub selected: Mutex<Vec<String>>,
    pub logouts: AtomicU32,
    /// Number of `.eml` files on disk each time a listing element was handed out.
    pub files_at_yield: Mutex<Vec<usize>>,
}

/// A mail server with a single folder, held in memory.
#[derive(Debug, Clone)]
pub struct FakeServer {
    pub folder: String,
    pub listing: Vec<Listed>,
    pub reject_login: bool,
    pub fail_logout: bool,
    pub log: Arc<ServerLog>,
}

impl FakeServer {
    pub fn new(folder: &str, listing: Vec<Listed>) -> Self {
        Self {
            folder: folder.to_string(),
            listing,
            reject_login: false,
            fail_logout: false,
            log: Arc::default(),
        }
    }

    pub fn empty(folder: &str) -> Self {
        Self::new(folder, Vec::new())
    }
}

impl SessionProvider for FakeServer {
    type Session = FakeSession;

    async fn connect(&self, config: &SyncConfig) -> Result<FakeSession> {
        self.log.connects.fetch_add(1, Ordering::SeqCst);

        if self.reject_login {
            return Err(Error::ImapLogin {
                user: config.username().to_string(),
                target: config.server().to_string(),
                source: async_imap::error::Error::No(
                    "[AUTHENTICATIONFAILED] Invalid credentials".into(),
                ),
                disconnect: None,
            });
        }

        Ok(FakeSession {
            server: self.clone(),
            messages_dir: config.messages_dir().to_path_buf(),
        })
    }
}

#[derive(Debug)]
pub struct FakeSession {
    server: FakeServer,
    messages_dir: PathBuf,
}

impl MailboxSession for FakeSession {
    async fn select(&mut self, mailbox: &str) -> Result<FolderInfo> {
        self.server.log.selected.lock().unwrap().push(mailbox.to_string());

        if mailbox != self.server.folder {
            return Err(Error::SelectMailbox {
                mailbox: mailbox.to_string(),
                source: async_imap::error::Error::No("Mailbox doesn't exist".into()),
            });
        }

        Ok(FolderInfo {
            name: mailbox.to_string(),
            exists: u32::try_from(self.server.listing.len()).unwrap(),
            uid_validity: Some(1),
        })
    }

    async fn stream_messages(&mut self, _folder: &FolderInfo) -> Result<MessageStream<'_>> {
        let log = Arc::clone(&self.server.log);
        let dir = self.messages_dir.clone();

        let listing = futures::stream::iter(self.server.listing.clone()).map(move |listed| {
            log.files_at_yield.lock().unwrap().push(eml_files(&dir).len());
            match listed {
                Listed::Message(message) => Ok(message),
                Listed::Broken(reason) => Err(Error::FetchMessage {
                    source: async_imap::error::Error::Bad(reason.into()),
                }),
            }
        });

        Ok(listing.boxed())
    }

    async fn logout(&mut self) -> Result<()> {
        self.server.log.logouts.fetch_add(1, Ordering::SeqCst);

        if self.server.fail_logout {
            return Err(Error::ImapLogout {
                source: async_imap::error::Error::Bad("connection reset".into()),
            });
        }
        Ok(())
    }
}

/// Records every reporter event as a line of text.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: RefCell<Vec<String>>,
}

impl SyncReporter for RecordingReporter {
    fn folder_selected(&self, folder: &FolderInfo) {
        self.events
            .borrow_mut()
            .push(format!("selected {} ({})", folder.name, folder.exists));
    }

    fn message_existing(&self, message: &RemoteMessage, _path: &Path) {
        self.events
            .borrow_mut()
            .push(format!("existing {}", message.identity));
    }

    fn message_written(&self, message: &RemoteMessage, _path: &Path) {
        self.events
            .borrow_mut()
            .push(format!("written {}", message.identity));
    }

    fn logout_failed(&self, error: &Error) {
        self.events
            .borrow_mut()
            .push(format!("logout failed: {}", error.category()));
    }

    fn finished(&self, result: &SyncResult) {
        self.events.borrow_mut().push(format!(
            "finished {} new {} existing",
            result.new_emails.len(),
            result.existing_emails.len()
        ));
    }
}

/// Temporary directory plus a config pointing at `<tmp>/messages`.
pub fn temp_config(mailbox: &str) -> (TempDir, SyncConfig) {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let config = SyncConfig::builder()
        .server("imap.example.com:993")
        .username("alice")
        .password("secret")
        .mailbox(mailbox)
        .messages_dir(tmp.path().join("messages"))
        .build()
        .expect("valid config");
    (tmp, config)
}

/// Sorted `.eml` files directly under `dir`; empty if `dir` is missing.
pub fn eml_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "eml"))
        .collect();
    files.sort();
    files
}
