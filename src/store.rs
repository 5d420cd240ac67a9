//! The local message directory.
//!
//! A [`MessageStore`] owns the directory messages are written to. Existence of
//! a message file is the only record of a previous download: files are never
//! re-verified, overwritten or removed. New files are written to a hidden
//! temporary file in the same directory and renamed into place only after the
//! full content is on disk, so an interrupted run never leaves a truncated
//! `.eml` behind.

use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;
use crate::mailbox::MessageIdentity;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Permissions of the messages directory.
#[cfg(unix)]
const DIR_MODE: u32 = 0o700;

/// Permissions of message files.
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// Where a message lives locally, and whether it was already there.
///
/// `exists` is sampled once, when the record is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMessage {
    /// Fingerprint of the message identity.
    pub fingerprint: Fingerprint,
    /// Target file path.
    pub path: PathBuf,
    /// Whether the file existed when the record was created.
    pub exists: bool,
}

/// Outcome of [`MessageStore::write_new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was created with the given content.
    Written,
    /// The target appeared after it was located; it was left untouched.
    AlreadyPresent,
}

/// Directory of `.eml` files, one per message identity.
#[derive(Debug, Clone)]
pub struct MessageStore {
    dir: PathBuf,
}

impl MessageStore {
    /// Opens the store, creating the directory and its parents if missing.
    ///
    /// New directories are owner-only on Unix. An existing directory is
    /// used as is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CreateDirectory`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(DIR_MODE);
        }

        builder
            .create(&dir)
            .map_err(|source| Error::CreateDirectory {
                path: dir.clone(),
                source,
            })?;

        debug!(dir = %dir.display(), "Message directory ready");

        Ok(Self { dir })
    }

    /// The directory messages are stored in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Computes the record for an identity and checks whether its file exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CheckExisting`] if existence cannot be determined
    /// (for example, the directory is not searchable).
    pub fn locate(&self, identity: &MessageIdentity) -> Result<LocalMessage> {
        let fingerprint = Fingerprint::of(identity);
        let path = self.dir.join(fingerprint.file_name());

        let exists = path
            .try_exists()
            .map_err(|source| Error::CheckExisting {
                path: path.clone(),
                source,
            })?;

        Ok(LocalMessage {
            fingerprint,
            path,
            exists,
        })
    }

    /// Writes `content` to the record's path unless a file is already there.
    ///
    /// The content is staged in a temporary file next to the target, synced,
    /// and linked into place without replacing an existing file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteMessage`] if staging, syncing or renaming fails.
    /// Files written earlier are left in place.
    pub fn write_new(&self, record: &LocalMessage, content: &[u8]) -> Result<WriteOutcome> {
        let write_error = |source: io::Error| Error::WriteMessage {
            path: record.path.clone(),
            source,
        };

        let mut staged = tempfile::Builder::new()
            .prefix(".")
            .suffix(".part")
            .tempfile_in(&self.dir)
            .map_err(write_error)?;

        staged.write_all(content).map_err(write_error)?;
        staged.flush().map_err(write_error)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staged
                .as_file()
                .set_permissions(fs::Permissions::from_mode(FILE_MODE))
                .map_err(write_error)?;
        }
        staged.as_file().sync_all().map_err(write_error)?;

        match staged.persist_noclobber(&record.path) {
            Ok(_) => Ok(WriteOutcome::Written),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %record.path.display(), "Message file appeared concurrently, keeping it");
                Ok(WriteOutcome::AlreadyPresent)
            }
            Err(err) => Err(write_error(err.error)),
        }
    }
}
