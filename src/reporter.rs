//! Progress reporting for sync runs.
//!
//! The engine holds no logger of its own; it tells a [`SyncReporter`] what
//! happened. [`NoopReporter`] discards everything and is the default.
//! [`TracingReporter`] turns events into `tracing` events, which is what the
//! command line tool installs.

use crate::engine::SyncResult;
use crate::error::Error;
use crate::mailbox::{FolderInfo, RemoteMessage};
use std::path::Path;
use tracing::{debug, error, info};

/// Receives events from a sync run.
///
/// Every method has an empty default, so implementors only override what
/// they care about.
pub trait SyncReporter {
    /// The folder was selected.
    fn folder_selected(&self, _folder: &FolderInfo) {}

    /// A message's file was already present and was left alone.
    fn message_existing(&self, _message: &RemoteMessage, _path: &Path) {}

    /// A message was written to a new file.
    fn message_written(&self, _message: &RemoteMessage, _path: &Path) {}

    /// Logging out failed. The run's outcome is unaffected.
    fn logout_failed(&self, _error: &Error) {}

    /// The run completed.
    fn finished(&self, _result: &SyncResult) {}
}

/// Discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl SyncReporter for NoopReporter {}

/// Emits events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl SyncReporter for TracingReporter {
    fn folder_selected(&self, folder: &FolderInfo) {
        debug!(
            mailbox = %folder.name,
            num_messages = folder.exists,
            uid_validity = ?folder.uid_validity,
            "Selected mailbox"
        );
    }

    fn message_existing(&self, message: &RemoteMessage, path: &Path) {
        debug!(
            seq = message.sequence,
            uid = ?message.uid,
            message_id = %message.identity,
            path = %path.display(),
            "Message already downloaded"
        );
    }

    fn message_written(&self, message: &RemoteMessage, path: &Path) {
        info!(
            seq = message.sequence,
            uid = ?message.uid,
            message_id = %message.identity,
            subject = message.subject.as_deref().unwrap_or_default(),
            path = %path.display(),
            bytes = message.content.len(),
            "Wrote message"
        );
    }

    fn logout_failed(&self, err: &Error) {
        error!(error = %err, "Error on logout from server");
    }

    fn finished(&self, result: &SyncResult) {
        info!(
            new = result.new_emails.len(),
            existing = result.existing_emails.len(),
            "Finished syncing"
        );
    }
}

impl<R: SyncReporter + ?Sized> SyncReporter for &R {
    fn folder_selected(&self, folder: &FolderInfo) {
        (**self).folder_selected(folder);
    }

    fn message_existing(&self, message: &RemoteMessage, path: &Path) {
        (**self).message_existing(message, path);
    }

    fn message_written(&self, message: &RemoteMessage, path: &Path) {
        (**self).message_written(message, path);
    }

    fn logout_failed(&self, error: &Error) {
        (**self).logout_failed(error);
    }

    fn finished(&self, result: &SyncResult) {
        (**self).finished(result);
    }
}
