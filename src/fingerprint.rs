//! Mapping from message identities to file names.
//!
//! A message is stored as `<hex>.eml`, where `<hex>` is the lowercase hex
//! rendering of the first [`FINGERPRINT_LEN`] bytes of the SHA-512 digest of
//! its identity. The mapping is pure: the same identity always yields the
//! same path, on any machine, and the hex rendering makes the name safe no
//! matter which bytes the identity contains.
//!
//! ```
//! use imap_folder_sync::fingerprint::message_path;
//! use std::path::Path;
//!
//! let path = message_path(Path::new("messages"), "<abc@example.com>");
//! assert_eq!(
//!     path,
//!     Path::new("messages/e67d074fbd3395113c02ae355f9ddb296258696239e1100a65041fe569adbf.eml")
//! );
//! ```

use crate::mailbox::MessageIdentity;
use sha2::{Digest, Sha512};
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

/// Number of digest bytes kept in a file name.
///
/// Existing message directories were written with 31 bytes; changing this
/// renames every file and makes the next run download everything again.
pub const FINGERPRINT_LEN: usize = 31;

/// File extension of stored messages.
pub const MESSAGE_EXTENSION: &str = "eml";

/// Truncated SHA-512 digest of a [`MessageIdentity`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Computes the fingerprint of an identity.
    #[must_use]
    pub fn of(identity: &MessageIdentity) -> Self {
        Self::of_str(identity.as_str())
    }

    /// Computes the fingerprint of a raw identity string.
    #[must_use]
    pub fn of_str(identity: &str) -> Self {
        let digest = Sha512::digest(identity.as_bytes());
        let mut bytes = [0u8; FINGERPRINT_LEN];
        bytes.copy_from_slice(&digest[..FINGERPRINT_LEN]);
        Self(bytes)
    }

    /// The truncated digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Lowercase hex rendering, two characters per byte.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }

    /// `<hex>.eml`
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{self}.{MESSAGE_EXTENSION}")
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|byte| write!(f, "{byte:02x}"))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hex = String::with_capacity(FINGERPRINT_LEN * 2);
        write!(hex, "{self}")?;
        f.debug_tuple("Fingerprint").field(&hex).finish()
    }
}

/// Returns the path a message with the given identity is stored at.
#[must_use]
pub fn message_path(base_dir: &Path, identity: &str) -> PathBuf {
    base_dir.join(Fingerprint::of_str(identity).file_name())
}
