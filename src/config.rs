//! Configuration for a folder sync run.
//!
//! Use [`SyncConfigBuilder`] to create a configuration with sensible defaults:
//!
//! ```
//! use imap_folder_sync::SyncConfig;
//!
//! let config = SyncConfig::builder()
//!     .server("mail.example.com:993")
//!     .username("alice")
//!     .password("app-password")
//!     .mailbox("INBOX")
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.messages_dir().to_str(), Some("messages"));
//! ```

use crate::error::{Error, Result};
use crate::proxy::Socks5Proxy;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default IMAPS port, used when the server address has none.
pub const DEFAULT_IMAP_PORT: u16 = 993;

/// Default directory messages are written to.
pub const DEFAULT_MESSAGES_DIR: &str = "messages";

/// A `host:port` server address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    host: String,
    port: u16,
}

impl ServerAddress {
    /// Creates an address from its parts.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Hostname, used for TLS SNI and certificate verification.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for ServerAddress {
    type Err = Error;

    /// Parses `host:port`, `host` (port 993) or `[v6-literal]:port`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = |message: String| Error::InvalidConfig { message };

        if s.is_empty() {
            return Err(invalid("server is required".into()));
        }

        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| invalid(format!("unterminated IPv6 literal in server '{s}'")))?;
            match after.strip_prefix(':') {
                Some(port) => (host, Some(port)),
                None if after.is_empty() => (host, None),
                None => return Err(invalid(format!("unexpected text after ']' in server '{s}'"))),
            }
        } else if s.matches(':').count() > 1 {
            return Err(invalid(format!(
                "IPv6 server '{s}' must be bracketed, e.g. [{s}]:{DEFAULT_IMAP_PORT}"
            )));
        } else {
            match s.rsplit_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (s, None),
            }
        };

        if host.is_empty() {
            return Err(invalid(format!("missing host in server '{s}'")));
        }

        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .ok()
                .filter(|port| *port != 0)
                .ok_or_else(|| invalid(format!("invalid port in server '{s}'")))?,
            None => DEFAULT_IMAP_PORT,
        };

        Ok(Self::new(host, port))
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Configuration for synchronizing one IMAP folder into a local directory.
///
/// Create using [`SyncConfig::builder()`].
///
/// The `password` field is stored as a [`SecretString`] to prevent
/// accidental logging of credentials.
#[derive(Clone)]
pub struct SyncConfig {
    server: ServerAddress,
    username: String,
    password: SecretString,
    mailbox: String,
    messages_dir: PathBuf,
    /// Optional SOCKS5 proxy for the connection.
    pub proxy: Option<Socks5Proxy>,
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("mailbox", &self.mailbox)
            .field("messages_dir", &self.messages_dir)
            .field("proxy", &self.proxy)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl SyncConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// The server to connect to.
    #[must_use]
    pub fn server(&self) -> &ServerAddress {
        &self.server
    }

    /// User name for LOGIN.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password as a string slice.
    ///
    /// The password is intentionally not directly accessible to prevent accidental logging.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// The folder to download, e.g. `INBOX` or `INBOX/subfolder`.
    #[must_use]
    pub fn mailbox(&self) -> &str {
        &self.mailbox
    }

    /// Local directory messages are written to.
    #[must_use]
    pub fn messages_dir(&self) -> &Path {
        &self.messages_dir
    }
}

/// Timeout configuration for each network phase of a run.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Timeout for the TCP connection and TLS handshake.
    pub connect: Duration,
    /// Timeout for IMAP authentication.
    pub auth: Duration,
    /// Timeout for selecting the mailbox.
    pub select: Duration,
    /// Timeout for receiving each message of the listing.
    pub message_fetch: Duration,
    /// Timeout for the logout round trip.
    pub logout: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            auth: Duration::from_secs(30),
            select: Duration::from_secs(10),
            message_fetch: Duration::from_secs(120),
            logout: Duration::from_secs(5),
        }
    }
}

/// Builder for [`SyncConfig`].
#[derive(Debug, Default)]
pub struct SyncConfigBuilder {
    server: Option<String>,
    username: Option<String>,
    password: Option<SecretString>,
    mailbox: Option<String>,
    messages_dir: Option<PathBuf>,
    proxy: Option<Socks5Proxy>,
    timeouts: Option<TimeoutConfig>,
}

impl SyncConfigBuilder {
    /// Sets the server address as `host:port` (required).
    ///
    /// The port defaults to 993 when omitted.
    #[must_use]
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Sets the login user name (required).
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the password (required, may be empty).
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Sets the mailbox to download (required).
    #[must_use]
    pub fn mailbox(mut self, mailbox: impl Into<String>) -> Self {
        self.mailbox = Some(mailbox.into());
        self
    }

    /// Sets the local directory messages are written to.
    ///
    /// Defaults to `messages`.
    #[must_use]
    pub fn messages_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.messages_dir = Some(dir.into());
        self
    }

    /// Sets a SOCKS5 proxy for the connection.
    #[must_use]
    pub fn proxy(mut self, proxy: Socks5Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Sets timeout configuration.
    #[must_use]
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .connect = timeout;
        self
    }

    /// Sets the authentication timeout.
    #[must_use]
    pub fn auth_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .auth = timeout;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the server, user name, password or
    /// mailbox is missing, or if the server address cannot be parsed.
    pub fn build(self) -> Result<SyncConfig> {
        let server = self
            .server
            .ok_or_else(|| missing("server"))?
            .parse::<ServerAddress>()?;

        let username = self
            .username
            .filter(|username| !username.is_empty())
            .ok_or_else(|| missing("username"))?;

        let password = self.password.ok_or_else(|| missing("password"))?;

        let mailbox = self
            .mailbox
            .filter(|mailbox| !mailbox.is_empty())
            .ok_or_else(|| missing("mailbox"))?;

        let messages_dir = self
            .messages_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MESSAGES_DIR));
        if messages_dir.as_os_str().is_empty() {
            return Err(missing("messages directory"));
        }

        Ok(SyncConfig {
            server,
            username,
            password,
            mailbox,
            messages_dir,
            proxy: self.proxy,
            timeouts: self.timeouts.unwrap_or_default(),
        })
    }
}

fn missing(field: &str) -> Error {
    Error::InvalidConfig {
        message: format!("{field} is required"),
    }
}
