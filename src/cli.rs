//! Command line arguments, password acquisition and logging setup.

use clap::Parser;
use imap_folder_sync::config::DEFAULT_MESSAGES_DIR;
use imap_folder_sync::{Result, Socks5Proxy, SyncConfig};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the IMAP password.
pub const PASSWORD_ENV: &str = "IMAP_PASSWORD";

/// Environment variable holding the SOCKS5 proxy password.
pub const PROXY_PASSWORD_ENV: &str = "IMAP_PROXY_PASSWORD";

#[derive(Debug, Parser)]
#[command(
    name = "imap-folder-sync",
    version,
    about = "Copy emails from an IMAP mailbox to your computer, one .eml file per message.",
    long_about = "Copy emails from an IMAP mailbox to your computer, one .eml file per message. \
                  Messages already present in the target directory are not downloaded again. \
                  The password is read from IMAP_PASSWORD, or prompted for."
)]
pub struct Args {
    /// Sync from this mail server and port (e.g. mail.example.com:993)
    #[arg(long, value_name = "HOST:PORT")]
    pub server: String,

    /// Username for logging into the mail server
    #[arg(long)]
    pub username: String,

    /// Mailbox to read messages from (typically INBOX or INBOX/subfolder)
    #[arg(long)]
    pub mailbox: String,

    /// Local directory to save messages in
    #[arg(long = "messages-dir", value_name = "DIR", default_value = DEFAULT_MESSAGES_DIR)]
    pub messages_dir: PathBuf,

    /// Route the connection through this SOCKS5 proxy
    #[arg(long, value_name = "HOST:PORT")]
    pub proxy: Option<Socks5Proxy>,

    /// Proxy user name (password from IMAP_PROXY_PASSWORD, or prompted for)
    #[arg(long = "proxy-user", requires = "proxy")]
    pub proxy_user: Option<String>,

    /// Seconds allowed for the TCP connection and TLS handshake
    #[arg(long = "connect-timeout", value_name = "SECS")]
    pub connect_timeout: Option<u64>,

    /// Seconds allowed for login
    #[arg(long = "auth-timeout", value_name = "SECS")]
    pub auth_timeout: Option<u64>,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Builds the sync configuration.
    ///
    /// `proxy_password` is only used together with `--proxy-user`.
    pub fn into_config(
        self,
        password: String,
        proxy_password: Option<String>,
    ) -> Result<SyncConfig> {
        let mut builder = SyncConfig::builder()
            .server(self.server)
            .username(self.username)
            .password(password)
            .mailbox(self.mailbox)
            .messages_dir(self.messages_dir);

        if let Some(mut proxy) = self.proxy {
            if let (Some(user), Some(proxy_password)) = (self.proxy_user, proxy_password) {
                proxy = proxy.authenticated(user, proxy_password);
            }
            builder = builder.proxy(proxy);
        }
        if let Some(secs) = self.connect_timeout {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.auth_timeout {
            builder = builder.auth_timeout(Duration::from_secs(secs));
        }

        builder.build()
    }
}

/// Returns the password from the environment, or asks for it without echo.
pub fn password(username: &str, server: &str) -> io::Result<String> {
    password_from(std::env::var(PASSWORD_ENV).ok(), || {
        rpassword::prompt_password(format!("Enter IMAP password for {username} on {server}: "))
    })
}

/// Returns the proxy password when `--proxy-user` is set.
///
/// Read from the environment, or asked for without echo.
pub fn proxy_password(args: &Args) -> io::Result<Option<String>> {
    let (Some(user), Some(proxy)) = (&args.proxy_user, &args.proxy) else {
        return Ok(None);
    };

    password_from(std::env::var(PROXY_PASSWORD_ENV).ok(), || {
        rpassword::prompt_password(format!(
            "Enter SOCKS5 proxy password for {user} on {}:{}: ",
            proxy.host, proxy.port
        ))
    })
    .map(Some)
}

fn password_from(
    env_value: Option<String>,
    prompt: impl FnOnce() -> io::Result<String>,
) -> io::Result<String> {
    match env_value {
        Some(password) if !password.is_empty() => Ok(password),
        _ => prompt(),
    }
}

/// Installs the `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise this crate logs at info, or debug
/// with `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "imap_folder_sync=debug"
    } else {
        "imap_folder_sync=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();
}
