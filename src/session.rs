//! IMAP implementation of the session seam.
//!
//! This module wraps async-imap operations with timeouts and error mapping.

use crate::config::{SyncConfig, TimeoutConfig};
use crate::connection::{Dialer, TlsStream};
use crate::error::{Error, Result};
use crate::mailbox::{FolderInfo, MailboxSession, MessageStream, RemoteMessage, SessionProvider};
use crate::parser;
use async_imap::{Client, Session};
use futures::StreamExt;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, warn};

/// Type alias for IMAP session over TLS.
pub(crate) type ImapSession = Session<TlsStream>;

/// Items requested for every message of the listing.
///
/// `BODY.PEEK[]` leaves the server's `\Seen` flag alone.
const FETCH_ITEMS: &str = "(UID ENVELOPE BODY.PEEK[])";

/// Connects to IMAP servers over TLS.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImapProvider;

impl SessionProvider for ImapProvider {
    type Session = ImapMailboxSession;

    #[instrument(
        name = "ImapProvider::connect",
        skip_all,
        fields(
            server = %config.server(),
            user = %config.username(),
            proxy_enabled = config.proxy.is_some()
        )
    )]
    async fn connect(&self, config: &SyncConfig) -> Result<ImapMailboxSession> {
        let target = config.server().to_string();
        let timeouts = &config.timeouts;

        let dialer = Dialer::new(config.proxy.as_ref());
        let tls_stream = tokio::time::timeout(timeouts.connect, dialer.dial(config.server()))
            .await
            .map_err(|_| Error::ConnectTimeout {
                target: target.clone(),
                timeout: timeouts.connect,
            })??;

        // The server greeting is consumed by LOGIN along with the other
        // untagged responses.
        let client = Client::new(tls_stream);

        let credentials = Credentials {
            user: config.username(),
            password: config.password(),
        };

        let session = tokio::time::timeout(
            timeouts.auth,
            authenticate(client, &credentials, &target),
        )
        .await
        .map_err(|_| Error::AuthTimeout {
            user: config.username().to_string(),
            timeout: timeouts.auth,
        })??;

        debug!("Logged in");

        Ok(ImapMailboxSession {
            session,
            timeouts: timeouts.clone(),
        })
    }
}

/// An authenticated IMAP session.
pub struct ImapMailboxSession {
    session: ImapSession,
    timeouts: TimeoutConfig,
}

impl std::fmt::Debug for ImapMailboxSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImapMailboxSession")
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl MailboxSession for ImapMailboxSession {
    #[instrument(name = "session::select", skip(self))]
    async fn select(&mut self, mailbox: &str) -> Result<FolderInfo> {
        let timeout = self.timeouts.select;

        let selected = tokio::time::timeout(timeout, self.session.select(mailbox))
            .await
            .map_err(|_| Error::SelectTimeout {
                mailbox: mailbox.to_string(),
                timeout,
            })?
            .map_err(|source| Error::SelectMailbox {
                mailbox: mailbox.to_string(),
                source,
            })?;

        debug!(
            num_messages = selected.exists,
            uid_validity = ?selected.uid_validity,
            "Selected mailbox"
        );

        Ok(FolderInfo {
            name: mailbox.to_string(),
            exists: selected.exists,
            uid_validity: selected.uid_validity,
        })
    }

    #[instrument(
        name = "session::stream_messages",
        skip_all,
        fields(mailbox = %folder.name, num_messages = folder.exists)
    )]
    async fn stream_messages(&mut self, folder: &FolderInfo) -> Result<MessageStream<'_>> {
        if folder.exists == 0 {
            debug!("Mailbox is empty, nothing to fetch");
            return Ok(futures::stream::empty::<Result<RemoteMessage>>().boxed());
        }

        debug!("Listing all messages in mailbox");

        let item_timeout = self.timeouts.message_fetch;
        let fetches = tokio::time::timeout(item_timeout, self.session.fetch("1:*", FETCH_ITEMS))
            .await
            .map_err(|_| Error::FetchTimeout {
                timeout: item_timeout,
            })?
            .map_err(|source| Error::ImapFetch {
                mailbox: folder.name.clone(),
                source,
            })?;

        Ok(listing(fetches.boxed(), item_timeout, parser::remote_message))
    }

    #[instrument(name = "session::logout", skip(self))]
    async fn logout(&mut self) -> Result<()> {
        let timeout = self.timeouts.logout;
        debug!("Logging out");

        tokio::time::timeout(timeout, self.session.logout())
            .await
            .map_err(|_| Error::LogoutTimeout { timeout })?
            .map_err(|source| Error::ImapLogout { source })
    }
}

type ImapItems<'a, T> = futures::stream::BoxStream<'a, std::result::Result<T, async_imap::error::Error>>;

/// Adapts raw fetch responses into listing elements.
///
/// Each wait for the next response is bounded by `item_timeout`. Responses
/// for which `parse` returns `None` are skipped. The listing ends after the
/// first error.
fn listing<'a, T, F>(items: ImapItems<'a, T>, item_timeout: Duration, parse: F) -> MessageStream<'a>
where
    T: Send + 'a,
    F: FnMut(&T) -> Option<RemoteMessage> + Send + 'a,
{
    futures::stream::unfold(Some((items, parse)), move |state| async move {
        let (mut items, mut parse) = state?;
        loop {
            let next = match tokio::time::timeout(item_timeout, items.next()).await {
                Ok(next) => next?,
                Err(_) => {
                    let err = Error::FetchTimeout {
                        timeout: item_timeout,
                    };
                    return Some((Err(err), None));
                }
            };

            match next {
                Ok(item) => {
                    if let Some(message) = parse(&item) {
                        debug!(seq = message.sequence, uid = ?message.uid, "Fetched message");
                        return Some((Ok(message), Some((items, parse))));
                    }
                }
                Err(source) => return Some((Err(Error::FetchMessage { source }), None)),
            }
        }
    })
    .boxed()
}

/// Login credentials borrowed from the configuration.
struct Credentials<'a> {
    user: &'a str,
    password: &'a str,
}

/// Authenticates and returns a session.
///
/// A rejected login shuts the stream down before returning; a shutdown
/// failure is attached to the login error.
#[instrument(name = "session::authenticate", skip_all, fields(user = %credentials.user))]
async fn authenticate<S>(
    client: Client<S>,
    credentials: &Credentials<'_>,
    target: &str,
) -> Result<Session<S>>
where
    S: AsyncRead + AsyncWrite + Unpin + std::fmt::Debug + Send,
{
    debug!("Authenticating to IMAP server");

    match client.login(credentials.user, credentials.password).await {
        Ok(session) => Ok(session),
        Err((source, client)) => {
            let mut stream = client.into_inner();
            let disconnect = stream.shutdown().await.err();
            if let Some(err) = &disconnect {
                warn!(error = %err, "Failed to close connection after rejected login");
            }

            Err(Error::ImapLogin {
                user: credentials.user.to_string(),
                target: target.to_string(),
                source,
                disconnect,
            })
        }
    }
}
