//! TCP and TLS plumbing for IMAP connections.
//!
//! The TCP leg is either direct or tunnelled through SOCKS5. TLS is always
//! rustls, trusting the webpki roots.

use crate::config::ServerAddress;
use crate::error::{Error, Result};
use crate::proxy::Socks5Proxy;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore, ServerName};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_socks::tcp::Socks5Stream;
use tracing::{debug, instrument};
use webpki_roots::TLS_SERVER_ROOTS;

/// A TLS stream over TCP, used for IMAP communication.
pub(crate) type TlsStream = tokio_rustls::client::TlsStream<TcpStream>;

/// Opens TLS streams, directly or through an optional SOCKS5 proxy.
pub(crate) struct Dialer<'a> {
    tls: TlsConnector,
    proxy: Option<&'a Socks5Proxy>,
}

impl<'a> Dialer<'a> {
    pub(crate) fn new(proxy: Option<&'a Socks5Proxy>) -> Self {
        Self {
            tls: TlsConnector::from(Arc::new(client_config())),
            proxy,
        }
    }

    /// Connects to `server` and completes the TLS handshake.
    ///
    /// The host is validated as a TLS server name before any socket is opened.
    #[instrument(
        name = "connection::establish_tls",
        skip_all,
        fields(server = %server, proxy_enabled = self.proxy.is_some())
    )]
    pub(crate) async fn dial(&self, server: &ServerAddress) -> Result<TlsStream> {
        let sni = server_name(server.host())?;

        let tcp = match self.proxy {
            Some(proxy) => tunnel(proxy, server).await?,
            None => direct(server).await?,
        };

        debug!("Starting TLS handshake");
        self.tls
            .connect(sni, tcp)
            .await
            .map_err(|source| Error::TlsConnect {
                target: server.to_string(),
                source,
            })
    }
}

fn client_config() -> ClientConfig {
    let mut roots = RootCertStore::empty();
    roots.add_trust_anchors(TLS_SERVER_ROOTS.iter().map(|anchor| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            anchor.subject,
            anchor.spki,
            anchor.name_constraints,
        )
    }));

    ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth()
}

fn server_name(host: &str) -> Result<ServerName> {
    ServerName::try_from(host).map_err(|source| Error::InvalidDnsName {
        host: host.to_string(),
        source,
    })
}

async fn direct(server: &ServerAddress) -> Result<TcpStream> {
    debug!("Opening direct TCP connection");

    TcpStream::connect((server.host(), server.port()))
        .await
        .map_err(|source| Error::TcpConnect {
            target: server.to_string(),
            source,
        })
}

#[instrument(name = "connection::socks5", skip_all, fields(proxy = %proxy))]
async fn tunnel(proxy: &Socks5Proxy, server: &ServerAddress) -> Result<TcpStream> {
    debug!("Opening TCP connection through SOCKS5 proxy");

    let proxy_addr = (proxy.host.as_str(), proxy.port);
    let target = (server.host(), server.port());

    let connected = if let Some(auth) = &proxy.auth {
        Socks5Stream::connect_with_password(proxy_addr, target, &auth.username, auth.password())
            .await
    } else {
        Socks5Stream::connect(proxy_addr, target).await
    };

    connected
        .map(Socks5Stream::into_inner)
        .map_err(|source| Error::Socks5Connect {
            proxy_host: proxy.host.clone(),
            target: server.to_string(),
            source,
        })
}
