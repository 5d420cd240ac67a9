//! Internal module turning IMAP fetch responses into listing elements.

use crate::mailbox::{MessageIdentity, RemoteMessage};
use mailparse::MailHeaderMap;
use tracing::{debug, warn};

/// Builds a [`RemoteMessage`] from a fetch response.
///
/// Returns `None` for responses carrying no body section, such as
/// unsolicited flag updates interleaved with the listing.
pub(crate) fn remote_message(fetch: &async_imap::types::Fetch) -> Option<RemoteMessage> {
    let envelope = fetch.envelope();
    build_message(FetchParts {
        sequence: fetch.message,
        uid: fetch.uid,
        body: fetch.body(),
        subject: envelope.and_then(|envelope| envelope.subject.as_deref()),
        message_id: envelope.and_then(|envelope| envelope.message_id.as_deref()),
    })
}

/// The pieces of a fetch response the listing cares about.
#[derive(Debug, Default, Clone, Copy)]
struct FetchParts<'a> {
    sequence: u32,
    uid: Option<u32>,
    body: Option<&'a [u8]>,
    subject: Option<&'a [u8]>,
    message_id: Option<&'a [u8]>,
}

fn build_message(parts: FetchParts<'_>) -> Option<RemoteMessage> {
    let FetchParts { sequence, uid, .. } = parts;

    let Some(body) = parts.body else {
        debug!(seq = sequence, ?uid, "Fetch response without body, skipping");
        return None;
    };

    let identity = parts
        .message_id
        .and_then(|raw| normalize_message_id(&String::from_utf8_lossy(raw)))
        .or_else(|| header_message_id(body))
        .unwrap_or_else(|| {
            warn!(
                seq = sequence,
                ?uid,
                "Message has no Message-ID, using empty identity"
            );
            MessageIdentity::default()
        });

    Some(RemoteMessage {
        sequence,
        uid,
        identity,
        subject: parts.subject.map(decode_subject),
        content: body.to_vec(),
    })
}

/// Decodes RFC 2047 encoded words in an envelope subject.
///
/// Falls back to a lossy UTF-8 reading when the value does not parse.
fn decode_subject(raw: &[u8]) -> String {
    let mut line = b"Subject: ".to_vec();
    line.extend_from_slice(raw);

    match mailparse::parse_header(&line) {
        Ok((header, _)) => header.get_value(),
        Err(_) => String::from_utf8_lossy(raw).into_owned(),
    }
}

/// Reads the `Message-ID` header straight from the raw message.
fn header_message_id(raw: &[u8]) -> Option<MessageIdentity> {
    let (headers, _) = match mailparse::parse_headers(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "Failed to parse message headers");
            return None;
        }
    };

    headers
        .get_first_value("Message-ID")
        .and_then(|value| normalize_message_id(&value))
}

/// Strips whitespace and one pair of surrounding angle brackets.
///
/// Returns `None` if nothing is left.
fn normalize_message_id(raw: &str) -> Option<MessageIdentity> {
    let trimmed = raw.trim();
    let bare = trimmed
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(trimmed)
        .trim();

    (!bare.is_empty()).then(|| MessageIdentity::new(bare))
}
