//! Response codec for the three wire formats of the cast control plane.
//!
//! Pure text extraction, no I/O. Every function returns a present/absent
//! result per field and never panics on malformed input.
//!
//! The bind-session response is deliberately parsed by literal marker search
//! rather than a structural JSON parser: the endpoint streams a length-framed
//! sequence of bracketed arrays whose outer envelope is not valid JSON on its
//! own (values may be split across framing boundaries at arbitrary byte
//! counts). A strict parser would reject valid sessions.

use serde_json::Value;

use crate::error::{DialError, DialResult};

// ─────────────────────────────────────────────────────────────────────────────
// Bind-Session Push-Channel Format
// ─────────────────────────────────────────────────────────────────────────────

/// Marker preceding the session id (`SID`) in a bind response.
const SID_MARKER: &str = "c\",\"";

/// Marker preceding the group session id in a bind response.
const GSESSION_MARKER: &str = "S\",\"";

/// Marker preceding the optional playlist id in a bind response.
const LIST_ID_MARKER: &str = "\"playlistModified\",{\"listId\":\"";

/// Session fields extracted from a bind-session response.
///
/// Absence of a field means its marker was not present in the body; it is
/// never an error at this layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindFields {
    /// Session id (`SID`) authorizing subsequent commands.
    pub sid: Option<String>,
    /// Group session id paired with the `SID`.
    pub gsessionid: Option<String>,
    /// Playlist/list identifier, only present when the device reports one.
    pub list_id: Option<String>,
}

/// Returns the span between `marker` and the next quote, if both exist.
fn after_marker(input: &str, marker: &str) -> Option<String> {
    let start = input.find(marker)? + marker.len();
    let rest = &input[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

/// Extracts `SID`, `gsessionid`, and the optional list id from a
/// bind-session response body.
pub fn extract_bind_fields(body: &str) -> BindFields {
    BindFields {
        sid: after_marker(body, SID_MARKER),
        gsessionid: after_marker(body, GSESSION_MARKER),
        list_id: after_marker(body, LIST_ID_MARKER),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Token-Batch JSON
// ─────────────────────────────────────────────────────────────────────────────

/// Extracts the lounge token from a token-batch response.
///
/// The body is contractual JSON of shape
/// `{"screens":[{"loungeToken": "..."}]}`; the token is taken from the first
/// array element only. Any structural deviation (unparsable body, missing or
/// empty array, non-string field) yields `None`, never an error.
pub fn extract_lounge_token(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("screens")?
        .as_array()?
        .first()?
        .get("loungeToken")?
        .as_str()
        .map(str::to_string)
}

// ─────────────────────────────────────────────────────────────────────────────
// Descriptor Headers and XML
// ─────────────────────────────────────────────────────────────────────────────

/// Extracts the `Application-Url` header value from a raw header block.
///
/// The lookup is case-insensitive (HTTP header names are not case-sensitive
/// and clients commonly lowercase them on receipt). Leading `:` and spaces
/// are skipped; the value ends at the first CR or LF.
pub fn extract_application_url(header_block: &str) -> Option<String> {
    const HEADER: &str = "application-url";
    let lower = header_block.to_ascii_lowercase();
    let pos = lower.find(HEADER)?;
    let rest = &header_block[pos + HEADER.len()..];
    let rest = rest.trim_start_matches([':', ' ']);
    let end = rest.find(['\r', '\n']).unwrap_or(rest.len());
    let url = &rest[..end];
    if url.is_empty() {
        return None;
    }
    Some(url.to_string())
}

/// Extracts the text content of the first `<element>...</element>` pair.
///
/// Textual scan, intentionally not an XML parse: the device descriptors in
/// the wild are small and flat, and the fields we need are never attributed
/// or namespaced. An empty captured span counts as absent.
pub fn extract_xml_text(xml: &str, element: &str) -> Option<String> {
    let open = format!("<{element}>");
    let close = format!("</{element}>");
    let start = xml.find(&open)? + open.len();
    let end = xml[start..].find(&close)? + start;
    let text = &xml[start..end];
    if text.is_empty() {
        return None;
    }
    Some(text.to_string())
}

/// Extracts the screen id assigned by the running application instance.
pub fn extract_screen_id(xml: &str) -> Option<String> {
    extract_xml_text(xml, "screenId")
}

/// Extracts the device's friendly display name from a descriptor body.
pub fn extract_friendly_name(xml: &str) -> Option<String> {
    extract_xml_text(xml, "friendlyName")
}

// ─────────────────────────────────────────────────────────────────────────────
// Location URLs
// ─────────────────────────────────────────────────────────────────────────────

/// Parses `scheme://host:port/path` into host and port.
///
/// # Errors
/// Returns [`DialError::InvalidLocation`] when the scheme separator is
/// missing, when no `:` precedes the first `/` after the scheme, or when the
/// port is not a valid number.
pub fn extract_ip_and_port(url: &str) -> DialResult<(String, u16)> {
    let invalid = || DialError::InvalidLocation(url.to_string());

    let (_, rest) = url.split_once("://").ok_or_else(invalid)?;
    let colon = rest.find(':').ok_or_else(invalid)?;
    let slash = rest.find('/').ok_or_else(invalid)?;
    if colon > slash {
        return Err(invalid());
    }

    let host = rest[..colon].to_string();
    if host.is_empty() {
        return Err(invalid());
    }
    let port: u16 = rest[colon + 1..slash].parse().map_err(|_| invalid())?;
    Ok((host, port))
}

/// Returns the path portion of a URL (after host and port), or `/` when the
/// URL carries no path.
pub fn extract_path(url: &str) -> String {
    let rest = match url.split_once("://") {
        Some((_, rest)) => rest,
        None => url,
    };
    match rest.find('/') {
        Some(idx) => rest[idx..].to_string(),
        None => "/".to_string(),
    }
}
