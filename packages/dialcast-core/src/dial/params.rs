//! Query-string and body builders for the lounge bind and command calls.
//!
//! Key order inside each query string and body is fixed; the lounge endpoint
//! is order-sensitive in practice and the sequences here match known-working
//! traffic.

use rand::Rng;
use uuid::Uuid;

use crate::dial::types::LoungeCommand;
use crate::error::{DialError, DialResult};
use crate::protocol_constants::BIND_REQUEST_BODY;

/// Alphabet of the channel nonce: digits and uppercase letters.
const ZX_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of the channel nonce.
const ZX_LEN: usize = 16;

/// Percent-encodes a value for embedding in a query string or form body.
///
/// Unreserved characters (ALPHA / DIGIT / `-` / `.` / `_` / `~`) pass
/// through; everything else becomes `%XX` with uppercase hex digits.
#[must_use]
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Decodes `%XX` escapes. Malformed escapes are left as-is.
#[must_use]
pub fn percent_decode(value: &str) -> String {
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// Generates a fresh random session id (UUID v4, lowercase hyphenated).
#[must_use]
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a fresh channel nonce: 16 characters from `[0-9A-Z]`.
#[must_use]
pub fn generate_zx() -> String {
    let mut rng = rand::thread_rng();
    (0..ZX_LEN)
        .map(|_| ZX_ALPHABET[rng.gen_range(0..ZX_ALPHABET.len())] as char)
        .collect()
}

/// Builds the query string and body of a session-bind request.
///
/// `name` is the remote-control name shown on the device; `token` is the
/// lounge token; `session_id` and `zx` are the locally generated identifiers
/// for this channel. All injected values are percent-encoded.
#[must_use]
pub fn build_bind_params(
    name: &str,
    token: &str,
    session_id: &str,
    zx: &str,
) -> (String, String) {
    let query = format!(
        "device=REMOTE_CONTROL&mdx-version=3&ui=1&v=2&name={}&app=youtube-desktop\
         &loungeIdToken={}&id={}&VER=8&CVER=1&zx={}&RID=1",
        percent_encode(name),
        percent_encode(token),
        percent_encode(session_id),
        percent_encode(zx),
    );
    (query, BIND_REQUEST_BODY.to_string())
}

/// Builds the query string and body of a lounge command request.
///
/// `sid` and `gsessionid` come from the bind response; `video_id` is required
/// for the queue commands and ignored by `play`/`pause`.
///
/// # Errors
/// Returns [`DialError::UnsupportedCommand`] when a queue command is built
/// without a video id. No network call has happened at that point.
pub fn build_command_params(
    sid: &str,
    gsessionid: &str,
    token: &str,
    command: LoungeCommand,
    video_id: Option<&str>,
) -> DialResult<(String, String)> {
    let query = format!(
        "CVER=1&RID=1&SID={}&VER=8&gsessionid={}&loungeIdToken={}",
        percent_encode(sid),
        percent_encode(gsessionid),
        percent_encode(token),
    );

    let body = match command {
        LoungeCommand::SetVideo | LoungeCommand::AddVideo => {
            let video = video_id.ok_or_else(|| {
                DialError::UnsupportedCommand(format!("{} without video id", command.as_str()))
            })?;
            let video = percent_encode(video);
            match command {
                LoungeCommand::SetVideo => format!(
                    "count=1&req0__sc=setVideo&req0_videoId={video}\
                     &req0_currentTime=0&req0_currentIndex=0&req0_videoIds={video}",
                ),
                _ => format!("count=1&req0__sc=addVideo&req0_videoId={video}"),
            }
        }
        LoungeCommand::Play | LoungeCommand::Pause => {
            format!("count=1&req0__sc={}", command.as_str())
        }
    };

    Ok((query, body))
}
