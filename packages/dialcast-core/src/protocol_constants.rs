//! Fixed protocol constants that should NOT be changed.
//!
//! These values are defined by the DIAL and lounge wire protocols (endpoint
//! URLs, header values, literal bodies) or were measured against real target
//! hardware (retry cadence); changing them breaks protocol compliance.

// ─────────────────────────────────────────────────────────────────────────────
// Lounge Endpoints
// ─────────────────────────────────────────────────────────────────────────────

/// Session-bind and command endpoint on the streaming-service host (TLS).
pub const LOUNGE_BIND_URL: &str = "https://www.youtube.com/api/lounge/bc/bind";

/// Token-batch endpoint that exchanges a screen id for a lounge token (TLS).
pub const LOUNGE_TOKEN_URL: &str =
    "https://www.youtube.com/api/lounge/pairing/get_lounge_token_batch";

/// Origin header required by the lounge endpoints and the device control plane.
pub const LOUNGE_ORIGIN: &str = "https://www.youtube.com";

/// User-Agent presented to the device control plane. Some device firmwares
/// only answer app-status requests from browser-like agents.
pub const REMOTE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/96.0.4664.45 Safari/537.36";

/// Literal request body of the session-bind POST.
pub const BIND_REQUEST_BODY: &str = "{\"count\": 0}";

// ─────────────────────────────────────────────────────────────────────────────
// Timeouts and Retry Cadence
// ─────────────────────────────────────────────────────────────────────────────

/// Timeout for device control-plane and command calls (seconds).
pub const CONTROL_TIMEOUT_SECS: u64 = 5;

/// Timeout for lounge token and cast-launch calls (seconds).
pub const LOUNGE_TIMEOUT_SECS: u64 = 10;

/// Default number of app-status polls before giving up on a device.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 5;

/// Default delay between app-status polls (seconds).
///
/// Fixed delay, no backoff or jitter: the value is tied to the measured
/// application-startup latency on target hardware.
pub const DEFAULT_POLL_DELAY_SECS: u64 = 3;

// ─────────────────────────────────────────────────────────────────────────────
// Resource Guard
// ─────────────────────────────────────────────────────────────────────────────

/// Minimum free memory required before opening a TLS session (bytes).
///
/// The lounge channel was profiled on a constrained controller where
/// concurrent TLS handshakes could exhaust the heap; the guard stays in
/// place on unconstrained hosts to document that profile.
pub const MIN_FREE_MEMORY_FOR_TLS: u64 = 25_000;

// ─────────────────────────────────────────────────────────────────────────────
// HTTP
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum response body size read from any endpoint (bytes).
pub const MAX_RESPONSE_BODY_BYTES: usize = 64 * 1024;

// ─────────────────────────────────────────────────────────────────────────────
// Application Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Default remote-control name shown on the device during a bound session.
pub const DEFAULT_DEVICE_NAME: &str = "DialCast";
