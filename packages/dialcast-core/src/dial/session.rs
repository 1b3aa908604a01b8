//! Device session engine: status polling, token exchange, bind, commands.
//!
//! Free async functions generic over [`DialTransport`] so every path can be
//! driven against scripted responses. All state lives in the [`Device`]
//! passed in; functions advance its lifecycle and never roll it back.

use tokio_util::sync::CancellationToken;

use crate::dial::params;
use crate::dial::transport::DialTransport;
use crate::dial::types::{AppKind, Device, DeviceStatus, LoungeCommand};
use crate::dial::wire;
use crate::error::{DialError, DialResult};
use crate::headroom::{ensure_headroom, HeadroomProbe};
use crate::protocol_constants::{LOUNGE_BIND_URL, LOUNGE_ORIGIN, LOUNGE_TOKEN_URL, REMOTE_USER_AGENT};
use crate::state::Config;

/// Outcome of a single app-status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppStatus {
    /// The app reports running and exposed a screen id.
    Running,
    /// The app is stopped, starting, unreachable, or reported no screen id.
    NotRunning,
}

// ─────────────────────────────────────────────────────────────────────────────
// Status Polling
// ─────────────────────────────────────────────────────────────────────────────

/// Polls the device once for the application's run state.
///
/// A timeout, a non-200 status, a body without `<state>running</state>`, or a
/// missing screen id all count as [`AppStatus::NotRunning`]; only transport
/// failures other than timeouts are errors. On `Running` the screen id is
/// stored on the device and its state advanced to `ScreenIdKnown`.
pub async fn poll_app_status<T: DialTransport + ?Sized>(
    transport: &T,
    device: &mut Device,
    app: AppKind,
    config: &Config,
) -> DialResult<AppStatus> {
    let url = format!("{}{}", device.app_endpoint, app.control_path());
    let headers = [
        ("Origin", LOUNGE_ORIGIN),
        ("User-Agent", REMOTE_USER_AGENT),
        ("Content-Type", "text/plain; charset=\"utf-8\""),
    ];

    device.advance(DeviceStatus::AppStatusUnknown);

    let response = match transport.get(&url, &headers, config.control_timeout()).await {
        Ok(response) => response,
        Err(err) if err.is_timeout() => {
            log::debug!("[DIAL] Status poll timed out for {}", device.name);
            return Ok(AppStatus::NotRunning);
        }
        Err(err) => return Err(err.into()),
    };

    if response.status != 200 {
        log::debug!(
            "[DIAL] Status poll for {} answered {}",
            device.name,
            response.status
        );
        return Ok(AppStatus::NotRunning);
    }

    if !response.body.contains("<state>running</state>") {
        return Ok(AppStatus::NotRunning);
    }

    let Some(screen_id) = wire::extract_screen_id(&response.body) else {
        // Running but not yet far enough to have a screen id. Poll again.
        return Ok(AppStatus::NotRunning);
    };

    log::info!("[DIAL] {} is running, screen id acquired", device.name);
    device.screen_id = Some(screen_id);
    device.advance(DeviceStatus::AppRunning);
    device.advance(DeviceStatus::ScreenIdKnown);
    Ok(AppStatus::Running)
}

// ─────────────────────────────────────────────────────────────────────────────
// Token Exchange
// ─────────────────────────────────────────────────────────────────────────────

/// Exchanges the device's screen id for a lounge token.
///
/// # Errors
/// [`DialError::SessionNotBound`] is never returned here; instead a missing
/// screen id is a [`DialError::ParseFailure`]. A non-200 answer or a body
/// without a token yields [`DialError::TokenUnavailable`].
pub async fn fetch_lounge_token<T: DialTransport + ?Sized>(
    transport: &T,
    device: &mut Device,
    probe: &dyn HeadroomProbe,
    config: &Config,
) -> DialResult<()> {
    let screen_id = device
        .screen_id
        .as_deref()
        .ok_or(DialError::ParseFailure("screen id"))?;

    ensure_headroom(probe, config.min_free_memory_bytes)?;

    let body = format!("screen_ids={}", params::percent_encode(screen_id));
    let headers = [(
        "Content-Type",
        "application/x-www-form-urlencoded",
    )];
    let response = transport
        .post(LOUNGE_TOKEN_URL, &headers, body, config.lounge_timeout())
        .await?;

    if response.status != 200 {
        log::warn!(
            "[DIAL] Token batch for {} answered {}",
            device.name,
            response.status
        );
        return Err(DialError::TokenUnavailable);
    }

    let token = wire::extract_lounge_token(&response.body).ok_or(DialError::TokenUnavailable)?;
    log::info!("[DIAL] Lounge token acquired for {}", device.name);
    device.lounge_token = Some(token);
    device.advance(DeviceStatus::TokenAcquired);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Bind
// ─────────────────────────────────────────────────────────────────────────────

/// Binds a lounge session for a device holding a token.
///
/// Generates a fresh session id and channel nonce, posts the bind request,
/// and extracts `SID` and `gsessionid` from the response by marker search.
/// The HTTP status of the bind answer is ignored; only the presence of both
/// session fields decides success. The list id is stored when present.
pub async fn bind_session<T: DialTransport + ?Sized>(
    transport: &T,
    device: &mut Device,
    probe: &dyn HeadroomProbe,
    config: &Config,
) -> DialResult<()> {
    let token = device
        .lounge_token
        .as_deref()
        .ok_or(DialError::ParseFailure("lounge token"))?;

    ensure_headroom(probe, config.min_free_memory_bytes)?;

    let session_id = params::generate_session_id();
    let zx = params::generate_zx();
    let (query, body) = params::build_bind_params(&config.device_name, token, &session_id, &zx);

    let url = format!("{LOUNGE_BIND_URL}?{query}");
    let headers = [
        ("Content-Type", "application/json"),
        ("Origin", LOUNGE_ORIGIN),
    ];
    let response = transport
        .post(&url, &headers, body, config.lounge_timeout())
        .await?;

    let fields = wire::extract_bind_fields(&response.body);
    let Some(sid) = fields.sid else {
        return Err(DialError::BindFailed("SID"));
    };
    let Some(gsessionid) = fields.gsessionid else {
        return Err(DialError::BindFailed("gsessionid"));
    };

    log::info!("[DIAL] Session bound for {}", device.name);
    device.session_id = Some(session_id);
    device.zx = Some(zx);
    device.sid = Some(sid);
    device.gsessionid = Some(gsessionid);
    device.list_id = fields.list_id;
    device.advance(DeviceStatus::SessionBound);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Acquisition Loop
// ─────────────────────────────────────────────────────────────────────────────

/// Drives a device from `Discovered` to `SessionBound`.
///
/// Polls the app status up to `config.poll_attempts` times with a fixed
/// `config.poll_delay()` between attempts (no backoff, no jitter). The delay
/// is skipped after the final attempt. Cancellation is honored between
/// attempts, never mid-request. Any terminal failure freezes the device in
/// `Failed` before the error is returned.
///
/// # Errors
/// [`DialError::RetriesExhausted`] when the app never reports running;
/// [`DialError::Cancelled`] when the token fires between attempts; otherwise
/// the first error from polling, token exchange, or bind.
pub async fn acquire_session<T: DialTransport + ?Sized>(
    transport: &T,
    device: &mut Device,
    app: AppKind,
    probe: &dyn HeadroomProbe,
    config: &Config,
    cancel: &CancellationToken,
) -> DialResult<()> {
    let mut running = false;

    for attempt in 1..=config.poll_attempts {
        if cancel.is_cancelled() {
            device.mark_failed();
            return Err(DialError::Cancelled);
        }

        log::debug!(
            "[DIAL] Status poll {}/{} for {}",
            attempt,
            config.poll_attempts,
            device.name
        );
        match poll_app_status(transport, device, app, config).await {
            Ok(AppStatus::Running) => {
                running = true;
                break;
            }
            Ok(AppStatus::NotRunning) => {}
            Err(err) => {
                // A hard transport failure consumes the attempt like a
                // not-running answer would.
                log::warn!("[DIAL] Status poll for {} failed: {}", device.name, err);
            }
        }

        if attempt < config.poll_attempts {
            tokio::select! {
                () = cancel.cancelled() => {
                    device.mark_failed();
                    return Err(DialError::Cancelled);
                }
                () = tokio::time::sleep(config.poll_delay()) => {}
            }
        }
    }

    if !running {
        log::warn!(
            "[DIAL] {} never reported running after {} polls",
            device.name,
            config.poll_attempts
        );
        device.mark_failed();
        return Err(DialError::RetriesExhausted {
            attempts: config.poll_attempts,
        });
    }

    if let Err(err) = fetch_lounge_token(transport, device, probe, config).await {
        device.mark_failed();
        return Err(err);
    }
    if let Err(err) = bind_session(transport, device, probe, config).await {
        device.mark_failed();
        return Err(err);
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Command Dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Dispatches a lounge command against a bound session.
///
/// Parameter validation happens before the headroom check and before any
/// network call. A transport failure here does NOT fail the device; the
/// session stays bound and the caller may retry.
///
/// # Errors
/// [`DialError::SessionNotBound`] when the device has no bound session;
/// [`DialError::UnsupportedCommand`] for a queue command without a video id;
/// [`DialError::UnexpectedStatus`] for a non-2xx answer.
pub async fn dispatch_command<T: DialTransport + ?Sized>(
    transport: &T,
    device: &Device,
    command: LoungeCommand,
    video_id: Option<&str>,
    probe: &dyn HeadroomProbe,
    config: &Config,
) -> DialResult<()> {
    if !device.is_bound() {
        return Err(DialError::SessionNotBound);
    }
    let (Some(sid), Some(gsessionid), Some(token)) = (
        device.sid.as_deref(),
        device.gsessionid.as_deref(),
        device.lounge_token.as_deref(),
    ) else {
        return Err(DialError::SessionNotBound);
    };

    let (query, body) = params::build_command_params(sid, gsessionid, token, command, video_id)?;

    ensure_headroom(probe, config.min_free_memory_bytes)?;

    let url = format!("{LOUNGE_BIND_URL}?{query}");
    let headers = [
        ("Content-Type", "application/x-www-form-urlencoded"),
        ("Origin", LOUNGE_ORIGIN),
    ];
    let response = transport
        .post(&url, &headers, body, config.control_timeout())
        .await?;

    if !response.is_success() {
        log::warn!(
            "[DIAL] Command {} on {} answered {}",
            command.as_str(),
            device.name,
            response.status
        );
        return Err(DialError::UnexpectedStatus(response.status));
    }

    log::info!("[DIAL] Command {} sent to {}", command.as_str(), device.name);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Launch
// ─────────────────────────────────────────────────────────────────────────────

/// Launches an application on a device via its application endpoint.
///
/// When `video_id` is given the launch body is `v=<encoded id>` as
/// `text/plain`, which starts playback on launch; otherwise the body is
/// empty. Returns whether the device accepted the launch (201 for a fresh
/// start, 200 when already running).
pub async fn launch_application<T: DialTransport + ?Sized>(
    transport: &T,
    endpoint: &str,
    app: AppKind,
    video_id: Option<&str>,
    config: &Config,
) -> DialResult<bool> {
    let url = format!("{}{}", endpoint, app.control_path());
    let body = match video_id {
        Some(id) => format!("v={}", params::percent_encode(id)),
        None => String::new(),
    };
    let headers = [
        ("Content-Type", "text/plain; charset=\"utf-8\""),
        ("Origin", LOUNGE_ORIGIN),
    ];
    let response = transport
        .post(&url, &headers, body, config.lounge_timeout())
        .await?;

    let accepted = matches!(response.status, 200 | 201);
    if accepted {
        log::info!("[DIAL] Launch accepted at {} ({})", url, response.status);
    } else {
        log::warn!("[DIAL] Launch rejected at {} ({})", url, response.status);
    }
    Ok(accepted)
}
