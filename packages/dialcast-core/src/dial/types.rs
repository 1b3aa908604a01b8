//! Core domain types: applications, devices, session lifecycle, commands.

use serde::{Deserialize, Serialize};

use crate::dial::wire;
use crate::error::{DialError, DialResult};

// ─────────────────────────────────────────────────────────────────────────────
// Applications
// ─────────────────────────────────────────────────────────────────────────────

/// Castable application known to the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppKind {
    /// YouTube, the only app with a lounge session path.
    YouTube,
    /// Netflix, launch-only.
    Netflix,
}

impl AppKind {
    /// Path appended to a device's application endpoint for this app.
    #[must_use]
    pub fn control_path(&self) -> &'static str {
        match self {
            Self::YouTube => "/YouTube",
            Self::Netflix => "/Netflix",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Discovery Records
// ─────────────────────────────────────────────────────────────────────────────

/// A discovered device, as handed in by the embedder's discovery layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Device host (IP or name) parsed from the location URL.
    pub host: String,
    /// Device control port.
    pub port: u16,
    /// Path of the device descriptor document.
    pub descriptor_path: String,
    /// The original location URL the record was built from.
    pub location: String,
}

impl DeviceRecord {
    /// Builds a record from a discovery location URL.
    ///
    /// # Errors
    /// Returns [`DialError::InvalidLocation`] when the URL lacks an explicit
    /// `host:port` before its path.
    pub fn from_location(location: &str) -> DialResult<Self> {
        let (host, port) = wire::extract_ip_and_port(location)?;
        Ok(Self {
            host,
            port,
            descriptor_path: wire::extract_path(location),
            location: location.to_string(),
        })
    }

    /// The URL of this device's descriptor document.
    #[must_use]
    pub fn descriptor_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.descriptor_path)
    }
}

/// A resolved cast target: the application endpoint plus a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastTarget {
    /// Application endpoint URL, with any trailing slash removed.
    pub endpoint: String,
    /// Display name, falling back to `host:port` when the descriptor has no
    /// friendly name.
    pub name: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Lifecycle
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle states of a device session, in acquisition order.
///
/// Progress is monotonic: a device only moves toward `SessionBound`, and
/// `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    /// Known from discovery, not yet contacted.
    Discovered,
    /// Contacted, app state not yet determined.
    AppStatusUnknown,
    /// The target application reports running.
    AppRunning,
    /// The running app exposed its screen id.
    ScreenIdKnown,
    /// A lounge token was exchanged for the screen id.
    TokenAcquired,
    /// Bind completed, commands may be dispatched.
    SessionBound,
    /// Acquisition failed; the device stays frozen in this state.
    Failed,
}

impl DeviceStatus {
    /// Position of this state in the acquisition order. `Failed` ranks above
    /// everything so no forward transition can leave it.
    fn rank(self) -> u8 {
        match self {
            Self::Discovered => 0,
            Self::AppStatusUnknown => 1,
            Self::AppRunning => 2,
            Self::ScreenIdKnown => 3,
            Self::TokenAcquired => 4,
            Self::SessionBound => 5,
            Self::Failed => 6,
        }
    }
}

/// A device being driven toward a bound lounge session.
///
/// Session fields start absent and are filled in as acquisition progresses;
/// none of them is ever truncated or cleared by a later stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Device host.
    pub host: String,
    /// Device control port.
    pub port: u16,
    /// Application endpoint URL for the device.
    pub app_endpoint: String,
    /// Display name.
    pub name: String,

    /// Locally generated session id sent in the bind request.
    pub session_id: Option<String>,
    /// Locally generated channel nonce sent in the bind request.
    pub zx: Option<String>,
    /// Screen id reported by the running application.
    pub screen_id: Option<String>,
    /// Lounge token exchanged for the screen id.
    pub lounge_token: Option<String>,
    /// Server-assigned session id (`SID`) from the bind response.
    pub sid: Option<String>,
    /// Server-assigned group session id from the bind response.
    pub gsessionid: Option<String>,
    /// Playlist id, when the bind response reported one.
    pub list_id: Option<String>,

    /// Current lifecycle state.
    pub status: DeviceStatus,
}

impl Device {
    /// Builds a fresh device from a resolved cast target.
    ///
    /// # Errors
    /// Returns [`DialError::InvalidLocation`] when the endpoint URL lacks an
    /// explicit `host:port`.
    pub fn from_target(target: &CastTarget) -> DialResult<Self> {
        let (host, port) = wire::extract_ip_and_port(&target.endpoint)?;
        Ok(Self {
            host,
            port,
            app_endpoint: target.endpoint.clone(),
            name: target.name.clone(),
            session_id: None,
            zx: None,
            screen_id: None,
            lounge_token: None,
            sid: None,
            gsessionid: None,
            list_id: None,
            status: DeviceStatus::Discovered,
        })
    }

    /// Advances the lifecycle state, never backwards.
    ///
    /// A `Failed` device stays failed; stale in-flight results arriving after
    /// a failure cannot resurrect the session.
    pub fn advance(&mut self, next: DeviceStatus) {
        if self.status == DeviceStatus::Failed {
            return;
        }
        if next.rank() > self.status.rank() && next != DeviceStatus::Failed {
            self.status = next;
        }
    }

    /// Freezes the device in the `Failed` state.
    pub fn mark_failed(&mut self) {
        self.status = DeviceStatus::Failed;
    }

    /// Whether commands may be dispatched to this device.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.status == DeviceStatus::SessionBound
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// The lounge command vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoungeCommand {
    /// Replace the queue with a single video and start it.
    SetVideo,
    /// Append a video to the queue.
    AddVideo,
    /// Resume playback.
    Play,
    /// Pause playback.
    Pause,
}

impl LoungeCommand {
    /// Wire name of the command.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SetVideo => "setVideo",
            Self::AddVideo => "addVideo",
            Self::Play => "play",
            Self::Pause => "pause",
        }
    }

    /// Resolves a wire name back to a command.
    ///
    /// # Errors
    /// Returns [`DialError::UnsupportedCommand`] for any name outside the
    /// vocabulary, before any network call is made.
    pub fn from_name(name: &str) -> DialResult<Self> {
        match name {
            "setVideo" => Ok(Self::SetVideo),
            "addVideo" => Ok(Self::AddVideo),
            "play" => Ok(Self::Play),
            "pause" => Ok(Self::Pause),
            other => Err(DialError::UnsupportedCommand(other.to_string())),
        }
    }

    /// Whether the command body must carry a video id.
    #[must_use]
    pub fn requires_video_id(&self) -> bool {
        matches!(self, Self::SetVideo | Self::AddVideo)
    }
}
