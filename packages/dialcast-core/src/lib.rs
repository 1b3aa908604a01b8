//! Core library for second-screen cast control over DIAL devices.
//!
//! Turns a set of discovered devices into cast targets, launches streaming
//! apps on them, and drives YouTube lounge sessions (status poll, token
//! exchange, bind, commands) so a remote can queue and control playback.
//!
//! Network I/O goes through the [`DialTransport`] seam; everything above it
//! is pure and unit-testable against scripted responses.

#![warn(clippy::all)]

pub mod dial;
pub mod error;
pub mod headroom;
pub mod protocol_constants;
pub mod services;
pub mod state;

pub use dial::{
    acquire_session, bind_session, dispatch_command, fetch_lounge_token, launch_application,
    poll_app_status, AppKind, AppStatus, BindFields, CastTarget, Device, DeviceRecord,
    DeviceStatus, DialTransport, HttpResponse, LoungeCommand, ReqwestTransport, TransportError,
    TransportResult,
};
pub use error::{DialError, DialResult, ErrorCode};
pub use headroom::{ensure_headroom, FixedHeadroomProbe, HeadroomProbe, SystemHeadroomProbe};
pub use services::{pick_random_video_id, CastCoordinator, CastMode, CastOutcome, CastReport};
pub use state::Config;
