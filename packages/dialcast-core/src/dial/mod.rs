//! DIAL device control and lounge session plumbing.
//!
//! Layering, bottom up:
//! - [`wire`]: pure response codecs for the three wire formats
//! - [`params`]: query-string and body builders, identifier generation
//! - [`transport`]: the HTTP seam everything above is tested through
//! - [`types`]: devices, lifecycle states, commands
//! - [`session`]: the engine driving a device to a bound session

pub mod params;
pub mod session;
pub mod transport;
pub mod types;
pub mod wire;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use session::{
    acquire_session, bind_session, dispatch_command, fetch_lounge_token, launch_application,
    poll_app_status, AppStatus,
};
pub use transport::{DialTransport, HttpResponse, ReqwestTransport, TransportError, TransportResult};
pub use types::{AppKind, CastTarget, Device, DeviceRecord, DeviceStatus, LoungeCommand};
pub use wire::BindFields;
