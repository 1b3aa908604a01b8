//! Pre-flight memory headroom guard for TLS calls.
//!
//! The lounge control channel was profiled on a constrained controller where
//! concurrent TLS handshakes could exhaust the heap. Every TLS attempt is
//! therefore gated on a free-memory threshold; an unmet threshold aborts that
//! attempt only, never the whole run.

use crate::error::{DialError, DialResult};

/// Reports the free memory available to the process.
///
/// The default [`SystemHeadroomProbe`] is suitable for production; tests and
/// embedders with their own allocator accounting can inject an alternative.
pub trait HeadroomProbe: Send + Sync {
    /// Returns the currently available memory in bytes.
    fn available_bytes(&self) -> u64;
}

/// Headroom probe backed by the operating system.
///
/// On Linux this reads `MemAvailable` from `/proc/meminfo`. On other
/// platforms (and when the read fails) it reports unlimited headroom, which
/// keeps the guard a no-op rather than a false blocker.
#[derive(Debug, Default, Clone)]
pub struct SystemHeadroomProbe;

impl HeadroomProbe for SystemHeadroomProbe {
    fn available_bytes(&self) -> u64 {
        #[cfg(target_os = "linux")]
        if let Some(bytes) = read_mem_available() {
            return bytes;
        }
        u64::MAX
    }
}

#[cfg(target_os = "linux")]
fn read_mem_available() -> Option<u64> {
    let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
    for line in meminfo.lines() {
        if let Some(rest) = line.strip_prefix("MemAvailable:") {
            let kib: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
            return Some(kib * 1024);
        }
    }
    None
}

/// Headroom probe that always reports a fixed value.
///
/// Used by tests and by embedders that meter memory themselves.
#[derive(Debug, Clone)]
pub struct FixedHeadroomProbe(pub u64);

impl HeadroomProbe for FixedHeadroomProbe {
    fn available_bytes(&self) -> u64 {
        self.0
    }
}

/// Checks that the probe reports at least `required` free bytes.
///
/// # Errors
/// Returns [`DialError::ResourceExhausted`] when the threshold is unmet.
pub fn ensure_headroom(probe: &dyn HeadroomProbe, required: u64) -> DialResult<()> {
    let available = probe.available_bytes();
    if available < required {
        log::warn!(
            "[DIAL] Insufficient headroom for TLS: {} bytes free, need {}",
            available,
            required
        );
        return Err(DialError::ResourceExhausted {
            available,
            required,
        });
    }
    Ok(())
}
