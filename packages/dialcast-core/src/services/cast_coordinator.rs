//! Orchestrates a cast run across a set of discovered devices.
//!
//! Resolves discovery records into cast targets (descriptor fetch, endpoint
//! fallback, dedup), then launches the chosen application on one or all of
//! them and reports per-target outcomes.

use std::sync::Arc;

use futures::future::join_all;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::dial::session::{acquire_session, launch_application};
use crate::dial::transport::DialTransport;
use crate::dial::types::{AppKind, CastTarget, Device, DeviceRecord};
use crate::dial::wire;
use crate::error::DialResult;
use crate::headroom::{ensure_headroom, HeadroomProbe, SystemHeadroomProbe};
use crate::state::Config;

// ─────────────────────────────────────────────────────────────────────────────
// Run Shapes
// ─────────────────────────────────────────────────────────────────────────────

/// How a cast run treats its target set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastMode {
    /// Try targets in order and stop at the first accepted launch.
    Single,
    /// Launch on every target concurrently.
    Broadcast,
}

/// Outcome of one target in a cast run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastOutcome {
    /// Application endpoint of the target.
    pub endpoint: String,
    /// Display name of the target.
    pub name: String,
    /// Whether the device accepted the launch.
    pub success: bool,
    /// Failure detail, when the launch was not accepted.
    pub error: Option<String>,
}

/// Aggregate result of a cast run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CastReport {
    /// Per-target outcomes, in the order the targets were tried.
    pub outcomes: Vec<CastOutcome>,
    /// Number of accepted launches.
    pub success_count: usize,
}

impl CastReport {
    fn from_outcomes(outcomes: Vec<CastOutcome>) -> Self {
        let success_count = outcomes.iter().filter(|o| o.success).count();
        Self {
            outcomes,
            success_count,
        }
    }
}

/// Fields resolved from a device descriptor fetch. Both absent when the
/// fetch fails or the descriptor lacks them.
#[derive(Debug, Clone, Default)]
struct DescriptorInfo {
    application_url: Option<String>,
    friendly_name: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Coordinator
// ─────────────────────────────────────────────────────────────────────────────

/// Drives cast runs end to end: descriptor resolution, launch fan-out,
/// session establishment.
pub struct CastCoordinator {
    transport: Arc<dyn DialTransport>,
    headroom: Arc<dyn HeadroomProbe>,
    config: Config,
}

impl CastCoordinator {
    /// Creates a coordinator using the system headroom probe.
    pub fn new(transport: Arc<dyn DialTransport>, config: Config) -> Self {
        Self {
            transport,
            headroom: Arc::new(SystemHeadroomProbe),
            config,
        }
    }

    /// Replaces the headroom probe.
    #[must_use]
    pub fn with_headroom_probe(mut self, probe: Arc<dyn HeadroomProbe>) -> Self {
        self.headroom = probe;
        self
    }

    /// Resolves discovery records into deduplicated cast targets.
    ///
    /// Descriptors are fetched concurrently. Duplicate endpoints (the same
    /// device discovered via several records) collapse to one target, keeping
    /// the first-seen name and the original order.
    pub async fn resolve_targets(&self, records: &[DeviceRecord]) -> Vec<CastTarget> {
        let resolved = join_all(records.iter().map(|record| self.resolve_record(record))).await;

        let mut targets: Vec<CastTarget> = Vec::new();
        for target in resolved {
            if !targets.iter().any(|t| t.endpoint == target.endpoint) {
                targets.push(target);
            }
        }
        targets
    }

    /// Resolves one record into a cast target.
    ///
    /// A failed descriptor fetch is not fatal: devices that answer their app
    /// endpoint but not their descriptor are still castable through the
    /// synthesized `http://host:port/apps` fallback.
    async fn resolve_record(&self, record: &DeviceRecord) -> CastTarget {
        let info = match self.fetch_descriptor(record).await {
            Ok(info) => info,
            Err(err) => {
                log::warn!(
                    "[Cast] Descriptor fetch failed for {}: {}",
                    record.location,
                    err
                );
                DescriptorInfo::default()
            }
        };

        let endpoint = info
            .application_url
            .unwrap_or_else(|| format!("http://{}:{}/apps", record.host, record.port));
        let endpoint = endpoint
            .strip_suffix('/')
            .map(str::to_string)
            .unwrap_or(endpoint);

        let name = info
            .friendly_name
            .unwrap_or_else(|| format!("{}:{}", record.host, record.port));

        CastTarget { endpoint, name }
    }

    async fn fetch_descriptor(&self, record: &DeviceRecord) -> DialResult<DescriptorInfo> {
        let response = self
            .transport
            .get(&record.descriptor_url(), &[], self.config.control_timeout())
            .await?;

        Ok(DescriptorInfo {
            application_url: wire::extract_application_url(&response.header_block),
            friendly_name: wire::extract_friendly_name(&response.body),
        })
    }

    /// Launches `app` across the targets per the chosen mode.
    ///
    /// `pick_video` chooses a video id per target; launch-only apps ignore
    /// it. In [`CastMode::Single`] the targets are tried in order and the run
    /// stops at the first accepted launch; untried targets get no outcome.
    /// [`CastMode::Broadcast`] launches on all targets concurrently.
    pub async fn cast_to_all<F>(
        &self,
        targets: &[CastTarget],
        app: AppKind,
        pick_video: F,
        mode: CastMode,
    ) -> CastReport
    where
        F: Fn(&CastTarget) -> Option<String> + Sync,
    {
        match mode {
            CastMode::Single => {
                let mut outcomes = Vec::new();
                for target in targets {
                    let outcome = self.cast_one(target, app, pick_video(target)).await;
                    let accepted = outcome.success;
                    outcomes.push(outcome);
                    if accepted {
                        break;
                    }
                }
                CastReport::from_outcomes(outcomes)
            }
            CastMode::Broadcast => {
                let outcomes = join_all(
                    targets
                        .iter()
                        .map(|target| self.cast_one(target, app, pick_video(target))),
                )
                .await;
                CastReport::from_outcomes(outcomes)
            }
        }
    }

    /// Launches the app on one target, mapping every failure into the
    /// outcome rather than aborting the run.
    async fn cast_one(
        &self,
        target: &CastTarget,
        app: AppKind,
        video_id: Option<String>,
    ) -> CastOutcome {
        let mut outcome = CastOutcome {
            endpoint: target.endpoint.clone(),
            name: target.name.clone(),
            success: false,
            error: None,
        };

        if let Err(err) =
            ensure_headroom(self.headroom.as_ref(), self.config.min_free_memory_bytes)
        {
            outcome.error = Some(err.to_string());
            return outcome;
        }

        match launch_application(
            self.transport.as_ref(),
            &target.endpoint,
            app,
            video_id.as_deref(),
            &self.config,
        )
        .await
        {
            Ok(true) => {
                log::info!("[Cast] {} accepted {}", target.name, app.control_path());
                outcome.success = true;
            }
            Ok(false) => {
                outcome.error = Some("launch rejected by device".to_string());
            }
            Err(err) => {
                log::warn!("[Cast] Launch on {} failed: {}", target.name, err);
                outcome.error = Some(err.to_string());
            }
        }
        outcome
    }

    /// Establishes bound lounge sessions on every target concurrently.
    ///
    /// Each target is driven through its own acquisition loop; one device
    /// failing never aborts the others. Results arrive in target order.
    pub async fn establish_sessions(
        &self,
        targets: &[CastTarget],
        app: AppKind,
        cancel: &CancellationToken,
    ) -> Vec<DialResult<Device>> {
        join_all(targets.iter().map(|target| async move {
            let mut device = Device::from_target(target)?;
            acquire_session(
                self.transport.as_ref(),
                &mut device,
                app,
                self.headroom.as_ref(),
                &self.config,
                cancel,
            )
            .await?;
            Ok(device)
        }))
        .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Video Picker
// ─────────────────────────────────────────────────────────────────────────────

const VIDEO_IDS: &[&str] = &[
    "dQw4w9WgXcQ", // Rick Astley - Never Gonna Give You Up
    "oHg5SJYRHA0", // RickRoll'D
    "xvFZjo5PgG0", // Stick Bug
    "djV11Xbc914", // A-ha - Take On Me
    "fC7oUOUEEi4", // Toto - Africa
    "y6120QOlsfU", // Darude - Sandstorm
    "kJQP7kiw5Fk", // Luis Fonsi - Despacito
    "9bZkp7q19f0", // PSY - Gangnam Style
    "3JZ_D3ELwOQ", // Michael Jackson - Smooth Criminal
    "QH2-TGUlwu4", // Nyan Cat
    "wZZ7oFKsKzY", // He-Man HEYYEYAAEYAAAEYAEYAA
    "L_jWHffIx5E", // Smash Mouth - All Star
    "hTWKbfoikeg", // Nirvana - Smells Like Teen Spirit
    "btPJPFnesV4", // Eye of the Tiger
    "fJ9rUzIMcZQ", // Queen - Bohemian Rhapsody
    "YQHsXMglC9A", // Adele - Hello
    "CevxZvSJLk8", // Katy Perry - Roar
    "JGwWNGJdvx8", // Ed Sheeran - Shape of You
    "RgKAFK5djSk", // Wiz Khalifa - See You Again
    "09R8_2nJtjg", // Maroon 5 - Sugar
    "lp-EO5I60KA", // Eminem - Lose Yourself
    "hT_nvWreIhg", // OneRepublic - Counting Stars
    "OPf0YbXqDm0", // Mark Ronson - Uptown Funk
    "pRpeEdMmmQ0", // Shakira - Waka Waka
    "2Vv-BfVoq4g", // Perfect - Ed Sheeran
    "60ItHLz5WEA", // Alan Walker - Faded
    "Zi_XLOBDo_Y", // Michael Jackson - Billie Jean
];

/// Picks a random video id from the built-in demo list.
#[must_use]
pub fn pick_random_video_id() -> &'static str {
    VIDEO_IDS[rand::thread_rng().gen_range(0..VIDEO_IDS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dial::test_fixtures::{MockTransport, DESCRIPTOR_HEADERS, DESCRIPTOR_XML};
    use crate::error::DialError;
    use crate::headroom::FixedHeadroomProbe;

    fn coordinator(transport: MockTransport) -> CastCoordinator {
        CastCoordinator::new(Arc::new(transport), Config::default())
            .with_headroom_probe(Arc::new(FixedHeadroomProbe(u64::MAX)))
    }

    fn record(location: &str) -> DeviceRecord {
        DeviceRecord::from_location(location).unwrap()
    }

    #[tokio::test]
    async fn descriptor_resolves_endpoint_and_name() {
        let transport = MockTransport::new();
        transport.route_with_headers(
            "/dd.xml",
            200,
            DESCRIPTOR_HEADERS.to_string(),
            DESCRIPTOR_XML.to_string(),
        );

        let coordinator = coordinator(transport);
        let targets = coordinator
            .resolve_targets(&[record("http://10.0.0.5:8060/dd.xml")])
            .await;

        assert_eq!(targets.len(), 1);
        // Trailing slash from the header is stripped.
        assert_eq!(targets[0].endpoint, "http://10.0.0.5:8060/apps");
        assert_eq!(targets[0].name, "Living Room TV");
    }

    #[tokio::test]
    async fn failed_descriptor_falls_back_to_synthesized_endpoint() {
        let transport = MockTransport::new();
        // No routes: every fetch answers 404 with no headers.

        let coordinator = coordinator(transport);
        let targets = coordinator
            .resolve_targets(&[record("http://10.0.0.7:8008/desc.xml")])
            .await;

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].endpoint, "http://10.0.0.7:8008/apps");
        assert_eq!(targets[0].name, "10.0.0.7:8008");
    }

    #[tokio::test]
    async fn duplicate_endpoints_collapse_keeping_first_name() {
        let transport = MockTransport::new();
        transport.route_with_headers(
            "/dd.xml",
            200,
            DESCRIPTOR_HEADERS.to_string(),
            DESCRIPTOR_XML.to_string(),
        );
        // Second record resolves to the same endpoint with no friendly name.
        transport.route_with_headers(
            "/other.xml",
            200,
            DESCRIPTOR_HEADERS.to_string(),
            String::new(),
        );

        let coordinator = coordinator(transport);
        let targets = coordinator
            .resolve_targets(&[
                record("http://10.0.0.5:8060/dd.xml"),
                record("http://10.0.0.5:8060/other.xml"),
            ])
            .await;

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, "Living Room TV");
    }

    #[tokio::test]
    async fn single_mode_stops_after_first_accepted_launch() {
        let transport = MockTransport::new();
        transport.route("10.0.0.1:8060", 503, String::new());
        transport.route("10.0.0.2:8060", 201, String::new());
        transport.route("10.0.0.3:8060", 201, String::new());

        let targets = vec![
            CastTarget {
                endpoint: "http://10.0.0.1:8060/apps".into(),
                name: "One".into(),
            },
            CastTarget {
                endpoint: "http://10.0.0.2:8060/apps".into(),
                name: "Two".into(),
            },
            CastTarget {
                endpoint: "http://10.0.0.3:8060/apps".into(),
                name: "Three".into(),
            },
        ];

        let coordinator = CastCoordinator::new(Arc::new(transport), Config::default())
            .with_headroom_probe(Arc::new(FixedHeadroomProbe(u64::MAX)));
        let report = coordinator
            .cast_to_all(&targets, AppKind::YouTube, |_| None, CastMode::Single)
            .await;

        // First target rejects, second accepts, third is never tried.
        assert_eq!(report.success_count, 1);
        assert_eq!(report.outcomes.len(), 2);
        assert!(!report.outcomes[0].success);
        assert!(report.outcomes[1].success);
    }

    #[tokio::test]
    async fn broadcast_mode_reports_n_of_m() {
        let transport = MockTransport::new();
        transport.route("10.0.0.1:8060", 201, String::new());
        transport.route("10.0.0.2:8060", 404, String::new());

        let targets = vec![
            CastTarget {
                endpoint: "http://10.0.0.1:8060/apps".into(),
                name: "One".into(),
            },
            CastTarget {
                endpoint: "http://10.0.0.2:8060/apps".into(),
                name: "Two".into(),
            },
        ];

        let coordinator = CastCoordinator::new(Arc::new(transport), Config::default())
            .with_headroom_probe(Arc::new(FixedHeadroomProbe(u64::MAX)));
        let report = coordinator
            .cast_to_all(
                &targets,
                AppKind::YouTube,
                |_| Some("dQw4w9WgXcQ".to_string()),
                CastMode::Broadcast,
            )
            .await;

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.success_count, 1);
        assert!(report.outcomes[1].error.is_some());
    }

    #[tokio::test]
    async fn headroom_shortfall_becomes_an_outcome_not_a_panic() {
        let transport = MockTransport::new();
        transport.route("10.0.0.1:8060", 201, String::new());

        let targets = vec![CastTarget {
            endpoint: "http://10.0.0.1:8060/apps".into(),
            name: "One".into(),
        }];

        let coordinator = CastCoordinator::new(Arc::new(transport), Config::default())
            .with_headroom_probe(Arc::new(FixedHeadroomProbe(0)));
        let report = coordinator
            .cast_to_all(&targets, AppKind::YouTube, |_| None, CastMode::Broadcast)
            .await;

        assert_eq!(report.success_count, 0);
        assert!(report.outcomes[0]
            .error
            .as_deref()
            .unwrap()
            .contains("headroom"));
    }

    #[tokio::test]
    async fn sessions_established_concurrently_with_isolated_failures() {
        use crate::dial::test_fixtures::{
            running_status_body, BIND_RESPONSE_FULL, TOKEN_BATCH_JSON,
        };

        let transport = MockTransport::new();
        transport.route("10.0.0.1:8060/apps/YouTube", 200, running_status_body("S1"));
        transport.route("get_lounge_token_batch", 200, TOKEN_BATCH_JSON.to_string());
        transport.route("lounge/bc/bind", 200, BIND_RESPONSE_FULL.to_string());
        // 10.0.0.2 never answers its status poll (404 fallback).

        let targets = vec![
            CastTarget {
                endpoint: "http://10.0.0.1:8060/apps".into(),
                name: "One".into(),
            },
            CastTarget {
                endpoint: "http://10.0.0.2:8060/apps".into(),
                name: "Two".into(),
            },
        ];

        let mut config = Config::default();
        config.poll_attempts = 1;
        let coordinator = CastCoordinator::new(Arc::new(transport), config)
            .with_headroom_probe(Arc::new(FixedHeadroomProbe(u64::MAX)));
        let results = coordinator
            .establish_sessions(&targets, AppKind::YouTube, &CancellationToken::new())
            .await;

        assert_eq!(results.len(), 2);
        let bound = results[0].as_ref().unwrap();
        assert!(bound.is_bound());
        assert!(matches!(
            results[1].as_ref().unwrap_err(),
            DialError::RetriesExhausted { attempts: 1 },
        ));
    }

    #[test]
    fn random_video_ids_come_from_the_list() {
        for _ in 0..50 {
            assert!(VIDEO_IDS.contains(&pick_random_video_id()));
        }
    }
}
