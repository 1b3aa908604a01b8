//! Higher-level orchestration built on the DIAL session engine.

pub mod cast_coordinator;

pub use cast_coordinator::{
    pick_random_video_id, CastCoordinator, CastMode, CastOutcome, CastReport,
};
