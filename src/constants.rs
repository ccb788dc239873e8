//! Perception tuning constants shared across the detection pipeline.
//!
//! Values mirror the defaults shipped in the bundled configuration; the
//! clamp bounds are applied whenever a configuration document is loaded.

/// Maximum age, in seconds, of a cached observation before it is discarded.
pub const SNAPSHOT_TTL: f64 = 1.5;
/// Minimum spacing, in seconds, between two forwarded HUD reports.
pub const HUD_COOLDOWN: f64 = 1.25;
/// How long a queued HUD message stays on screen.
pub const MESSAGE_DURATION: f32 = 3.5;
/// Messages waiting behind the one on screen; older ones are dropped first.
pub const MAX_PENDING_MESSAGES: usize = 2;
/// Seconds between two spatial polls when nothing else is configured.
pub const DEFAULT_POLL_INTERVAL: f64 = 0.3;
pub const MIN_POLL_INTERVAL: f64 = 0.1;
pub const MAX_POLL_INTERVAL: f64 = 1.0;
/// Detection radius used when the configured value is missing or invalid.
pub const DEFAULT_DETECTION_RADIUS: f32 = 30.0;
pub const MIN_DETECTION_RADIUS: f32 = 5.0;
pub const MAX_DETECTION_RADIUS: f32 = 60.0;
pub const DEFAULT_HEARING_RADIUS: f32 = 20.0;
/// Half-angle of an agent's vision cone, in degrees.
pub const DEFAULT_FOV_HALF_ANGLE: f32 = 85.0;
/// Eye height assumed for bodies that do not report one.
pub const DEFAULT_EYE_HEIGHT: f32 = 1.0;
/// Slack allowed between an occluding hit and the target along a sight line.
pub const RAY_HIT_TOLERANCE: f32 = 0.25;
/// Minimum spacing between repeated "world unavailable" log lines.
pub const WORLD_LOG_COOLDOWN: f64 = 5.0;
