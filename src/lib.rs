#![cfg_attr(docsrs, feature(doc_cfg))]
//! Hostile-agent perception layer.
//!
//! Decides, every poll and on every per-agent event, whether the player is
//! unnoticed, hidden from nearby hostiles or seen by at least one of them.
//! The core (`capability`, `perception`, `cache`, `detection`, `driver`) is
//! engine-agnostic and talks to its host through [`host::HostApi`]; the
//! [`PerceptionPlugin`] adapts it to a Bevy world.
pub mod cache;
pub mod capability;
pub mod components;
pub mod config;
pub mod constants;
pub mod detection;
pub mod display;
pub mod driver;
pub mod entity;
pub mod host;
pub mod logging;
pub mod numeric;
pub mod perception;
pub mod plugin;
pub mod presentation;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod testing;
pub mod vector_math;
pub use constants::*;

// Re-export commonly used items
pub use cache::{CacheAggregate, ObservationCache, Reference};
pub use capability::{Capabilities, CapabilityProber};
pub use components::{AttackTarget, Crouching, EyeHeight, Health, Hostile, Occluder, TrackedPlayer};
pub use config::{ConfigError, ConfigFile, ConfigSource, PerceptionConfig};
pub use detection::{reconcile, DetectionContext, DetectionState, Frame};
pub use display::{DisplaySink, LogSink, StateToken};
pub use driver::{RuntimeDriver, Tick};
pub use entity::{Agent, AgentRecord, EntityId, Player, PlayerRecord};
pub use host::{HostApi, HostError, HostSurface};
pub use logging::init as init_logging;
pub use perception::{evaluate, EvaluationParams, ObservationSnapshot};
pub use plugin::{AgentTicked, EcsHost, Perception, PerceptionPlugin};
pub use presentation::{DetectionOverlay, HudPlugin};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use lurk::prelude::*;
    //! ```

    pub use crate::components::{Crouching, Hostile, Occluder, TrackedPlayer};
    pub use crate::config::PerceptionConfig;
    pub use crate::detection::DetectionState;
    pub use crate::plugin::{AgentTicked, Perception, PerceptionPlugin};
    pub use crate::presentation::DetectionOverlay;
}
