//! Utility helpers for tests.
//!
//! [`agents`] builds plain records for core-level scenarios; [`scene`]
//! builds headless Bevy apps with the perception plugin installed.
pub mod agents;
pub mod scene;
