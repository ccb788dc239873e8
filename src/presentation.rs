//! Detection overlay: current exposure icon plus a queue of HUD messages.
//!
//! `DetectionOverlay` is the engine-side [`DisplaySink`]. The icon token
//! changes immediately; textual reports are queued and shown one at a time,
//! each for the configured message duration. At most
//! [`MAX_PENDING_MESSAGES`] wait behind the one on screen.

use std::collections::VecDeque;

use bevy::prelude::*;
use log::debug;

use crate::constants::{MAX_PENDING_MESSAGES, MESSAGE_DURATION};
use crate::display::{DisplaySink, StateToken};

/// Formats a HUD line such as `[SEEN] walker - 12.3m`.
///
/// # Examples
///
/// ```
/// use lurk::presentation::format_report;
/// assert_eq!(format_report("walker", false, 9.26), "[HIDDEN] walker - 9.3m");
/// ```
#[must_use]
pub fn format_report(agent_name: &str, detected: bool, distance: f32) -> String {
    let status = if detected { "SEEN" } else { "HIDDEN" };
    format!("[{status}] {agent_name} - {distance:.1}m")
}

/// One queued HUD line.
#[derive(Debug, Clone, PartialEq)]
pub struct HudMessage {
    pub text: String,
    pub detected: bool,
}

/// Resource mirroring what the player should see.
#[derive(Resource, Debug, Clone)]
pub struct DetectionOverlay {
    token: StateToken,
    messages: VecDeque<HudMessage>,
    shown_for: f32,
    message_duration: f32,
}

impl Default for DetectionOverlay {
    fn default() -> Self {
        Self::new(MESSAGE_DURATION)
    }
}

impl DetectionOverlay {
    #[must_use]
    pub fn new(message_duration: f32) -> Self {
        Self {
            token: StateToken::None,
            messages: VecDeque::new(),
            shown_for: 0.0,
            message_duration,
        }
    }

    #[must_use]
    pub const fn token(&self) -> StateToken {
        self.token
    }

    /// Message currently on screen.
    #[must_use]
    pub fn current_message(&self) -> Option<&HudMessage> {
        self.messages.front()
    }

    #[must_use]
    pub fn queued(&self) -> usize {
        self.messages.len()
    }

    pub fn set_message_duration(&mut self, seconds: f32) {
        self.message_duration = seconds;
    }

    /// Ages the message on screen by `delta` seconds, retiring it once its
    /// duration is reached. The next message starts with a fresh timer.
    pub fn advance(&mut self, delta: f32) {
        if self.messages.is_empty() {
            return;
        }
        self.shown_for += delta;
        if self.shown_for >= self.message_duration {
            self.messages.pop_front();
            self.shown_for = 0.0;
            if let Some(next) = self.messages.front() {
                debug!("HUD -> {}", next.text);
            }
        }
    }
}

impl DisplaySink for DetectionOverlay {
    fn set_state(&mut self, token: StateToken) {
        self.token = token;
    }

    fn report(&mut self, agent_name: &str, detected: bool, distance: f32) {
        let text = format_report(agent_name, detected, distance);
        if self.messages.is_empty() {
            self.shown_for = 0.0;
            debug!("HUD -> {text}");
        }
        self.messages.push_back(HudMessage { text, detected });
        if self.messages.len() > MAX_PENDING_MESSAGES + 1 {
            if let Some(dropped) = self.messages.remove(1) {
                debug!("HUD backlog full, dropping {}", dropped.text);
            }
        }
    }
}

/// Advances the HUD message queue by the frame delta.
pub fn hud_message_system(time: Res<Time>, mut overlay: ResMut<DetectionOverlay>) {
    overlay.advance(time.delta_secs());
}

/// Plugin owning the overlay resource and its message timer.
#[derive(Debug, Default)]
pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DetectionOverlay>();
        app.add_systems(Update, hud_message_system);
    }
}
