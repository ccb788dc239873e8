//! Per-pair perception: how far an agent is, whether it sees the player and
//! whether the player sits inside its vision cone.
//!
//! Everything here is a pure function of its inputs and the bound
//! [`Capabilities`]. Host invocation failures degrade to the geometric
//! sight line and, failing that, to "not visible".
use glam::Vec3;
use log::debug;

use crate::capability::{Capabilities, SightLine, VisibilityCheck};
use crate::constants::{DEFAULT_EYE_HEIGHT, RAY_HIT_TOLERANCE};
use crate::entity::{Agent, EntityId, Player};
use crate::host::HostApi;
use crate::vector_math::angle_between_degrees;

/// Immutable result of evaluating one agent against the player.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSnapshot {
    pub agent: EntityId,
    pub agent_name: String,
    /// Tick-clock time of the evaluation, in seconds.
    pub timestamp: f64,
    pub distance: f32,
    /// The agent is attacking the player or has a clear sight line.
    pub seen: bool,
    /// Not seen, but inside the detection radius.
    pub hidden_candidate: bool,
}

/// Tuning read from the configuration for one evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationParams {
    pub detection_radius: f32,
    pub fov_half_angle: f32,
}

/// Straight-line distance between the two bodies.
pub fn distance<A: Agent, P: Player>(agent: &A, player: &P) -> f32 {
    agent.position().distance(player.position())
}

/// `true` when the agent's attack target is the player.
pub fn is_targeting<A: Agent, P: Player>(agent: &A, player: &P) -> bool {
    agent.attack_target() == Some(player.id())
}

/// Vision-cone containment. Agents without a facing are treated as facing
/// the player; coincident bodies are always inside.
pub fn in_field_of_view<A: Agent, P: Player>(agent: &A, player: &P, half_angle: f32) -> bool {
    let Some(facing) = agent.facing() else {
        return true;
    };
    angle_between_degrees(facing, player.position() - agent.position())
        .is_none_or(|angle| angle <= half_angle)
}

fn eye_of(position: Vec3, eye_height: Option<f32>) -> Vec3 {
    position + Vec3::Y * eye_height.unwrap_or(DEFAULT_EYE_HEIGHT)
}

/// Geometric sight line from the agent's eyes to the player's eyes.
///
/// Clear when nothing is hit, when the player itself is hit or when the
/// first occluder lies at or beyond the player within
/// [`RAY_HIT_TOLERANCE`]. Agents facing away never see the player.
pub fn has_sight_line<H: HostApi>(
    host: &H,
    capabilities: &Capabilities,
    agent: &H::Agent,
    player: &H::Player,
    params: &EvaluationParams,
) -> bool {
    if capabilities.sight_line == SightLine::Unavailable {
        return false;
    }
    if !in_field_of_view(agent, player, params.fov_half_angle) {
        return false;
    }
    let from = eye_of(agent.position(), agent.eye_height());
    let to = eye_of(player.position(), player.eye_height());
    let target_distance = from.distance(to);
    match host.raycast(from, to) {
        Ok(None) => true,
        Ok(Some(hit)) => {
            hit.body == Some(player.id()) || hit.distance + RAY_HIT_TOLERANCE >= target_distance
        }
        Err(err) => {
            debug!("sight line for agent {} unavailable: {err}", agent.id());
            false
        }
    }
}

/// Raw visibility through the bound strategy.
pub fn can_see<H: HostApi>(
    host: &H,
    capabilities: &Capabilities,
    agent: &H::Agent,
    player: &H::Player,
    params: &EvaluationParams,
) -> bool {
    match capabilities.visibility {
        VisibilityCheck::Host(accessor) => match host.can_see(accessor, agent, player) {
            Ok(visible) => visible,
            Err(err) => {
                debug!(
                    "visibility probe failed for agent {}, using sight line: {err}",
                    agent.id()
                );
                has_sight_line(host, capabilities, agent, player, params)
            }
        },
        VisibilityCheck::Geometric => has_sight_line(host, capabilities, agent, player, params),
        VisibilityCheck::Unavailable => false,
    }
}

/// Evaluates one live agent against the player.
///
/// Callers filter dead agents before calling.
pub fn evaluate<H: HostApi>(
    host: &H,
    capabilities: &Capabilities,
    agent: &H::Agent,
    player: &H::Player,
    params: &EvaluationParams,
    now: f64,
) -> ObservationSnapshot {
    let distance = distance(agent, player);
    let seen =
        is_targeting(agent, player) || can_see(host, capabilities, agent, player, params);
    ObservationSnapshot {
        agent: agent.id(),
        agent_name: agent.name().to_owned(),
        timestamp: now,
        distance,
        seen,
        hidden_candidate: !seen && distance <= params.detection_radius,
    }
}
