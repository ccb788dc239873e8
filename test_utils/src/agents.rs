//! Convenience constructors for agent and player records used in tests.

use glam::Vec3;
use lurk::entity::{AgentRecord, EntityId, PlayerRecord};

/// Identity every helper gives the player.
pub const PLAYER_ID: EntityId = EntityId(1);

/// Standing player at the origin.
///
/// # Examples
/// ```
/// use test_utils::agents::{player, PLAYER_ID};
/// assert_eq!(player().id, PLAYER_ID);
/// ```
#[must_use]
pub fn player() -> PlayerRecord {
    PlayerRecord::standing(PLAYER_ID.0, Vec3::ZERO)
}

/// Crouching player at the origin.
#[must_use]
pub fn crouched_player() -> PlayerRecord {
    player().crouched()
}

/// Hostile agent on the +X axis, `distance` metres from the origin.
#[must_use]
pub fn walker(id: u64, distance: f32) -> AgentRecord {
    AgentRecord::hostile(id, format!("walker-{id}"), Vec3::new(distance, 0.0, 0.0))
}

/// Hostile agent on the +X axis that is attacking the player.
#[must_use]
pub fn brute(id: u64, distance: f32) -> AgentRecord {
    AgentRecord::hostile(id, format!("brute-{id}"), Vec3::new(distance, 0.0, 0.0))
        .targeting(PLAYER_ID)
}
