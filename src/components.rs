//! ECS component types read by the perception plugin.
//! Markers for hostiles and the tracked player, plus the body data the
//! evaluator needs: health, attack target, eye height and occluder volumes.
use bevy::prelude::*;

/// Marks an entity as a hostile agent that may perceive the player.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Hostile;

/// Marks the locally tracked player. Only the first match is used.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TrackedPlayer;

/// Present while the player is crouching.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Crouching;

/// Entity this agent is currently attacking.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Deref)]
pub struct AttackTarget(pub Entity);

/// Hit points; a body at zero or below counts as dead. Bodies without this
/// component are treated as alive.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Health(pub i32);

impl Health {
    #[must_use]
    pub const fn is_alive(self) -> bool {
        self.0 > 0
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct EyeHeight(pub f32);

/// Axis-aligned box blocking sight lines, centred on the entity's
/// translation.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Occluder {
    pub half_extents: Vec3,
}

impl Occluder {
    #[must_use]
    pub const fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }
}
