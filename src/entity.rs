//! Read-only views of the bodies the perception layer reasons about.
//!
//! The host simulation owns agents and the player; the core only reads
//! them through [`Agent`] and [`Player`]. [`AgentRecord`] and
//! [`PlayerRecord`] are plain-data implementations used by engine adapters
//! that snapshot their world before handing it over.
use glam::Vec3;

/// Stable identity of a simulated body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A non-player body that may perceive the player.
pub trait Agent {
    fn id(&self) -> EntityId;
    /// Human-readable name used in HUD reports.
    fn name(&self) -> &str;
    fn position(&self) -> Vec3;
    fn is_alive(&self) -> bool;
    /// Only hostile agents take part in detection.
    fn is_hostile(&self) -> bool;
    /// Identity of the body this agent is currently attacking, if any.
    fn attack_target(&self) -> Option<EntityId>;
    /// Height of the eyes above [`Agent::position`], when the host knows it.
    fn eye_height(&self) -> Option<f32> {
        None
    }
    /// Facing direction, when the host knows it.
    fn facing(&self) -> Option<Vec3> {
        None
    }
}

/// The locally tracked player.
///
/// Crouching is deliberately absent: hosts expose it through one of several
/// accessors, resolved by [`crate::capability`].
pub trait Player {
    fn id(&self) -> EntityId;
    fn position(&self) -> Vec3;
    fn is_alive(&self) -> bool;
    fn eye_height(&self) -> Option<f32> {
        None
    }
}

/// Plain-data agent snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRecord {
    pub id: EntityId,
    pub name: String,
    pub position: Vec3,
    pub alive: bool,
    pub hostile: bool,
    pub attack_target: Option<EntityId>,
    pub eye_height: Option<f32>,
    pub facing: Option<Vec3>,
}

impl AgentRecord {
    /// Alive hostile agent at `position` with no target and no probed body
    /// data.
    ///
    /// # Examples
    /// ```
    /// use glam::Vec3;
    /// use lurk::entity::{Agent, AgentRecord};
    /// let zombie = AgentRecord::hostile(7, "walker", Vec3::ZERO);
    /// assert!(zombie.is_alive() && zombie.is_hostile());
    /// ```
    pub fn hostile(id: u64, name: impl Into<String>, position: Vec3) -> Self {
        Self {
            id: EntityId(id),
            name: name.into(),
            position,
            alive: true,
            hostile: true,
            attack_target: None,
            eye_height: None,
            facing: None,
        }
    }

    #[must_use]
    pub fn targeting(mut self, target: EntityId) -> Self {
        self.attack_target = Some(target);
        self
    }

    #[must_use]
    pub fn facing_towards(mut self, direction: Vec3) -> Self {
        self.facing = Some(direction);
        self
    }

    #[must_use]
    pub fn dead(mut self) -> Self {
        self.alive = false;
        self
    }
}

impl Agent for AgentRecord {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn is_hostile(&self) -> bool {
        self.hostile
    }

    fn attack_target(&self) -> Option<EntityId> {
        self.attack_target
    }

    fn eye_height(&self) -> Option<f32> {
        self.eye_height
    }

    fn facing(&self) -> Option<Vec3> {
        self.facing
    }
}

/// Plain-data player snapshot.
///
/// `crouching` is raw host state; the core only sees it through the probed
/// crouch accessor.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub id: EntityId,
    pub position: Vec3,
    pub alive: bool,
    pub crouching: bool,
    pub eye_height: Option<f32>,
}

impl PlayerRecord {
    pub const fn standing(id: u64, position: Vec3) -> Self {
        Self {
            id: EntityId(id),
            position,
            alive: true,
            crouching: false,
            eye_height: None,
        }
    }

    #[must_use]
    pub fn crouched(mut self) -> Self {
        self.crouching = true;
        self
    }
}

impl Player for PlayerRecord {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn eye_height(&self) -> Option<f32> {
        self.eye_height
    }
}
