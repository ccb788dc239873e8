//! Narrow contract between the perception core and the host simulation.
//!
//! Hosts differ in which queries they offer: one build exposes a senses
//! subsystem with a line-of-sight query, another only a raycast; crouching
//! may be a flag, a field or a stealth-state enum. Every optional query is
//! named by an [`Accessor`]. The host advertises what it has through
//! [`HostSurface::exposes`] and executes named accessors through
//! [`HostApi`]. Choosing which accessor to use is the job of
//! [`crate::capability`], which does it once.
use glam::Vec3;
use thiserror::Error;

use crate::entity::{Agent, EntityId, Player};
use crate::vector_math::Aabb;

/// Line-of-sight queries a host may offer, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisibilityAccessor {
    /// The agent's senses component answers "can I see this body".
    SensesCanSee,
    /// The entity itself answers "can I see this body".
    EntityCanSee,
}

/// Ways a host may expose the player's crouch or stealth posture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrouchAccessor {
    CrouchingFlag,
    SneakingFlag,
    StealthedFlag,
    /// Enumerated stealth state; any non-zero state counts as stealthed.
    StealthState,
}

/// Spatial query overloads, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpatialAccessor {
    /// Fills a caller-provided buffer with the bodies inside a box.
    BoundsIntoBuffer,
    /// Returns a fresh list of the bodies inside a box.
    BoundsReturningList,
}

/// Any optional host capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    Visibility(VisibilityAccessor),
    Crouch(CrouchAccessor),
    Spatial(SpatialAccessor),
    /// Segment-versus-world occlusion test.
    Raycast,
    /// Enumeration of every body in the world.
    WorldScan,
}

impl Accessor {
    /// Stable label for log lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Visibility(VisibilityAccessor::SensesCanSee) => "senses.can_see(body)",
            Self::Visibility(VisibilityAccessor::EntityCanSee) => "entity.can_see(body)",
            Self::Crouch(CrouchAccessor::CrouchingFlag) => "player.is_crouching",
            Self::Crouch(CrouchAccessor::SneakingFlag) => "player.is_sneaking",
            Self::Crouch(CrouchAccessor::StealthedFlag) => "player.is_stealthed",
            Self::Crouch(CrouchAccessor::StealthState) => "player.stealth_state",
            Self::Spatial(SpatialAccessor::BoundsIntoBuffer) => {
                "world.entities_in_bounds(filter, bounds, buffer)"
            }
            Self::Spatial(SpatialAccessor::BoundsReturningList) => {
                "world.entities_in_bounds(filter, bounds)"
            }
            Self::Raycast => "world.raycast(from, to)",
            Self::WorldScan => "world.entities()",
        }
    }
}

impl From<VisibilityAccessor> for Accessor {
    fn from(accessor: VisibilityAccessor) -> Self {
        Self::Visibility(accessor)
    }
}

impl From<CrouchAccessor> for Accessor {
    fn from(accessor: CrouchAccessor) -> Self {
        Self::Crouch(accessor)
    }
}

impl From<SpatialAccessor> for Accessor {
    fn from(accessor: SpatialAccessor) -> Self {
        Self::Spatial(accessor)
    }
}

/// Failure raised by the host while executing an accessor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The accessor is not available on this host.
    #[error("accessor {} is not available", .0.label())]
    Missing(Accessor),
    /// The accessor exists but failed when called.
    #[error("accessor {} failed: {detail}", .accessor.label())]
    Invocation { accessor: Accessor, detail: String },
}

impl HostError {
    pub fn invocation(accessor: impl Into<Accessor>, detail: impl Into<String>) -> Self {
        Self::Invocation {
            accessor: accessor.into(),
            detail: detail.into(),
        }
    }
}

/// Which bodies a spatial query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityFilter {
    /// Bodies of the hostile supertype.
    Hostile,
    Any,
}

/// First occluder met by a raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin.
    pub distance: f32,
    /// Body that was hit, when the occluder is a body rather than terrain.
    pub body: Option<EntityId>,
}

/// Opaque handle on the currently loaded world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorldId(pub u32);

/// Capability advertisement, consulted once by the prober.
pub trait HostSurface {
    fn exposes(&self, accessor: Accessor) -> bool;
}

/// Host operations used by the perception core.
///
/// Every call may fail; the core degrades instead of propagating.
pub trait HostApi: HostSurface {
    type Agent: Agent;
    type Player: Player;

    /// The loaded world, or `None` during level transitions.
    fn current_world(&self) -> Option<WorldId>;
    fn primary_player(&self, world: WorldId) -> Option<Self::Player>;

    /// Aliveness re-check for a cached agent that may have been despawned.
    fn is_agent_alive(&self, id: EntityId) -> bool;

    fn can_see(
        &self,
        accessor: VisibilityAccessor,
        agent: &Self::Agent,
        player: &Self::Player,
    ) -> Result<bool, HostError>;

    fn read_crouch(&self, accessor: CrouchAccessor, player: &Self::Player)
        -> Result<bool, HostError>;

    fn entities_in_bounds(
        &self,
        accessor: SpatialAccessor,
        filter: EntityFilter,
        bounds: Aabb,
    ) -> Result<Vec<Self::Agent>, HostError>;

    fn scan_entities(&self) -> Result<Vec<Self::Agent>, HostError>;

    /// First occluder along `from → to`, or `None` when the segment is clear.
    fn raycast(&self, from: Vec3, to: Vec3) -> Result<Option<RayHit>, HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn errors_name_the_accessor() {
        let err = HostError::invocation(VisibilityAccessor::SensesCanSee, "null senses");
        assert_eq!(
            err.to_string(),
            "accessor senses.can_see(body) failed: null senses"
        );
        let missing = HostError::Missing(Accessor::Raycast);
        assert_eq!(missing.to_string(), "accessor world.raycast(from, to) is not available");
    }

    #[rstest]
    fn accessor_conversions_wrap_the_family() {
        assert_eq!(
            Accessor::from(CrouchAccessor::StealthState),
            Accessor::Crouch(CrouchAccessor::StealthState)
        );
        assert_eq!(
            Accessor::from(SpatialAccessor::BoundsIntoBuffer),
            Accessor::Spatial(SpatialAccessor::BoundsIntoBuffer)
        );
    }
}
