//! One-time resolution of optional host capabilities.
//!
//! Each resolver walks a fixed priority list of [`Accessor`]s, binds the
//! first one the host exposes and otherwise binds a fallback. The result is
//! a set of plain strategy enums ([`Capabilities`]) that the evaluator and
//! the driver dispatch on every tick without probing again.
//!
//! Fallbacks:
//! - visibility: geometric sight line through [`HostApi::raycast`]; when the
//!   host cannot raycast either, nothing is ever visible;
//! - crouch: the player is assumed to be standing;
//! - spatial query: a full world scan filtered by the query box; when the
//!   host cannot enumerate its world, the query yields nothing.
use log::{debug, info, warn};
use once_cell::sync::OnceCell;

use crate::entity::Agent;
use crate::host::{
    Accessor, CrouchAccessor, EntityFilter, HostApi, HostError, HostSurface, SpatialAccessor,
    VisibilityAccessor,
};
use crate::vector_math::Aabb;

const VISIBILITY_PRIORITY: [VisibilityAccessor; 2] = [
    VisibilityAccessor::SensesCanSee,
    VisibilityAccessor::EntityCanSee,
];

const CROUCH_PRIORITY: [CrouchAccessor; 4] = [
    CrouchAccessor::CrouchingFlag,
    CrouchAccessor::SneakingFlag,
    CrouchAccessor::StealthedFlag,
    CrouchAccessor::StealthState,
];

const SPATIAL_PRIORITY: [SpatialAccessor; 2] = [
    SpatialAccessor::BoundsIntoBuffer,
    SpatialAccessor::BoundsReturningList,
];

/// How "can this agent see the player" is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityCheck {
    Host(VisibilityAccessor),
    /// Sight line tested with the host raycast.
    Geometric,
    /// No way to tell; always "not visible".
    Unavailable,
}

/// How "is the player crouching" is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrouchCheck {
    Host(CrouchAccessor),
    AssumeStanding,
}

/// How nearby agents are enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialQuery {
    Host(SpatialAccessor),
    WorldScan,
    Unavailable,
}

/// Whether the geometric sight-line fallback can run on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SightLine {
    Raycast,
    Unavailable,
}

/// Resolved strategy set for one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub visibility: VisibilityCheck,
    pub sight_line: SightLine,
    pub crouch: CrouchCheck,
    pub spatial: SpatialQuery,
}

impl Capabilities {
    /// Runs every resolver against `surface`.
    pub fn resolve(surface: &impl HostSurface) -> Self {
        let sight_line = if surface.exposes(Accessor::Raycast) {
            SightLine::Raycast
        } else {
            SightLine::Unavailable
        };
        Self {
            visibility: resolve_visibility_check(surface),
            sight_line,
            crouch: resolve_crouch_check(surface),
            spatial: resolve_spatial_query(surface),
        }
    }

    /// Reads the player's crouch posture through the bound accessor.
    ///
    /// Invocation failures count as standing.
    pub fn is_crouching<H: HostApi>(&self, host: &H, player: &H::Player) -> bool {
        match self.crouch {
            CrouchCheck::Host(accessor) => host.read_crouch(accessor, player).unwrap_or_else(|err| {
                debug!("crouch probe failed, assuming standing: {err}");
                false
            }),
            CrouchCheck::AssumeStanding => false,
        }
    }

    /// Enumerates agents matching `filter` inside `bounds`.
    ///
    /// # Errors
    /// Returns the host error when the bound query fails, or
    /// [`HostError::Missing`] when no query is available at all.
    pub fn query_agents<H: HostApi>(
        &self,
        host: &H,
        filter: EntityFilter,
        bounds: Aabb,
    ) -> Result<Vec<H::Agent>, HostError> {
        match self.spatial {
            SpatialQuery::Host(accessor) => host.entities_in_bounds(accessor, filter, bounds),
            SpatialQuery::WorldScan => {
                let mut agents = host.scan_entities()?;
                agents.retain(|agent| {
                    bounds.contains(agent.position())
                        && (filter == EntityFilter::Any || agent.is_hostile())
                });
                Ok(agents)
            }
            SpatialQuery::Unavailable => Err(HostError::Missing(Accessor::WorldScan)),
        }
    }
}

/// Binds the first exposed line-of-sight accessor, else the geometric test.
pub fn resolve_visibility_check(surface: &impl HostSurface) -> VisibilityCheck {
    if let Some(accessor) = first_exposed(surface, VISIBILITY_PRIORITY) {
        info!("visibility resolved to {}", Accessor::from(accessor).label());
        return VisibilityCheck::Host(accessor);
    }
    if surface.exposes(Accessor::Raycast) {
        info!(
            "no line-of-sight accessor; using geometric fallback via {}",
            Accessor::Raycast.label()
        );
        return VisibilityCheck::Geometric;
    }
    warn!("no line-of-sight accessor and no raycast; agents will never see the player");
    VisibilityCheck::Unavailable
}

/// Binds the first exposed posture accessor, else assumes standing.
pub fn resolve_crouch_check(surface: &impl HostSurface) -> CrouchCheck {
    if let Some(accessor) = first_exposed(surface, CROUCH_PRIORITY) {
        info!("crouch state resolved to {}", Accessor::from(accessor).label());
        return CrouchCheck::Host(accessor);
    }
    info!("no crouch accessor; the player is treated as standing");
    CrouchCheck::AssumeStanding
}

/// Binds the first exposed bounds query, else a world scan.
pub fn resolve_spatial_query(surface: &impl HostSurface) -> SpatialQuery {
    if let Some(accessor) = first_exposed(surface, SPATIAL_PRIORITY) {
        info!("spatial query resolved to {}", Accessor::from(accessor).label());
        return SpatialQuery::Host(accessor);
    }
    if surface.exposes(Accessor::WorldScan) {
        info!("no bounds query; scanning {}", Accessor::WorldScan.label());
        return SpatialQuery::WorldScan;
    }
    warn!("no spatial query available; polling will see no agents");
    SpatialQuery::Unavailable
}

fn first_exposed<A, const N: usize>(surface: &impl HostSurface, priority: [A; N]) -> Option<A>
where
    A: Copy + Into<Accessor>,
{
    priority
        .into_iter()
        .find(|accessor| surface.exposes((*accessor).into()))
}

/// Lazily resolves [`Capabilities`] on first use and keeps them.
#[derive(Debug, Default)]
pub struct CapabilityProber {
    resolved: OnceCell<Capabilities>,
}

impl CapabilityProber {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached capabilities, resolving them against `surface` the
    /// first time.
    pub fn capabilities(&self, surface: &impl HostSurface) -> &Capabilities {
        self.resolved.get_or_init(|| Capabilities::resolve(surface))
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashSet;

    use rstest::rstest;

    struct Surface {
        exposed: HashSet<Accessor>,
        probes: Cell<usize>,
    }

    impl Surface {
        fn with(accessors: &[Accessor]) -> Self {
            Self {
                exposed: accessors.iter().copied().collect(),
                probes: Cell::new(0),
            }
        }
    }

    impl HostSurface for Surface {
        fn exposes(&self, accessor: Accessor) -> bool {
            self.probes.set(self.probes.get() + 1);
            self.exposed.contains(&accessor)
        }
    }

    #[rstest]
    fn visibility_prefers_senses_over_entity() {
        let surface = Surface::with(&[
            VisibilityAccessor::EntityCanSee.into(),
            VisibilityAccessor::SensesCanSee.into(),
            Accessor::Raycast,
        ]);
        assert_eq!(
            resolve_visibility_check(&surface),
            VisibilityCheck::Host(VisibilityAccessor::SensesCanSee)
        );
    }

    #[rstest]
    #[case::raycast_only(&[Accessor::Raycast], VisibilityCheck::Geometric)]
    #[case::nothing(&[], VisibilityCheck::Unavailable)]
    #[case::entity_only(
        &[Accessor::Visibility(VisibilityAccessor::EntityCanSee)],
        VisibilityCheck::Host(VisibilityAccessor::EntityCanSee)
    )]
    fn visibility_fallbacks(#[case] exposed: &[Accessor], #[case] expected: VisibilityCheck) {
        assert_eq!(resolve_visibility_check(&Surface::with(exposed)), expected);
    }

    #[rstest]
    #[case::flag(&[Accessor::Crouch(CrouchAccessor::CrouchingFlag)], CrouchCheck::Host(CrouchAccessor::CrouchingFlag))]
    #[case::stealth_state_last(
        &[Accessor::Crouch(CrouchAccessor::StealthState), Accessor::Crouch(CrouchAccessor::SneakingFlag)],
        CrouchCheck::Host(CrouchAccessor::SneakingFlag)
    )]
    #[case::none(&[], CrouchCheck::AssumeStanding)]
    fn crouch_priority(#[case] exposed: &[Accessor], #[case] expected: CrouchCheck) {
        assert_eq!(resolve_crouch_check(&Surface::with(exposed)), expected);
    }

    #[rstest]
    #[case::buffer_first(
        &[Accessor::Spatial(SpatialAccessor::BoundsReturningList), Accessor::Spatial(SpatialAccessor::BoundsIntoBuffer)],
        SpatialQuery::Host(SpatialAccessor::BoundsIntoBuffer)
    )]
    #[case::scan(&[Accessor::WorldScan], SpatialQuery::WorldScan)]
    #[case::nothing(&[], SpatialQuery::Unavailable)]
    fn spatial_priority(#[case] exposed: &[Accessor], #[case] expected: SpatialQuery) {
        assert_eq!(resolve_spatial_query(&Surface::with(exposed)), expected);
    }

    #[rstest]
    fn prober_resolves_only_once() {
        let surface = Surface::with(&[Accessor::Raycast]);
        let prober = CapabilityProber::new();
        assert!(!prober.is_resolved());
        let first = *prober.capabilities(&surface);
        let probes_after_first = surface.probes.get();
        let second = *prober.capabilities(&surface);
        assert_eq!(first, second);
        assert_eq!(surface.probes.get(), probes_after_first);
        assert!(prober.is_resolved());
        assert_eq!(first.sight_line, SightLine::Raycast);
    }
}
