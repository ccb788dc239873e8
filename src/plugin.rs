//! Bevy plugin wiring the perception core into the ECS schedule.
//!
//! `PerceptionPlugin` inserts the [`Perception`] resource, runs the poll
//! system every frame (the driver decides whether a poll is due) and
//! installs an observer for [`AgentTicked`], the per-agent event path.
//! [`EcsHost`] adapts the ECS world to the host contract: it exposes the
//! crouching marker, a list-returning bounds query, a world scan and an
//! occluder raycast. It has no line-of-sight query, so sight is always
//! decided geometrically.

use std::path::PathBuf;

use bevy::ecs::prelude::On;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use log::error;

use crate::capability::{Capabilities, CapabilityProber};
use crate::components::{
    AttackTarget, Crouching, EyeHeight, Health, Hostile, Occluder, TrackedPlayer,
};
use crate::config::{ConfigFile, ConfigSource, PerceptionConfig};
use crate::detection::{DetectionContext, DetectionState};
use crate::driver::{RuntimeDriver, Tick};
use crate::entity::{AgentRecord, EntityId, PlayerRecord};
use crate::host::{
    Accessor, CrouchAccessor, EntityFilter, HostApi, HostError, HostSurface, RayHit,
    SpatialAccessor, VisibilityAccessor, WorldId,
};
use crate::presentation::{hud_message_system, DetectionOverlay, HudPlugin};
use crate::vector_math::{segment_entry, Aabb};

type PlayerRow = (
    Entity,
    &'static Transform,
    Option<&'static Health>,
    Has<Crouching>,
    Option<&'static EyeHeight>,
);

type AgentRow = (
    Entity,
    &'static Transform,
    Option<&'static Name>,
    Option<&'static Health>,
    Option<&'static AttackTarget>,
    Option<&'static EyeHeight>,
);

/// Queries the perception systems read from.
#[derive(SystemParam)]
pub struct PerceptionQueries<'w, 's> {
    pub players: Query<'w, 's, PlayerRow, With<TrackedPlayer>>,
    pub agents: Query<'w, 's, AgentRow, With<Hostile>>,
    pub occluders: Query<'w, 's, (Entity, &'static Transform, &'static Occluder)>,
}

fn to_core(v: Vec3) -> glam::Vec3 {
    glam::Vec3::from_array(v.to_array())
}

fn id_of(entity: Entity) -> EntityId {
    EntityId(entity.to_bits())
}

fn alive(health: Option<&Health>) -> bool {
    health.is_none_or(|health| health.is_alive())
}

type AgentView<'a> = (
    Entity,
    &'a Transform,
    Option<&'a Name>,
    Option<&'a Health>,
    Option<&'a AttackTarget>,
    Option<&'a EyeHeight>,
);

fn agent_record((entity, transform, name, health, target, eye): AgentView<'_>) -> AgentRecord {
    AgentRecord {
        id: id_of(entity),
        name: name.map_or_else(|| format!("agent {entity}"), |name| name.as_str().to_owned()),
        position: to_core(transform.translation),
        alive: alive(health),
        hostile: true,
        attack_target: target.map(|target| id_of(target.0)),
        eye_height: eye.map(|eye| eye.0),
        facing: Some(to_core(transform.forward().as_vec3())),
    }
}

/// Host view over the current ECS world.
pub struct EcsHost<'a, 'w, 's> {
    queries: &'a PerceptionQueries<'w, 's>,
}

impl<'a, 'w, 's> EcsHost<'a, 'w, 's> {
    pub const fn new(queries: &'a PerceptionQueries<'w, 's>) -> Self {
        Self { queries }
    }

    /// Record for a hostile entity, if it still exists.
    pub fn agent(&self, entity: Entity) -> Option<AgentRecord> {
        self.queries.agents.get(entity).ok().map(agent_record)
    }

    fn agents(&self) -> impl Iterator<Item = AgentRecord> + '_ {
        self.queries.agents.iter().map(agent_record)
    }
}

impl HostSurface for EcsHost<'_, '_, '_> {
    fn exposes(&self, accessor: Accessor) -> bool {
        matches!(
            accessor,
            Accessor::Crouch(CrouchAccessor::CrouchingFlag)
                | Accessor::Spatial(SpatialAccessor::BoundsReturningList)
                | Accessor::WorldScan
                | Accessor::Raycast
        )
    }
}

impl HostApi for EcsHost<'_, '_, '_> {
    type Agent = AgentRecord;
    type Player = PlayerRecord;

    fn current_world(&self) -> Option<WorldId> {
        Some(WorldId(0))
    }

    fn primary_player(&self, _world: WorldId) -> Option<PlayerRecord> {
        let (entity, transform, health, crouching, eye) = self.queries.players.iter().next()?;
        Some(PlayerRecord {
            id: id_of(entity),
            position: to_core(transform.translation),
            alive: alive(health),
            crouching,
            eye_height: eye.map(|eye| eye.0),
        })
    }

    fn is_agent_alive(&self, id: EntityId) -> bool {
        Entity::try_from_bits(id.0)
            .and_then(|entity| self.queries.agents.get(entity).ok())
            .is_some_and(|(_, _, _, health, ..)| alive(health))
    }

    fn can_see(
        &self,
        accessor: VisibilityAccessor,
        _agent: &AgentRecord,
        _player: &PlayerRecord,
    ) -> Result<bool, HostError> {
        Err(HostError::Missing(accessor.into()))
    }

    fn read_crouch(
        &self,
        accessor: CrouchAccessor,
        player: &PlayerRecord,
    ) -> Result<bool, HostError> {
        match accessor {
            CrouchAccessor::CrouchingFlag => Ok(player.crouching),
            other => Err(HostError::Missing(other.into())),
        }
    }

    fn entities_in_bounds(
        &self,
        accessor: SpatialAccessor,
        _filter: EntityFilter,
        bounds: Aabb,
    ) -> Result<Vec<AgentRecord>, HostError> {
        if accessor != SpatialAccessor::BoundsReturningList {
            return Err(HostError::Missing(accessor.into()));
        }
        Ok(self
            .agents()
            .filter(|agent| bounds.contains(agent.position))
            .collect())
    }

    fn scan_entities(&self) -> Result<Vec<AgentRecord>, HostError> {
        Ok(self.agents().collect())
    }

    fn raycast(&self, from: glam::Vec3, to: glam::Vec3) -> Result<Option<RayHit>, HostError> {
        Ok(self
            .queries
            .occluders
            .iter()
            .filter_map(|(entity, transform, occluder)| {
                let aabb = Aabb::from_half_extents(
                    to_core(transform.translation),
                    to_core(occluder.half_extents),
                );
                segment_entry(from, to, &aabb).map(|distance| RayHit {
                    distance,
                    body: Some(id_of(entity)),
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance)))
    }
}

/// Perception state owned by the ECS world.
#[derive(Resource)]
pub struct Perception {
    context: DetectionContext,
    driver: RuntimeDriver,
    prober: CapabilityProber,
    source: Box<dyn ConfigSource + Send + Sync>,
    config: PerceptionConfig,
}

impl Perception {
    pub fn new(source: impl ConfigSource + Send + Sync + 'static) -> Self {
        let mut source: Box<dyn ConfigSource + Send + Sync> = Box::new(source);
        let config = source.current();
        Self {
            context: DetectionContext::new(config.hud_cooldown),
            driver: RuntimeDriver::new(),
            prober: CapabilityProber::new(),
            source,
            config,
        }
    }

    #[must_use]
    pub const fn current_state(&self) -> DetectionState {
        self.context.current_state()
    }

    #[must_use]
    pub const fn context(&self) -> &DetectionContext {
        &self.context
    }

    /// Configuration read at the start of the latest frame.
    #[must_use]
    pub const fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    #[must_use]
    pub fn is_probed(&self) -> bool {
        self.prober.is_resolved()
    }

    fn refresh_config(&mut self) {
        self.config = self.source.current();
    }
}

/// Event raised by the host after it updates one hostile agent.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentTicked {
    pub agent: Entity,
}

/// Poll path: refreshes the config and polls when the interval elapsed.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn perception_poll_system(
    time: Res<Time>,
    queries: PerceptionQueries,
    mut perception: ResMut<Perception>,
    mut overlay: ResMut<DetectionOverlay>,
) {
    let perception = &mut *perception;
    perception.refresh_config();
    overlay.set_message_duration(perception.config.message_duration);

    let now = time.elapsed_secs_f64();
    if !perception.driver.poll_due(now, perception.config.poll_interval) {
        return;
    }
    let host = EcsHost::new(&queries);
    let capabilities: &Capabilities = perception.prober.capabilities(&host);
    let tick = Tick {
        host: &host,
        capabilities,
        config: &perception.config,
        now,
    };
    perception
        .driver
        .tick(&mut perception.context, &tick, &mut *overlay);
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must accept On<T> by value."
)]
fn on_agent_ticked(
    event: On<AgentTicked>,
    time: Res<Time>,
    queries: PerceptionQueries,
    mut perception: ResMut<Perception>,
    mut overlay: ResMut<DetectionOverlay>,
) {
    let host = EcsHost::new(&queries);
    let Some(agent) = host.agent(event.event().agent) else {
        return;
    };
    let perception = &mut *perception;
    let capabilities = perception.prober.capabilities(&host);
    let tick = Tick {
        host: &host,
        capabilities,
        config: &perception.config,
        now: time.elapsed_secs_f64(),
    };
    perception
        .driver
        .on_agent_tick(&mut perception.context, &tick, &agent, &mut *overlay);
}

/// Where [`PerceptionPlugin`] takes its configuration from.
#[derive(Debug, Clone)]
pub enum ConfigOrigin {
    Inline(PerceptionConfig),
    /// JSON file, hot reloaded when it changes on disk.
    File(PathBuf),
    /// File the caller already opened and validated.
    Opened(ConfigFile),
}

/// Plugin installing detection, the HUD overlay and the event observer.
#[derive(Debug, Clone)]
pub struct PerceptionPlugin {
    origin: ConfigOrigin,
}

impl Default for PerceptionPlugin {
    fn default() -> Self {
        Self::new(PerceptionConfig::default())
    }
}

impl PerceptionPlugin {
    #[must_use]
    pub const fn new(config: PerceptionConfig) -> Self {
        Self {
            origin: ConfigOrigin::Inline(config),
        }
    }

    #[must_use]
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: ConfigOrigin::File(path.into()),
        }
    }

    /// Uses a config file the caller has already opened.
    #[must_use]
    pub fn with_config_file(file: ConfigFile) -> Self {
        Self {
            origin: ConfigOrigin::Opened(file),
        }
    }

    fn perception(&self) -> Perception {
        match &self.origin {
            ConfigOrigin::Inline(config) => Perception::new(config.clone().sanitised()),
            ConfigOrigin::File(path) => match ConfigFile::open(path.clone()) {
                Ok(file) => Perception::new(file),
                Err(err) => {
                    error!("{err}; falling back to default perception config");
                    Perception::new(PerceptionConfig::default())
                }
            },
            ConfigOrigin::Opened(file) => Perception::new(file.clone()),
        }
    }
}

impl Plugin for PerceptionPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<HudPlugin>() {
            app.add_plugins(HudPlugin);
        }
        let perception = self.perception();
        app.insert_resource(DetectionOverlay::new(perception.config.message_duration));
        app.insert_resource(perception);
        app.add_observer(on_agent_ticked);
        app.add_systems(Update, perception_poll_system.before(hud_message_system));
    }
}
