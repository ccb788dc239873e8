//! Scriptable host and recording sink for unit and behavioural tests.
//!
//! Compiled for this crate's own tests and, through the `test-support`
//! feature, for integration tests.
use glam::Vec3;
use hashbrown::{HashMap, HashSet};

use crate::display::{DisplaySink, StateToken};
use crate::entity::{Agent, AgentRecord, EntityId, PlayerRecord};
use crate::host::{
    Accessor, CrouchAccessor, EntityFilter, HostApi, HostError, HostSurface, RayHit,
    SpatialAccessor, VisibilityAccessor, WorldId,
};
use crate::vector_math::{segment_entry, Aabb};

/// In-memory host whose answers are set up front and editable between ticks.
///
/// A fresh host has a loaded world, no player and no agents, and exposes a
/// raycast, a world scan and the crouching flag. Agents it does not know
/// about are reported alive.
#[derive(Debug, Clone)]
pub struct ScriptedHost {
    exposed: HashSet<Accessor>,
    world_loaded: bool,
    player: Option<PlayerRecord>,
    agents: Vec<AgentRecord>,
    despawned: HashSet<EntityId>,
    sight: HashMap<EntityId, Result<bool, HostError>>,
    walls: Vec<Aabb>,
    scan_failure: Option<HostError>,
    crouch_failure: Option<HostError>,
}

impl Default for ScriptedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedHost {
    #[must_use]
    pub fn new() -> Self {
        Self {
            exposed: [
                Accessor::Raycast,
                Accessor::WorldScan,
                Accessor::Crouch(CrouchAccessor::CrouchingFlag),
            ]
            .into_iter()
            .collect(),
            world_loaded: true,
            player: None,
            agents: Vec::new(),
            despawned: HashSet::new(),
            sight: HashMap::new(),
            walls: Vec::new(),
            scan_failure: None,
            crouch_failure: None,
        }
    }

    #[must_use]
    pub fn exposing(mut self, accessor: impl Into<Accessor>) -> Self {
        self.exposed.insert(accessor.into());
        self
    }

    #[must_use]
    pub fn hiding(mut self, accessor: impl Into<Accessor>) -> Self {
        self.exposed.remove(&accessor.into());
        self
    }

    #[must_use]
    pub fn with_player(mut self, player: PlayerRecord) -> Self {
        self.player = Some(player);
        self
    }

    #[must_use]
    pub fn with_agent(mut self, agent: AgentRecord) -> Self {
        self.agents.push(agent);
        self
    }

    /// Scripts the answer of the host visibility accessor for `agent`.
    #[must_use]
    pub fn with_sight(mut self, agent: EntityId, answer: Result<bool, HostError>) -> Self {
        self.sight.insert(agent, answer);
        self
    }

    /// Adds an axis-aligned occluder.
    #[must_use]
    pub fn with_wall(mut self, center: Vec3, half_extents: Vec3) -> Self {
        self.walls.push(Aabb::from_half_extents(center, half_extents));
        self
    }

    #[must_use]
    pub fn with_scan_failure(mut self, error: HostError) -> Self {
        self.scan_failure = Some(error);
        self
    }

    #[must_use]
    pub fn with_crouch_failure(mut self, error: HostError) -> Self {
        self.crouch_failure = Some(error);
        self
    }

    pub fn set_world_loaded(&mut self, loaded: bool) {
        self.world_loaded = loaded;
    }

    pub fn player_mut(&mut self) -> Option<&mut PlayerRecord> {
        self.player.as_mut()
    }

    pub fn add_agent(&mut self, agent: AgentRecord) {
        self.agents.retain(|known| known.id != agent.id);
        self.agents.push(agent);
    }

    pub fn agent_mut(&mut self, id: EntityId) -> Option<&mut AgentRecord> {
        self.agents.iter_mut().find(|agent| agent.id == id)
    }

    /// Removes the agent from the world; cached observations of it become
    /// stale.
    pub fn despawn(&mut self, id: EntityId) {
        self.agents.retain(|agent| agent.id != id);
        self.despawned.insert(id);
    }

    #[must_use]
    pub fn agents(&self) -> &[AgentRecord] {
        &self.agents
    }

    fn require(&self, accessor: Accessor) -> Result<(), HostError> {
        if self.exposed.contains(&accessor) {
            Ok(())
        } else {
            Err(HostError::Missing(accessor))
        }
    }
}

impl HostSurface for ScriptedHost {
    fn exposes(&self, accessor: Accessor) -> bool {
        self.exposed.contains(&accessor)
    }
}

impl HostApi for ScriptedHost {
    type Agent = AgentRecord;
    type Player = PlayerRecord;

    fn current_world(&self) -> Option<WorldId> {
        self.world_loaded.then_some(WorldId(0))
    }

    fn primary_player(&self, _world: WorldId) -> Option<PlayerRecord> {
        self.player.clone()
    }

    fn is_agent_alive(&self, id: EntityId) -> bool {
        if self.despawned.contains(&id) {
            return false;
        }
        self.agents
            .iter()
            .find(|agent| agent.id == id)
            .is_none_or(Agent::is_alive)
    }

    fn can_see(
        &self,
        accessor: VisibilityAccessor,
        agent: &AgentRecord,
        _player: &PlayerRecord,
    ) -> Result<bool, HostError> {
        if let Some(answer) = self.sight.get(&agent.id) {
            return answer.clone();
        }
        self.require(accessor.into())?;
        Ok(false)
    }

    fn read_crouch(
        &self,
        accessor: CrouchAccessor,
        player: &PlayerRecord,
    ) -> Result<bool, HostError> {
        if let Some(error) = &self.crouch_failure {
            return Err(error.clone());
        }
        self.require(accessor.into())?;
        Ok(player.crouching)
    }

    fn entities_in_bounds(
        &self,
        accessor: SpatialAccessor,
        filter: EntityFilter,
        bounds: Aabb,
    ) -> Result<Vec<AgentRecord>, HostError> {
        self.require(accessor.into())?;
        Ok(self
            .agents
            .iter()
            .filter(|agent| bounds.contains(agent.position))
            .filter(|agent| filter == EntityFilter::Any || agent.hostile)
            .cloned()
            .collect())
    }

    fn scan_entities(&self) -> Result<Vec<AgentRecord>, HostError> {
        if let Some(error) = &self.scan_failure {
            return Err(error.clone());
        }
        self.require(Accessor::WorldScan)?;
        Ok(self.agents.clone())
    }

    fn raycast(&self, from: Vec3, to: Vec3) -> Result<Option<RayHit>, HostError> {
        self.require(Accessor::Raycast)?;
        Ok(self
            .walls
            .iter()
            .filter_map(|wall| segment_entry(from, to, wall))
            .reduce(f32::min)
            .map(|distance| RayHit {
                distance,
                body: None,
            }))
    }
}

/// One forwarded HUD report.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedReport {
    pub agent_name: String,
    pub detected: bool,
    pub distance: f32,
}

/// Sink that keeps every call for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub tokens: Vec<StateToken>,
    pub reports: Vec<RecordedReport>,
}

impl RecordingSink {
    pub fn clear(&mut self) {
        self.tokens.clear();
        self.reports.clear();
    }
}

impl DisplaySink for RecordingSink {
    fn set_state(&mut self, token: StateToken) {
        self.tokens.push(token);
    }

    fn report(&mut self, agent_name: &str, detected: bool, distance: f32) {
        self.reports.push(RecordedReport {
            agent_name: agent_name.to_owned(),
            detected,
            distance,
        });
    }
}

/// Convenience for scenarios that only need a player's identity.
#[must_use]
pub fn player_at(position: Vec3) -> PlayerRecord {
    PlayerRecord::standing(1, position)
}
