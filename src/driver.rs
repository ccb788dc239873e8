//! Fixed-interval poll loop and event-hook glue around a
//! [`DetectionContext`].
//!
//! The host calls [`RuntimeDriver::update`] every frame; a poll runs only
//! when the configured interval has elapsed on the tick clock. The per-agent
//! hook calls [`RuntimeDriver::on_agent_tick`] whenever the host updates an
//! agent, independent of the poll cadence.
use log::{debug, info, warn};

use crate::capability::{Capabilities, SpatialQuery};
use crate::config::PerceptionConfig;
use crate::constants::WORLD_LOG_COOLDOWN;
use crate::detection::{DetectionContext, DetectionState, Frame};
use crate::display::DisplaySink;
use crate::entity::{Agent, Player};
use crate::host::{Accessor, EntityFilter, HostApi};
use crate::logging::{Throttle, WarnOnce};
use crate::vector_math::Aabb;

/// Inputs shared by one frame's worth of driver calls.
pub struct Tick<'a, H: HostApi> {
    pub host: &'a H,
    pub capabilities: &'a Capabilities,
    pub config: &'a PerceptionConfig,
    /// Monotonic tick clock in seconds.
    pub now: f64,
}

#[derive(Debug, Clone)]
pub struct RuntimeDriver {
    last_poll: Option<f64>,
    unavailable: Throttle,
    query_failure: WarnOnce,
    query_announced: WarnOnce,
}

impl Default for RuntimeDriver {
    fn default() -> Self {
        Self {
            last_poll: None,
            unavailable: Throttle::new(WORLD_LOG_COOLDOWN),
            query_failure: WarnOnce::default(),
            query_announced: WarnOnce::default(),
        }
    }
}

impl RuntimeDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when `interval` seconds have passed since the last poll. The
    /// first call is always due. Arms the timer when it returns `true`.
    pub fn poll_due(&mut self, now: f64, interval: f64) -> bool {
        match self.last_poll {
            Some(last) if now - last < interval => false,
            _ => {
                self.last_poll = Some(now);
                true
            }
        }
    }

    /// Runs [`RuntimeDriver::tick`] when a poll is due. Returns the state
    /// after the poll, or `None` when no poll ran.
    pub fn update<H: HostApi>(
        &mut self,
        context: &mut DetectionContext,
        tick: &Tick<'_, H>,
        sink: &mut dyn DisplaySink,
    ) -> Option<DetectionState> {
        self.poll_due(tick.now, tick.config.poll_interval)
            .then(|| self.tick(context, tick, sink))
    }

    /// One poll: resolve the player, query nearby hostiles and reconcile.
    pub fn tick<H: HostApi>(
        &mut self,
        context: &mut DetectionContext,
        tick: &Tick<'_, H>,
        sink: &mut dyn DisplaySink,
    ) -> DetectionState {
        let host = tick.host;
        let config = tick.config;
        context.set_hud_cooldown(config.hud_cooldown);

        let Some(world) = host.current_world() else {
            self.lose_player("no world loaded", context, tick.now, sink);
            return context.current_state();
        };
        let Some(player) = host.primary_player(world) else {
            self.lose_player("no local player", context, tick.now, sink);
            return context.current_state();
        };
        if !player.is_alive() {
            self.lose_player("local player is dead", context, tick.now, sink);
            return context.current_state();
        }

        let radius = config.detection_radius;
        let bounds = Aabb::cube(player.position(), 2.0 * radius);
        if self.query_announced.first() {
            info!(
                "polling hostiles via {}",
                spatial_label(tick.capabilities.spatial)
            );
        }
        let mut agents = tick
            .capabilities
            .query_agents(host, EntityFilter::Hostile, bounds)
            .unwrap_or_else(|err| {
                if self.query_failure.first() {
                    warn!("spatial query failed, polling with no agents: {err}");
                }
                Vec::new()
            });
        agents.retain(|agent| agent.is_alive() && agent.is_hostile());

        if config.debug {
            let nearest = agents
                .iter()
                .map(|agent| agent.position().distance(player.position()))
                .reduce(f32::min);
            debug!(
                "poll at {:.2}s: {} hostiles within {radius}m, nearest {nearest:?}",
                tick.now,
                agents.len()
            );
        }

        let frame = Frame {
            host,
            capabilities: tick.capabilities,
            player: &player,
            params: config.evaluation_params(),
            now: tick.now,
            reports_enabled: config.enable_hud,
        };
        context.process_poll(&frame, &agents, sink)
    }

    /// Event path for a single agent update.
    ///
    /// Ignored when the hook is disabled, the agent is dead or not hostile,
    /// or there is no live player. Returns the resulting state when the
    /// event was processed.
    pub fn on_agent_tick<H: HostApi>(
        &mut self,
        context: &mut DetectionContext,
        tick: &Tick<'_, H>,
        agent: &H::Agent,
        sink: &mut dyn DisplaySink,
    ) -> Option<DetectionState> {
        let config = tick.config;
        if !config.enable_event_hook || !agent.is_alive() || !agent.is_hostile() {
            return None;
        }
        let host = tick.host;
        let player = host
            .current_world()
            .and_then(|world| host.primary_player(world))
            .filter(Player::is_alive)?;
        context.set_hud_cooldown(config.hud_cooldown);
        let frame = Frame {
            host,
            capabilities: tick.capabilities,
            player: &player,
            params: config.evaluation_params(),
            now: tick.now,
            reports_enabled: config.enable_hud,
        };
        Some(context.process_event(&frame, agent, sink))
    }

    fn lose_player(
        &mut self,
        reason: &str,
        context: &mut DetectionContext,
        now: f64,
        sink: &mut dyn DisplaySink,
    ) {
        if self.unavailable.ready(now) {
            warn!("{reason}; detection reset");
        }
        context.reset(sink);
    }
}

fn spatial_label(query: SpatialQuery) -> &'static str {
    match query {
        SpatialQuery::Host(accessor) => Accessor::from(accessor).label(),
        SpatialQuery::WorldScan => Accessor::WorldScan.label(),
        SpatialQuery::Unavailable => "nothing",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSink, ScriptedHost};
    use crate::display::StateToken;
    use crate::entity::{AgentRecord, PlayerRecord};
    use crate::host::HostError;
    use glam::Vec3;
    use rstest::rstest;

    #[rstest]
    #[case::first_call(None, 0.0, true)]
    #[case::too_soon(Some(1.0), 1.2, false)]
    #[case::exactly_due(Some(1.0), 1.3, true)]
    fn poll_cadence(#[case] last: Option<f64>, #[case] now: f64, #[case] due: bool) {
        let mut driver = RuntimeDriver::new();
        if let Some(at) = last {
            assert!(driver.poll_due(at, 0.3));
        }
        assert_eq!(driver.poll_due(now, 0.3), due);
    }

    #[rstest]
    fn update_skips_between_polls() {
        let host = ScriptedHost::new().with_player(PlayerRecord::standing(1, Vec3::ZERO));
        let capabilities = Capabilities::resolve(&host);
        let config = PerceptionConfig::default();
        let mut driver = RuntimeDriver::new();
        let mut context = DetectionContext::default();
        let mut sink = RecordingSink::default();
        let at = |now| Tick {
            host: &host,
            capabilities: &capabilities,
            config: &config,
            now,
        };
        assert!(driver.update(&mut context, &at(0.0), &mut sink).is_some());
        assert!(driver.update(&mut context, &at(0.1), &mut sink).is_none());
        assert!(driver.update(&mut context, &at(0.31), &mut sink).is_some());
    }

    #[rstest]
    fn missing_world_resets_every_poll() {
        let host = ScriptedHost::new();
        let capabilities = Capabilities::resolve(&host);
        let config = PerceptionConfig::default();
        let mut driver = RuntimeDriver::new();
        let mut context = DetectionContext::default();
        let mut sink = RecordingSink::default();
        for now in [0.0, 0.3] {
            let tick = Tick {
                host: &host,
                capabilities: &capabilities,
                config: &config,
                now,
            };
            assert_eq!(driver.tick(&mut context, &tick, &mut sink), DetectionState::None);
        }
        assert_eq!(sink.tokens, vec![StateToken::None, StateToken::None]);
    }

    #[rstest]
    fn failing_query_counts_as_empty() {
        let player = PlayerRecord::standing(1, Vec3::ZERO);
        let host = ScriptedHost::new()
            .with_player(player.clone())
            .with_agent(AgentRecord::hostile(2, "brute", Vec3::X).targeting(player.id))
            .with_scan_failure(HostError::invocation(Accessor::WorldScan, "world locked"));
        let capabilities = Capabilities::resolve(&host);
        let config = PerceptionConfig::default();
        let mut driver = RuntimeDriver::new();
        let mut context = DetectionContext::default();
        let mut sink = RecordingSink::default();
        let tick = Tick {
            host: &host,
            capabilities: &capabilities,
            config: &config,
            now: 0.0,
        };
        assert_eq!(driver.tick(&mut context, &tick, &mut sink), DetectionState::None);
        assert!(sink.tokens.is_empty());
    }

    #[rstest]
    fn event_hook_ignores_dead_and_disabled() {
        let player = PlayerRecord::standing(1, Vec3::ZERO);
        let host = ScriptedHost::new().with_player(player.clone());
        let capabilities = Capabilities::resolve(&host);
        let mut config = PerceptionConfig::default();
        let mut driver = RuntimeDriver::new();
        let mut context = DetectionContext::default();
        let mut sink = RecordingSink::default();
        let brute = AgentRecord::hostile(2, "brute", Vec3::X).targeting(player.id);

        let dead = brute.clone().dead();
        let tick = Tick {
            host: &host,
            capabilities: &capabilities,
            config: &config,
            now: 0.0,
        };
        assert!(driver.on_agent_tick(&mut context, &tick, &dead, &mut sink).is_none());

        config.enable_event_hook = false;
        let tick = Tick {
            host: &host,
            capabilities: &capabilities,
            config: &config,
            now: 0.0,
        };
        assert!(driver.on_agent_tick(&mut context, &tick, &brute, &mut sink).is_none());
        assert!(sink.tokens.is_empty());
    }
}
