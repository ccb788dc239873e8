//! Aggregate detection state with hysteresis and a throttled report channel.
//!
//! Two producers feed one [`ObservationCache`]: the batch poll
//! ([`DetectionContext::process_poll`]) and the per-agent event hook
//! ([`DetectionContext::process_event`]). Both re-sweep and re-aggregate the
//! whole cache, then [`reconcile`] decides the state. The display sink only
//! hears about actual changes; textual reports additionally pass a cooldown
//! gate so a flapping state cannot spam the HUD.
use log::{debug, info};

use crate::cache::{CacheAggregate, ObservationCache, Reference};
use crate::capability::Capabilities;
use crate::constants::HUD_COOLDOWN;
use crate::display::{DisplaySink, StateToken};
use crate::host::HostApi;
use crate::logging::Throttle;
use crate::perception::{evaluate, EvaluationParams};

/// Process-wide verdict on the player's exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DetectionState {
    #[default]
    None,
    Hidden,
    Seen,
}

impl DetectionState {
    #[must_use]
    pub const fn token(self) -> StateToken {
        match self {
            Self::None => StateToken::None,
            Self::Hidden => StateToken::Hidden,
            Self::Seen => StateToken::Seen,
        }
    }
}

/// Outcome of one [`reconcile`] step.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub state: DetectionState,
    pub reference: Option<Reference>,
}

/// Derives the aggregate state.
///
/// Any seen agent wins. Otherwise a crouching player with a hidden candidate
/// inside `radius` is `Hidden`. Everything else is `None`.
#[must_use]
pub fn reconcile(crouching: bool, aggregate: &CacheAggregate, radius: f32) -> Reconciliation {
    if aggregate.seen_any {
        return Reconciliation {
            state: DetectionState::Seen,
            reference: aggregate.nearest_seen.clone(),
        };
    }
    if crouching && aggregate.hidden_any {
        if let Some(hidden) = aggregate
            .nearest_hidden
            .as_ref()
            .filter(|reference| reference.distance <= radius)
        {
            return Reconciliation {
                state: DetectionState::Hidden,
                reference: Some(hidden.clone()),
            };
        }
    }
    Reconciliation {
        state: DetectionState::None,
        reference: None,
    }
}

/// Everything one poll or event needs from the caller for a single tick.
pub struct Frame<'a, H: HostApi> {
    pub host: &'a H,
    pub capabilities: &'a Capabilities,
    pub player: &'a H::Player,
    pub params: EvaluationParams,
    /// Tick clock in seconds; must not run backwards.
    pub now: f64,
    /// When `false`, transitions still update the overlay but no textual
    /// report is forwarded.
    pub reports_enabled: bool,
}

/// Explicit owner of the cache, the current state and the report gate.
#[derive(Debug, Clone)]
pub struct DetectionContext {
    cache: ObservationCache,
    state: DetectionState,
    reports: Throttle,
}

impl Default for DetectionContext {
    fn default() -> Self {
        Self::new(HUD_COOLDOWN)
    }
}

impl DetectionContext {
    /// Creates a context in the `None` state whose reports are spaced at
    /// least `hud_cooldown` seconds apart.
    #[must_use]
    pub fn new(hud_cooldown: f64) -> Self {
        Self::with_cache(ObservationCache::new(), hud_cooldown)
    }

    #[must_use]
    pub fn with_cache(cache: ObservationCache, hud_cooldown: f64) -> Self {
        Self {
            cache,
            state: DetectionState::None,
            reports: Throttle::new(hud_cooldown),
        }
    }

    #[must_use]
    pub const fn current_state(&self) -> DetectionState {
        self.state
    }

    #[must_use]
    pub const fn cache(&self) -> &ObservationCache {
        &self.cache
    }

    /// Replaces the report spacing; the window already open is kept.
    pub fn set_hud_cooldown(&mut self, hud_cooldown: f64) {
        self.reports.set_interval(hud_cooldown);
    }

    /// Batch path: evaluates every agent in `agents`, then reconciles.
    pub fn process_poll<H: HostApi>(
        &mut self,
        frame: &Frame<'_, H>,
        agents: &[H::Agent],
        sink: &mut dyn DisplaySink,
    ) -> DetectionState {
        for agent in agents {
            self.cache.upsert(evaluate(
                frame.host,
                frame.capabilities,
                agent,
                frame.player,
                &frame.params,
                frame.now,
            ));
        }
        self.refresh(frame, sink)
    }

    /// Incremental path: evaluates one agent, then reconciles the whole cache.
    pub fn process_event<H: HostApi>(
        &mut self,
        frame: &Frame<'_, H>,
        agent: &H::Agent,
        sink: &mut dyn DisplaySink,
    ) -> DetectionState {
        self.cache.upsert(evaluate(
            frame.host,
            frame.capabilities,
            agent,
            frame.player,
            &frame.params,
            frame.now,
        ));
        self.refresh(frame, sink)
    }

    /// Forces `None`, empties the cache and pushes the `none` token
    /// unconditionally.
    pub fn reset(&mut self, sink: &mut dyn DisplaySink) {
        if self.state != DetectionState::None {
            info!("detection reset from {:?}", self.state);
        }
        self.state = DetectionState::None;
        self.cache.clear();
        sink.set_state(StateToken::None);
    }

    fn refresh<H: HostApi>(
        &mut self,
        frame: &Frame<'_, H>,
        sink: &mut dyn DisplaySink,
    ) -> DetectionState {
        let removed = self
            .cache
            .sweep(frame.now, |id| frame.host.is_agent_alive(id));
        if removed > 0 {
            debug!("swept {removed} stale observations");
        }
        let aggregate = self.cache.aggregate();
        let crouching = frame.capabilities.is_crouching(frame.host, frame.player);
        let outcome = reconcile(crouching, &aggregate, frame.params.detection_radius);
        if outcome.state != self.state {
            self.transition(outcome, aggregate.evaluated, frame, sink);
        }
        self.state
    }

    fn transition<H: HostApi>(
        &mut self,
        outcome: Reconciliation,
        evaluated: usize,
        frame: &Frame<'_, H>,
        sink: &mut dyn DisplaySink,
    ) {
        let previous = std::mem::replace(&mut self.state, outcome.state);
        match &outcome.reference {
            Some(reference) => info!(
                "detection {previous:?} -> {:?} ({evaluated} evaluated, nearest {} {} at {:.1}m)",
                outcome.state, reference.name, reference.agent, reference.distance
            ),
            None => info!(
                "detection {previous:?} -> {:?} ({evaluated} evaluated)",
                outcome.state
            ),
        }
        sink.set_state(outcome.state.token());

        let Some(reference) = outcome.reference else {
            return;
        };
        if !frame.reports_enabled {
            return;
        }
        if self.reports.ready(frame.now) {
            sink.report(
                &reference.name,
                outcome.state == DetectionState::Seen,
                reference.distance,
            );
        } else {
            debug!("report for {} suppressed by cooldown", reference.name);
        }
    }
}
