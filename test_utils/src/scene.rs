//! Headless Bevy scenes for plugin tests.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use lurk::components::{Crouching, Health, Hostile, Occluder, TrackedPlayer};
use lurk::config::PerceptionConfig;
use lurk::plugin::PerceptionPlugin;

/// Simulated frame length used by [`perception_app`].
pub const FRAME: Duration = Duration::from_millis(100);

/// App with minimal plugins, a fixed 100 ms clock and the perception plugin.
#[must_use]
pub fn perception_app(config: PerceptionConfig) -> App {
    app_with(PerceptionPlugin::new(config))
}

/// Same as [`perception_app`] for an arbitrary plugin configuration.
#[must_use]
pub fn app_with(plugin: PerceptionPlugin) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
        .add_plugins(plugin);
    app
}

pub fn spawn_player(app: &mut App, position: Vec3, crouched: bool) -> Entity {
    let mut player = app.world_mut().spawn((
        Name::new("player"),
        TrackedPlayer,
        Health(100),
        Transform::from_translation(position),
    ));
    if crouched {
        player.insert(Crouching);
    }
    player.id()
}

/// Hostile agent facing `look_at`.
pub fn spawn_hostile(app: &mut App, name: &str, position: Vec3, look_at: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Name::new(name.to_owned()),
            Hostile,
            Health(40),
            Transform::from_translation(position).looking_at(look_at, Vec3::Y),
        ))
        .id()
}

pub fn spawn_wall(app: &mut App, center: Vec3, half_extents: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Occluder::new(half_extents),
            Transform::from_translation(center),
        ))
        .id()
}

/// Runs `frames` updates.
pub fn advance(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}
