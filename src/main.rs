use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use clap::Parser;
use log::info;
use lurk::prelude::*;
use lurk::{init_logging, ConfigFile, Health};

/// Headless perception demo: a hostile walks past a wall towards a
/// crouching player.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// JSON perception config, reloaded while the demo runs
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of frames to simulate
    #[arg(long, default_value_t = 240)]
    frames: u32,
    /// Simulated frame length in milliseconds
    #[arg(long, default_value_t = 50)]
    frame_ms: u64,
}

/// Moves an agent towards `destination` at `speed` metres per second.
#[derive(Component, Debug, Clone, Copy)]
struct Walker {
    destination: Vec3,
    speed: f32,
}

fn spawn_scene(mut commands: Commands) {
    commands.spawn((
        Name::new("player"),
        TrackedPlayer,
        Crouching,
        Health(100),
        Transform::from_xyz(0.0, 0.0, 0.0),
    ));
    commands.spawn((
        Name::new("crate stack"),
        Occluder::new(Vec3::new(0.5, 2.0, 3.0)),
        Transform::from_xyz(6.0, 1.0, 0.0),
    ));
    commands.spawn((
        Name::new("walker"),
        Hostile,
        Health(40),
        Walker {
            destination: Vec3::new(2.0, 0.0, 0.0),
            speed: 2.0,
        },
        Transform::from_xyz(25.0, 0.0, 0.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
fn advance_walkers(time: Res<Time>, mut walkers: Query<(&Walker, &mut Transform)>) {
    let delta = time.delta_secs();
    for (walker, mut transform) in &mut walkers {
        let offset = walker.destination - transform.translation;
        let step = walker.speed * delta;
        if offset.length() <= step {
            transform.translation = walker.destination;
        } else {
            transform.translation += offset.normalize() * step;
        }
    }
}

/// Stands in for the host's per-agent update hook.
fn announce_agent_ticks(
    mut commands: Commands,
    moved: Query<Entity, (With<Hostile>, Changed<Transform>)>,
) {
    for agent in &moved {
        commands.trigger(AgentTicked { agent });
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let plugin = match &args.config {
        Some(path) => ConfigFile::open(path)
            .map(PerceptionPlugin::with_config_file)
            .with_context(|| format!("loading perception config {}", path.display()))?,
        None => PerceptionPlugin::default(),
    };

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
            args.frame_ms,
        )))
        .add_plugins(plugin)
        .add_systems(Startup, spawn_scene)
        .add_systems(Update, (advance_walkers, announce_agent_ticks).chain());

    let mut last = DetectionState::None;
    for frame in 0..args.frames {
        app.update();
        let state = app.world().resource::<Perception>().current_state();
        if state != last {
            info!("frame {frame}: {last:?} -> {state:?}");
            last = state;
        }
    }

    let overlay = app.world().resource::<DetectionOverlay>();
    info!(
        "final overlay token: {} ({} HUD messages queued)",
        overlay.token(),
        overlay.queued()
    );
    Ok(())
}
