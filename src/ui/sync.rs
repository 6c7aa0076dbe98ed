//! Systems for syncing Bevy entities with simulation state

use bevy::prelude::*;
use bevy::log::{error, info};
use std::collections::HashSet;

use super::components::{
    to_color, to_world, AgentLink, AlertFeed, EntityMappings, SignalLamp, SimControl, SimSynced,
    SimWorldResource, StatusText,
};
use crate::simulation::{kind_color, AgentId, Rgb};

/// System to run one simulation tick per fixed step
pub fn tick_simulation(
    control: Res<SimControl>,
    mut sim_world: ResMut<SimWorldResource>,
    mut feed: ResMut<AlertFeed>,
) {
    if control.paused {
        return;
    }
    let report = match sim_world.0.tick() {
        Ok(report) => report,
        Err(err) => {
            error!("Tick failed: {:#}", err);
            return;
        }
    };
    if let Some(update) = &report.update {
        let now = report.tick as f64 * sim_world.0.config().frame.tick_secs() as f64;
        let AlertFeed {
            announcer,
            state,
            last,
        } = &mut *feed;
        if let Some(announcement) = announcer.observe(state, update, now) {
            info!("ALERT: {}", announcement.phrase());
            *last = Some(announcement.phrase());
        }
    }
}

/// System to sync vehicle sprites from simulation state
pub fn sync_vehicles(
    mut commands: Commands,
    sim_world: Res<SimWorldResource>,
    mut mappings: ResMut<EntityMappings>,
    mut agent_query: Query<(Entity, &AgentLink, &mut Transform)>,
) {
    let world = &sim_world.0;
    let frame = &world.config().frame;

    // Update existing agents and track which ones still exist
    let mut existing: HashSet<AgentId> = HashSet::new();
    for (entity, link, mut transform) in agent_query.iter_mut() {
        if let Some(agent) = world.agent(link.0) {
            existing.insert(link.0);
            let center = agent.center();
            transform.translation = to_world(frame, center.x, center.y).extend(1.0);
        } else {
            // Agent no longer exists in simulation, despawn
            commands.entity(entity).despawn();
            mappings.agents.remove(&link.0);
        }
    }

    // Spawn new agents
    for agent in world.agents() {
        if existing.contains(&agent.id()) {
            continue;
        }
        let (width, height) = agent.size();
        let center = agent.center();
        let entity = commands
            .spawn((
                SimSynced,
                AgentLink(agent.id()),
                Sprite {
                    color: to_color(kind_color(agent.kind())),
                    custom_size: Some(Vec2::new(width, height)),
                    ..default()
                },
                Transform::from_translation(to_world(frame, center.x, center.y).extend(1.0)),
            ))
            .id();
        mappings.agents.insert(agent.id(), entity);
    }
}

/// System to color the signal lamps
pub fn update_lamps(sim_world: Res<SimWorldResource>, mut lamps: Query<(&SignalLamp, &mut Sprite)>) {
    let phase = sim_world.0.phase();
    for (lamp, mut sprite) in lamps.iter_mut() {
        let rgb = if phase.green == lamp.0 { Rgb::GREEN } else { Rgb::RED };
        sprite.color = to_color(rgb);
    }
}

/// System to update the status panel
pub fn update_status_text(
    sim_world: Res<SimWorldResource>,
    feed: Res<AlertFeed>,
    mut text_query: Query<(&StatusText, &mut Text)>,
) {
    let world = &sim_world.0;
    let phase = world.phase();
    for (line, mut text) in text_query.iter_mut() {
        match line {
            StatusText::Signal => {
                **text = format!("Signal: {} (green {:?})", phase.state, phase.green);
            }
            StatusText::Queues => {
                let counts = world.last_update().map(|u| u.counts).unwrap_or_default();
                **text = format!(
                    "H: {} | V: {} | Vehicles: {}",
                    counts.horizontal,
                    counts.vertical,
                    world.agents().len()
                );
            }
            StatusText::Congestion => {
                if let Some(update) = world.last_update() {
                    **text = format!("Congestion: {}", update.congestion());
                }
            }
            StatusText::Alert => {
                if let Some(last) = &feed.last {
                    **text = last.clone();
                }
            }
        }
    }
}
