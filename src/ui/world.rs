//! World setup systems for camera, roads, lamps and the HUD

use bevy::prelude::*;

use super::components::{to_world, MainCamera, SignalLamp, SimWorldResource, StatusText};
use crate::simulation::{Axis, Direction};

const GRASS: Color = Color::srgb(0.16, 0.35, 0.16);
const ASPHALT: Color = Color::srgb(0.25, 0.25, 0.25);
const STOP_LINE: Color = Color::srgb(0.9, 0.9, 0.9);

/// Spawn a flat rectangle given in frame coordinates
fn spawn_rect(commands: &mut Commands, sim: &SimWorldResource, rect: Rect, color: Color, z: f32) {
    let frame = &sim.0.config().frame;
    let center = to_world(frame, rect.center().x, rect.center().y);
    commands.spawn((
        Sprite {
            color,
            custom_size: Some(rect.size()),
            ..default()
        },
        Transform::from_translation(center.extend(z)),
    ));
}

/// System to setup the camera, the two roads and their stop lines
pub fn setup_world(mut commands: Commands, sim_world: Res<SimWorldResource>) {
    commands.spawn((MainCamera, Camera2d));

    let config = sim_world.0.config();
    let (width, height) = (config.frame.width, config.frame.height);
    let road = config.road.clone();

    spawn_rect(&mut commands, &sim_world, Rect::new(0.0, 0.0, width, height), GRASS, 0.0);
    spawn_rect(
        &mut commands,
        &sim_world,
        Rect::new(0.0, road.horizontal_top, width, road.horizontal_bottom),
        ASPHALT,
        0.1,
    );
    spawn_rect(
        &mut commands,
        &sim_world,
        Rect::new(road.vertical_left, 0.0, road.vertical_right, height),
        ASPHALT,
        0.1,
    );

    // Stop lines on the approach side of each lane
    let mid_x = (road.vertical_left + road.vertical_right) / 2.0;
    let mid_y = (road.horizontal_top + road.horizontal_bottom) / 2.0;
    for direction in Direction::ALL {
        let line = road.stop_line(direction);
        let rect = match direction {
            Direction::Right => Rect::new(line - 2.0, mid_y, line + 2.0, road.horizontal_bottom),
            Direction::Left => Rect::new(line - 2.0, road.horizontal_top, line + 2.0, mid_y),
            Direction::Down => Rect::new(road.vertical_left, line - 2.0, mid_x, line + 2.0),
            Direction::Up => Rect::new(mid_x, line - 2.0, road.vertical_right, line + 2.0),
        };
        spawn_rect(&mut commands, &sim_world, rect, STOP_LINE, 0.2);
    }

    // One lamp per road, at the top-left corner of the junction
    let lamps = [
        (Axis::Horizontal, road.vertical_left - 40.0, road.horizontal_top - 40.0),
        (Axis::Vertical, road.vertical_left - 70.0, road.horizontal_top - 40.0),
    ];
    for (axis, x, y) in lamps {
        commands.spawn((
            SignalLamp(axis),
            Sprite {
                color: Color::srgb(1.0, 0.0, 0.0),
                custom_size: Some(Vec2::splat(20.0)),
                ..default()
            },
            Transform::from_translation(to_world(&config.frame, x, y).extend(0.3)),
        ));
    }
}

/// System to setup the status panel
pub fn setup_hud(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Auto,
                height: Val::Auto,
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                left: Val::Px(10.0),
                padding: UiRect::all(Val::Px(10.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(5.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
        ))
        .with_children(|parent| {
            let lines = [
                (StatusText::Signal, "Signal: -", 18.0, Color::srgb(0.2, 1.0, 0.2)),
                (StatusText::Queues, "H: 0 | V: 0", 14.0, Color::srgb(0.9, 0.9, 0.9)),
                (StatusText::Congestion, "Congestion: Low", 14.0, Color::srgb(0.9, 0.9, 0.9)),
                (StatusText::Alert, "", 14.0, Color::srgb(1.0, 1.0, 0.5)),
            ];
            for (marker, text, size, color) in lines {
                parent.spawn((
                    Text::new(text),
                    TextFont {
                        font_size: size,
                        ..default()
                    },
                    TextColor(color),
                    marker,
                ));
            }
        });
}
