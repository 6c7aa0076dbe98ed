//! UI module that visualizes the simulation state using Bevy
//!
//! This module is purely for visualization - all simulation logic is in the `simulation` module.
//! The UI reads state from `SimWorld` and renders the junction in 2D.

mod components;
mod input;
mod sync;
mod world;

use bevy::prelude::*;

pub use components::{EntityMappings, SimWorldResource};

use components::{AlertFeed, SimControl};
use input::handle_input;
use sync::{sync_vehicles, tick_simulation, update_lamps, update_status_text};
use world::{setup_hud, setup_world};

/// Plugin to register all UI systems
pub struct JunctionUIPlugin;

impl Plugin for JunctionUIPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimWorldResource>()
            .init_resource::<EntityMappings>()
            .init_resource::<SimControl>()
            .init_resource::<AlertFeed>()
            .add_systems(Startup, (setup_world, setup_hud))
            .add_systems(FixedUpdate, tick_simulation)
            .add_systems(
                Update,
                (sync_vehicles, update_lamps, update_status_text, handle_input),
            );
    }
}
