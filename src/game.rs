use bevy::prelude::*;

pub mod ai;
pub mod config;
pub mod control;
pub mod cvar;
pub mod debug_draw;
pub mod ecs;
pub mod error;
pub mod external;
pub mod flight;
pub mod memory;
pub mod navigation;
pub mod simulation;
pub mod world;

use config::GameConfigPlugin;
use simulation::SimulationPlugin;

/// Headless game core: configuration plus the fixed-tick simulation.
///
/// Input and drawing are separate plugins so tests can run the core without
/// a window.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((GameConfigPlugin, SimulationPlugin));
    }
}
