use bevy::prelude::*;
use spacegame_macros::profile;

use super::{SimTick, Simulation};
use crate::game::config::{GameConfig, GameConfigHandle, InitialConfig};

// ============================================================================
// Startup
// ============================================================================

/// Size the fixed timestep and build the world from [`InitialConfig`].
pub fn setup_simulation(
    mut commands: Commands,
    mut fixed_time: ResMut<Time<Fixed>>,
    initial_config: Option<Res<InitialConfig>>,
) {
    let config = match initial_config {
        Some(cfg) => cfg.clone(),
        None => {
            warn!("[CONFIG] InitialConfig not found, using defaults");
            InitialConfig::default()
        }
    };

    fixed_time.set_timestep_seconds(1.0 / config.tick_rate);

    match Simulation::new(config) {
        Ok(sim) => commands.insert_resource(sim),
        Err(e) => error!("[WORLD] Failed to build the world: {}", e),
    }
}

// ============================================================================
// Fixed tick
// ============================================================================

/// Advance the simulation by one fixed timestep.
///
/// World errors here are bookkeeping bugs, not gameplay situations, so the
/// tick loop stops.
#[profile(16)]
pub fn tick_simulation(
    sim: Option<ResMut<Simulation>>,
    mut tick: ResMut<SimTick>,
    time: Res<Time<Fixed>>,
) {
    let Some(mut sim) = sim else {
        return;
    };
    let dt = time.timestep().as_secs_f32();

    if let Err(e) = sim.update(dt) {
        error!("[WORLD] Tick {} failed: {}", tick.0, e);
        panic!("simulation tick {} failed: {}", tick.0, e);
    }
    tick.0 += 1;

    use crate::profile_log;
    profile_log!(
        tick,
        "[SIM STATUS] Tick: {} | Ships: {} | Asteroids: {} | Draw commands: {}",
        tick.0,
        sim.world.ships().len(),
        sim.world.asteroids().len(),
        sim.render.commands().len()
    );
}

// ============================================================================
// Runtime config
// ============================================================================

/// Mirror every (re)load of the runtime config into the cvar store.
pub fn apply_game_config(
    config_handle: Option<Res<GameConfigHandle>>,
    game_configs: Res<Assets<GameConfig>>,
    mut events: MessageReader<AssetEvent<GameConfig>>,
    sim: Option<ResMut<Simulation>>,
) {
    let (Some(handle), Some(mut sim)) = (config_handle, sim) else {
        return;
    };
    for event in events.read() {
        if event.is_modified(handle.0.id()) || event.is_loaded_with_dependencies(handle.0.id()) {
            if let Some(config) = game_configs.get(&handle.0) {
                sim.cvars.apply(config);
                info!("[CONFIG] Runtime config applied (debug toggles updated)");
            }
        }
    }
}
