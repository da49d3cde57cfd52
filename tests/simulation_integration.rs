use bevy::prelude::*;
use spacegame::game::config::{GameConfig, GameConfigHandle, InitialConfig};
use spacegame::game::cvar::CVar;
use spacegame::game::ecs::{
    AiControllerComponent, AiState, EntityKey, EntityType, PathStateComponent, TransformComponent,
};
use spacegame::game::simulation::{SimTick, Simulation};
use spacegame::game::GamePlugin;

const DT: f32 = 1.0 / 60.0;

fn quiet_config(seed: u64) -> InitialConfig {
    InitialConfig {
        rng_seed: seed,
        grid_side: 3,
        grid_spacing: 20.0,
        grid_origin: Vec3::splat(-20.0),
        asteroid_count: 0,
        enemy_count: 0,
        ..InitialConfig::default()
    }
}

fn state_of(sim: &Simulation, key: EntityKey) -> AiState {
    sim.world.component::<AiControllerComponent>(key).unwrap().state
}

#[test]
fn test_detection_always_leaves_roaming() {
    for seed in 0..12 {
        let mut sim = Simulation::new(quiet_config(seed)).unwrap();
        let scout = sim.world.create_enemy_ship(Vec3::new(300.0, 0.0, 0.0), false).unwrap();
        sim.world.create_enemy_ship(Vec3::new(300.0, 0.0, 20.0), false).unwrap();

        sim.update(DT).unwrap();

        assert_ne!(state_of(&sim, scout), AiState::Roaming, "seed {}: detection must pick chase or flee", seed);
        let path = sim.world.component::<PathStateComponent>(scout).unwrap();
        assert!(path.path.is_empty());
        assert!(!path.has_reached_start_node);
    }
}

#[test]
fn test_fleeing_ship_gives_up_beyond_flee_radius() {
    let mut sim = Simulation::new(quiet_config(1)).unwrap();
    let runner = sim.world.create_enemy_ship(Vec3::new(300.0, 0.0, 0.0), false).unwrap();
    let threat = sim.world.create_enemy_ship(Vec3::new(300.0, 0.0, 100.0), false).unwrap();
    {
        let controller = sim.world.component_mut::<AiControllerComponent>(runner).unwrap();
        controller.state = AiState::Fleeing;
        controller.target = Some(threat);
    }

    sim.update(DT).unwrap();

    assert_eq!(state_of(&sim, runner), AiState::Roaming);
}

#[test]
fn test_population_is_stable_over_many_ticks() {
    let config = InitialConfig {
        asteroid_count: 30,
        asteroid_spread: 60.0,
        enemy_count: 12,
        enemy_spawn_spread: 40.0,
        ..quiet_config(42)
    };
    let mut sim = Simulation::new(config).unwrap();
    let mut ids: Vec<u32> = enemy_ids(&sim);

    for _ in 0..600 {
        sim.update(DT).unwrap();
        for ship in sim.world.ships() {
            let position = sim.world.component::<TransformComponent>(*ship).unwrap().position;
            assert!(position.is_finite(), "Ship pose must stay finite");
        }
    }

    let stats = sim.world.stats();
    assert_eq!(stats.player_ships, 1);
    assert_eq!(stats.enemy_ships, 12, "Every destroyed ship is respawned");
    assert_eq!(stats.asteroids, 30);
    let mut after = enemy_ids(&sim);
    ids.sort_unstable();
    after.sort_unstable();
    assert_eq!(ids, after, "Respawns keep the original ids");
}

fn enemy_ids(sim: &Simulation) -> Vec<u32> {
    sim.world
        .ships()
        .iter()
        .filter_map(|k| sim.world.entity(*k))
        .filter(|e| e.kind == EntityType::EnemyShip)
        .map(|e| e.id)
        .collect()
}

// ============================================================================
// Headless app
// ============================================================================

fn headless_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(AssetPlugin::default());
    app.add_plugins(GamePlugin);
    // Startup: builds the Simulation and starts the runtime config load.
    app.update();
    app
}

#[test]
fn test_app_builds_world_from_initial_config() {
    let mut app = headless_app();

    let expected = app.world().resource::<InitialConfig>().clone();
    let sim = app.world().get_resource::<Simulation>().expect("Simulation inserted at startup");
    let stats = sim.world.stats();
    assert_eq!(stats.enemy_ships, expected.enemy_count);
    assert_eq!(stats.asteroids, expected.asteroid_count);
    assert_eq!(stats.nodes as u32, expected.grid_side.pow(3));

    let timestep = app.world().resource::<Time<Fixed>>().timestep().as_secs_f64();
    assert!((timestep - 1.0 / expected.tick_rate).abs() < 1e-6);
}

#[test]
fn test_fixed_update_advances_tick() {
    let mut app = headless_app();
    let start = app.world().resource::<SimTick>().0;

    for _ in 0..10 {
        app.world_mut().run_schedule(FixedUpdate);
    }

    assert_eq!(app.world().resource::<SimTick>().0, start + 10);
    let sim = app.world().resource::<Simulation>();
    assert!(sim.render.camera_view().is_some(), "Each tick ends with a camera view");
}

#[test]
fn test_runtime_config_changes_reach_cvars() {
    let mut app = headless_app();

    // Wait for game_config.ron to load.
    let handle = app.world().resource::<GameConfigHandle>().0.clone();
    for _ in 0..200 {
        app.update();
        if app.world().resource::<Assets<GameConfig>>().contains(&handle) {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert!(
        app.world().resource::<Assets<GameConfig>>().contains(&handle),
        "game_config.ron should load"
    );

    if let Some(config) = app.world_mut().resource_mut::<Assets<GameConfig>>().get_mut(&handle) {
        config.draw_path = true;
        config.camera_select_id = 3;
    }
    app.update();
    app.update();

    let sim = app.world().resource::<Simulation>();
    assert!(sim.cvars.enabled(CVar::DrawPath));
    assert_eq!(sim.cvars.get(CVar::CameraSelectId), 3);
}
