use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;
use serde::{Deserialize, Serialize};

pub const INITIAL_CONFIG_PATH: &str = "assets/initial_config.ron";

/// Static configuration read once when the plugin is built. Changing these
/// values requires a restart (grid layout, population, seed).
#[derive(Resource, Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct InitialConfig {
    pub tick_rate: f64,
    pub rng_seed: u64,

    // Navigation lattice
    pub grid_side: u32,
    pub grid_spacing: f32,
    pub grid_origin: Vec3,

    // Population
    pub asteroid_count: usize,
    pub asteroid_spread: f32,
    /// Bounding radius handed to the physics stand-in for every asteroid mesh.
    pub asteroid_radius: f32,
    pub enemy_count: usize,
    pub enemy_spawn_spread: f32,

    pub ai: AiTuning,
}

/// Behaviour constants for enemy pilots. Distances are world units unless
/// the field name says squared.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AiTuning {
    pub detection_radius: f32,
    pub attack_radius: f32,
    pub firing_range: f32,
    pub flee_radius: f32,
    /// A waypoint counts as reached inside this squared distance.
    pub arrival_threshold_sq: f32,
    /// Time spent at a reached waypoint before moving on.
    pub arrival_delay: f32,
    /// Beyond this squared distance a roaming ship accelerates to full speed.
    pub slow_down_distance_sq: f32,
    /// Probability that a detection turns into a chase rather than a flight.
    pub chase_probability: f64,

    pub projectile_speed: f32,
    pub hit_radius: f32,
    pub max_projectile_travel: f32,
    /// Hull probes are only cast when an asteroid centre is this close.
    pub asteroid_probe_radius: f32,

    pub roam_speed: f32,
    pub chase_speed: f32,
    pub flee_speed: f32,
    /// Radians per second at full stick.
    pub roam_turn_rate: f32,
    pub chase_turn_rate: f32,
    pub flee_turn_rate: f32,

    pub movement_scale: f32,
    pub roll_clamp: f32,
    pub smoothing: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            detection_radius: 30.0,
            attack_radius: 50.0,
            firing_range: 30.0,
            flee_radius: 80.0,
            arrival_threshold_sq: 40.0,
            arrival_delay: 0.05,
            slow_down_distance_sq: 100.0,
            chase_probability: 0.7,

            projectile_speed: 500.0,
            hit_radius: 2.0,
            max_projectile_travel: 5000.0,
            asteroid_probe_radius: 8.0,

            roam_speed: 1.0,
            chase_speed: 1.5,
            flee_speed: 2.0,
            roam_turn_rate: 1.8,
            chase_turn_rate: 3.0,
            flee_turn_rate: 2.4,

            movement_scale: 10.0,
            roll_clamp: 45.0,
            smoothing: 10.0,
        }
    }
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            rng_seed: 0x5EED,
            grid_side: 10,
            grid_spacing: 20.0,
            grid_origin: Vec3::splat(-100.0),
            asteroid_count: 40,
            asteroid_spread: 100.0,
            asteroid_radius: 4.0,
            enemy_count: 8,
            enemy_spawn_spread: 60.0,
            ai: AiTuning::default(),
        }
    }
}

/// Runtime configuration that can be hot-reloaded during play: key bindings
/// and debug toggles. Toggles are mirrored into the simulation's cvar store.
#[derive(Deserialize, Serialize, Asset, TypePath, Clone, Debug)]
#[serde(default)]
pub struct GameConfig {
    // Controls
    pub key_thrust: KeyCode,
    pub key_boost: KeyCode,
    pub key_pitch_up: KeyCode,
    pub key_pitch_down: KeyCode,
    pub key_yaw_left: KeyCode,
    pub key_yaw_right: KeyCode,
    pub key_roll_left: KeyCode,
    pub key_roll_right: KeyCode,
    pub key_fire: KeyCode,

    // Debug visualization
    pub draw_path: bool,
    pub draw_node_axis: bool,
    /// Node to label when drawing axes; negative draws every node.
    pub draw_node_axis_id: i32,
    pub draw_raycasts: bool,
    pub camera_select: bool,
    pub camera_select_id: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            key_thrust: KeyCode::KeyW,
            key_boost: KeyCode::ShiftLeft,
            key_pitch_up: KeyCode::ArrowUp,
            key_pitch_down: KeyCode::ArrowDown,
            key_yaw_left: KeyCode::ArrowLeft,
            key_yaw_right: KeyCode::ArrowRight,
            key_roll_left: KeyCode::KeyA,
            key_roll_right: KeyCode::KeyD,
            key_fire: KeyCode::Space,
            draw_path: false,
            draw_node_axis: false,
            draw_node_axis_id: -1,
            draw_raycasts: false,
            camera_select: false,
            camera_select_id: -1,
        }
    }
}

#[derive(Resource)]
pub struct GameConfigHandle(pub Handle<GameConfig>);

pub struct GameConfigPlugin;

impl Plugin for GameConfigPlugin {
    fn build(&self, app: &mut App) {
        // Everything downstream sizes itself from InitialConfig, so it has to
        // exist before the first Startup system runs.
        app.insert_resource(load_initial_config(INITIAL_CONFIG_PATH))
            .add_plugins(RonAssetPlugin::<GameConfig>::new(&["game_config.ron"]))
            .add_systems(Startup, setup_runtime_config);
    }
}

/// Read and parse an [`InitialConfig`], falling back to defaults on any failure.
pub fn load_initial_config(path: &str) -> InitialConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match ron::from_str::<InitialConfig>(&contents) {
            Ok(config) => {
                info!("[CONFIG] Loaded initial config from {}", path);
                config
            }
            Err(e) => {
                error!("[CONFIG] Failed to parse {}: {}", path, e);
                error!("[CONFIG] Using default InitialConfig");
                InitialConfig::default()
            }
        },
        Err(e) => {
            error!("[CONFIG] Failed to read {}: {}", path, e);
            error!("[CONFIG] Using default InitialConfig");
            InitialConfig::default()
        }
    }
}

/// Start the hot-reloadable runtime config load.
fn setup_runtime_config(mut commands: Commands, asset_server: Res<AssetServer>) {
    let handle = asset_server.load("game_config.ron");
    commands.insert_resource(GameConfigHandle(handle));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_initial_config("assets/does_not_exist.ron");
        assert_eq!(config.grid_side, InitialConfig::default().grid_side);
        assert_eq!(config.ai, AiTuning::default());
    }

    #[test]
    fn test_partial_ron_keeps_defaults_for_missing_fields() {
        let config: InitialConfig = ron::from_str("(grid_side: 4, ai: (flee_radius: 12.0))").unwrap();
        assert_eq!(config.grid_side, 4);
        assert_eq!(config.ai.flee_radius, 12.0);
        assert_eq!(config.ai.detection_radius, 30.0, "Unspecified tuning keeps its default");
        assert_eq!(config.enemy_count, InitialConfig::default().enemy_count);
    }

    #[test]
    fn test_shipped_initial_config_parses() {
        let contents = std::fs::read_to_string(INITIAL_CONFIG_PATH).unwrap();
        let config: InitialConfig = ron::from_str(&contents).unwrap();
        assert!(config.grid_side > 1);
        assert!(config.tick_rate > 0.0);
    }

    #[test]
    fn test_shipped_game_config_parses() {
        let contents = std::fs::read_to_string("assets/game_config.ron").unwrap();
        let config: GameConfig = ron::from_str(&contents).unwrap();
        assert_eq!(config.key_fire, KeyCode::Space);
    }
}
