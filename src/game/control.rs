use bevy::prelude::*;

use crate::game::config::{GameConfig, GameConfigHandle};
use crate::game::ecs::ShipInput;
use crate::game::simulation::Simulation;

/// Keyboard to player-ship input.
pub struct ControlPlugin;

impl Plugin for ControlPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, handle_ship_input);
    }
}

fn handle_ship_input(
    keys: Res<ButtonInput<KeyCode>>,
    config_handle: Option<Res<GameConfigHandle>>,
    game_configs: Res<Assets<GameConfig>>,
    sim: Option<ResMut<Simulation>>,
) {
    let Some(mut sim) = sim else { return };

    let fallback = GameConfig::default();
    let config = config_handle
        .and_then(|handle| game_configs.get(&handle.0))
        .unwrap_or(&fallback);

    sim.player_input = read_ship_input(&keys, config);
}

/// Sample the bound keys. Nose-up pitch and left yaw are negative/positive
/// the same way the AI stick is: toward a target above gives negative pitch,
/// toward a target on the local +X side gives positive yaw.
pub fn read_ship_input(keys: &ButtonInput<KeyCode>, config: &GameConfig) -> ShipInput {
    let axis = |negative: KeyCode, positive: KeyCode| {
        let mut value = 0.0;
        if keys.pressed(negative) {
            value -= 1.0;
        }
        if keys.pressed(positive) {
            value += 1.0;
        }
        value
    };

    ShipInput {
        thrust: keys.pressed(config.key_thrust),
        boost: keys.pressed(config.key_boost),
        pitch: axis(config.key_pitch_up, config.key_pitch_down),
        yaw: axis(config.key_yaw_right, config.key_yaw_left),
        roll: axis(config.key_roll_left, config.key_roll_right),
        fire: keys.pressed(config.key_fire),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keys_means_neutral_input() {
        let keys = ButtonInput::<KeyCode>::default();
        assert_eq!(read_ship_input(&keys, &GameConfig::default()), ShipInput::default());
    }

    #[test]
    fn test_bound_keys_map_to_axes() {
        let config = GameConfig::default();
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(config.key_thrust);
        keys.press(config.key_pitch_up);
        keys.press(config.key_yaw_left);
        keys.press(config.key_fire);

        let input = read_ship_input(&keys, &config);
        assert!(input.thrust && input.fire);
        assert!(!input.boost);
        assert_eq!(input.pitch, -1.0, "Pitch up noses toward +Y");
        assert_eq!(input.yaw, 1.0, "Yaw left swings toward local +X");
        assert_eq!(input.roll, 0.0);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let config = GameConfig::default();
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(config.key_roll_left);
        keys.press(config.key_roll_right);
        assert_eq!(read_ship_input(&keys, &config).roll, 0.0);
    }
}
