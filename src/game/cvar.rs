//! Integer-valued runtime toggles read by the simulation every tick.

use rustc_hash::FxHashMap;

use crate::game::config::GameConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CVar {
    DrawPath,
    DrawNodeAxis,
    DrawNodeAxisId,
    DrawRaycasts,
    CameraSelect,
    CameraSelectId,
}

impl CVar {
    pub const ALL: [CVar; 6] = [
        CVar::DrawPath,
        CVar::DrawNodeAxis,
        CVar::DrawNodeAxisId,
        CVar::DrawRaycasts,
        CVar::CameraSelect,
        CVar::CameraSelectId,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CVar::DrawPath => "r_draw_path",
            CVar::DrawNodeAxis => "r_draw_node_axis",
            CVar::DrawNodeAxisId => "r_draw_node_axis_id",
            CVar::DrawRaycasts => "r_raycasts",
            CVar::CameraSelect => "r_camera",
            CVar::CameraSelectId => "r_camera_id",
        }
    }

    /// Value an unset cvar reads as. Id selectors default to "none".
    pub fn default_value(self) -> i32 {
        match self {
            CVar::DrawNodeAxisId | CVar::CameraSelectId => -1,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CVarStore {
    values: FxHashMap<CVar, i32>,
}

impl CVarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cvar: CVar) -> i32 {
        self.values.get(&cvar).copied().unwrap_or(cvar.default_value())
    }

    pub fn set(&mut self, cvar: CVar, value: i32) {
        self.values.insert(cvar, value);
    }

    pub fn enabled(&self, cvar: CVar) -> bool {
        self.get(cvar) != 0
    }

    /// Id selected by an id cvar, or `None` while it holds a negative value.
    pub fn selected_id(&self, cvar: CVar) -> Option<u32> {
        u32::try_from(self.get(cvar)).ok()
    }

    pub fn find(name: &str) -> Option<CVar> {
        CVar::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Mirror the debug toggles of a (re)loaded [`GameConfig`].
    pub fn apply(&mut self, config: &GameConfig) {
        self.set(CVar::DrawPath, config.draw_path as i32);
        self.set(CVar::DrawNodeAxis, config.draw_node_axis as i32);
        self.set(CVar::DrawNodeAxisId, config.draw_node_axis_id);
        self.set(CVar::DrawRaycasts, config.draw_raycasts as i32);
        self.set(CVar::CameraSelect, config.camera_select as i32);
        self.set(CVar::CameraSelectId, config.camera_select_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_cvars_read_defaults() {
        let store = CVarStore::new();
        assert_eq!(store.get(CVar::DrawPath), 0);
        assert_eq!(store.get(CVar::CameraSelectId), -1);
        assert_eq!(store.selected_id(CVar::DrawNodeAxisId), None);
    }

    #[test]
    fn test_apply_game_config() {
        let mut store = CVarStore::new();
        let config = GameConfig {
            draw_raycasts: true,
            camera_select: true,
            camera_select_id: 3,
            ..GameConfig::default()
        };
        store.apply(&config);

        assert!(store.enabled(CVar::DrawRaycasts));
        assert!(!store.enabled(CVar::DrawPath));
        assert_eq!(store.selected_id(CVar::CameraSelectId), Some(3));
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(CVarStore::find("r_draw_path"), Some(CVar::DrawPath));
        assert_eq!(CVarStore::find("nope"), None);
    }
}
