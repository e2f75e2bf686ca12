use serde::{Deserialize, Serialize};

use crate::model::Position;

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub(super) struct AppSettings {
    /// Editor default placement, owned by the hosting configuration rather
    /// than the editor itself.
    pub default_x: f32,
    pub default_y: f32,
    pub default_size: f32,
    pub move_step: f32,
    pub move_step_fast: f32,
    pub record_path: String,
    pub qr_preview_text: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_x: 50.0,
            default_y: 50.0,
            default_size: 15.0,
            move_step: 1.0,
            move_step_fast: 5.0,
            record_path: "record.json".to_string(),
            qr_preview_text: "https://example.com/r/preview".to_string(),
        }
    }
}

impl AppSettings {
    pub fn default_position(&self) -> Position {
        Position::new(
            self.default_x,
            self.default_y,
            self.default_size,
            self.default_size,
        )
    }
}

pub(super) fn load_settings(path: &str) -> Option<AppSettings> {
    let s = std::fs::read_to_string(path).ok()?;
    if path.ends_with(".toml") {
        toml::from_str::<AppSettings>(&s)
            .ok()
            .or_else(|| serde_json::from_str::<AppSettings>(&s).ok())
    } else {
        serde_json::from_str::<AppSettings>(&s)
            .ok()
            .or_else(|| toml::from_str::<AppSettings>(&s).ok())
    }
}

pub(super) fn save_settings(path: &str, settings: &AppSettings) -> Result<(), String> {
    if path.ends_with(".toml") {
        let toml = toml::to_string_pretty(settings).map_err(|e| e.to_string())?;
        std::fs::write(path, toml).map_err(|e| e.to_string())
    } else {
        let json = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
        std::fs::write(path, json).map_err(|e| e.to_string())
    }
}
