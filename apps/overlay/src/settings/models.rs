use serde::{Deserialize, Serialize};

use crate::display::time::RoundingMode;
use crate::display::timer::TimerName;
use crate::layout::FontFamily;

pub const DEFAULT_WEBSOCKET_PATH: &str = "ws://localhost:4001/ws";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextShadow {
    pub enabled: bool,
    pub offset_x: i32,
    pub offset_y: i32,
    pub blur_radius: u32,
    pub color: String,
}

impl Default for TextShadow {
    fn default() -> Self {
        Self {
            enabled: false,
            offset_x: 2,
            offset_y: 2,
            blur_radius: 4,
            color: "#000000".to_string(),
        }
    }
}

/// Timer page settings. Field names are the query-string paths
/// (`showHours`, `textShadow.color`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    pub show_hours: bool,
    pub websocket_path: String,
    pub text_shadow: TextShadow,
    pub selected_timer: TimerName,
    pub rounding_mode: RoundingMode,
    pub font_family: FontFamily,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            show_hours: true,
            websocket_path: DEFAULT_WEBSOCKET_PATH.to_string(),
            text_shadow: TextShadow::default(),
            selected_timer: TimerName::Main,
            rounding_mode: RoundingMode::Ceil,
            font_family: FontFamily::Inter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSettings {
    /// Draws the design reference background behind the card.
    pub bg: bool,
    pub websocket_path: String,
}

impl Default for CardSettings {
    fn default() -> Self {
        Self {
            bg: false,
            websocket_path: DEFAULT_WEBSOCKET_PATH.to_string(),
        }
    }
}
