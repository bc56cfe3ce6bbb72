//! Session payloads returned by `/Sessions`.

use serde::Deserialize;

use crate::playback::{NowPlayingItem, PlayerHandle, PlayerState, TICKS_PER_MILLISECOND, Ticks};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayStateInfo {
    #[serde(default)]
    pub position_ticks: Option<Ticks>,
    #[serde(default)]
    pub is_paused: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionInfo {
    pub id: String,
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub now_playing_item: Option<NowPlayingItem>,
    #[serde(default)]
    pub play_state: Option<PlayStateInfo>,
}

impl SessionInfo {
    pub fn handle(&self) -> PlayerHandle {
        let name = match (self.device_name.is_empty(), self.client.is_empty()) {
            (false, false) => format!("{} ({})", self.device_name, self.client),
            (false, true) => self.device_name.clone(),
            (true, false) => self.client.clone(),
            (true, true) => self.id.clone(),
        };
        PlayerHandle {
            id: self.id.clone(),
            name,
        }
    }

    pub fn is_playing_item(&self) -> bool {
        self.now_playing_item.is_some()
    }

    pub fn player_state(&self) -> PlayerState {
        PlayerState {
            now_playing_item: self.now_playing_item.clone(),
        }
    }

    pub fn paused(&self) -> bool {
        self.play_state.as_ref().is_some_and(|p| p.is_paused)
    }

    /// Reported position in milliseconds.
    pub fn position_ms(&self) -> f64 {
        self.play_state
            .as_ref()
            .and_then(|p| p.position_ticks)
            .map(|t| t as f64 / TICKS_PER_MILLISECOND as f64)
            .unwrap_or(0.0)
    }
}
