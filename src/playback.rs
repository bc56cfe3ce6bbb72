//! Playback collaborator contract used by the lyrics view.
//!
//! Positions are expressed in ticks (100 ns units) except for
//! [`PlaybackManager::current_time`], which reports milliseconds.

use serde::Deserialize;
use std::future::Future;

/// Playback position unit shared by the server and lyric start times.
pub type Ticks = i64;

pub const TICKS_PER_MILLISECOND: i64 = 10_000;

/// Convert a millisecond playback time into ticks. A missing time counts as 0.
pub fn ms_to_ticks(ms: Option<f64>) -> Ticks {
    match ms {
        Some(ms) if ms.is_finite() => (ms * TICKS_PER_MILLISECOND as f64).round() as Ticks,
        _ => 0,
    }
}

/// Opaque handle identifying one player.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerHandle {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NowPlayingItem {
    pub id: String,
    pub server_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Snapshot of what a player is doing, as reported by the playback manager.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerState {
    pub now_playing_item: Option<NowPlayingItem>,
}

#[derive(thiserror::Error, Debug)]
pub enum PlaybackError {
    #[error("Session error: {0}")]
    Session(#[from] crate::session::SessionError),
    #[error("No player is active")]
    NoPlayer,
}

pub trait PlaybackManager: Send + Sync + 'static {
    fn current_player(&self) -> Option<PlayerHandle>;

    fn player_state(&self, player: &PlayerHandle) -> Option<PlayerState>;

    /// Current playback time in milliseconds, if known.
    fn current_time(&self) -> Option<f64>;

    fn paused(&self) -> bool;

    fn seek(&self, ticks: Ticks) -> impl Future<Output = Result<(), PlaybackError>> + Send;

    fn play_pause(
        &self,
        player: &PlayerHandle,
    ) -> impl Future<Output = Result<(), PlaybackError>> + Send;
}
