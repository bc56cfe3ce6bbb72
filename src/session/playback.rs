//! Playback manager backed by a remote server session.
//!
//! The followed session is refreshed by polling (see `session::events`). Each
//! poll is diffed against the previous snapshot to produce the playback events
//! a local player would emit.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::{EventBus, PlaybackEvent, Source};
use crate::playback::{
    NowPlayingItem, PlaybackError, PlaybackManager, PlayerHandle, PlayerState,
    TICKS_PER_MILLISECOND, Ticks,
};
use crate::session::connection::{SessionClient, is_blocked};
use crate::session::metadata::SessionInfo;
use crate::timer::PlaybackTimer;

/// Position drift between estimate and report that counts as a seek.
pub const SEEK_THRESHOLD_MS: f64 = 2000.0;

#[derive(Debug, Default)]
struct Snapshot {
    player: Option<PlayerHandle>,
    item: Option<NowPlayingItem>,
    paused: bool,
    timer: PlaybackTimer,
}

pub struct RemotePlayback {
    client: SessionClient,
    bus: Arc<EventBus>,
    block_list: Vec<String>,
    snapshot: Mutex<Snapshot>,
}

impl RemotePlayback {
    pub fn new(client: SessionClient, bus: Arc<EventBus>, block_list: Vec<String>) -> Self {
        Self {
            client,
            bus,
            block_list,
            snapshot: Mutex::new(Snapshot::default()),
        }
    }

    #[cfg(test)]
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Pick the session to follow: the current one while it still plays
    /// something, otherwise the first unblocked session with a now playing item.
    fn select<'a>(&self, sessions: &'a [SessionInfo]) -> Option<&'a SessionInfo> {
        let candidates = || {
            sessions
                .iter()
                .filter(|s| s.is_playing_item() && !is_blocked(s, &self.block_list))
        };
        let current = self.snapshot.lock().player.as_ref().map(|p| p.id.clone());
        current
            .and_then(|id| candidates().find(|s| s.id == id))
            .or_else(|| candidates().next())
    }

    /// Fold one poll result into the snapshot and return the events it implies.
    pub fn apply_sessions(&self, sessions: &[SessionInfo]) -> Vec<(Source, PlaybackEvent)> {
        let selected = self.select(sessions);
        let mut events = Vec::new();
        let mut snap = self.snapshot.lock();

        let new_id = selected.map(|s| s.id.as_str());
        let old_id = snap.player.as_ref().map(|p| p.id.as_str());

        if new_id != old_id {
            match selected {
                Some(session) => {
                    snap.player = Some(session.handle());
                    snap.item = session.now_playing_item.clone();
                    snap.paused = session.paused();
                    snap.timer.set_position(session.position_ms());
                    tracing::info!(player = %session.handle().name, "following session");
                    events.push((Source::Manager, PlaybackEvent::PlayerChange));
                    events.push((
                        Source::Player(session.id.clone()),
                        PlaybackEvent::PlaybackStart {
                            state: session.player_state(),
                        },
                    ));
                }
                None => {
                    tracing::info!("no session is playing");
                    *snap = Snapshot::default();
                    events.push((Source::Manager, PlaybackEvent::PlayerChange));
                }
            }
            return events;
        }

        let Some(session) = selected else {
            return events;
        };
        let source = Source::Player(session.id.clone());
        let reported = session.position_ms();

        let new_item_id = session.now_playing_item.as_ref().map(|i| i.id.as_str());
        if snap.item.as_ref().map(|i| i.id.as_str()) != new_item_id {
            snap.item = session.now_playing_item.clone();
            snap.paused = session.paused();
            snap.timer.set_position(reported);
            events.push((
                source,
                PlaybackEvent::PlaybackStart {
                    state: session.player_state(),
                },
            ));
            return events;
        }

        let expected = snap.timer.estimate(!snap.paused);
        if (reported - expected).abs() > SEEK_THRESHOLD_MS {
            events.push((
                source.clone(),
                PlaybackEvent::Seek {
                    ticks: (reported * TICKS_PER_MILLISECOND as f64).round() as Ticks,
                },
            ));
        }
        snap.timer.set_position(reported);

        let paused = session.paused();
        if paused != snap.paused {
            snap.paused = paused;
            events.push((source, PlaybackEvent::Pause { paused }));
        }
        events
    }

    /// Poll the server once and publish the resulting events.
    pub async fn poll(&self) -> Result<(), crate::session::SessionError> {
        let sessions = self.client.list_sessions().await?;
        for (source, event) in self.apply_sessions(&sessions) {
            tracing::debug!(?source, event = event.name().as_str(), "emit");
            self.bus.emit(&source, &event);
        }
        Ok(())
    }

    /// Emit a `timeupdate` on the followed player while it is playing.
    pub fn tick(&self) {
        let source = {
            let snap = self.snapshot.lock();
            match &snap.player {
                Some(p) if !snap.paused => Source::Player(p.id.clone()),
                _ => return,
            }
        };
        self.bus.emit(&source, &PlaybackEvent::TimeUpdate);
    }

    fn session_id(&self) -> Result<String, PlaybackError> {
        self.snapshot
            .lock()
            .player
            .as_ref()
            .map(|p| p.id.clone())
            .ok_or(PlaybackError::NoPlayer)
    }
}

impl PlaybackManager for RemotePlayback {
    fn current_player(&self) -> Option<PlayerHandle> {
        self.snapshot.lock().player.clone()
    }

    fn player_state(&self, player: &PlayerHandle) -> Option<PlayerState> {
        let snap = self.snapshot.lock();
        match &snap.player {
            Some(p) if p.id == player.id => Some(PlayerState {
                now_playing_item: snap.item.clone(),
            }),
            _ => None,
        }
    }

    fn current_time(&self) -> Option<f64> {
        let snap = self.snapshot.lock();
        snap.player.as_ref()?;
        Some(snap.timer.estimate(!snap.paused))
    }

    fn paused(&self) -> bool {
        self.snapshot.lock().paused
    }

    fn seek(&self, ticks: Ticks) -> impl Future<Output = Result<(), PlaybackError>> + Send {
        async move {
            let session_id = self.session_id()?;
            self.client.seek(&session_id, ticks).await?;
            self.snapshot
                .lock()
                .timer
                .set_position(ticks as f64 / TICKS_PER_MILLISECOND as f64);
            self.bus
                .emit(&Source::Player(session_id), &PlaybackEvent::Seek { ticks });
            Ok(())
        }
    }

    fn play_pause(
        &self,
        player: &PlayerHandle,
    ) -> impl Future<Output = Result<(), PlaybackError>> + Send {
        let session_id = player.id.clone();
        async move {
            self.client.play_pause(&session_id).await?;
            let paused = {
                let mut snap = self.snapshot.lock();
                if snap.player.as_ref().is_some_and(|p| p.id == session_id) {
                    if snap.paused {
                        snap.timer.mark_playing();
                    } else {
                        snap.timer.mark_paused();
                    }
                    snap.paused = !snap.paused;
                    Some(snap.paused)
                } else {
                    None
                }
            };
            if let Some(paused) = paused {
                self.bus
                    .emit(&Source::Player(session_id), &PlaybackEvent::Pause { paused });
            }
            Ok(())
        }
    }
}
