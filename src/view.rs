//! Lyrics view controller.
//!
//! Owns the per-activation [`ViewState`], fetches lyrics for the item playing
//! on the current player and keeps the highlighted line in sync with playback.
//! All inputs arrive as [`ViewEvent`]s on one channel and are handled in order
//! by [`LyricsView::handle`].

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::event::{EventBus, EventName, Handler, PlaybackEvent, Source, Subscriptions};
use crate::lyrics::{LyricLine, LyricsApi, LyricsError};
use crate::playback::{NowPlayingItem, PlaybackManager, PlayerHandle, PlayerState, Ticks, ms_to_ticks};
use crate::state::{ViewState, line_state};
use crate::ui::{LyricsRenderer, RenderedLine, ViewShell};

pub const TITLE: &str = "Lyrics";
pub const NO_LYRICS_MESSAGE: &str = "No lyrics found";

/// Player events the view listens to while a player is bound.
pub const PLAYER_EVENTS: [EventName; 4] = [
    EventName::TimeUpdate,
    EventName::Seek,
    EventName::PlaybackStart,
    EventName::Pause,
];

#[derive(Debug)]
pub enum ViewEvent {
    /// Event from a player subscription, tagged with the player it came from.
    Player {
        player_id: String,
        event: PlaybackEvent,
    },
    /// The playback manager switched players.
    PlayerChange,
    LyricsLoaded {
        generation: u64,
        result: Result<Vec<LyricLine>, LyricsError>,
    },
    /// A rendered line with a click binding was activated.
    LineClicked { start: Ticks },
}

#[derive(thiserror::Error, Debug)]
pub enum ViewError {
    #[error("Player {player} has no now playing item")]
    NoNowPlayingItem { player: String },
}

pub struct LyricsView<P, A, R, S> {
    bus: Arc<EventBus>,
    playback: Arc<P>,
    api: Arc<A>,
    renderer: R,
    shell: S,
    events: mpsc::UnboundedSender<ViewEvent>,
    state: ViewState,
    manager_subs: Option<Subscriptions>,
    player_subs: Option<Subscriptions>,
    active: bool,
}

impl<P, A, R, S> LyricsView<P, A, R, S>
where
    P: PlaybackManager,
    A: LyricsApi,
    R: LyricsRenderer,
    S: ViewShell,
{
    pub fn new(
        bus: Arc<EventBus>,
        playback: Arc<P>,
        api: Arc<A>,
        renderer: R,
        shell: S,
        events: mpsc::UnboundedSender<ViewEvent>,
    ) -> Self {
        Self {
            bus,
            playback,
            api,
            renderer,
            shell,
            events,
            state: ViewState::default(),
            manager_subs: None,
            player_subs: None,
            active: false,
        }
    }

    #[cfg(test)]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut S {
        &mut self.shell
    }

    #[cfg(test)]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Activate the view: listen for player changes and load lyrics.
    pub fn show(&mut self) {
        self.active = true;
        if self.manager_subs.is_none() {
            let mut subs = Subscriptions::new(Arc::clone(&self.bus), Source::Manager);
            let tx = self.events.clone();
            subs.on(
                EventName::PlayerChange,
                Arc::new(move |_| {
                    let _ = tx.send(ViewEvent::PlayerChange);
                }),
            );
            self.manager_subs = Some(subs);
        }
        self.reload();
    }

    /// Deactivate the view and drop every subscription it holds.
    pub fn hide(&mut self) {
        self.active = false;
        if let Some(mut subs) = self.manager_subs.take() {
            subs.release();
        }
        self.release_player();
        self.state.reset();
    }

    pub async fn handle(&mut self, event: ViewEvent) {
        if !self.active {
            tracing::trace!(?event, "view inactive, dropping event");
            return;
        }
        match event {
            ViewEvent::Player { player_id, event } => {
                let bound = self.state.current_player.as_ref().map(|p| p.id.as_str());
                if bound != Some(player_id.as_str()) {
                    tracing::debug!(player = %player_id, "event from unbound player ignored");
                    return;
                }
                self.on_player_event(event);
            }
            ViewEvent::PlayerChange => {
                let player = self.playback.current_player();
                tracing::info!(player = ?player.as_ref().map(|p| &p.name), "player changed");
                self.bind_to_player(player.clone());
                // playbackstart from the new player can predate the binding
                if let Some(player) = player
                    && let Some(state) = self.playback.player_state(&player)
                {
                    self.on_playback_start(state);
                }
            }
            ViewEvent::LyricsLoaded { generation, result } => {
                if !self.state.is_current_generation(generation) {
                    tracing::debug!(generation, current = self.state.generation, "stale lyrics discarded");
                    return;
                }
                match result {
                    Ok(lines) if !lines.is_empty() => self.update_lyrics(lines),
                    Ok(_) => self.render_no_lyrics(&LyricsError::Empty),
                    Err(e) => self.render_no_lyrics(&e),
                }
            }
            ViewEvent::LineClicked { start } => {
                if self.state.is_dynamic() {
                    self.on_lyric_click(start).await;
                }
            }
        }
    }

    /// Run a load, sending the view home if activation fails.
    fn reload(&mut self) {
        if let Err(e) = self.on_load() {
            tracing::warn!(error = %e, "cannot display lyrics");
            self.release_player();
            self.shell.go_home();
        }
    }

    fn on_load(&mut self) -> Result<(), ViewError> {
        let generation = self.state.reset();
        self.shell.set_title(TITLE);

        let Some(player) = self.playback.current_player() else {
            tracing::info!("nothing is playing");
            self.bind_to_player(None);
            self.shell.go_home();
            return Ok(());
        };

        self.bind_to_player(Some(player.clone()));

        let item = self
            .playback
            .player_state(&player)
            .and_then(|s| s.now_playing_item)
            .ok_or_else(|| ViewError::NoNowPlayingItem {
                player: player.name.clone(),
            })?;
        self.state.current_item = Some(item.clone());
        self.fetch_lyrics(generation, item);
        Ok(())
    }

    fn fetch_lyrics(&self, generation: u64, item: NowPlayingItem) {
        tracing::debug!(generation, item = %item.id, server = %item.server_id, "fetching lyrics");
        let api = Arc::clone(&self.api);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = api.get_lyrics(&item.server_id, &item.id).await;
            let _ = tx.send(ViewEvent::LyricsLoaded { generation, result });
        });
    }

    fn update_lyrics(&mut self, lines: Vec<LyricLine>) {
        let set = self.state.set_lyrics(lines);
        let dynamic = set.is_dynamic();
        let rendered = set
            .lines()
            .iter()
            .enumerate()
            .map(|(index, line)| RenderedLine {
                index,
                text: line.text.clone(),
                seek_to: if dynamic { line.start } else { None },
            })
            .collect();
        tracing::info!(lines = set.len(), dynamic, "lyrics loaded");
        self.renderer.render_lines(rendered);

        if dynamic {
            self.sync_to(self.current_play_ticks());
        }
        let player = self.state.current_player.clone();
        self.bind_to_player(player);
    }

    fn render_no_lyrics(&mut self, err: &LyricsError) {
        tracing::info!(error = %err, "no lyrics");
        self.renderer.render_message(NO_LYRICS_MESSAGE);
    }

    fn current_play_ticks(&self) -> Ticks {
        ms_to_ticks(self.playback.current_time())
    }

    /// Reclassify every line against `ticks`. Dynamic lyrics only.
    fn sync_to(&mut self, ticks: Ticks) {
        let Some(set) = self.state.lyrics.as_ref().filter(|s| s.is_dynamic()) else {
            return;
        };
        let active = set.active_index(ticks);
        let len = set.len();
        if !self.state.update_applied(active) {
            return;
        }
        for index in 0..len {
            self.renderer.set_line_state(index, line_state(index, active));
        }
    }

    fn on_player_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::TimeUpdate => {
                let ticks = self.current_play_ticks();
                self.sync_to(ticks);
            }
            PlaybackEvent::Pause { paused } => {
                tracing::debug!(paused, "pause state changed");
                let ticks = self.current_play_ticks();
                self.sync_to(ticks);
            }
            PlaybackEvent::Seek { ticks } => self.sync_to(ticks),
            PlaybackEvent::PlaybackStart { state } => self.on_playback_start(state),
            PlaybackEvent::PlayerChange => {}
        }
    }

    fn on_playback_start(&mut self, state: PlayerState) {
        let tracked = self.state.current_item.as_ref().map(|i| i.id.as_str());
        let started = state.now_playing_item.as_ref().map(|i| i.id.as_str());
        if tracked != started {
            tracing::info!(from = ?tracked, to = ?started, "track changed, reloading");
            self.reload();
        }
    }

    async fn on_lyric_click(&mut self, start: Ticks) {
        if let Err(e) = self.playback.seek(start).await {
            tracing::warn!(error = %e, ticks = start, "seek failed");
        }
        if self.playback.paused()
            && let Some(player) = self.state.current_player.clone()
            && let Err(e) = self.playback.play_pause(&player).await
        {
            tracing::warn!(error = %e, "resume failed");
        }
    }

    /// Make `player` the bound player. Rebinding the same player is a no-op.
    fn bind_to_player(&mut self, player: Option<PlayerHandle>) {
        let already_bound = match (&player, &self.player_subs) {
            (Some(p), Some(subs)) => *subs.source() == Source::Player(p.id.clone()),
            _ => false,
        };
        if already_bound && self.state.current_player == player {
            return;
        }

        self.release_player();
        self.state.current_player = player.clone();

        let Some(player) = player else {
            return;
        };
        let mut subs = Subscriptions::new(Arc::clone(&self.bus), Source::Player(player.id.clone()));
        for name in PLAYER_EVENTS {
            subs.on(name, self.player_handler(&player.id));
        }
        tracing::debug!(
            player = %player.name,
            subscriptions = self.bus.subscription_count(subs.source()),
            "bound to player"
        );
        self.player_subs = Some(subs);
    }

    fn player_handler(&self, player_id: &str) -> Handler {
        let tx = self.events.clone();
        let player_id = player_id.to_string();
        Arc::new(move |event: &PlaybackEvent| {
            let _ = tx.send(ViewEvent::Player {
                player_id: player_id.clone(),
                event: event.clone(),
            });
        })
    }

    fn release_player(&mut self) {
        if let Some(mut subs) = self.player_subs.take() {
            subs.release();
        }
        self.state.current_player = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PlaybackError;
    use crate::state::LineState;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::future::{Future, ready};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Seek(Ticks),
        PlayPause(String),
    }

    #[derive(Default)]
    struct FakeInner {
        player: Option<PlayerHandle>,
        items: HashMap<String, NowPlayingItem>,
        time_ms: Option<f64>,
        paused: bool,
        calls: Vec<Call>,
    }

    #[derive(Default)]
    struct FakePlayback(Mutex<FakeInner>);

    impl FakePlayback {
        fn play(&self, player_id: &str, item_id: &str) {
            let mut inner = self.0.lock();
            inner.player = Some(handle(player_id));
            inner.items.insert(player_id.to_string(), item(item_id));
        }

        fn set_time_ticks(&self, ticks: Ticks) {
            self.0.lock().time_ms = Some(ticks as f64 / 10_000.0);
        }
    }

    impl PlaybackManager for FakePlayback {
        fn current_player(&self) -> Option<PlayerHandle> {
            self.0.lock().player.clone()
        }

        fn player_state(&self, player: &PlayerHandle) -> Option<PlayerState> {
            Some(PlayerState {
                now_playing_item: self.0.lock().items.get(&player.id).cloned(),
            })
        }

        fn current_time(&self) -> Option<f64> {
            self.0.lock().time_ms
        }

        fn paused(&self) -> bool {
            self.0.lock().paused
        }

        fn seek(&self, ticks: Ticks) -> impl Future<Output = Result<(), PlaybackError>> + Send {
            self.0.lock().calls.push(Call::Seek(ticks));
            ready(Ok(()))
        }

        fn play_pause(
            &self,
            player: &PlayerHandle,
        ) -> impl Future<Output = Result<(), PlaybackError>> + Send {
            let mut inner = self.0.lock();
            inner.calls.push(Call::PlayPause(player.id.clone()));
            inner.paused = !inner.paused;
            ready(Ok(()))
        }
    }

    #[derive(Default)]
    struct FakeApi {
        lyrics: Mutex<HashMap<String, Vec<LyricLine>>>,
        requests: Mutex<Vec<(String, String)>>,
    }

    impl LyricsApi for FakeApi {
        fn get_lyrics(
            &self,
            server_id: &str,
            item_id: &str,
        ) -> impl Future<Output = Result<Vec<LyricLine>, LyricsError>> + Send {
            self.requests
                .lock()
                .push((server_id.to_string(), item_id.to_string()));
            ready(self.lyrics.lock().get(item_id).cloned().ok_or(LyricsError::Empty))
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        lines: Vec<RenderedLine>,
        message: Option<String>,
        states: HashMap<usize, LineState>,
        state_writes: usize,
    }

    impl LyricsRenderer for RecordingRenderer {
        fn render_lines(&mut self, lines: Vec<RenderedLine>) {
            self.lines = lines;
            self.message = None;
            self.states.clear();
        }

        fn render_message(&mut self, message: &str) {
            self.lines.clear();
            self.states.clear();
            self.message = Some(message.to_string());
        }

        fn set_line_state(&mut self, index: usize, state: LineState) {
            self.state_writes += 1;
            self.states.insert(index, state);
        }
    }

    impl RecordingRenderer {
        fn states(&self) -> Vec<LineState> {
            (0..self.lines.len()).map(|i| self.states[&i]).collect()
        }
    }

    #[derive(Default)]
    struct FakeShell {
        title: String,
        home: usize,
    }

    impl ViewShell for FakeShell {
        fn set_title(&mut self, title: &str) {
            self.title = title.to_string();
        }

        fn go_home(&mut self) {
            self.home += 1;
        }
    }

    fn handle(id: &str) -> PlayerHandle {
        PlayerHandle {
            id: id.to_string(),
            name: format!("player {id}"),
        }
    }

    fn item(id: &str) -> NowPlayingItem {
        NowPlayingItem {
            id: id.to_string(),
            server_id: "srv".to_string(),
            name: None,
        }
    }

    fn timed(starts: &[Ticks]) -> Vec<LyricLine> {
        starts
            .iter()
            .map(|s| LyricLine::timed(format!("at {s}"), *s))
            .collect()
    }

    struct Harness {
        bus: Arc<EventBus>,
        playback: Arc<FakePlayback>,
        api: Arc<FakeApi>,
        rx: mpsc::UnboundedReceiver<ViewEvent>,
        view: LyricsView<FakePlayback, FakeApi, RecordingRenderer, FakeShell>,
    }

    impl Harness {
        fn new() -> Self {
            let bus = EventBus::new();
            let playback = Arc::new(FakePlayback::default());
            let api = Arc::new(FakeApi::default());
            let (tx, rx) = mpsc::unbounded_channel();
            let view = LyricsView::new(
                Arc::clone(&bus),
                Arc::clone(&playback),
                Arc::clone(&api),
                RecordingRenderer::default(),
                FakeShell::default(),
                tx,
            );
            Self {
                bus,
                playback,
                api,
                rx,
                view,
            }
        }

        fn with_lyrics(self, item_id: &str, lines: Vec<LyricLine>) -> Self {
            self.api.lyrics.lock().insert(item_id.to_string(), lines);
            self
        }

        async fn pump(&mut self) {
            let event = tokio::time::timeout(Duration::from_secs(1), self.rx.recv())
                .await
                .expect("timed out waiting for view event")
                .expect("channel closed");
            self.view.handle(event).await;
        }

        fn emit(&self, player_id: &str, event: PlaybackEvent) {
            self.bus.emit(&Source::Player(player_id.to_string()), &event);
        }

        fn renderer(&self) -> &RecordingRenderer {
            self.view.renderer()
        }

        fn calls(&self) -> Vec<Call> {
            self.playback.0.lock().calls.clone()
        }

        fn player_count(&self, player_id: &str) -> usize {
            self.bus.subscription_count(&Source::Player(player_id.to_string()))
        }
    }

    #[tokio::test]
    async fn no_player_goes_home_without_subscriptions() {
        let mut h = Harness::new();
        h.view.show();
        assert_eq!(h.view.shell().home, 1);
        assert_eq!(h.view.shell().title, TITLE);
        assert!(h.api.requests.lock().is_empty());
        assert!(h.view.state().current_player.is_none());
        assert_eq!(h.bus.subscription_count(&Source::Manager), 1);
    }

    #[tokio::test]
    async fn dynamic_lyrics_render_with_bindings_and_highlight() {
        let mut h = Harness::new().with_lyrics("i1", timed(&[0, 100, 200]));
        h.playback.play("a", "i1");
        h.playback.set_time_ticks(150);
        h.view.show();
        h.pump().await;

        assert_eq!(
            h.api.requests.lock().clone(),
            vec![("srv".to_string(), "i1".to_string())]
        );
        let r = h.renderer();
        assert_eq!(
            r.lines.iter().map(|l| l.seek_to).collect::<Vec<_>>(),
            vec![Some(0), Some(100), Some(200)]
        );
        assert_eq!(r.states(), vec![LineState::Past, LineState::Current, LineState::Future]);
        assert!(h.view.state().is_dynamic());
    }

    #[tokio::test]
    async fn time_before_first_line_marks_everything_future() {
        let mut h = Harness::new().with_lyrics("i1", timed(&[50, 100]));
        h.playback.play("a", "i1");
        h.playback.set_time_ticks(10);
        h.view.show();
        h.pump().await;
        assert_eq!(h.renderer().states(), vec![LineState::Future, LineState::Future]);
    }

    #[tokio::test]
    async fn timeupdate_and_seek_move_highlight() {
        let mut h = Harness::new().with_lyrics("i1", timed(&[0, 100, 200]));
        h.playback.play("a", "i1");
        h.view.show();
        h.pump().await;
        assert_eq!(h.renderer().states()[0], LineState::Current);

        h.playback.set_time_ticks(250);
        h.emit("a", PlaybackEvent::TimeUpdate);
        h.pump().await;
        assert_eq!(h.renderer().states(), vec![LineState::Past, LineState::Past, LineState::Current]);

        h.emit("a", PlaybackEvent::Seek { ticks: 120 });
        h.pump().await;
        assert_eq!(h.renderer().states(), vec![LineState::Past, LineState::Current, LineState::Future]);
    }

    #[tokio::test]
    async fn clicking_a_line_seeks_and_resumes_when_paused() {
        let mut h = Harness::new().with_lyrics("i1", timed(&[0, 100, 200]));
        h.playback.play("a", "i1");
        h.view.show();
        h.pump().await;

        h.view.handle(ViewEvent::LineClicked { start: 200 }).await;
        assert_eq!(h.calls(), vec![Call::Seek(200)]);

        h.playback.0.lock().paused = true;
        h.view.handle(ViewEvent::LineClicked { start: 100 }).await;
        assert_eq!(
            h.calls(),
            vec![Call::Seek(200), Call::Seek(100), Call::PlayPause("a".to_string())]
        );
    }

    #[tokio::test]
    async fn static_lyrics_have_no_bindings_and_never_update() {
        let lines = vec![LyricLine::plain("one"), LyricLine::timed("two", 10)];
        let mut h = Harness::new().with_lyrics("i1", lines);
        h.playback.play("a", "i1");
        h.view.show();
        h.pump().await;

        assert!(!h.view.state().is_dynamic());
        assert!(h.renderer().lines.iter().all(|l| l.seek_to.is_none()));
        assert_eq!(h.renderer().lines.len(), 2);

        h.playback.set_time_ticks(500);
        h.emit("a", PlaybackEvent::TimeUpdate);
        h.pump().await;
        h.emit("a", PlaybackEvent::Seek { ticks: 20 });
        h.pump().await;
        assert_eq!(h.renderer().state_writes, 0);

        h.view.handle(ViewEvent::LineClicked { start: 10 }).await;
        assert!(h.calls().is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_shows_message_and_keeps_player_bound() {
        let mut h = Harness::new();
        h.playback.play("a", "missing");
        h.view.show();
        h.pump().await;
        assert_eq!(h.renderer().message.as_deref(), Some(NO_LYRICS_MESSAGE));
        assert_eq!(h.player_count("a"), PLAYER_EVENTS.len());
    }

    #[tokio::test]
    async fn player_change_moves_all_subscriptions() {
        let mut h = Harness::new().with_lyrics("i1", timed(&[0]));
        h.playback.play("a", "i1");
        h.view.show();
        h.pump().await;
        assert_eq!(h.player_count("a"), 4);

        h.playback.play("b", "i1");
        h.bus.emit(&Source::Manager, &PlaybackEvent::PlayerChange);
        h.pump().await;

        assert_eq!(h.player_count("a"), 0);
        assert_eq!(h.player_count("b"), 4);
        let b = Source::Player("b".to_string());
        assert!(PLAYER_EVENTS.iter().all(|e| h.bus.is_subscribed(&b, *e)));
    }

    #[tokio::test]
    async fn player_change_to_none_only_unsubscribes() {
        let mut h = Harness::new();
        h.playback.play("a", "i1");
        h.view.show();
        h.playback.0.lock().player = None;
        h.bus.emit(&Source::Manager, &PlaybackEvent::PlayerChange);
        // the fetch result may arrive first
        while h.view.state().current_player.is_some() {
            h.pump().await;
        }
        assert_eq!(h.player_count("a"), 0);
    }

    #[tokio::test]
    async fn hide_releases_every_subscription() {
        let mut h = Harness::new().with_lyrics("i1", timed(&[0]));
        h.playback.play("a", "i1");
        h.view.show();
        h.pump().await;
        h.view.hide();
        assert_eq!(h.player_count("a"), 0);
        assert_eq!(h.bus.subscription_count(&Source::Manager), 0);
        assert!(!h.view.is_active());
    }

    #[tokio::test]
    async fn playback_start_of_new_item_reloads() {
        let mut h = Harness::new()
            .with_lyrics("i1", timed(&[0, 100]))
            .with_lyrics("i2", vec![LyricLine::plain("new song")]);
        h.playback.play("a", "i1");
        h.view.show();
        h.pump().await;

        h.emit(
            "a",
            PlaybackEvent::PlaybackStart {
                state: PlayerState {
                    now_playing_item: Some(item("i1")),
                },
            },
        );
        h.pump().await;
        assert_eq!(h.api.requests.lock().len(), 1);

        h.playback.play("a", "i2");
        h.emit(
            "a",
            PlaybackEvent::PlaybackStart {
                state: PlayerState {
                    now_playing_item: Some(item("i2")),
                },
            },
        );
        h.pump().await;
        assert!(h.view.state().lyrics.is_none());

        h.pump().await;
        assert_eq!(h.api.requests.lock().len(), 2);
        assert_eq!(h.renderer().lines[0].text, "new song");
        assert_eq!(h.view.state().current_item.as_ref().map(|i| i.id.as_str()), Some("i2"));
    }

    #[tokio::test]
    async fn stale_fetch_results_are_discarded() {
        let mut h = Harness::new()
            .with_lyrics("i1", timed(&[0, 100]))
            .with_lyrics("i2", vec![LyricLine::plain("new song")]);
        h.playback.play("a", "i1");
        h.view.show();
        // let the first fetch finish and queue its result
        while h.api.requests.lock().is_empty() {
            tokio::task::yield_now().await;
        }

        h.playback.play("a", "i2");
        h.view
            .handle(ViewEvent::Player {
                player_id: "a".to_string(),
                event: PlaybackEvent::PlaybackStart {
                    state: PlayerState {
                        now_playing_item: Some(item("i2")),
                    },
                },
            })
            .await;

        // result of the first load arrives after the reload
        h.pump().await;
        assert!(h.view.state().lyrics.is_none());
        assert!(h.renderer().lines.is_empty());

        h.pump().await;
        assert_eq!(h.renderer().lines.len(), 1);
        assert_eq!(h.renderer().lines[0].text, "new song");
        assert!(!h.view.state().is_dynamic());
    }

    #[tokio::test]
    async fn player_change_to_new_item_reloads_lyrics() {
        let mut h = Harness::new()
            .with_lyrics("i1", timed(&[0, 100]))
            .with_lyrics("i2", vec![LyricLine::plain("new song")]);
        h.playback.play("a", "i1");
        h.view.show();
        h.pump().await;

        h.playback.play("b", "i2");
        h.bus.emit(&Source::Manager, &PlaybackEvent::PlayerChange);
        // emitted before the view has bound to b, so nobody hears it
        h.emit(
            "b",
            PlaybackEvent::PlaybackStart {
                state: PlayerState {
                    now_playing_item: Some(item("i2")),
                },
            },
        );
        h.pump().await;
        h.pump().await;

        assert_eq!(
            h.api.requests.lock().clone(),
            vec![
                ("srv".to_string(), "i1".to_string()),
                ("srv".to_string(), "i2".to_string())
            ]
        );
        assert_eq!(h.view.state().current_item.as_ref().map(|i| i.id.as_str()), Some("i2"));
        assert_eq!(h.renderer().lines[0].text, "new song");
        assert_eq!(h.player_count("a"), 0);
        assert_eq!(h.player_count("b"), 4);
    }

    #[tokio::test]
    async fn player_returning_with_new_item_reloads_lyrics() {
        let mut h = Harness::new()
            .with_lyrics("i1", timed(&[0, 100]))
            .with_lyrics("i2", vec![LyricLine::plain("new song")]);
        h.playback.play("a", "i1");
        h.view.show();
        h.pump().await;

        h.playback.0.lock().player = None;
        h.bus.emit(&Source::Manager, &PlaybackEvent::PlayerChange);
        h.pump().await;
        assert!(h.view.state().current_player.is_none());
        assert_eq!(h.api.requests.lock().len(), 1);

        h.playback.play("b", "i2");
        h.bus.emit(&Source::Manager, &PlaybackEvent::PlayerChange);
        h.pump().await;
        h.pump().await;
        assert_eq!(h.api.requests.lock().len(), 2);
        assert_eq!(h.renderer().lines[0].text, "new song");
    }

    #[tokio::test]
    async fn events_from_previous_player_are_ignored() {
        let mut h = Harness::new().with_lyrics("i1", timed(&[0, 100]));
        h.playback.play("a", "i1");
        h.view.show();
        h.pump().await;
        let writes = h.renderer().state_writes;

        h.view
            .handle(ViewEvent::Player {
                player_id: "old".to_string(),
                event: PlaybackEvent::Seek { ticks: 150 },
            })
            .await;
        assert_eq!(h.renderer().state_writes, writes);
    }

    #[tokio::test]
    async fn activation_error_goes_home_and_releases_player() {
        let mut h = Harness::new();
        h.playback.0.lock().player = Some(handle("a"));
        h.view.show();
        assert_eq!(h.view.shell().home, 1);
        assert_eq!(h.player_count("a"), 0);
    }
}
