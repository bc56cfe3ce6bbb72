// app.rs: single-task event loop driving the lyrics view

use std::error::Error;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::event::{EventBus, EventName, Source, Subscriptions};
use crate::lyrics::ServerConnections;
use crate::playback::PlaybackManager;
use crate::session::RemotePlayback;
use crate::ui::modern::{self, InputAction, ModernRenderer};
use crate::ui::pipe::PipeRenderer;
use crate::ui::{LyricsRenderer, Route, RouterShell};
use crate::view::{LyricsView, ViewEvent};

pub const HOME_MESSAGE: &str = "Nothing is playing";

type BoxError = Box<dyn Error + Send + Sync>;

/// The lyrics page plus the "home" screen it falls back to.
///
/// While home, the app listens for player changes itself and re-opens the
/// lyrics page once a player is active again.
pub struct App<R> {
    bus: Arc<EventBus>,
    playback: Arc<RemotePlayback>,
    view: LyricsView<RemotePlayback, ServerConnections, R, RouterShell>,
    home_tx: mpsc::UnboundedSender<()>,
    home_subs: Option<Subscriptions>,
}

/// Receiving ends the app loop selects on.
pub struct AppChannels {
    view_rx: mpsc::UnboundedReceiver<ViewEvent>,
    home_rx: mpsc::UnboundedReceiver<()>,
}

impl<R: LyricsRenderer> App<R> {
    pub fn new(
        bus: Arc<EventBus>,
        playback: Arc<RemotePlayback>,
        api: Arc<ServerConnections>,
        renderer: R,
    ) -> (Self, AppChannels) {
        let (view_tx, view_rx) = mpsc::unbounded_channel();
        let (home_tx, home_rx) = mpsc::unbounded_channel();
        let view = LyricsView::new(
            Arc::clone(&bus),
            Arc::clone(&playback),
            api,
            renderer,
            RouterShell::new(),
            view_tx,
        );
        let app = Self {
            bus,
            playback,
            view,
            home_tx,
            home_subs: None,
        };
        (app, AppChannels { view_rx, home_rx })
    }

    pub fn start(&mut self) {
        self.view.show();
        self.check_navigation();
    }

    pub fn title(&self) -> &str {
        self.view.shell().title()
    }

    async fn on_view_event(&mut self, event: ViewEvent) {
        self.view.handle(event).await;
        self.check_navigation();
    }

    fn on_home_signal(&mut self) {
        if self.view.shell().route() != Route::Home || self.playback.current_player().is_none() {
            return;
        }
        tracing::info!("player available, opening lyrics");
        self.home_subs = None;
        self.view.shell_mut().navigate(Route::Lyrics);
        self.view.shell_mut().take_navigation();
        self.start();
    }

    fn check_navigation(&mut self) {
        if self.view.shell_mut().take_navigation() == Some(Route::Home) {
            self.go_home();
        }
    }

    fn go_home(&mut self) {
        self.view.hide();
        self.view.renderer_mut().render_message(HOME_MESSAGE);

        let mut subs = Subscriptions::new(Arc::clone(&self.bus), Source::Manager);
        let tx = self.home_tx.clone();
        subs.on(
            EventName::PlayerChange,
            Arc::new(move |_| {
                let _ = tx.send(());
            }),
        );
        self.home_subs = Some(subs);
    }

    fn shutdown(&mut self) {
        self.home_subs = None;
        self.view.hide();
    }
}

/// Pipe mode loop: runs until Ctrl-C.
pub async fn run_pipe(
    mut app: App<PipeRenderer>,
    mut channels: AppChannels,
) -> Result<(), BoxError> {
    app.start();
    loop {
        tokio::select! {
            Some(event) = channels.view_rx.recv() => app.on_view_event(event).await,
            Some(()) = channels.home_rx.recv() => app.on_home_signal(),
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    app.shutdown();
    Ok(())
}

/// Full-screen loop: runs until the user quits.
pub async fn run_modern(
    mut app: App<ModernRenderer>,
    mut channels: AppChannels,
) -> Result<(), BoxError> {
    let mut terminal = modern::enter_terminal()?;
    let (input_tx, mut input_rx) = mpsc::channel(32);
    modern::spawn_input_thread(input_tx);

    app.start();
    let result: Result<(), BoxError> = loop {
        let title = app.title().to_string();
        if let Err(e) = app.view.renderer_mut().draw(&mut terminal, &title) {
            break Err(e.into());
        }
        tokio::select! {
            Some(event) = channels.view_rx.recv() => app.on_view_event(event).await,
            Some(()) = channels.home_rx.recv() => app.on_home_signal(),
            input = input_rx.recv() => {
                let Some(input) = input else { break Ok(()) };
                match modern::map_key(&input) {
                    Some(InputAction::Quit) => break Ok(()),
                    Some(InputAction::Up) => app.view.renderer_mut().select_prev(),
                    Some(InputAction::Down) => app.view.renderer_mut().select_next(),
                    Some(InputAction::Activate) => {
                        if let Some(start) = app.view.renderer_mut().activate_selected() {
                            app.on_view_event(ViewEvent::LineClicked { start }).await;
                        }
                    }
                    None => {
                        if matches!(input, crossterm::event::Event::Resize(..)) {
                            if let Err(e) = terminal.clear() {
                                break Err(e.into());
                            }
                            app.view.renderer_mut().mark_dirty();
                        }
                    }
                }
            }
        }
    };

    app.shutdown();
    modern::leave_terminal(&mut terminal)?;
    result
}
