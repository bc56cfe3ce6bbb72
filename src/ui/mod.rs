//! Rendering and navigation contracts, plus the terminal and pipe renderers.

pub mod modern;
pub mod pipe;
pub mod shell;
pub mod styles;

use crate::playback::Ticks;
use crate::state::LineState;

pub use shell::{Route, RouterShell};

/// One line element handed to a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub index: usize,
    pub text: String,
    /// Click binding: the position to seek to when the line is activated.
    /// Only set for time-synced lyrics.
    pub seek_to: Option<Ticks>,
}

/// Container the lyrics view draws into.
pub trait LyricsRenderer {
    /// Replace the container content with `lines`.
    fn render_lines(&mut self, lines: Vec<RenderedLine>);

    /// Replace the container content with a single message.
    fn render_message(&mut self, message: &str);

    /// Set the visual state of the line at `index`. Unknown indexes are ignored.
    fn set_line_state(&mut self, index: usize, state: LineState);
}

/// Page shell around the view: title bar and navigation.
pub trait ViewShell {
    fn set_title(&mut self, title: &str);

    fn go_home(&mut self);
}
