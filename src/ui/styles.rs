use ratatui::style::{Color, Modifier, Style};

use crate::state::LineState;

pub struct LyricStyles {
    pub past: Style,
    pub current: Style,
    pub future: Style,
    /// Lines without timing data.
    pub plain: Style,
    pub selected: Style,
    pub title: Style,
}

impl LyricStyles {
    pub fn for_state(&self, state: Option<LineState>) -> Style {
        match state {
            Some(LineState::Past) => self.past,
            Some(LineState::Current) => self.current,
            Some(LineState::Future) => self.future,
            None => self.plain,
        }
    }
}

impl Default for LyricStyles {
    fn default() -> Self {
        Self {
            past: Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
            current: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            future: Style::default(),
            plain: Style::default(),
            selected: Style::default().add_modifier(Modifier::REVERSED),
            title: Style::default().add_modifier(Modifier::BOLD),
        }
    }
}
