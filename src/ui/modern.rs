//! Full-screen terminal renderer.
//!
//! Lines are kept in a small model and drawn on demand: the app loop calls
//! [`ModernRenderer::draw`] after each handled event, and only redraws when
//! the model changed. Past lines are dimmed, the current line is highlighted
//! and the view scrolls to keep it (or the selection cursor) centered.

use std::io::{self, Stdout};
use std::thread;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Layout};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc;

use crate::playback::Ticks;
use crate::state::LineState;
use crate::ui::styles::LyricStyles;
use crate::ui::{LyricsRenderer, RenderedLine};

/// Key actions understood by the lyrics screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    Up,
    Down,
    Activate,
}

pub fn map_key(event: &Event) -> Option<InputAction> {
    let Event::Key(key) = event else {
        return None;
    };
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(InputAction::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(InputAction::Quit)
        }
        KeyCode::Up | KeyCode::Char('k') => Some(InputAction::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(InputAction::Down),
        KeyCode::Enter => Some(InputAction::Activate),
        _ => None,
    }
}

#[derive(Default)]
pub struct ModernRenderer {
    lines: Vec<RenderedLine>,
    states: Vec<Option<LineState>>,
    message: Option<String>,
    selected: Option<usize>,
    dirty: bool,
    styles: LyricStyles,
}

impl ModernRenderer {
    pub fn new() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[cfg(test)]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select_next(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        let next = match self.selected {
            Some(i) => (i + 1).min(self.lines.len() - 1),
            None => self.current_index().unwrap_or(0),
        };
        self.selected = Some(next);
        self.dirty = true;
    }

    pub fn select_prev(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        let prev = match self.selected {
            Some(i) => i.saturating_sub(1),
            None => self.current_index().unwrap_or(0),
        };
        self.selected = Some(prev);
        self.dirty = true;
    }

    /// Click the selected line. Returns its seek target when it has one.
    pub fn activate_selected(&mut self) -> Option<Ticks> {
        let index = self.selected.take()?;
        self.dirty = true;
        self.lines.get(index).and_then(|l| l.seek_to)
    }

    fn current_index(&self) -> Option<usize> {
        self.states
            .iter()
            .position(|s| *s == Some(LineState::Current))
    }

    /// Wrapped, styled rows for a `width` x `height` area, centered on the
    /// selection or the current line.
    pub fn visible_rows(&self, width: usize, height: usize) -> Vec<Line<'static>> {
        if height == 0 {
            return Vec::new();
        }
        let width = width.max(1);
        if let Some(msg) = &self.message {
            return textwrap::wrap(msg, width)
                .into_iter()
                .map(|row| Line::from(Span::styled(row.into_owned(), self.styles.current)))
                .collect();
        }

        let focus = self.selected.or_else(|| self.current_index());
        let mut rows = Vec::new();
        let mut focus_row = 0;
        for line in &self.lines {
            let state = self.states.get(line.index).copied().flatten();
            let mut style = self.styles.for_state(state);
            if self.selected == Some(line.index) {
                style = style.patch(self.styles.selected);
            }
            if focus == Some(line.index) {
                focus_row = rows.len();
            }
            let wrapped = textwrap::wrap(&line.text, width);
            if wrapped.is_empty() {
                rows.push(Line::from(""));
            }
            for row in wrapped {
                rows.push(Line::from(Span::styled(row.into_owned(), style)));
            }
        }

        let start = if focus.is_some() {
            focus_row
                .saturating_sub(height / 2)
                .min(rows.len().saturating_sub(height))
        } else {
            0
        };
        rows.into_iter().skip(start).take(height).collect()
    }

    /// Redraw if anything changed since the last draw.
    pub fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>, title: &str) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        terminal.draw(|f| {
            let [header, body] =
                Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(f.area());
            f.render_widget(
                Paragraph::new(Line::from(Span::styled(title.to_string(), self.styles.title)))
                    .alignment(Alignment::Center),
                header,
            );

            let rows = self.visible_rows(body.width as usize, body.height as usize);
            let top_padding = (body.height as usize).saturating_sub(rows.len()) / 2;
            let mut area = body;
            area.y += top_padding as u16;
            area.height = (rows.len() as u16).min(body.height);
            f.render_widget(Paragraph::new(rows).alignment(Alignment::Center), area);
        })?;
        self.dirty = false;
        Ok(())
    }
}

impl LyricsRenderer for ModernRenderer {
    fn render_lines(&mut self, lines: Vec<RenderedLine>) {
        self.states = vec![None; lines.len()];
        self.lines = lines;
        self.message = None;
        self.selected = None;
        self.dirty = true;
    }

    fn render_message(&mut self, message: &str) {
        self.lines.clear();
        self.states.clear();
        self.selected = None;
        self.message = Some(message.to_string());
        self.dirty = true;
    }

    fn set_line_state(&mut self, index: usize, state: LineState) {
        if let Some(slot) = self.states.get_mut(index)
            && *slot != Some(state)
        {
            *slot = Some(state);
            self.dirty = true;
        }
    }
}

pub type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

pub fn enter_terminal() -> io::Result<CrosstermTerminal> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

pub fn leave_terminal(terminal: &mut CrosstermTerminal) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Poll crossterm on a dedicated OS thread and forward events to the async side.
/// The thread exits once the receiver is dropped.
pub fn spawn_input_thread(tx: mpsc::Sender<Event>) {
    thread::spawn(move || {
        loop {
            match crossterm::event::poll(Duration::from_millis(100)) {
                Ok(true) => {
                    if let Ok(ev) = crossterm::event::read()
                        && tx.blocking_send(ev).is_err()
                    {
                        break;
                    }
                }
                Ok(false) => {
                    if tx.is_closed() {
                        break;
                    }
                }
                Err(_) => thread::sleep(Duration::from_millis(100)),
            }
        }
    });
}
