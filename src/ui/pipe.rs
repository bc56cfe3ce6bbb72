use std::io::{self, Write};

use crate::state::LineState;
use crate::ui::{LyricsRenderer, RenderedLine};

/// Pipe mode: writes each newly current line to stdout, for scripting.
///
/// Static lyrics are written once in full; messages are written as-is.
pub struct PipeRenderer<W: Write = io::Stdout> {
    out: W,
    lines: Vec<RenderedLine>,
    last_printed: Option<usize>,
}

impl PipeRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> PipeRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            lines: Vec::new(),
            last_printed: None,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, text: &str) {
        // A closed pipe is not worth tearing the view down for.
        if let Err(e) = writeln!(self.out, "{text}").and_then(|_| self.out.flush()) {
            tracing::debug!(error = %e, "pipe write failed");
        }
    }
}

impl<W: Write> LyricsRenderer for PipeRenderer<W> {
    fn render_lines(&mut self, lines: Vec<RenderedLine>) {
        self.last_printed = None;
        let synced = lines.iter().any(|l| l.seek_to.is_some());
        if !synced {
            for line in &lines {
                self.write_line(&line.text);
            }
        }
        self.lines = lines;
    }

    fn render_message(&mut self, message: &str) {
        self.lines.clear();
        self.last_printed = None;
        self.write_line(message);
    }

    fn set_line_state(&mut self, index: usize, state: LineState) {
        if state != LineState::Current || self.last_printed == Some(index) {
            return;
        }
        let Some(text) = self.lines.get(index).map(|l| l.text.clone()) else {
            return;
        };
        self.last_printed = Some(index);
        self.write_line(&text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(index: usize, text: &str, seek_to: Option<i64>) -> RenderedLine {
        RenderedLine {
            index,
            text: text.to_string(),
            seek_to,
        }
    }

    fn output(r: PipeRenderer<Vec<u8>>) -> String {
        String::from_utf8(r.into_inner()).unwrap()
    }

    #[test]
    fn prints_each_current_line_once() {
        let mut r = PipeRenderer::new(Vec::new());
        r.render_lines(vec![line(0, "first", Some(0)), line(1, "second", Some(10))]);
        r.set_line_state(0, LineState::Current);
        r.set_line_state(1, LineState::Future);
        r.set_line_state(0, LineState::Current);
        r.set_line_state(0, LineState::Past);
        r.set_line_state(1, LineState::Current);
        assert_eq!(output(r), "first\nsecond\n");
    }

    #[test]
    fn static_lyrics_print_in_full() {
        let mut r = PipeRenderer::new(Vec::new());
        r.render_lines(vec![line(0, "a", None), line(1, "b", None)]);
        assert_eq!(output(r), "a\nb\n");
    }

    #[test]
    fn messages_are_printed() {
        let mut r = PipeRenderer::new(Vec::new());
        r.render_message("No lyrics found");
        r.set_line_state(0, LineState::Current);
        assert_eq!(output(r), "No lyrics found\n");
    }
}
