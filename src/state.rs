// state.rs: lyric set classification and per-view state

use crate::lyrics::LyricLine;
use crate::playback::{NowPlayingItem, PlayerHandle, Ticks};

/// Whether a lyric set can be synced to playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LyricKind {
    /// Every line carries a start time.
    Dynamic,
    /// At least one line has no start time; displayed as plain text.
    Static,
}

/// Visual state of one rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    Past,
    Current,
    Future,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LyricSet {
    lines: Vec<LyricLine>,
    kind: LyricKind,
}

impl LyricSet {
    pub fn new(lines: Vec<LyricLine>) -> Self {
        let kind = classify(&lines);
        Self { lines, kind }
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == LyricKind::Dynamic
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn active_index(&self, time: Ticks) -> Option<usize> {
        active_line_index(time, &self.lines)
    }
}

pub fn classify(lines: &[LyricLine]) -> LyricKind {
    if !lines.is_empty() && lines.iter().all(|l| l.start.is_some()) {
        LyricKind::Dynamic
    } else {
        LyricKind::Static
    }
}

/// Index of the last line whose start is at or before `time`.
///
/// Found as "first line starting after `time`, minus one"; when every line
/// starts at or before `time` the last line is active. `None` means playback
/// is before every line. Lines without a start never match.
pub fn active_line_index(time: Ticks, lines: &[LyricLine]) -> Option<usize> {
    let first_after = lines
        .iter()
        .position(|l| l.start.is_some_and(|s| s > time))
        .unwrap_or(lines.len());
    first_after.checked_sub(1)
}

pub fn line_state(index: usize, active: Option<usize>) -> LineState {
    match active {
        Some(a) if index < a => LineState::Past,
        Some(a) if index == a => LineState::Current,
        _ => LineState::Future,
    }
}

/// State owned by one lyrics view instance, reset on every activation.
#[derive(Debug, Default)]
pub struct ViewState {
    pub current_player: Option<PlayerHandle>,
    pub current_item: Option<NowPlayingItem>,
    pub lyrics: Option<LyricSet>,
    /// Incremented on every load; fetch results from older loads are dropped.
    pub generation: u64,
    /// Highlight last pushed to the renderer: `Some(active)` once applied.
    pub applied: Option<Option<usize>>,
}

impl ViewState {
    /// Clear everything tied to the previous load and start a new generation.
    pub fn reset(&mut self) -> u64 {
        self.current_item = None;
        self.lyrics = None;
        self.applied = None;
        self.generation += 1;
        self.generation
    }

    pub fn is_dynamic(&self) -> bool {
        self.lyrics.as_ref().is_some_and(LyricSet::is_dynamic)
    }

    pub fn is_current_generation(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn set_lyrics(&mut self, lines: Vec<LyricLine>) -> &LyricSet {
        self.applied = None;
        self.lyrics.insert(LyricSet::new(lines))
    }

    /// Record a new highlight. Returns false when it is already applied.
    pub fn update_applied(&mut self, active: Option<usize>) -> bool {
        if self.applied == Some(active) {
            false
        } else {
            self.applied = Some(active);
            true
        }
    }
}
