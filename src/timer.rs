use std::time::Instant;

/// Estimates playback position between session polls.
///
/// Positions are in milliseconds.
#[derive(Debug, PartialEq, Default)]
pub struct PlaybackTimer {
    /// Last observed position (finite, >= 0).
    anchor_position: f64,
    /// Monotonic instant corresponding to `anchor_position` while playing.
    anchor_instant: Option<Instant>,
}

impl PlaybackTimer {
    /// Re-anchor to an observed position. Caller decides whether the clock runs.
    pub fn set_position(&mut self, position: f64) {
        self.anchor_position = sanitize_position(position);
        self.anchor_instant = Some(Instant::now());
    }

    pub fn mark_playing(&mut self) {
        self.anchor_instant = Some(Instant::now());
    }

    /// Freeze the estimate at the current position.
    pub fn mark_paused(&mut self) {
        self.anchor_position = self.estimate(true);
        self.anchor_instant = None;
    }

    pub fn estimate(&self, playing: bool) -> f64 {
        let base = self.anchor_position;
        if !playing {
            return base;
        }
        match self.anchor_instant {
            Some(inst) => {
                let val = base + inst.elapsed().as_secs_f64() * 1000.0;
                if val.is_finite() { val } else { base }
            }
            None => base,
        }
    }
}

pub fn sanitize_position(p: f64) -> f64 {
    if !p.is_finite() || p < 0.0 { 0.0 } else { p }
}
