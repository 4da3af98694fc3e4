//! Double-tap confirmation.
//!
//! A pick only counts when the same sprite is tapped twice within the
//! configured window. A stray single tap while panning never costs a strike.

#[derive(Clone, Debug)]
pub struct DoubleTap {
    window_ms: f64,
    last: Option<(usize, f64)>,
}

impl DoubleTap {
    pub fn new(window_ms: f64) -> Self {
        Self { window_ms, last: None }
    }

    /// Record a tap on `sprite` at `now_ms`; returns true when it completes a
    /// double tap. A completed double tap resets the detector so a third tap
    /// starts over.
    pub fn tap(&mut self, sprite: usize, now_ms: f64) -> bool {
        if let Some((prev, at)) = self.last {
            let dt = now_ms - at;
            if prev == sprite && (0.0..=self.window_ms).contains(&dt) {
                self.last = None;
                return true;
            }
        }
        self.last = Some((sprite, now_ms));
        false
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
