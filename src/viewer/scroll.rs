//! Vertical scroll state with smoothing
//!
//! `target` is where input wants the page to be, `position` is what gets
//! drawn. Both stay within `[0, max]` where `max` is how far the page
//! extends past the bottom of the viewport.

/// Scroll position and target in surface pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Scroll {
    /// Offset currently drawn
    pub position: f32,
    /// Offset `position` is moving toward
    pub target: f32,
}

impl Scroll {
    /// Remaining distance below which `position` snaps onto `target`
    const SNAP_DISTANCE: f32 = 0.01;

    /// Largest valid offset for a surface of `surface_height` in a viewport
    /// of `viewport_height`
    #[must_use]
    pub fn max_offset(surface_height: f32, viewport_height: f32) -> f32 {
        (surface_height - viewport_height).max(0.0)
    }

    /// Move the target by `delta`, then clamp it to `[0, max]`
    pub fn nudge(&mut self, delta: f32, max: f32) {
        if delta.is_finite() {
            self.target += delta;
        }
        self.target = self.target.clamp(0.0, max.max(0.0));
    }

    /// Put the target back at the top, leaving `position` to follow
    pub fn reset_target(&mut self) {
        self.target = 0.0;
    }

    /// Jump both position and target to the top
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Clamp both position and target to `[0, max]`
    pub fn clamp_to(&mut self, max: f32) {
        let max = max.max(0.0);
        self.target = self.target.clamp(0.0, max);
        self.position = self.position.clamp(0.0, max);
    }

    /// Advance `position` toward `target`.
    ///
    /// The remaining distance shrinks by `exp(-rate * dt)` per step, so the
    /// motion is frame-rate independent and never overshoots.
    pub fn settle(&mut self, rate: f32, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let remaining = self.target - self.position;
        if remaining.abs() < Self::SNAP_DISTANCE {
            self.position = self.target;
            return;
        }
        let blend = 1.0 - (-rate * dt).exp();
        let next = self.position + remaining * blend;
        // Rounding must not carry the position past the target
        self.position = if remaining > 0.0 {
            next.min(self.target)
        } else {
            next.max(self.target)
        };
    }

    /// Whether `position` has reached `target`
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.position == self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_offset_is_zero_for_short_pages() {
        assert_eq!(Scroll::max_offset(300.0, 1200.0), 0.0);
        assert_eq!(Scroll::max_offset(1500.0, 1200.0), 300.0);
    }

    #[test]
    fn nudge_clamps_both_ends() {
        let mut scroll = Scroll::default();
        scroll.nudge(-50.0, 100.0);
        assert_eq!(scroll.target, 0.0);
        scroll.nudge(80.0, 100.0);
        assert_eq!(scroll.target, 80.0);
        scroll.nudge(80.0, 100.0);
        assert_eq!(scroll.target, 100.0);
    }

    #[test]
    fn nudge_ignores_non_finite_delta() {
        let mut scroll = Scroll {
            position: 0.0,
            target: 40.0,
        };
        scroll.nudge(f32::NAN, 100.0);
        assert_eq!(scroll.target, 40.0);
    }

    #[test]
    fn settle_converges_without_overshoot() {
        let mut scroll = Scroll {
            position: 0.0,
            target: 500.0,
        };
        let mut last = scroll.position;
        for _ in 0..600 {
            scroll.settle(15.0, 1.0 / 60.0);
            assert!(scroll.position >= last);
            assert!(scroll.position <= 500.0);
            last = scroll.position;
        }
        assert!(scroll.is_settled());
    }

    #[test]
    fn settle_with_huge_frame_time_lands_on_target() {
        let mut scroll = Scroll {
            position: 10.0,
            target: 200.0,
        };
        scroll.settle(15.0, 10.0);
        assert!((scroll.position - 200.0).abs() < 0.01);
    }

    #[test]
    fn settle_halves_distance_on_characteristic_timescale() {
        let rate = 15.0;
        let half_life = std::f32::consts::LN_2 / rate;
        let mut scroll = Scroll {
            position: 0.0,
            target: 100.0,
        };
        scroll.settle(rate, half_life);
        assert!((scroll.position - 50.0).abs() < 0.01);
    }

    #[test]
    fn clamp_to_pulls_back_position_and_target() {
        let mut scroll = Scroll {
            position: 250.0,
            target: 300.0,
        };
        scroll.clamp_to(120.0);
        assert_eq!(scroll.position, 120.0);
        assert_eq!(scroll.target, 120.0);
    }
}
