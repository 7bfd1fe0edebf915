/// Periodic animation curve: a sinusoid mapped into `[0, 1]`.
///
/// Smooth, bounded, repeating, and a pure function of elapsed time, so the
/// animated value at time T is identical no matter how many frames were
/// rendered to get there.
#[inline]
pub fn pulse(t: f32) -> f32 {
    0.5 + 0.5 * t.sin()
}

/// Per-frame derived state. Recomputed every iteration from the frame
/// clock's elapsed time; it has no identity across frames.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameState {
    /// Seconds since the render loop's clock started.
    pub elapsed: f32,

    /// `pulse(elapsed)`, precomputed for uniform animators.
    pub pulse: f32,
}

impl FrameState {
    pub fn at(elapsed: f32) -> Self {
        Self {
            elapsed,
            pulse: pulse(elapsed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── pulse ─────────────────────────────────────────────────────────────

    #[test]
    fn pulse_starts_at_midpoint() {
        assert_eq!(pulse(0.0), 0.5);
    }

    #[test]
    fn pulse_peaks_a_quarter_period_in() {
        assert!((pulse(std::f32::consts::FRAC_PI_2) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn pulse_stays_bounded() {
        let mut t = -20.0f32;
        while t < 20.0 {
            let v = pulse(t);
            assert!((0.0..=1.0).contains(&v), "pulse({t}) = {v} out of range");
            t += 0.37;
        }
    }

    #[test]
    fn pulse_depends_only_on_elapsed_time() {
        // Same T, same value; frame count between samples is irrelevant.
        let t = 3.125;
        assert_eq!(pulse(t), pulse(t));
        assert_eq!(FrameState::at(t), FrameState::at(t));
    }

    // ── frame state ───────────────────────────────────────────────────────

    #[test]
    fn frame_state_precomputes_pulse() {
        let fs = FrameState::at(1.5);
        assert_eq!(fs.pulse, pulse(1.5));
    }
}
