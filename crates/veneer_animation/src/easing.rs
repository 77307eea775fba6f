//! Easing curves applied to raw ramp progress

use std::f64::consts::PI;

/// Progress at which [`Easing::CustomQuadratic`] starts to move
const QUADRATIC_KICKOFF: f64 = 0.6;

/// Easing curve mapping raw progress in `[0, 1]` to eased progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Easing {
    #[default]
    Linear,
    /// Sinusoidal ease in and out
    EaseInOut,
    /// Quadratic deceleration
    EaseOut,
    /// Holds at zero until 60% progress, then a cosine rise to one
    CustomQuadratic,
}

impl Easing {
    /// Apply the curve to raw progress; input is clamped to `[0, 1]`
    pub fn apply(self, progress: f64) -> f64 {
        let p = progress.clamp(0.0, 1.0);
        match self {
            Easing::Linear => p,
            Easing::EaseInOut => p - (2.0 * PI * p).sin() / (2.0 * PI),
            Easing::EaseOut => -p * (p - 2.0),
            Easing::CustomQuadratic => {
                let shifted = p.max(QUADRATIC_KICKOFF) - QUADRATIC_KICKOFF;
                1.0 - (shifted * PI / (2.0 - 2.0 * QUADRATIC_KICKOFF)).cos()
            }
        }
    }
}
