//! A single progress ramp owned by an animation manager

use veneer_core::{Color, Point, Rect};

/// Direction a ramp is travelling
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RampDirection {
    /// 0 towards 1, retires at 1
    #[default]
    In,
    /// 1 towards 0, retires at 0
    Out,
    /// Rising half of an in-then-out ramp; flips to `InOutOut` at 1
    InOutIn,
    /// Falling half of an in-then-out ramp; retires at 0
    InOutOut,
    /// Rising half of a ramp that bounces between 0 and 1 until retargeted
    InOutRepeatingIn,
    /// Falling half of a bouncing ramp
    InOutRepeatingOut,
}

impl RampDirection {
    /// Whether progress increases in this direction
    pub fn is_rising(self) -> bool {
        matches!(
            self,
            RampDirection::In | RampDirection::InOutIn | RampDirection::InOutRepeatingIn
        )
    }

    /// Falling halves of in-out ramps use the secondary increment
    pub fn uses_secondary_increment(self) -> bool {
        matches!(
            self,
            RampDirection::InOutOut | RampDirection::InOutRepeatingOut
        )
    }

    /// Progress a freshly created ramp starts at
    pub fn start_progress(self) -> f64 {
        if self.is_rising() {
            0.0
        } else {
            1.0
        }
    }
}

/// Opaque value attached to a ramp by whoever started it
///
/// Typically the item index a hover belongs to, or the colour a ripple
/// fades from.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Payload {
    #[default]
    None,
    Index(usize),
    Float(f64),
    Color(Color),
    Rect(Rect),
    Text(String),
}

/// One animation instance: progress, direction, where it started and why
#[derive(Clone, Debug, PartialEq)]
pub struct Ramp {
    pub(crate) progress: f64,
    pub(crate) direction: RampDirection,
    pub(crate) source: Point,
    pub(crate) payload: Payload,
}

impl Ramp {
    pub fn new(direction: RampDirection, source: Point, payload: Payload) -> Self {
        Self {
            progress: direction.start_progress(),
            direction,
            source,
            payload,
        }
    }

    /// Raw (un-eased) progress in `[0, 1]`
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn direction(&self) -> RampDirection {
        self.direction
    }

    pub fn source(&self) -> Point {
        self.source
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Whether the ramp has reached the end of its travel
    ///
    /// `InOutIn` and the repeating directions never settle on their own.
    pub fn is_settled(&self) -> bool {
        match self.direction {
            RampDirection::In => self.progress >= 1.0,
            RampDirection::Out | RampDirection::InOutOut => self.progress <= 0.0,
            RampDirection::InOutIn
            | RampDirection::InOutRepeatingIn
            | RampDirection::InOutRepeatingOut => false,
        }
    }

    /// Advance one tick, clamping to `[0, 1]` and flipping in-out phases
    pub(crate) fn step(&mut self, increment: f64, secondary_increment: f64) {
        if self.is_settled() {
            return;
        }

        if self.direction.is_rising() {
            self.progress = (self.progress + increment).min(1.0);
        } else {
            let decrement = if self.direction.uses_secondary_increment() {
                secondary_increment
            } else {
                increment
            };
            self.progress = (self.progress - decrement).max(0.0);
        }

        self.direction = match self.direction {
            RampDirection::InOutIn if self.progress >= 1.0 => RampDirection::InOutOut,
            RampDirection::InOutRepeatingIn if self.progress >= 1.0 => {
                RampDirection::InOutRepeatingOut
            }
            RampDirection::InOutRepeatingOut if self.progress <= 0.0 => {
                RampDirection::InOutRepeatingIn
            }
            other => other,
        };
    }
}
