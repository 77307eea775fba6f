//! Animation managers: a set of ramps sharing one increment and easing
//!
//! A manager is owned by whatever element it animates (hover, ripple,
//! open/close). It does not keep time itself; every [`tick`] advances each
//! ramp by one increment, so the frame rate of the host timer decides the
//! wall-clock duration.
//!
//! [`tick`]: AnimationManager::tick

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;
use veneer_core::Point;

use crate::easing::Easing;
use crate::ramp::{Payload, Ramp, RampDirection};

/// Default per-tick progress increment
pub const DEFAULT_INCREMENT: f64 = 0.03;

/// Callback fired by a manager after it ticks
pub type ManagerCallback = Rc<dyn Fn(&AnimationManager)>;

/// A group of ramps advanced together
pub struct AnimationManager {
    ramps: SmallVec<[Ramp; 2]>,
    increment: f64,
    secondary_increment: f64,
    easing: Easing,
    /// One reusable ramp, retargeted instead of stacked
    singular: bool,
    /// Allow starting while already animating
    interrupt_animation: bool,
    on_progress: Option<ManagerCallback>,
    on_finished: Option<ManagerCallback>,
}

impl AnimationManager {
    /// A singular manager with the default increment and linear easing
    pub fn new() -> Self {
        Self {
            ramps: SmallVec::new(),
            increment: DEFAULT_INCREMENT,
            secondary_increment: DEFAULT_INCREMENT,
            easing: Easing::Linear,
            singular: true,
            interrupt_animation: false,
            on_progress: None,
            on_finished: None,
        }
    }

    pub fn increment(mut self, increment: f64) -> Self {
        self.increment = increment;
        self
    }

    /// Decrement used by the falling half of in-out ramps
    pub fn secondary_increment(mut self, increment: f64) -> Self {
        self.secondary_increment = increment;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn singular(mut self, singular: bool) -> Self {
        self.singular = singular;
        self
    }

    pub fn interrupt_animation(mut self, interrupt: bool) -> Self {
        self.interrupt_animation = interrupt;
        self
    }

    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&AnimationManager) + 'static,
    {
        self.on_progress = Some(Rc::new(callback));
        self
    }

    pub fn on_finished<F>(mut self, callback: F) -> Self
    where
        F: Fn(&AnimationManager) + 'static,
    {
        self.on_finished = Some(Rc::new(callback));
        self
    }

    pub fn set_on_progress(&mut self, callback: Option<ManagerCallback>) {
        self.on_progress = callback;
    }

    pub fn set_on_finished(&mut self, callback: Option<ManagerCallback>) {
        self.on_finished = callback;
    }

    pub fn is_singular(&self) -> bool {
        self.singular
    }

    pub fn get_easing(&self) -> Easing {
        self.easing
    }

    // =========================================================================
    // Starting and steering
    // =========================================================================

    /// Start a ramp in `direction`
    ///
    /// Ignored while animating unless `interrupt_animation` is set. A
    /// singular manager retargets its existing ramp and keeps its progress,
    /// so reversing mid-flight never jumps.
    pub fn start_new_animation(&mut self, direction: RampDirection, source: Point, payload: Payload) {
        if self.is_animating() && !self.interrupt_animation {
            tracing::trace!("AnimationManager: start ignored while animating");
            return;
        }

        if self.singular {
            if let Some(ramp) = self.ramps.first_mut() {
                ramp.direction = direction;
                ramp.source = source;
                ramp.payload = payload;
                return;
            }
        }

        self.ramps.push(Ramp::new(direction, source, payload));
    }

    /// Overwrite raw progress of one ramp; returns false if it does not exist
    pub fn set_progress(&mut self, index: usize, progress: f64) -> bool {
        match self.ramps.get_mut(index) {
            Some(ramp) => {
                ramp.progress = progress.clamp(0.0, 1.0);
                true
            }
            None => false,
        }
    }

    pub fn set_direction(&mut self, index: usize, direction: RampDirection) -> bool {
        match self.ramps.get_mut(index) {
            Some(ramp) => {
                ramp.direction = direction;
                true
            }
            None => false,
        }
    }

    pub fn set_payload(&mut self, index: usize, payload: Payload) -> bool {
        match self.ramps.get_mut(index) {
            Some(ramp) => {
                ramp.payload = payload;
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Eased progress of the first ramp
    pub fn progress(&self) -> f64 {
        self.progress_at(0)
    }

    /// Eased progress of ramp `index`; 0 when there is no such ramp
    pub fn progress_at(&self, index: usize) -> f64 {
        self.ramps
            .get(index)
            .map(|ramp| self.easing.apply(ramp.progress))
            .unwrap_or(0.0)
    }

    /// Un-eased progress of ramp `index`; 0 when there is no such ramp
    pub fn raw_progress(&self, index: usize) -> f64 {
        self.ramps.get(index).map(|ramp| ramp.progress).unwrap_or(0.0)
    }

    pub fn source(&self, index: usize) -> Option<Point> {
        self.ramps.get(index).map(|ramp| ramp.source)
    }

    pub fn payload(&self, index: usize) -> Option<&Payload> {
        self.ramps.get(index).map(|ramp| &ramp.payload)
    }

    pub fn direction(&self, index: usize) -> Option<RampDirection> {
        self.ramps.get(index).map(|ramp| ramp.direction)
    }

    pub fn ramps(&self) -> &[Ramp] {
        &self.ramps
    }

    pub fn animation_count(&self) -> usize {
        self.ramps.len()
    }

    /// Whether any ramp is still moving
    pub fn is_animating(&self) -> bool {
        self.ramps.iter().any(|ramp| !ramp.is_settled())
    }

    // =========================================================================
    // Ticking
    // =========================================================================

    /// Advance every ramp by one increment
    ///
    /// Settled ramps of a non-singular manager are retired; a singular
    /// manager keeps its ramp frozen at the end of travel. Fires
    /// `on_progress` after the step and `on_finished` once nothing moves.
    /// Returns whether the manager still needs ticks.
    pub fn tick(&mut self) -> bool {
        if !self.is_animating() {
            return false;
        }

        for ramp in self.ramps.iter_mut() {
            ramp.step(self.increment, self.secondary_increment);
        }

        if !self.singular {
            self.ramps.retain(|ramp| !ramp.is_settled());
        }

        if let Some(callback) = self.on_progress.clone() {
            callback(self);
        }

        let animating = self.is_animating();
        if !animating {
            if let Some(callback) = self.on_finished.clone() {
                callback(self);
            }
        }
        animating
    }
}

impl Default for AnimationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AnimationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationManager")
            .field("ramps", &self.ramps)
            .field("increment", &self.increment)
            .field("secondary_increment", &self.secondary_increment)
            .field("easing", &self.easing)
            .field("singular", &self.singular)
            .field("interrupt_animation", &self.interrupt_animation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn run_until_idle(manager: &mut AnimationManager) -> usize {
        let mut ticks = 0;
        while manager.tick() {
            ticks += 1;
            assert!(ticks < 10_000, "manager never settled");
        }
        ticks
    }

    #[test]
    fn test_out_ramp_settles_at_zero_and_retires() {
        let mut manager = AnimationManager::new().singular(false).increment(0.1);
        manager.start_new_animation(RampDirection::Out, Point::ZERO, Payload::None);
        assert_eq!(manager.raw_progress(0), 1.0);

        run_until_idle(&mut manager);
        assert_eq!(manager.animation_count(), 0);
        assert!(!manager.is_animating());
    }

    #[test]
    fn test_singular_out_ramp_freezes_at_zero() {
        let mut manager = AnimationManager::new().increment(0.25);
        manager.start_new_animation(RampDirection::Out, Point::ZERO, Payload::None);
        run_until_idle(&mut manager);

        assert_eq!(manager.animation_count(), 1);
        assert_eq!(manager.raw_progress(0), 0.0);
    }

    #[test]
    fn test_interrupt_never_jumps_more_than_one_increment() {
        let increment = 0.03;
        let mut manager = AnimationManager::new()
            .increment(increment)
            .interrupt_animation(true);
        manager.start_new_animation(RampDirection::In, Point::ZERO, Payload::None);
        for _ in 0..10 {
            manager.tick();
        }

        let before = manager.raw_progress(0);
        manager.start_new_animation(RampDirection::Out, Point::ZERO, Payload::None);
        assert_eq!(manager.raw_progress(0), before);

        let mut last = before;
        while manager.tick() {
            let now = manager.raw_progress(0);
            assert!((now - last).abs() <= increment + 1e-9);
            last = now;
        }
        assert_eq!(manager.raw_progress(0), 0.0);
    }

    #[test]
    fn test_start_ignored_while_animating_without_interrupt() {
        let mut manager = AnimationManager::new();
        manager.start_new_animation(RampDirection::In, Point::ZERO, Payload::None);
        manager.tick();
        manager.start_new_animation(RampDirection::Out, Point::ZERO, Payload::None);
        assert_eq!(manager.direction(0), Some(RampDirection::In));
    }

    #[test]
    fn test_in_out_uses_secondary_increment_on_the_way_down() {
        let mut manager = AnimationManager::new()
            .singular(false)
            .increment(0.5)
            .secondary_increment(0.25);
        manager.start_new_animation(RampDirection::InOutIn, Point::ZERO, Payload::None);

        manager.tick();
        manager.tick();
        assert_eq!(manager.direction(0), Some(RampDirection::InOutOut));
        assert_eq!(manager.raw_progress(0), 1.0);

        manager.tick();
        assert_eq!(manager.raw_progress(0), 0.75);

        let remaining = run_until_idle(&mut manager);
        assert_eq!(remaining, 2);
        assert_eq!(manager.animation_count(), 0);
    }

    #[test]
    fn test_missing_index_reads_zero() {
        let manager = AnimationManager::new();
        assert_eq!(manager.progress(), 0.0);
        assert_eq!(manager.progress_at(7), 0.0);
        assert_eq!(manager.source(7), None);
    }

    #[test]
    fn test_non_singular_stacks_ramps() {
        let mut manager = AnimationManager::new()
            .singular(false)
            .interrupt_animation(true);
        manager.start_new_animation(RampDirection::In, Point::new(1.0, 1.0), Payload::Index(0));
        manager.start_new_animation(RampDirection::In, Point::new(5.0, 5.0), Payload::Index(1));

        assert_eq!(manager.animation_count(), 2);
        assert_eq!(manager.source(1), Some(Point::new(5.0, 5.0)));
        assert_eq!(manager.payload(1), Some(&Payload::Index(1)));
    }

    #[test]
    fn test_callbacks_fire() {
        let progress_calls = Rc::new(Cell::new(0));
        let finished_calls = Rc::new(Cell::new(0));

        let mut manager = {
            let progress_calls = progress_calls.clone();
            let finished_calls = finished_calls.clone();
            AnimationManager::new()
                .increment(0.5)
                .on_progress(move |_| progress_calls.set(progress_calls.get() + 1))
                .on_finished(move |m| {
                    assert!(!m.is_animating());
                    finished_calls.set(finished_calls.get() + 1);
                })
        };

        manager.start_new_animation(RampDirection::In, Point::ZERO, Payload::None);
        run_until_idle(&mut manager);
        // An idle tick fires nothing
        manager.tick();

        assert_eq!(progress_calls.get(), 2);
        assert_eq!(finished_calls.get(), 1);
    }

    #[test]
    fn test_eased_progress() {
        let mut manager = AnimationManager::new()
            .easing(Easing::EaseOut)
            .increment(0.5);
        manager.start_new_animation(RampDirection::In, Point::ZERO, Payload::None);
        manager.tick();
        assert_eq!(manager.raw_progress(0), 0.5);
        assert_eq!(manager.progress(), 0.75);
    }
}
