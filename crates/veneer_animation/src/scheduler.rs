//! Animation scheduler
//!
//! Owns every live [`AnimationManager`] and advances them together when the
//! host timer fires. Managers register through a weak [`SchedulerHandle`];
//! the [`AnimatedManager`] wrapper unregisters its manager when dropped.
//!
//! The scheduler never reads the wall clock on its own. Callers drive it
//! with [`AnimationScheduler::tick`] (one step per host timer event),
//! [`AnimationScheduler::advance`] (a known elapsed duration) or
//! [`AnimationScheduler::poll`] (an `Instant` supplied by the caller).

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use veneer_core::Point;

use crate::manager::AnimationManager;
use crate::ramp::{Payload, RampDirection};

/// Default interval between ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(5);

new_key_type! {
    /// Handle to a registered animation manager
    pub struct ManagerId;
}

type SharedManager = Rc<RefCell<AnimationManager>>;

struct SchedulerInner {
    managers: SlotMap<ManagerId, SharedManager>,
    tick_interval: Duration,
    /// Elapsed time not yet consumed by a whole tick
    pending: Duration,
    last_poll: Option<Instant>,
    ticks: u64,
}

/// The scheduler that ticks all registered managers
pub struct AnimationScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_TICK_INTERVAL)
    }

    pub fn with_interval(tick_interval: Duration) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                managers: SlotMap::with_key(),
                tick_interval,
                pending: Duration::ZERO,
                last_poll: None,
                ticks: 0,
            })),
        }
    }

    /// Get a weak handle for registering managers
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.inner.borrow().tick_interval
    }

    pub fn set_tick_interval(&self, interval: Duration) {
        self.inner.borrow_mut().tick_interval = interval;
    }

    /// Total ticks run since creation
    pub fn tick_count(&self) -> u64 {
        self.inner.borrow().ticks
    }

    pub fn manager_count(&self) -> usize {
        self.inner.borrow().managers.len()
    }

    /// Whether any registered manager still needs ticks
    pub fn has_active_animations(&self) -> bool {
        self.inner
            .borrow()
            .managers
            .values()
            .any(|m| m.try_borrow().map(|m| m.is_animating()).unwrap_or(true))
    }

    /// Register a manager directly (see also [`SchedulerHandle::register`])
    pub fn add_manager(&self, manager: AnimationManager) -> ManagerId {
        insert_manager(&self.inner, manager)
    }

    pub fn remove_manager(&self, id: ManagerId) -> bool {
        self.inner.borrow_mut().managers.remove(id).is_some()
    }

    /// Advance every manager one step
    ///
    /// Returns true if any manager is still animating afterwards. Manager
    /// callbacks run without the scheduler borrowed, so they may register
    /// or drop other managers.
    pub fn tick(&self) -> bool {
        let managers: SmallVec<[SharedManager; 8]> = {
            let mut inner = self.inner.borrow_mut();
            inner.ticks += 1;
            inner.managers.values().cloned().collect()
        };

        let mut active = false;
        for manager in managers {
            match manager.try_borrow_mut() {
                Ok(mut manager) => active |= manager.tick(),
                Err(_) => {
                    tracing::trace!("AnimationScheduler: manager busy, skipped this tick");
                    active = true;
                }
            }
        }
        active
    }

    /// Run as many whole ticks as fit in `elapsed` plus the carried remainder
    ///
    /// Returns the number of ticks run. Time accumulated while nothing is
    /// animating is dropped so a new animation does not start with a burst.
    pub fn advance(&self, elapsed: Duration) -> usize {
        if !self.has_active_animations() {
            self.inner.borrow_mut().pending = Duration::ZERO;
            return 0;
        }

        let interval = self.tick_interval();
        if interval.is_zero() {
            self.tick();
            return 1;
        }

        let mut ticks = 0;
        let mut pending = self.inner.borrow().pending + elapsed;
        while pending >= interval {
            pending -= interval;
            ticks += 1;
            if !self.tick() {
                pending = Duration::ZERO;
                break;
            }
        }
        self.inner.borrow_mut().pending = pending;

        if ticks > 0 {
            tracing::trace!(ticks, "AnimationScheduler: advanced");
        }
        ticks
    }

    /// Advance by the time since the previous poll
    pub fn poll(&self, now: Instant) -> usize {
        let last = self.inner.borrow_mut().last_poll.replace(now);
        match last {
            Some(last) => self.advance(now.saturating_duration_since(last)),
            None => 0,
        }
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the animation scheduler
///
/// Passed to elements that need to register animations. It won't prevent
/// the scheduler from being dropped; every operation on a dead handle is a
/// no-op.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

fn insert_manager(inner: &RefCell<SchedulerInner>, manager: AnimationManager) -> ManagerId {
    let id = inner
        .borrow_mut()
        .managers
        .insert(Rc::new(RefCell::new(manager)));
    tracing::debug!(?id, "AnimationScheduler: registered manager");
    id
}

impl SchedulerHandle {
    /// Register a manager and return its ID
    pub fn register(&self, manager: AnimationManager) -> Option<ManagerId> {
        self.inner
            .upgrade()
            .map(|inner| insert_manager(&inner, manager))
    }

    /// Remove a manager
    pub fn remove(&self, id: ManagerId) {
        if let Some(inner) = self.inner.upgrade() {
            let removed = inner.borrow_mut().managers.remove(id);
            if removed.is_some() {
                tracing::debug!(?id, "AnimationScheduler: removed manager");
            }
        }
    }

    /// Run `f` against a registered manager
    ///
    /// Returns `None` if the scheduler or the manager is gone, or if the
    /// manager is currently ticking (i.e. `f` was called from its own
    /// callback).
    pub fn with_manager<F, R>(&self, id: ManagerId, f: F) -> Option<R>
    where
        F: FnOnce(&mut AnimationManager) -> R,
    {
        let inner = self.inner.upgrade()?;
        let manager = inner.borrow().managers.get(id).cloned()?;
        let mut manager = manager.try_borrow_mut().ok()?;
        Some(f(&mut manager))
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

// ============================================================================
// Animated Manager
// ============================================================================

/// A manager registered with the scheduler for as long as this value lives
///
/// ```
/// use veneer_animation::*;
/// use veneer_core::Point;
///
/// let scheduler = AnimationScheduler::new();
/// let hover = AnimatedManager::new(scheduler.handle(), AnimationManager::new().increment(0.5));
///
/// hover.start_new_animation(RampDirection::In, Point::ZERO, Payload::None);
/// scheduler.tick();
/// assert_eq!(hover.progress(), 0.5);
///
/// drop(hover);
/// assert_eq!(scheduler.manager_count(), 0);
/// ```
pub struct AnimatedManager {
    handle: SchedulerHandle,
    id: Option<ManagerId>,
}

impl AnimatedManager {
    pub fn new(handle: SchedulerHandle, manager: AnimationManager) -> Self {
        let id = handle.register(manager);
        if id.is_none() {
            tracing::warn!("AnimatedManager: scheduler is gone, animation disabled");
        }
        Self { handle, id }
    }

    pub fn id(&self) -> Option<ManagerId> {
        self.id
    }

    /// Run `f` against the underlying manager
    pub fn with<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut AnimationManager) -> R,
    {
        self.handle.with_manager(self.id?, f)
    }

    pub fn start_new_animation(&self, direction: RampDirection, source: Point, payload: Payload) {
        self.with(|m| m.start_new_animation(direction, source, payload));
    }

    /// Eased progress of the first ramp
    pub fn progress(&self) -> f64 {
        self.progress_at(0)
    }

    pub fn progress_at(&self, index: usize) -> f64 {
        self.with(|m| m.progress_at(index)).unwrap_or(0.0)
    }

    pub fn is_animating(&self) -> bool {
        self.with(|m| m.is_animating()).unwrap_or(false)
    }

    pub fn animation_count(&self) -> usize {
        self.with(|m| m.animation_count()).unwrap_or(0)
    }
}

impl Drop for AnimatedManager {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.handle.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast_manager() -> AnimationManager {
        AnimationManager::new().increment(0.25)
    }

    #[test]
    fn test_tick_advances_all_managers() {
        let scheduler = AnimationScheduler::new();
        let a = AnimatedManager::new(scheduler.handle(), fast_manager());
        let b = AnimatedManager::new(scheduler.handle(), fast_manager());
        a.start_new_animation(RampDirection::In, Point::ZERO, Payload::None);
        b.start_new_animation(RampDirection::In, Point::ZERO, Payload::None);

        assert!(scheduler.tick());
        assert_eq!(a.progress(), 0.25);
        assert_eq!(b.progress(), 0.25);
        assert_eq!(scheduler.tick_count(), 1);
    }

    #[test]
    fn test_advance_keeps_remainder() {
        let scheduler = AnimationScheduler::with_interval(Duration::from_millis(10));
        let m = AnimatedManager::new(scheduler.handle(), AnimationManager::new().increment(0.01));
        m.start_new_animation(RampDirection::In, Point::ZERO, Payload::None);

        assert_eq!(scheduler.advance(Duration::from_millis(25)), 2);
        assert_eq!(scheduler.advance(Duration::from_millis(5)), 1);
        assert_eq!(scheduler.advance(Duration::from_millis(4)), 0);
    }

    #[test]
    fn test_advance_when_idle_runs_nothing() {
        let scheduler = AnimationScheduler::new();
        let _m = AnimatedManager::new(scheduler.handle(), fast_manager());
        assert_eq!(scheduler.advance(Duration::from_secs(1)), 0);
        assert!(!scheduler.has_active_animations());
    }

    #[test]
    fn test_poll_uses_supplied_instants() {
        let scheduler = AnimationScheduler::with_interval(Duration::from_millis(5));
        let m = AnimatedManager::new(scheduler.handle(), AnimationManager::new().increment(0.01));
        m.start_new_animation(RampDirection::In, Point::ZERO, Payload::None);

        let start = Instant::now();
        assert_eq!(scheduler.poll(start), 0);
        assert_eq!(scheduler.poll(start + Duration::from_millis(15)), 3);
    }

    #[test]
    fn test_drop_unregisters() {
        let scheduler = AnimationScheduler::new();
        {
            let _m = AnimatedManager::new(scheduler.handle(), fast_manager());
            assert_eq!(scheduler.manager_count(), 1);
        }
        assert_eq!(scheduler.manager_count(), 0);
    }

    #[test]
    fn test_dead_handle_is_inert() {
        let handle = {
            let scheduler = AnimationScheduler::new();
            scheduler.handle()
        };
        assert!(!handle.is_alive());
        let m = AnimatedManager::new(handle, fast_manager());
        m.start_new_animation(RampDirection::In, Point::ZERO, Payload::None);
        assert_eq!(m.progress(), 0.0);
        assert!(!m.is_animating());
    }

    #[test]
    fn test_callback_may_register_another_manager() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let spawned = Rc::new(Cell::new(None));

        let manager = {
            let handle = handle.clone();
            let spawned = spawned.clone();
            fast_manager().on_finished(move |_| {
                spawned.set(handle.register(AnimationManager::new()));
            })
        };
        let m = AnimatedManager::new(handle, manager);
        m.start_new_animation(RampDirection::In, Point::ZERO, Payload::None);

        while scheduler.tick() {}
        assert!(spawned.get().is_some());
        assert_eq!(scheduler.manager_count(), 2);
    }
}
