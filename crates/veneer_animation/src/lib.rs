//! Veneer Animation System
//!
//! Progress ramps advanced by a host-timer driven scheduler:
//!
//! - **Ramps**: one progress value per running animation, with direction,
//!   source point and payload
//! - **Managers**: a group of ramps sharing increment, easing and callbacks
//! - **Scheduler**: ticks every registered manager; managers live as long as
//!   their [`AnimatedManager`] wrapper
//! - **Easing**: linear, sinusoidal in-out, ease-out and a delayed cosine rise

pub mod easing;
pub mod manager;
pub mod ramp;
pub mod scheduler;

pub use easing::Easing;
pub use manager::{AnimationManager, ManagerCallback, DEFAULT_INCREMENT};
pub use ramp::{Payload, Ramp, RampDirection};
pub use scheduler::{
    AnimatedManager, AnimationScheduler, ManagerId, SchedulerHandle, DEFAULT_TICK_INTERVAL,
};
