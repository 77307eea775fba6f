//! Veneer Application Layer
//!
//! Ties an element tree to a host window: input routing, the animation
//! timer, redraw requests and frame presentation, plus TOML configuration
//! and logging setup.
//!
//! # Example (Headless)
//!
//! ```
//! use veneer_app::prelude::*;
//! use veneer_core::{Color, DrawContext, Rect};
//!
//! let config = AppConfig::default();
//! let mut host = HeadlessWindow::from_config(&config.window);
//! let mut window = RootWindow::new(&config);
//! window.attach(&mut host);
//!
//! window
//!     .add_child(
//!         Element::new("banner")
//!             .with_bounds(Rect::new(0.0, 0.0, 0.0, 40.0))
//!             .with_dock(Dock::Top)
//!             .on_paint(|view, ctx| ctx.fill_rect(view.client_rect(), 0.0, Color::BLUE)),
//!     )
//!     .unwrap();
//!
//! window.handle_event(Event::Paint, &mut host);
//! assert_eq!(host.pixel(10, 10), Some(0xFF00_00FF));
//! ```

pub mod config;
mod error;
pub mod logging;
mod root;


pub use config::{AnimationConfig, AppConfig, LoggingConfig, PaintConfig};
pub use error::{AppError, Result};
pub use logging::init_logging;
pub use root::RootWindow;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::error::{AppError, Result};
    pub use crate::logging::init_logging;
    pub use crate::root::RootWindow;

    pub use veneer_animation::{AnimatedManager, AnimationManager, Easing, Payload, RampDirection};
    pub use veneer_layout::prelude::*;
    pub use veneer_paint::{PaintOutcome, PaintStats};
    pub use veneer_platform::prelude::*;
    pub use veneer_platform::HeadlessWindow;
}
