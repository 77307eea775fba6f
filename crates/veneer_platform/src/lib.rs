//! Veneer Platform Abstraction Layer
//!
//! The host-facing boundary of the element framework. The core consumes a
//! host window that can report its client size, request a repaint, accept a
//! finished frame and run a repeating timer; raw pointer and keyboard
//! messages arrive as [`Event`]s.
//!
//! # Example
//!
//! ```
//! use veneer_platform::*;
//!
//! let event_loop = HeadlessEventLoop::new(HeadlessWindow::new(320, 240))
//!     .with_events([Event::Paint, Event::Window(WindowEvent::CloseRequested)]);
//!
//! event_loop
//!     .run(|event, window| match event {
//!         Event::Paint => {
//!             window.request_redraw();
//!             ControlFlow::Continue
//!         }
//!         Event::Window(WindowEvent::CloseRequested) => ControlFlow::Exit,
//!         _ => ControlFlow::Continue,
//!     })
//!     .unwrap();
//! ```

mod error;
mod event;
mod headless;
mod input;
mod window;

pub use error::{PlatformError, Result};
pub use event::{ControlFlow, Event, EventLoop, WindowEvent};
pub use headless::{HeadlessEventLoop, HeadlessWindow};
pub use input::{
    InputEvent, Key, KeyState, KeyboardEvent, Modifiers, MouseButton, MouseEvent, ScrollPhase,
};
pub use window::{Cursor, HostWindow, PresentFrame, WindowConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{PlatformError, Result};
    pub use crate::event::{ControlFlow, Event, EventLoop, WindowEvent};
    pub use crate::input::{
        InputEvent, Key, KeyState, KeyboardEvent, Modifiers, MouseButton, MouseEvent,
    };
    pub use crate::window::{Cursor, HostWindow, PresentFrame, WindowConfig};
}
