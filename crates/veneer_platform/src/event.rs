//! Event loop and host events

use crate::error::PlatformError;
use crate::input::InputEvent;
use crate::window::HostWindow;

/// Event loop abstraction
///
/// Host integrations implement this to feed raw messages into a root
/// window. All callbacks run on the UI thread.
pub trait EventLoop {
    /// The window type driven by this loop
    type Window: HostWindow;

    /// Run until the handler returns [`ControlFlow::Exit`] or events run out
    fn run<F>(self, handler: F) -> Result<(), PlatformError>
    where
        F: FnMut(Event, &mut Self::Window) -> ControlFlow;
}

/// Control flow after handling an event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControlFlow {
    #[default]
    Continue,
    Exit,
}

/// Host events
#[derive(Clone, Debug)]
pub enum Event {
    /// Window-related event
    Window(WindowEvent),
    /// Input event (mouse, keyboard, wheel)
    Input(InputEvent),
    /// The host asks for the client area to be painted
    Paint,
    /// The animation timer started via `HostWindow::start_timer` fired
    Timer,
}

/// Window events
#[derive(Clone, Debug)]
pub enum WindowEvent {
    /// Client area was resized
    Resized { width: u32, height: u32 },
    /// Close was requested (e.g., close button clicked)
    CloseRequested,
    /// Window gained or lost activation
    Focused(bool),
}
