//! Host window abstraction and configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// Window configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial client width in logical pixels
    pub width: u32,
    /// Initial client height in logical pixels
    pub height: u32,
    /// Whether the window can be resized
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Veneer".to_string(),
            width: 800,
            height: 600,
            resizable: true,
        }
    }
}

impl WindowConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }
}

/// A finished frame handed to the host in one call
///
/// `pixels` are premultiplied `0xAARRGGBB`, row-major, `width * height` long.
/// The slice borrows the surface the canvas drew into; nothing is copied
/// between drawing and presentation.
#[derive(Clone, Copy, Debug)]
pub struct PresentFrame<'a> {
    pub pixels: &'a [u32],
    pub width: u32,
    pub height: u32,
}

impl PresentFrame<'_> {
    /// View the pixels as raw bytes for hosts that blit byte buffers
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.pixels)
    }
}

/// Host window trait
///
/// The core consumes only these capabilities from the host: the client area
/// size, a redraw request, frame presentation and a repeating timer.
pub trait HostWindow {
    /// Client area size in logical pixels
    fn client_size(&self) -> (u32, u32);

    /// Set the window title
    fn set_title(&mut self, title: &str);

    /// Set the cursor icon
    fn set_cursor(&mut self, cursor: Cursor);

    /// Ask the host to deliver an [`Event::Paint`](crate::Event::Paint) soon
    fn request_redraw(&mut self);

    /// Copy a finished frame into the drawable region
    fn present(&mut self, frame: PresentFrame<'_>) -> Result<(), PlatformError>;

    /// Start (or retime) the repeating animation timer
    fn start_timer(&mut self, interval: Duration);

    /// Stop the animation timer
    fn stop_timer(&mut self);
}

/// Cursor icons
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Text,
    Move,
    NotAllowed,
    ResizeNS,
    ResizeEW,
    Wait,
}
