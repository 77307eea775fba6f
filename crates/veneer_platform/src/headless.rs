//! In-memory host for tests and offscreen rendering
//!
//! `HeadlessWindow` records every request the core makes of its host, and
//! `HeadlessEventLoop` replays a scripted queue of events against it.

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::PlatformError;
use crate::event::{ControlFlow, Event, EventLoop, WindowEvent};
use crate::window::{Cursor, HostWindow, PresentFrame, WindowConfig};

/// A host window with no OS backing
#[derive(Debug, Default)]
pub struct HeadlessWindow {
    width: u32,
    height: u32,
    title: String,
    cursor: Cursor,
    redraw_requests: usize,
    frames_presented: usize,
    last_frame: Vec<u32>,
    last_frame_size: (u32, u32),
    timer_interval: Option<Duration>,
}

impl HeadlessWindow {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn from_config(config: &WindowConfig) -> Self {
        let mut window = Self::new(config.width, config.height);
        window.title = config.title.clone();
        window
    }

    /// Change the client size as the OS would before sending `Resized`
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn redraw_requests(&self) -> usize {
        self.redraw_requests
    }

    /// Reset the redraw counter, returning how many requests were pending
    pub fn take_redraw_requests(&mut self) -> usize {
        std::mem::take(&mut self.redraw_requests)
    }

    pub fn frames_presented(&self) -> usize {
        self.frames_presented
    }

    /// The last presented frame
    pub fn last_frame(&self) -> &[u32] {
        &self.last_frame
    }

    pub fn last_frame_size(&self) -> (u32, u32) {
        self.last_frame_size
    }

    /// Read one pixel of the last presented frame
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        let (w, h) = self.last_frame_size;
        if x >= w || y >= h {
            return None;
        }
        self.last_frame.get((y * w + x) as usize).copied()
    }

    pub fn timer_interval(&self) -> Option<Duration> {
        self.timer_interval
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer_interval.is_some()
    }
}

impl HostWindow for HeadlessWindow {
    fn client_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn request_redraw(&mut self) {
        self.redraw_requests += 1;
    }

    fn present(&mut self, frame: PresentFrame<'_>) -> Result<(), PlatformError> {
        let expected = frame.width as usize * frame.height as usize;
        if frame.pixels.len() != expected {
            return Err(PlatformError::Present(format!(
                "frame has {} pixels, expected {}x{}",
                frame.pixels.len(),
                frame.width,
                frame.height
            )));
        }
        self.last_frame.clear();
        self.last_frame.extend_from_slice(frame.pixels);
        self.last_frame_size = (frame.width, frame.height);
        self.frames_presented += 1;
        Ok(())
    }

    fn start_timer(&mut self, interval: Duration) {
        self.timer_interval = Some(interval);
    }

    fn stop_timer(&mut self) {
        self.timer_interval = None;
    }
}

/// Replays a scripted sequence of events
pub struct HeadlessEventLoop {
    window: HeadlessWindow,
    events: VecDeque<Event>,
}

impl HeadlessEventLoop {
    pub fn new(window: HeadlessWindow) -> Self {
        Self {
            window,
            events: VecDeque::new(),
        }
    }

    /// Queue an event to be delivered by `run`
    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn with_events(mut self, events: impl IntoIterator<Item = Event>) -> Self {
        self.events.extend(events);
        self
    }
}

impl EventLoop for HeadlessEventLoop {
    type Window = HeadlessWindow;

    fn run<F>(mut self, mut handler: F) -> Result<(), PlatformError>
    where
        F: FnMut(Event, &mut Self::Window) -> ControlFlow,
    {
        while let Some(event) = self.events.pop_front() {
            if let Event::Window(WindowEvent::Resized { width, height }) = event {
                self.window.resize(width, height);
            }
            if handler(event, &mut self.window) == ControlFlow::Exit {
                tracing::debug!("HeadlessEventLoop: exit requested");
                break;
            }
        }
        Ok(())
    }
}
