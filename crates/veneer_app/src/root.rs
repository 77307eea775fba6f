//! Root windows
//!
//! A [`RootWindow`] owns one element tree and everything that serves it:
//! the input router, the animation scheduler and the paint pipeline. The
//! host window is borrowed per call, so the same root can sit behind any
//! [`EventLoop`].
//!
//! Each event is one turn. Whatever the event changed, the turn ends in
//! [`RootWindow::flush`], which turns pending paint invalidation into a
//! single redraw request and starts or stops the host timer to match the
//! scheduler.

use veneer_animation::{AnimatedManager, AnimationManager, AnimationScheduler, SchedulerHandle};
use veneer_core::Rect;
use veneer_layout::{Element, ElementKind, ElementTree, EventRouter, Invalidator, NodeId, TreeError};
use veneer_paint::{PaintOutcome, PaintPipeline};
use veneer_platform::{ControlFlow, Event, EventLoop, HostWindow, WindowEvent};

use crate::config::{AnimationConfig, AppConfig};
use crate::error::Result;

pub struct RootWindow {
    tree: ElementTree,
    root: NodeId,
    router: EventRouter,
    scheduler: AnimationScheduler,
    pipeline: PaintPipeline,
    animation: AnimationConfig,
    title: String,
    timer_running: bool,
    redraw_requested: bool,
    closed: bool,
}

impl RootWindow {
    pub fn new(config: &AppConfig) -> Self {
        let mut tree = ElementTree::new();
        let size = Rect::new(0.0, 0.0, config.window.width as f32, config.window.height as f32);
        let root = tree.insert(
            Element::new("root")
                .with_kind(ElementKind::Container)
                .with_bounds(size),
        );

        Self {
            tree,
            root,
            router: EventRouter::new(),
            scheduler: AnimationScheduler::with_interval(config.animation.tick_interval()),
            pipeline: config.paint.pipeline(),
            animation: config.animation.clone(),
            title: config.window.title.clone(),
            timer_running: false,
            redraw_requested: false,
            closed: false,
        }
    }

    /// Bind to a host: adopt its client size and push the title
    pub fn attach<H>(&mut self, host: &mut H)
    where
        H: HostWindow + ?Sized,
    {
        host.set_title(&self.title);
        let (width, height) = host.client_size();
        self.resize(width, height);
        self.flush(host);
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut EventRouter {
        &mut self.router
    }

    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    pub fn scheduler_handle(&self) -> SchedulerHandle {
        self.scheduler.handle()
    }

    pub fn pipeline(&self) -> &PaintPipeline {
        &self.pipeline
    }

    /// Shared invalidation handle, for animation callbacks
    pub fn invalidator(&self) -> Invalidator {
        self.tree.invalidator().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Add an element directly under the root
    pub fn add_child(&mut self, element: Element) -> std::result::Result<NodeId, TreeError> {
        self.tree.insert_child(self.root, element)
    }

    /// A manager preloaded with the configured increments
    pub fn animation_manager(&self) -> AnimationManager {
        self.animation.manager()
    }

    /// Register `manager` with this window's scheduler
    pub fn animate(&self, manager: AnimationManager) -> AnimatedManager {
        AnimatedManager::new(self.scheduler.handle(), manager)
    }

    // =========================================================================
    // Event handling
    // =========================================================================

    /// Handle one host event and finish the turn
    pub fn handle_event<H>(&mut self, event: Event, host: &mut H) -> ControlFlow
    where
        H: HostWindow + ?Sized,
    {
        if self.closed {
            return ControlFlow::Exit;
        }

        match event {
            Event::Window(WindowEvent::Resized { width, height }) => self.resize(width, height),
            Event::Window(WindowEvent::CloseRequested) => {
                self.close(host);
                return ControlFlow::Exit;
            }
            Event::Window(WindowEvent::Focused(false)) => {
                self.router.release_capture(&self.tree);
            }
            Event::Window(WindowEvent::Focused(true)) => {}
            Event::Input(input) => {
                let dispatched = self.router.handle_input(&self.tree, self.root, &input);
                tracing::trace!(count = dispatched.len(), "input routed");
            }
            Event::Paint => {
                self.paint(host);
            }
            Event::Timer => {
                self.scheduler.tick();
            }
        }

        self.flush(host);
        ControlFlow::Continue
    }

    /// Drive `event_loop` until it exits or the window closes
    pub fn run<L>(&mut self, event_loop: L) -> Result<()>
    where
        L: EventLoop,
    {
        event_loop.run(|event, window| self.handle_event(event, window))?;
        Ok(())
    }

    /// Paint and present a frame now
    pub fn paint<H>(&mut self, host: &mut H) -> PaintOutcome
    where
        H: HostWindow + ?Sized,
    {
        self.redraw_requested = false;
        let outcome = self.pipeline.paint(&self.tree, self.root, host);
        if let PaintOutcome::Skipped(reason) = &outcome {
            tracing::debug!(?reason, "paint skipped");
        }
        outcome
    }

    /// Run scheduler ticks for `elapsed` and finish the turn
    pub fn advance<H>(&mut self, elapsed: std::time::Duration, host: &mut H) -> usize
    where
        H: HostWindow + ?Sized,
    {
        let ticks = self.scheduler.advance(elapsed);
        self.flush(host);
        ticks
    }

    /// End-of-turn bookkeeping
    ///
    /// Applies tree edits deferred by handlers, drops router state for
    /// elements that went away, requests at most one redraw while one is
    /// outstanding, and keeps the host timer running exactly while some
    /// manager is animating.
    pub fn flush<H>(&mut self, host: &mut H)
    where
        H: HostWindow + ?Sized,
    {
        let edits = self.router.apply_deferred(&mut self.tree);
        if edits > 0 {
            tracing::trace!(edits, "deferred edits applied");
        }
        self.router.prune(&self.tree);

        if self.tree.invalidator().needs_paint() && !self.redraw_requested {
            host.request_redraw();
            self.redraw_requested = true;
        }

        let active = self.scheduler.has_active_animations();
        if active && !self.timer_running {
            host.start_timer(self.scheduler.tick_interval());
            self.timer_running = true;
            tracing::debug!(interval = ?self.scheduler.tick_interval(), "animation timer started");
        } else if !active && self.timer_running {
            host.stop_timer();
            self.timer_running = false;
            tracing::debug!("animation timer stopped");
        }
    }

    /// Tear down: stop the timer and release the surface
    pub fn close<H>(&mut self, host: &mut H)
    where
        H: HostWindow + ?Sized,
    {
        if self.closed {
            return;
        }
        self.router.release_capture(&self.tree);
        self.router.focus_mut().clear(&self.tree);
        if self.timer_running {
            host.stop_timer();
            self.timer_running = false;
        }
        self.pipeline.dispose();
        self.closed = true;
        tracing::debug!(title = %self.title, "root window closed");
    }

    fn resize(&mut self, width: u32, height: u32) {
        let bounds = Rect::new(0.0, 0.0, width as f32, height as f32);
        if self.tree.bounds(self.root) == bounds {
            return;
        }
        tracing::debug!(width, height, "root resized");
        self.tree.set_bounds(self.root, bounds);
        self.tree.invalidator().invalidate_all();
    }
}

impl std::fmt::Debug for RootWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootWindow")
            .field("title", &self.title)
            .field("root", &self.root)
            .field("elements", &self.tree.len())
            .field("timer_running", &self.timer_running)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
