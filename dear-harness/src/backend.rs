//! The seam between the harness and a concrete window/graphics stack
//!
//! A [`Backend`] bundles the windowing library, the graphics context and the
//! Dear ImGui platform and renderer layers. The harness only decides *when*
//! each call happens; the backend decides *how*.
//!
//! Backends report window-system events through plain function pointers
//! registered by the harness. The callbacks carry no context of their own and
//! reach harness state through [`Harness::instance`](crate::Harness::instance).

use std::collections::BTreeMap;

use dear_imgui_rs::render::DrawData;
use dear_imgui_rs::{Context, Key, Ui};

use crate::config::{GlslVersion, WindowHint};
use crate::error::BackendError;

/// What happened to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Press,
    Release,
    Repeat,
}

/// A key event forwarded from the window system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub action: KeyAction,
}

impl KeyEvent {
    pub fn press(key: Key) -> Self {
        Self {
            key,
            action: KeyAction::Press,
        }
    }

    pub fn release(key: Key) -> Self {
        Self {
            key,
            action: KeyAction::Release,
        }
    }
}

/// Rendering viewport handed to the framebuffer-size callback
pub trait Viewport {
    fn set_viewport(&mut self, width: u32, height: u32);
}

pub type KeyCallback = fn(KeyEvent);
pub type FramebufferSizeCallback = fn(&mut dyn Viewport, u32, u32);
pub type CloseCallback = fn();
pub type ErrorCallback = fn(i32, &str);

/// Callback slots a backend fires while pumping events
#[derive(Debug, Clone, Copy, Default)]
pub struct Callbacks {
    pub key: Option<KeyCallback>,
    pub framebuffer_size: Option<FramebufferSizeCallback>,
    pub close: Option<CloseCallback>,
    pub error: Option<ErrorCallback>,
}

impl Callbacks {
    pub fn key(&self, event: KeyEvent) {
        if let Some(cb) = self.key {
            cb(event);
        }
    }

    pub fn framebuffer_size(&self, viewport: &mut dyn Viewport, width: u32, height: u32) {
        if let Some(cb) = self.framebuffer_size {
            cb(viewport, width, height);
        }
    }

    pub fn close(&self) {
        if let Some(cb) = self.close {
            cb();
        }
    }

    pub fn error(&self, code: i32, description: &str) {
        if let Some(cb) = self.error {
            cb(code, description);
        }
    }
}

/// Window parameters passed to [`Backend::create_window`]
#[derive(Debug, Clone, Copy)]
pub struct WindowDesc<'a> {
    pub width: u32,
    pub height: u32,
    pub title: &'a str,
    pub hints: &'a BTreeMap<WindowHint, i32>,
}

impl WindowDesc<'_> {
    pub fn hint(&self, hint: WindowHint) -> Option<i32> {
        self.hints.get(&hint).copied()
    }

    /// Boolean hint, `default` when absent
    pub fn flag(&self, hint: WindowHint, default: bool) -> bool {
        self.hint(hint).map_or(default, |v| v != 0)
    }
}

/// Window system, graphics context and GUI backend layers behind one object.
///
/// Methods are listed in the order the harness calls them during
/// construction, per frame, and at teardown.
pub trait Backend {
    /// Install the error callback. Called before anything else.
    fn set_error_callback(&mut self, callback: ErrorCallback);

    /// Initialize the windowing library
    fn init(&mut self) -> Result<(), BackendError>;

    /// Create the main window honoring `desc.hints`
    fn create_window(&mut self, desc: &WindowDesc<'_>) -> Result<(), BackendError>;

    fn set_key_callback(&mut self, callback: KeyCallback);
    fn set_framebuffer_size_callback(&mut self, callback: FramebufferSizeCallback);
    fn set_close_callback(&mut self, callback: CloseCallback);

    /// Make the main window's graphics context current on this thread
    fn make_current(&mut self) -> Result<(), BackendError>;

    fn set_swap_interval(&mut self, interval: u32) -> Result<(), BackendError>;

    /// Load graphics functions for the current context
    fn load_gl(&mut self) -> Result<(), BackendError>;

    /// Initialize the GUI input/platform layer for the main window
    fn init_platform(&mut self, imgui: &mut Context) -> Result<(), BackendError>;

    /// Initialize the GUI renderer layer
    fn init_renderer(
        &mut self,
        imgui: &mut Context,
        glsl: &GlslVersion,
    ) -> Result<(), BackendError>;

    /// Seconds since the windowing library was initialized
    fn time(&self) -> f64;

    fn disable_depth_test(&mut self);

    fn renderer_new_frame(&mut self) -> Result<(), BackendError>;

    /// Feed display size, delta time and input state into the GUI context
    fn platform_new_frame(&mut self, imgui: &mut Context, delta: f32);

    /// Clear the main framebuffer's color buffer
    fn clear(&mut self, color: [f32; 4]);

    /// Called after the update hook, before the frame is finalized
    fn end_frame(&mut self, _ui: &Ui) {}

    fn render_draw_data(&mut self, draw_data: &DrawData) -> Result<(), BackendError>;

    /// Update and render secondary platform windows
    fn render_platform_windows(&mut self, imgui: &mut Context) -> Result<(), BackendError>;

    fn swap_buffers(&mut self) -> Result<(), BackendError>;

    /// Process pending window-system events, firing the registered callbacks
    fn poll_events(&mut self, imgui: &mut Context);

    fn shutdown_renderer(&mut self, imgui: &mut Context);
    fn shutdown_platform(&mut self, imgui: &mut Context);
    fn destroy_window(&mut self);

    /// Release the windowing library
    fn terminate(&mut self);
}
