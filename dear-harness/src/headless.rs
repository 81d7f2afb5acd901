//! A backend without a display
//!
//! [`HeadlessBackend`] drives a real Dear ImGui context but replaces the
//! window system with a script: events queued per event pump, a clock that
//! advances by a fixed step on every query, and an optional failure injected
//! at a construction stage. Every backend call is appended to a shared
//! [`Journal`], so the call order stays observable after the backend has been
//! moved into a [`Harness`](crate::Harness).

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use dear_imgui_rs::render::DrawData;
use dear_imgui_rs::{BackendFlags, Context};

use crate::backend::{
    Backend, Callbacks, CloseCallback, ErrorCallback, FramebufferSizeCallback, KeyCallback,
    KeyEvent, Viewport, WindowDesc,
};
use crate::config::GlslVersion;
use crate::error::{BackendError, InitStage};

/// A backend call as recorded by [`HeadlessBackend`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetErrorCallback,
    Init,
    CreateWindow {
        width: u32,
        height: u32,
        title: String,
    },
    SetKeyCallback,
    SetFramebufferSizeCallback,
    SetCloseCallback,
    MakeCurrent,
    SwapInterval(u32),
    LoadGl,
    InitPlatform,
    InitRenderer(String),
    DisableDepthTest,
    RendererNewFrame,
    PlatformNewFrame(f32),
    Clear([f32; 4]),
    EndFrame,
    RenderDrawData,
    RenderPlatformWindows,
    SwapBuffers,
    PollEvents,
    SetViewport(u32, u32),
    ShutdownRenderer,
    ShutdownPlatform,
    DestroyWindow,
    Terminate,
}

/// Shared, append-only log of backend calls
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Call>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn contains(&self, call: &Call) -> bool {
        self.0.borrow().contains(call)
    }

    /// Position of the first recorded `call`
    pub fn position(&self, call: &Call) -> Option<usize> {
        self.0.borrow().iter().position(|c| c == call)
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// A scripted window-system event
#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessEvent {
    Key(KeyEvent),
    Resize(u32, u32),
    CloseRequested,
    Error { code: i32, description: String },
}

/// Display-less [`Backend`] driven by a script
#[derive(Debug)]
pub struct HeadlessBackend {
    journal: Journal,
    script: VecDeque<Vec<HeadlessEvent>>,
    fail_at: Option<InitStage>,
    init_error: Option<(i32, String)>,
    callbacks: Callbacks,
    time_step: f64,
    clock: Cell<f64>,
    window: Option<(u32, u32)>,
    viewport: (u32, u32),
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            journal: Journal::new(),
            script: VecDeque::new(),
            fail_at: None,
            init_error: None,
            callbacks: Callbacks::default(),
            time_step: 1.0 / 60.0,
            clock: Cell::new(0.0),
            window: None,
            viewport: (0, 0),
        }
    }

    /// Record calls into `journal`
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Seconds the clock advances per [`Backend::time`] query
    pub fn with_time_step(mut self, step: f64) -> Self {
        self.time_step = step;
        self
    }

    /// Fail the backend call belonging to `stage`
    pub fn fail_at(mut self, stage: InitStage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    /// Report `code`/`description` through the error callback during `init`
    pub fn with_init_error(mut self, code: i32, description: impl Into<String>) -> Self {
        self.init_error = Some((code, description.into()));
        self
    }

    /// Queue the events delivered by the next unscripted event pump
    pub fn then_poll(mut self, events: Vec<HeadlessEvent>) -> Self {
        self.script.push_back(events);
        self
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    fn check(&self, stage: InitStage) -> Result<(), BackendError> {
        if self.fail_at != Some(stage) {
            return Ok(());
        }
        let message = format!("injected failure at {stage}");
        Err(match stage {
            InitStage::BackendInit => BackendError::Init(message),
            InitStage::WindowCreation => BackendError::Window(message),
            InitStage::ContextActivation | InitStage::SwapInterval => {
                BackendError::Context(message)
            }
            InitStage::GraphicsLoader => BackendError::Loader(message),
            InitStage::PlatformBackend => BackendError::Platform(message),
            InitStage::RendererBackend => BackendError::Renderer(message),
        })
    }

    fn dispatch(&mut self, event: HeadlessEvent) {
        let callbacks = self.callbacks;
        match event {
            HeadlessEvent::Key(key) => callbacks.key(key),
            HeadlessEvent::Resize(width, height) => {
                self.window = Some((width, height));
                callbacks.framebuffer_size(self, width, height);
            }
            HeadlessEvent::CloseRequested => callbacks.close(),
            HeadlessEvent::Error { code, description } => callbacks.error(code, &description),
        }
    }
}

impl Viewport for HeadlessBackend {
    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.journal.push(Call::SetViewport(width, height));
    }
}

impl Backend for HeadlessBackend {
    fn set_error_callback(&mut self, callback: ErrorCallback) {
        self.callbacks.error = Some(callback);
        self.journal.push(Call::SetErrorCallback);
    }

    fn init(&mut self) -> Result<(), BackendError> {
        self.journal.push(Call::Init);
        self.check(InitStage::BackendInit)?;
        if let Some((code, description)) = self.init_error.take() {
            self.callbacks.error(code, &description);
        }
        self.clock.set(0.0);
        Ok(())
    }

    fn create_window(&mut self, desc: &WindowDesc<'_>) -> Result<(), BackendError> {
        self.journal.push(Call::CreateWindow {
            width: desc.width,
            height: desc.height,
            title: desc.title.to_string(),
        });
        self.check(InitStage::WindowCreation)?;
        self.window = Some((desc.width, desc.height));
        self.viewport = (desc.width, desc.height);
        Ok(())
    }

    fn set_key_callback(&mut self, callback: KeyCallback) {
        self.callbacks.key = Some(callback);
        self.journal.push(Call::SetKeyCallback);
    }

    fn set_framebuffer_size_callback(&mut self, callback: FramebufferSizeCallback) {
        self.callbacks.framebuffer_size = Some(callback);
        self.journal.push(Call::SetFramebufferSizeCallback);
    }

    fn set_close_callback(&mut self, callback: CloseCallback) {
        self.callbacks.close = Some(callback);
        self.journal.push(Call::SetCloseCallback);
    }

    fn make_current(&mut self) -> Result<(), BackendError> {
        self.journal.push(Call::MakeCurrent);
        self.check(InitStage::ContextActivation)
    }

    fn set_swap_interval(&mut self, interval: u32) -> Result<(), BackendError> {
        self.journal.push(Call::SwapInterval(interval));
        self.check(InitStage::SwapInterval)
    }

    fn load_gl(&mut self) -> Result<(), BackendError> {
        self.journal.push(Call::LoadGl);
        self.check(InitStage::GraphicsLoader)
    }

    fn init_platform(&mut self, imgui: &mut Context) -> Result<(), BackendError> {
        self.journal.push(Call::InitPlatform);
        self.check(InitStage::PlatformBackend)?;
        let (width, height) = self.window.unwrap_or_default();
        let io = imgui.io_mut();
        io.set_display_size([width as f32, height as f32]);
        io.set_delta_time(self.time_step as f32);
        let mut flags = io.backend_flags();
        flags.insert(BackendFlags::HAS_MOUSE_CURSORS);
        io.set_backend_flags(flags);
        Ok(())
    }

    fn init_renderer(
        &mut self,
        imgui: &mut Context,
        glsl: &GlslVersion,
    ) -> Result<(), BackendError> {
        self.journal.push(Call::InitRenderer(glsl.to_string()));
        self.check(InitStage::RendererBackend)?;
        let _ = imgui.font_atlas_mut().build();
        Ok(())
    }

    fn time(&self) -> f64 {
        let now = self.clock.get() + self.time_step;
        self.clock.set(now);
        now
    }

    fn disable_depth_test(&mut self) {
        self.journal.push(Call::DisableDepthTest);
    }

    fn renderer_new_frame(&mut self) -> Result<(), BackendError> {
        self.journal.push(Call::RendererNewFrame);
        Ok(())
    }

    fn platform_new_frame(&mut self, imgui: &mut Context, delta: f32) {
        self.journal.push(Call::PlatformNewFrame(delta));
        let (width, height) = self.window.unwrap_or_default();
        let io = imgui.io_mut();
        io.set_display_size([width as f32, height as f32]);
        // The GUI core rejects non-positive frame times.
        io.set_delta_time(if delta > 0.0 {
            delta
        } else {
            self.time_step as f32
        });
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.journal.push(Call::Clear(color));
    }

    fn end_frame(&mut self, _ui: &dear_imgui_rs::Ui) {
        self.journal.push(Call::EndFrame);
    }

    fn render_draw_data(&mut self, _draw_data: &DrawData) -> Result<(), BackendError> {
        self.journal.push(Call::RenderDrawData);
        Ok(())
    }

    fn render_platform_windows(&mut self, _imgui: &mut Context) -> Result<(), BackendError> {
        self.journal.push(Call::RenderPlatformWindows);
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<(), BackendError> {
        self.journal.push(Call::SwapBuffers);
        Ok(())
    }

    fn poll_events(&mut self, _imgui: &mut Context) {
        self.journal.push(Call::PollEvents);
        for event in self.script.pop_front().unwrap_or_default() {
            self.dispatch(event);
        }
    }

    fn shutdown_renderer(&mut self, _imgui: &mut Context) {
        self.journal.push(Call::ShutdownRenderer);
    }

    fn shutdown_platform(&mut self, _imgui: &mut Context) {
        self.journal.push(Call::ShutdownPlatform);
    }

    fn destroy_window(&mut self) {
        self.journal.push(Call::DestroyWindow);
        self.window = None;
    }

    fn terminate(&mut self) {
        self.journal.push(Call::Terminate);
    }
}
