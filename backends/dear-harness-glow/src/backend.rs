use std::cell::RefCell;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use dear_harness::imgui::render::DrawData;
use dear_harness::imgui::{ConfigFlags, Context, Ui};
use dear_harness::{
    Backend, BackendError, Callbacks, CloseCallback, ErrorCallback, FramebufferSizeCallback,
    GlslVersion, KeyCallback, Viewport, WindowDesc,
};
use dear_imgui_glow::GlowRenderer;
use dear_imgui_glow::glow::{self, HasContext};
#[cfg(feature = "multi-viewport")]
use dear_imgui_winit::multi_viewport;
use dear_imgui_winit::{HiDpiMode, WinitPlatform};
use glutin::config::{Config, GlConfig};
use glutin::context::{
    ContextAttributesBuilder, NotCurrentGlContext, PossiblyCurrentContext,
    PossiblyCurrentGlContext,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use raw_window_handle::HasWindowHandle;
use tracing::{debug, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::{hints, keys};

// winit allows one event loop per process, so it outlives individual
// harness instances and is handed back on terminate.
thread_local! {
    static EVENT_LOOP: RefCell<Option<EventLoop<()>>> = const { RefCell::new(None) };
}

// Upper bound on pumps while waiting for the platform to resume the app.
const RESUME_ATTEMPTS: usize = 64;

struct GlWindow {
    // Field order is drop order: surface and context go before the window.
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    config: Config,
    window: Window,
}

/// winit + glutin + glow backend
///
/// Windowing runs on winit's pump API so the harness keeps control of the
/// frame loop; Dear ImGui input goes through `dear-imgui-winit` and
/// rendering through `dear-imgui-glow`.
pub struct GlowBackend {
    event_loop: Option<EventLoop<()>>,
    started: Option<Instant>,
    callbacks: Callbacks,
    window: Option<GlWindow>,
    srgb: Option<bool>,
    // Loaded GL functions, waiting for the renderer to take ownership
    gl: Option<glow::Context>,
    platform: Option<WinitPlatform>,
    renderer: Option<GlowRenderer>,
    // Secondary platform windows are driven by Dear ImGui
    #[cfg_attr(not(feature = "multi-viewport"), allow(dead_code))]
    viewports: bool,
    pending: Vec<(WindowId, WindowEvent)>,
}

impl Default for GlowBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GlowBackend {
    pub fn new() -> Self {
        Self {
            event_loop: None,
            started: None,
            callbacks: Callbacks::default(),
            window: None,
            srgb: None,
            gl: None,
            platform: None,
            renderer: None,
            viewports: false,
            pending: Vec::new(),
        }
    }

    /// The main window, once created
    pub fn window(&self) -> Option<&Window> {
        self.window.as_ref().map(|w| &w.window)
    }

    fn gl_window(&self) -> Result<&GlWindow, BackendError> {
        self.window
            .as_ref()
            .ok_or_else(|| BackendError::Context("no window".to_string()))
    }

    fn gl_context(&self) -> Option<&glow::Context> {
        self.renderer
            .as_ref()
            .and_then(|r| r.gl_context())
            .map(|gl| gl.as_ref())
    }

    fn pump<A: ApplicationHandler>(&mut self, handler: &mut A) -> PumpStatus {
        match self.event_loop.as_mut() {
            Some(event_loop) => event_loop.pump_app_events(Some(Duration::ZERO), handler),
            None => PumpStatus::Continue,
        }
    }

    fn resize_surface(&self, width: u32, height: u32) {
        let (Some(gl_window), Some(width), Some(height)) = (
            self.window.as_ref(),
            NonZeroU32::new(width),
            NonZeroU32::new(height),
        ) else {
            return;
        };
        gl_window
            .surface
            .resize(&gl_window.context, width, height);
    }

    fn dispatch(&mut self, imgui: &mut Context, id: WindowId, event: WindowEvent) {
        let Some(gl_window) = self.window.as_ref() else {
            return;
        };
        if id != gl_window.window.id() {
            self.route_to_viewport(imgui, id, event);
            return;
        }
        if let Some(platform) = self.platform.as_mut() {
            let wrapped: Event<()> = Event::WindowEvent {
                window_id: id,
                event: event.clone(),
            };
            platform.handle_event(imgui, &gl_window.window, &wrapped);
        }

        let callbacks = self.callbacks;
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(key) = keys::translate(&event) {
                    callbacks.key(key);
                }
            }
            WindowEvent::Resized(size) => {
                self.resize_surface(size.width, size.height);
                callbacks.framebuffer_size(self, size.width, size.height);
            }
            WindowEvent::CloseRequested => callbacks.close(),
            _ => {}
        }
    }

    // Input for a secondary viewport window goes to Dear ImGui only.
    #[cfg(feature = "multi-viewport")]
    fn route_to_viewport(&self, imgui: &mut Context, id: WindowId, event: WindowEvent) {
        if self.viewports {
            let event: Event<()> = Event::WindowEvent {
                window_id: id,
                event,
            };
            multi_viewport::route_event_to_viewports(imgui, &event);
        }
    }

    #[cfg(not(feature = "multi-viewport"))]
    fn route_to_viewport(&self, _imgui: &mut Context, _id: WindowId, _event: WindowEvent) {}
}

/// Whether the GUI context asks for secondary platform windows and this
/// build can provide them
pub(crate) fn viewports_requested(imgui: &Context) -> bool {
    cfg!(feature = "multi-viewport")
        && imgui
            .io()
            .config_flags()
            .contains(ConfigFlags::VIEWPORTS_ENABLE)
}

impl Viewport for GlowBackend {
    fn set_viewport(&mut self, width: u32, height: u32) {
        if let Some(gl) = self.gl_context() {
            unsafe { gl.viewport(0, 0, width as i32, height as i32) };
        }
    }
}

impl Backend for GlowBackend {
    fn set_error_callback(&mut self, callback: ErrorCallback) {
        self.callbacks.error = Some(callback);
    }

    fn init(&mut self) -> Result<(), BackendError> {
        let event_loop = match EVENT_LOOP.with(|slot| slot.borrow_mut().take()) {
            Some(event_loop) => event_loop,
            None => EventLoop::new().map_err(|e| BackendError::Init(e.to_string()))?,
        };
        self.event_loop = Some(event_loop);
        self.started = Some(Instant::now());
        debug!("event loop ready");
        Ok(())
    }

    fn create_window(&mut self, desc: &WindowDesc<'_>) -> Result<(), BackendError> {
        let mut pump = Pump::creating(
            hints::window_attributes(desc),
            hints::config_template(desc),
            ContextRequest {
                api: hints::context_api(desc),
                profile: hints::gl_profile(desc),
            },
        );

        for _ in 0..RESUME_ATTEMPTS {
            if let PumpStatus::Exit(code) = self.pump(&mut pump) {
                return Err(BackendError::Window(format!(
                    "event loop exited with code {code} before the window opened"
                )));
            }
            if pump.created.is_some() {
                break;
            }
        }

        let (window, config, context) = match pump.created.take() {
            Some(created) => created?,
            None => {
                return Err(BackendError::Window(
                    "the platform never resumed the application".to_string(),
                ));
            }
        };
        self.pending = pump.events;

        let size = window.inner_size();
        let handle = window
            .window_handle()
            .map_err(|e| BackendError::Surface(e.to_string()))?
            .as_raw();
        self.srgb = hints::srgb(desc);
        let attrs = SurfaceAttributesBuilder::<WindowSurface>::new()
            .with_srgb(self.srgb)
            .build(
                handle,
                NonZeroU32::new(size.width.max(1)).unwrap_or(NonZeroU32::MIN),
                NonZeroU32::new(size.height.max(1)).unwrap_or(NonZeroU32::MIN),
            );
        let surface = unsafe { config.display().create_window_surface(&config, &attrs) }
            .map_err(|e| BackendError::Surface(e.to_string()))?;
        let context = context
            .make_current(&surface)
            .map_err(|e| BackendError::Context(e.to_string()))?;

        info!(
            width = size.width,
            height = size.height,
            samples = config.num_samples(),
            "window created"
        );
        self.window = Some(GlWindow {
            surface,
            context,
            config,
            window,
        });
        Ok(())
    }

    fn set_key_callback(&mut self, callback: KeyCallback) {
        self.callbacks.key = Some(callback);
    }

    fn set_framebuffer_size_callback(&mut self, callback: FramebufferSizeCallback) {
        self.callbacks.framebuffer_size = Some(callback);
    }

    fn set_close_callback(&mut self, callback: CloseCallback) {
        self.callbacks.close = Some(callback);
    }

    fn make_current(&mut self) -> Result<(), BackendError> {
        let gl_window = self.gl_window()?;
        gl_window
            .context
            .make_current(&gl_window.surface)
            .map_err(|e| BackendError::Context(e.to_string()))
    }

    fn set_swap_interval(&mut self, interval: u32) -> Result<(), BackendError> {
        let gl_window = self.gl_window()?;
        let interval = match NonZeroU32::new(interval) {
            Some(n) => SwapInterval::Wait(n),
            None => SwapInterval::DontWait,
        };
        gl_window
            .surface
            .set_swap_interval(&gl_window.context, interval)
            .map_err(|e| BackendError::Context(e.to_string()))
    }

    fn load_gl(&mut self) -> Result<(), BackendError> {
        let gl_window = self.gl_window()?;
        let display = gl_window.config.display();
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name).cast())
        };
        let version = gl.version();
        if version.major == 0 {
            return Err(BackendError::Loader(
                "no OpenGL functions could be loaded".to_string(),
            ));
        }
        debug!(major = version.major, minor = version.minor, "OpenGL functions loaded");
        self.gl = Some(gl);
        Ok(())
    }

    fn init_platform(&mut self, imgui: &mut Context) -> Result<(), BackendError> {
        let viewports = viewports_requested(imgui);
        let gl_window = self.gl_window()?;
        let mut platform = WinitPlatform::new(imgui);
        platform.attach_window(&gl_window.window, HiDpiMode::Default, imgui);

        #[cfg(feature = "multi-viewport")]
        if viewports {
            multi_viewport::init_multi_viewport_support(imgui, &gl_window.window);
            debug!("platform viewport support installed");
        } else {
            // The winit layer turns viewports on whenever it is built with them.
            let io = imgui.io_mut();
            let mut flags = io.config_flags();
            flags.remove(ConfigFlags::VIEWPORTS_ENABLE);
            io.set_config_flags(flags);
        }

        self.viewports = viewports;
        self.platform = Some(platform);
        Ok(())
    }

    fn init_renderer(
        &mut self,
        imgui: &mut Context,
        glsl: &GlslVersion,
    ) -> Result<(), BackendError> {
        let gl = self
            .gl
            .take()
            .ok_or_else(|| BackendError::Renderer("OpenGL functions not loaded".to_string()))?;
        let mut renderer =
            GlowRenderer::new(gl, imgui).map_err(|e| BackendError::Renderer(e.to_string()))?;
        if self.srgb == Some(true) {
            renderer.set_framebuffer_srgb_enabled(true);
        }
        #[cfg(feature = "multi-viewport")]
        if self.viewports {
            dear_imgui_glow::multi_viewport::init_multi_viewport_support(imgui);
            debug!("renderer viewport support installed");
        }
        // GlowRenderer picks its shader header from the live context; the
        // configured version only gates construction.
        debug!(glsl = %glsl, "renderer ready");
        self.renderer = Some(renderer);
        Ok(())
    }

    fn time(&self) -> f64 {
        self.started
            .map_or(0.0, |started| started.elapsed().as_secs_f64())
    }

    fn disable_depth_test(&mut self) {
        if let Some(gl) = self.gl_context() {
            unsafe { gl.disable(glow::DEPTH_TEST) };
        }
    }

    fn renderer_new_frame(&mut self) -> Result<(), BackendError> {
        match self.renderer.as_mut() {
            Some(renderer) => renderer
                .new_frame()
                .map_err(|e| BackendError::Renderer(e.to_string())),
            None => Err(BackendError::Renderer("renderer not initialized".to_string())),
        }
    }

    fn platform_new_frame(&mut self, imgui: &mut Context, delta: f32) {
        if let (Some(platform), Some(gl_window)) = (self.platform.as_mut(), self.window.as_ref()) {
            platform.prepare_frame(&gl_window.window, imgui);
        }
        if delta > 0.0 {
            imgui.io_mut().set_delta_time(delta);
        }
    }

    fn clear(&mut self, color: [f32; 4]) {
        if let Some(gl) = self.gl_context() {
            unsafe {
                gl.clear_color(color[0], color[1], color[2], color[3]);
                gl.clear(glow::COLOR_BUFFER_BIT);
            }
        }
    }

    fn end_frame(&mut self, ui: &Ui) {
        if let (Some(platform), Some(gl_window)) = (self.platform.as_mut(), self.window.as_ref()) {
            platform.prepare_render_with_ui(ui, &gl_window.window);
        }
    }

    fn render_draw_data(&mut self, draw_data: &DrawData) -> Result<(), BackendError> {
        match self.renderer.as_mut() {
            Some(renderer) => renderer
                .render(draw_data)
                .map_err(|e| BackendError::Renderer(e.to_string())),
            None => Err(BackendError::Renderer("renderer not initialized".to_string())),
        }
    }

    // Secondary windows are created through the active event loop, which
    // only exists while winit is pumping.
    #[cfg(feature = "multi-viewport")]
    fn render_platform_windows(&mut self, imgui: &mut Context) -> Result<(), BackendError> {
        if !self.viewports {
            return Ok(());
        }
        let mut pump = ViewportPump {
            imgui,
            rendered: false,
            events: Vec::new(),
        };
        let status = self.pump(&mut pump);
        if !pump.rendered {
            tracing::trace!("no event loop iteration completed; platform windows wait a frame");
        }
        self.pending.extend(pump.events);

        if let PumpStatus::Exit(code) = status {
            if code != 0 {
                self.callbacks.error(code, "event loop exited unexpectedly");
            }
            self.callbacks.close();
        }
        Ok(())
    }

    #[cfg(not(feature = "multi-viewport"))]
    fn render_platform_windows(&mut self, _imgui: &mut Context) -> Result<(), BackendError> {
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<(), BackendError> {
        let gl_window = self.gl_window()?;
        gl_window
            .surface
            .swap_buffers(&gl_window.context)
            .map_err(|e| BackendError::Surface(e.to_string()))
    }

    fn poll_events(&mut self, imgui: &mut Context) {
        let mut pump = Pump::polling();
        let status = self.pump(&mut pump);

        let mut events = std::mem::take(&mut self.pending);
        events.extend(pump.events);
        for (id, event) in events {
            self.dispatch(imgui, id, event);
        }

        if let PumpStatus::Exit(code) = status {
            if code != 0 {
                self.callbacks
                    .error(code, "event loop exited unexpectedly");
            }
            self.callbacks.close();
        }
    }

    fn shutdown_renderer(&mut self, imgui: &mut Context) {
        if self.renderer.is_some() && self.make_current().is_err() {
            warn!("could not make the context current; GL objects may leak");
        }
        #[cfg(feature = "multi-viewport")]
        if self.viewports && self.renderer.is_some() {
            dear_imgui_glow::multi_viewport::shutdown_multi_viewport_support(imgui);
        }
        #[cfg(not(feature = "multi-viewport"))]
        let _ = imgui;
        self.renderer = None;
        self.gl = None;
    }

    fn shutdown_platform(&mut self, _imgui: &mut Context) {
        #[cfg(feature = "multi-viewport")]
        if self.viewports {
            multi_viewport::shutdown_multi_viewport_support();
            debug!("platform windows destroyed");
        }
        self.viewports = false;
        self.platform = None;
    }

    fn destroy_window(&mut self) {
        if self.window.take().is_some() {
            debug!("window destroyed");
        }
        self.pending.clear();
    }

    fn terminate(&mut self) {
        if let Some(event_loop) = self.event_loop.take() {
            EVENT_LOOP.with(|slot| *slot.borrow_mut() = Some(event_loop));
        }
        self.started = None;
    }
}

struct ContextRequest {
    api: glutin::context::ContextApi,
    profile: Option<glutin::context::GlProfile>,
}

type Created = Result<(Window, Config, glutin::context::NotCurrentContext), BackendError>;

/// Event-loop handler for one pump
struct Pump {
    request: Option<(WindowAttributes, glutin::config::ConfigTemplateBuilder, ContextRequest)>,
    created: Option<Created>,
    events: Vec<(WindowId, WindowEvent)>,
}

impl Pump {
    fn creating(
        attributes: WindowAttributes,
        template: glutin::config::ConfigTemplateBuilder,
        context: ContextRequest,
    ) -> Self {
        Self {
            request: Some((attributes, template, context)),
            created: None,
            events: Vec::new(),
        }
    }

    fn polling() -> Self {
        Self {
            request: None,
            created: None,
            events: Vec::new(),
        }
    }
}

/// Event-loop handler that updates and renders the secondary platform windows
#[cfg(feature = "multi-viewport")]
struct ViewportPump<'a> {
    imgui: &'a mut Context,
    rendered: bool,
    events: Vec<(WindowId, WindowEvent)>,
}

#[cfg(feature = "multi-viewport")]
impl ApplicationHandler for ViewportPump<'_> {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        self.events.push((id, event));
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.rendered {
            return;
        }
        multi_viewport::set_event_loop(event_loop);
        self.imgui.update_platform_windows();
        self.imgui.render_platform_windows_default();
        self.rendered = true;
    }
}

impl ApplicationHandler for Pump {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Some((attributes, template, context)) = self.request.take() {
            self.created = Some(open_window(event_loop, attributes, template, context));
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        self.events.push((id, event));
    }
}

fn open_window(
    event_loop: &ActiveEventLoop,
    attributes: WindowAttributes,
    template: glutin::config::ConfigTemplateBuilder,
    request: ContextRequest,
) -> Created {
    let (window, config) = glutin_winit::DisplayBuilder::new()
        .with_window_attributes(Some(attributes))
        .build(event_loop, template, |configs| {
            configs
                .reduce(|best, c| if c.num_samples() > best.num_samples() { c } else { best })
                .expect("no GL config matches the requested hints")
        })
        .map_err(|e| BackendError::Window(e.to_string()))?;
    let window =
        window.ok_or_else(|| BackendError::Window("no window was created".to_string()))?;

    let handle = window
        .window_handle()
        .map_err(|e| BackendError::Window(e.to_string()))?
        .as_raw();
    let mut attrs = ContextAttributesBuilder::new().with_context_api(request.api);
    if let Some(profile) = request.profile {
        attrs = attrs.with_profile(profile);
    }
    let context = unsafe { config.display().create_context(&config, &attrs.build(Some(handle))) }
        .map_err(|e| BackendError::Context(e.to_string()))?;
    Ok((window, config, context))
}
