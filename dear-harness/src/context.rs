//! Process-wide context controller
//!
//! [`Harness`] owns the window, the graphics context and the Dear ImGui
//! context. At most one instance is live per process: [`Harness::create`]
//! returns the live instance when there is one, and [`Harness::destroy`]
//! tears it down in reverse construction order.

use std::cell::{Cell, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::thread::{self, ThreadId};

use dear_imgui_rs::{ConfigFlags, Context};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::app::App;
use crate::backend::{Backend, WindowDesc};
use crate::config::{GlslVersion, HarnessConfig};
use crate::error::{BackendError, HarnessError, HarnessResult, InitStage};
use crate::theme::{Theme, apply_theme};

// Thread that owns the live instance, if any. The GUI context and the window
// are not `Send`, so the instance itself lives in a thread-local slot.
static OWNER: Mutex<Option<ThreadId>> = parking_lot::const_mutex(None);

thread_local! {
    static INSTANCE: RefCell<Option<Harness>> = const { RefCell::new(None) };
    static PLATFORM_ERROR: RefCell<Option<(i32, String)>> = const { RefCell::new(None) };
}

pub(crate) struct Live {
    pub(crate) backend: Box<dyn Backend>,
    pub(crate) imgui: Context,
    #[cfg(feature = "implot")]
    pub(crate) plot: dear_implot::PlotContext,
}

impl Live {
    fn teardown(self) {
        let Live {
            mut backend,
            mut imgui,
            #[cfg(feature = "implot")]
            plot,
        } = self;
        backend.shutdown_renderer(&mut imgui);
        debug!("renderer backend shut down");
        backend.shutdown_platform(&mut imgui);
        debug!("platform backend shut down");
        #[cfg(feature = "implot")]
        {
            drop(plot);
            debug!("plot context destroyed");
        }
        drop(imgui);
        debug!("GUI context destroyed");
        backend.destroy_window();
        backend.terminate();
        debug!("window destroyed, backend terminated");
    }
}

struct Shared {
    config: HarnessConfig,
    owner: ThreadId,
    width: Cell<u32>,
    height: Cell<u32>,
    should_close: Cell<bool>,
    theme: Cell<Theme>,
    state: RefCell<Option<Live>>,
}

impl Drop for Shared {
    // The owning thread exited without calling `destroy`.
    fn drop(&mut self) {
        if let Some(live) = self.state.get_mut().take() {
            warn!("harness dropped without destroy; tearing down");
            live.teardown();
            release_owner(self.owner);
        }
    }
}

/// Handle to the live window, graphics context and GUI context.
///
/// Handles are cheap to clone and compare equal when they refer to the same
/// instance.
#[derive(Clone)]
pub struct Harness {
    shared: Rc<Shared>,
}

impl PartialEq for Harness {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for Harness {}

impl fmt::Debug for Harness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("title", &self.shared.config.window_title)
            .field("width", &self.width())
            .field("height", &self.height())
            .field("should_close", &self.should_close())
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl Harness {
    /// Create the process-wide instance, or return the live one.
    ///
    /// The first call opens the window and initializes the graphics and GUI
    /// backends. While that instance is live, later calls return it unchanged
    /// and drop their `config` and `backend` unused.
    pub fn create<B>(config: HarnessConfig, backend: B) -> HarnessResult<Harness>
    where
        B: Backend + 'static,
    {
        if let Some(existing) = Self::instance() {
            debug!(
                ignored_title = %config.window_title,
                "harness already live, returning existing instance"
            );
            return Ok(existing);
        }

        let owner = claim_owner()?;
        match Self::construct(config, Box::new(backend), owner) {
            Ok(harness) => {
                INSTANCE.with(|slot| *slot.borrow_mut() = Some(harness.clone()));
                info!(
                    title = %harness.config().window_title,
                    width = harness.width(),
                    height = harness.height(),
                    "harness created"
                );
                Ok(harness)
            }
            Err(err) => {
                release_owner(owner);
                clear_platform_error();
                Err(err)
            }
        }
    }

    /// The live instance on this thread, if any.
    ///
    /// This is the access path for window-system callbacks, which cannot be
    /// handed any context. Everything else receives the handle explicitly.
    pub fn instance() -> Option<Harness> {
        INSTANCE.with(|slot| slot.borrow().clone())
    }

    /// Tear the instance down: renderer, platform layer, plot context (with
    /// the `implot` feature), GUI context, window, windowing library.
    ///
    /// A later [`Harness::create`] starts a new instance. Destroying a handle
    /// whose instance is already gone does nothing.
    pub fn destroy(self) -> HarnessResult<()> {
        let live = self
            .shared
            .state
            .try_borrow_mut()
            .map_err(|_| HarnessError::Reentrant)?
            .take();

        INSTANCE.with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.as_ref() == Some(&self) {
                *slot = None;
            }
        });

        let Some(live) = live else {
            debug!("harness already destroyed");
            return Ok(());
        };

        live.teardown();
        release_owner(self.shared.owner);
        clear_platform_error();
        info!(title = %self.shared.config.window_title, "harness destroyed");
        Ok(())
    }

    /// The configuration this instance was created from
    pub fn config(&self) -> &HarnessConfig {
        &self.shared.config
    }

    /// Current framebuffer width as last reported by the window system
    pub fn width(&self) -> u32 {
        self.shared.width.get()
    }

    /// Current framebuffer height as last reported by the window system
    pub fn height(&self) -> u32 {
        self.shared.height.get()
    }

    /// Ask the frame loop to stop after the current frame
    pub fn close(&self) {
        self.shared.should_close.set(true);
    }

    pub fn should_close(&self) -> bool {
        self.shared.should_close.get()
    }

    pub fn is_alive(&self) -> bool {
        self.shared
            .state
            .try_borrow()
            .map_or(true, |state| state.is_some())
    }

    /// Switch the GUI color theme; the last call wins
    pub fn set_theme(&self, theme: Theme) -> HarnessResult<()> {
        if !self.is_alive() {
            return Err(HarnessError::Destroyed);
        }
        apply_theme(theme);
        self.shared.theme.set(theme);
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        self.shared.theme.get()
    }

    /// Access the GUI context between runs, e.g. to load fonts
    pub fn with_imgui<R>(&self, f: impl FnOnce(&mut Context) -> R) -> HarnessResult<R> {
        let mut live = self.live()?;
        Ok(f(&mut live.imgui))
    }

    /// Drive `app` until the close condition is observed
    pub fn run<A: App + ?Sized>(&self, app: &mut A) -> HarnessResult<()> {
        crate::run::run(self, app)
    }

    pub(crate) fn live(&self) -> HarnessResult<RefMut<'_, Live>> {
        let state = self
            .shared
            .state
            .try_borrow_mut()
            .map_err(|_| HarnessError::Reentrant)?;
        RefMut::filter_map(state, |state| state.as_mut()).map_err(|_| HarnessError::Destroyed)
    }

    fn construct(
        config: HarnessConfig,
        mut backend: Box<dyn Backend>,
        owner: ThreadId,
    ) -> HarnessResult<Harness> {
        let glsl = config.glsl_version()?;
        clear_platform_error();

        let mut reached = None;
        if let Err(err) = open_window(&config, backend.as_mut(), &mut reached) {
            unwind_window(backend.as_mut(), reached);
            return Err(err);
        }

        let mut imgui = create_gui_context(&config);
        #[cfg(feature = "implot")]
        let plot = match create_plot_context(&imgui, &mut reached) {
            Ok(plot) => plot,
            Err(err) => {
                drop(imgui);
                unwind_window(backend.as_mut(), reached);
                return Err(err);
            }
        };
        if let Err(err) = attach_gui_backends(&glsl, backend.as_mut(), &mut imgui, &mut reached) {
            if reached >= Some(InitStage::PlatformBackend) {
                backend.shutdown_platform(&mut imgui);
            }
            #[cfg(feature = "implot")]
            drop(plot);
            drop(imgui);
            unwind_window(backend.as_mut(), reached);
            return Err(err);
        }

        Ok(Harness {
            shared: Rc::new(Shared {
                owner,
                width: Cell::new(config.window_width),
                height: Cell::new(config.window_height),
                should_close: Cell::new(false),
                theme: Cell::new(config.theme),
                state: RefCell::new(Some(Live {
                    backend,
                    imgui,
                    #[cfg(feature = "implot")]
                    plot,
                })),
                config,
            }),
        })
    }

    fn record_size(&self, width: u32, height: u32) {
        self.shared.width.set(width);
        self.shared.height.set(height);
    }
}

fn open_window(
    config: &HarnessConfig,
    backend: &mut dyn Backend,
    reached: &mut Option<InitStage>,
) -> HarnessResult<()> {
    backend.set_error_callback(callbacks::error);
    step(InitStage::BackendInit, backend.init(), reached)?;

    let desc = WindowDesc {
        width: config.window_width,
        height: config.window_height,
        title: &config.window_title,
        hints: &config.window_hints,
    };
    step(
        InitStage::WindowCreation,
        backend.create_window(&desc),
        reached,
    )?;
    backend.set_key_callback(config.custom_key_callback.unwrap_or(callbacks::key));
    backend.set_framebuffer_size_callback(callbacks::framebuffer_size);
    backend.set_close_callback(callbacks::close);

    step(
        InitStage::ContextActivation,
        backend.make_current(),
        reached,
    )?;
    step(
        InitStage::SwapInterval,
        backend.set_swap_interval(config.swap_interval),
        reached,
    )?;
    step(InitStage::GraphicsLoader, backend.load_gl(), reached)
}

fn create_gui_context(config: &HarnessConfig) -> Context {
    let mut imgui = Context::create();
    let _ = imgui.set_ini_filename(config.ini_filename.clone());
    apply_theme(config.theme);

    let io = imgui.io_mut();
    let merged = io.config_flags().bits() | config.config_flags().bits();
    io.set_config_flags(ConfigFlags::from_bits_retain(merged));
    debug!(theme = ?config.theme, multi_viewport = config.multi_viewport, "GUI context created");
    imgui
}

#[cfg(feature = "implot")]
fn create_plot_context(
    imgui: &Context,
    reached: &mut Option<InitStage>,
) -> HarnessResult<dear_implot::PlotContext> {
    let plot = dear_implot::PlotContext::try_create(imgui).map_err(|e| {
        HarnessError::Construction {
            stage: InitStage::PlotContext,
            source: BackendError::Extension(e.to_string()),
        }
    })?;
    *reached = Some(InitStage::PlotContext);
    debug!(stage = %InitStage::PlotContext, "done");
    Ok(plot)
}

fn attach_gui_backends(
    glsl: &GlslVersion,
    backend: &mut dyn Backend,
    imgui: &mut Context,
    reached: &mut Option<InitStage>,
) -> HarnessResult<()> {
    step(
        InitStage::PlatformBackend,
        backend.init_platform(imgui),
        reached,
    )?;
    step(
        InitStage::RendererBackend,
        backend.init_renderer(imgui, glsl),
        reached,
    )
}

fn step(
    stage: InitStage,
    result: Result<(), BackendError>,
    reached: &mut Option<InitStage>,
) -> HarnessResult<()> {
    result.map_err(|source| HarnessError::Construction { stage, source })?;
    *reached = Some(stage);
    debug!(%stage, "done");
    take_platform_error()
}

fn unwind_window(backend: &mut dyn Backend, reached: Option<InitStage>) {
    if reached >= Some(InitStage::WindowCreation) {
        backend.destroy_window();
    }
    if reached >= Some(InitStage::BackendInit) {
        backend.terminate();
    }
}

fn claim_owner() -> HarnessResult<ThreadId> {
    let current = thread::current().id();
    let mut owner = OWNER.lock();
    match *owner {
        Some(id) if id != current => Err(HarnessError::ForeignThread),
        _ => {
            *owner = Some(current);
            Ok(current)
        }
    }
}

fn release_owner(thread: ThreadId) {
    let mut owner = OWNER.lock();
    if *owner == Some(thread) {
        *owner = None;
    }
}

/// Surface an error stored by the error callback since the last check
pub(crate) fn take_platform_error() -> HarnessResult<()> {
    let pending = PLATFORM_ERROR
        .try_with(|slot| slot.borrow_mut().take())
        .ok()
        .flatten();
    match pending {
        Some((code, description)) => Err(HarnessError::Platform { code, description }),
        None => Ok(()),
    }
}

fn clear_platform_error() {
    let _ = PLATFORM_ERROR.try_with(|slot| slot.borrow_mut().take());
}

/// Default window-system callbacks installed by [`Harness::create`]
mod callbacks {
    use super::{Harness, PLATFORM_ERROR};
    use crate::backend::{KeyAction, KeyEvent, Viewport};

    pub(super) fn key(event: KeyEvent) {
        let Some(harness) = Harness::instance() else {
            return;
        };
        if event.key == harness.config().exit_key && event.action == KeyAction::Press {
            harness.close();
        }
    }

    pub(super) fn framebuffer_size(viewport: &mut dyn Viewport, width: u32, height: u32) {
        let Some(harness) = Harness::instance() else {
            return;
        };
        harness.record_size(width, height);
        viewport.set_viewport(width, height);
    }

    pub(super) fn close() {
        if let Some(harness) = Harness::instance() {
            harness.close();
        }
    }

    // Never unwinds into the backend: the error is parked and picked up by
    // the harness once the backend call returns. The first error wins.
    pub(super) fn error(code: i32, description: &str) {
        PLATFORM_ERROR.with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.is_none() {
                *slot = Some((code, description.to_string()));
            }
        });
    }
}
