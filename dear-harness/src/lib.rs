//! dear-harness: window, context and frame-loop harness for dear-imgui-rs
//!
//! The harness owns one window, its graphics context and the Dear ImGui
//! context, and drives a user object through a fixed frame sequence until the
//! window is asked to close.
//!
//! - [`HarnessConfig`]: window size, title, context hints, swap interval,
//!   exit key, theme and GUI feature flags
//! - [`Harness`]: the process-wide instance, created once and torn down in
//!   reverse order
//! - [`App`]: the hooks a user object may provide; only the update hook is
//!   required
//! - [`Backend`]: the window-system and graphics seam. `dear-harness-glow`
//!   provides winit + glutin + glow; [`HeadlessBackend`] runs without a
//!   display
//!
//! Features
//! - `multi-viewport`: update and render secondary platform windows when
//!   [`HarnessConfig::multi_viewport`] is set
//! - `implot`: create an ImPlot context with the GUI context and hand it to
//!   `App::on_plot` every frame
//!
//! Quickstart
//! ```no_run
//! use dear_harness::imgui::{Condition, Key, Ui};
//! use dear_harness::{Harness, HarnessConfig, HeadlessBackend, HeadlessEvent, KeyEvent};
//!
//! fn main() -> Result<(), dear_harness::HarnessError> {
//!     let config = HarnessConfig::default().with_size(520, 650).with_title("Hello");
//!     // Headless: Escape is "pressed" during the first event pump.
//!     let backend = HeadlessBackend::new()
//!         .then_poll(vec![HeadlessEvent::Key(KeyEvent::press(Key::Escape))]);
//!     let harness = Harness::create(config, backend)?;
//!     harness.run(&mut |ui: &Ui, _dt: f32| {
//!         ui.window("Hello")
//!             .size([300.0, 120.0], Condition::FirstUseEver)
//!             .build(|| ui.text("Hello from dear-harness!"));
//!     })?;
//!     harness.destroy()
//! }
//! ```

pub use dear_imgui_rs as imgui;
#[cfg(feature = "implot")]
pub use dear_implot as implot;

mod app;
mod backend;
mod config;
mod context;
mod error;
mod headless;
mod run;
mod theme;

pub use app::{App, Hooks, LifecycleHook, NoHook};
pub use backend::{
    Backend, Callbacks, CloseCallback, ErrorCallback, FramebufferSizeCallback, KeyAction,
    KeyCallback, KeyEvent, Viewport, WindowDesc,
};
pub use config::{FeatureFlags, GlslVersion, HarnessConfig, WindowHint, hint};
pub use context::Harness;
pub use error::{BackendError, HarnessError, HarnessResult, InitStage};
pub use headless::{Call, HeadlessBackend, HeadlessEvent, Journal};
pub use run::run;
pub use theme::Theme;
