//! OpenGL backend for dear-harness
//!
//! [`GlowBackend`] opens the window with winit, creates the OpenGL context
//! with glutin and renders Dear ImGui through `dear-imgui-glow`. Window-system
//! events are pumped once per frame, so the harness owns the loop.
//!
//! ```no_run
//! use dear_harness::imgui::{Condition, Ui};
//! use dear_harness::HarnessConfig;
//!
//! fn main() -> Result<(), dear_harness::HarnessError> {
//!     let harness = dear_harness_glow::create(HarnessConfig::default().with_title("Hello"))?;
//!     harness.run(&mut |ui: &Ui, _dt: f32| {
//!         ui.window("Hello")
//!             .size([300.0, 120.0], Condition::FirstUseEver)
//!             .build(|| ui.text("Press Escape to quit"));
//!     })?;
//!     harness.destroy()
//! }
//! ```
//!
//! Window hints map onto winit window attributes (resizable, visible,
//! decorated, maximized, transparent) and glutin context attributes (client
//! API, version, profile, samples, double buffering, sRGB).

mod backend;
pub mod hints;
pub mod keys;

pub use backend::GlowBackend;

use dear_harness::{Harness, HarnessConfig, HarnessResult};

/// Create the process-wide harness on a [`GlowBackend`]
pub fn create(config: HarnessConfig) -> HarnessResult<Harness> {
    Harness::create(config, GlowBackend::new())
}
