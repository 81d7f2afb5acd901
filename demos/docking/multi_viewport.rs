//! Docking with multi-viewport: windows dragged outside the main window get
//! their own platform window.

#[path = "../support/mod.rs"]
mod support;

use dear_harness::imgui::{Condition, Ui};
use dear_harness::{FeatureFlags, Hooks, HarnessConfig};

fn main() {
    support::init_tracing_dev();

    let config = HarnessConfig::default()
        .with_title("Multi-viewport")
        .with_size(1280, 720)
        .with_features(FeatureFlags::DOCKING | FeatureFlags::NAV_KEYBOARD)
        .with_multi_viewport(true);

    let harness = match dear_harness_glow::create(config) {
        Ok(harness) => harness,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut frames = 0_u64;
    let mut hooks = Hooks::new(|ui: &Ui, _dt: f32| {
        frames += 1;
        ui.window("Drag me outside")
            .size([300.0, 120.0], Condition::FirstUseEver)
            .build(|| ui.text(format!("frames: {frames}")));
    })
    .on_close(|| tracing::info!("multi-viewport demo closing"));

    if let Err(e) = harness.run(&mut hooks).and_then(|()| harness.destroy()) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
