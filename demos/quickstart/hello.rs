//! Smallest harness program: one window, Escape closes it.

#[path = "../support/mod.rs"]
mod support;

use dear_harness::HarnessConfig;
use dear_harness::imgui::{Condition, Key, Ui};

fn main() {
    support::init_tracing();

    let config = HarnessConfig::default()
        .with_size(520, 650)
        .with_title("Hello, dear-harness")
        .with_exit_key(Key::Escape);

    let harness = match dear_harness_glow::create(config) {
        Ok(harness) => harness,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut checked = false;
    let result = harness.run(&mut |ui: &Ui, delta: f32| {
        ui.window("Hello")
            .size([320.0, 140.0], Condition::FirstUseEver)
            .build(|| {
                ui.text("Press Escape to quit.");
                ui.text(format!("frame time: {:.2} ms", delta * 1000.0));
                ui.checkbox("A checkbox", &mut checked);
            });
    });

    if let Err(e) = result.and_then(|()| harness.destroy()) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
