//! All three lifecycle hooks on a user type, plus menu-driven close and theme
//! switching. F1 toggles the Dear ImGui demo window.

#[path = "../support/mod.rs"]
mod support;

use dear_harness::imgui::{Condition, Key, Ui, WindowFlags};
use dear_harness::{App, FeatureFlags, Harness, HarnessConfig, Theme, WindowHint, hint};
use tracing::info;

struct Device {
    name: &'static str,
    kind: &'static str,
    natural_scroll: bool,
    left_handed: bool,
}

struct Devices {
    harness: Harness,
    devices: Vec<Device>,
    selected: usize,
    profile: usize,
    accent: [f32; 4],
    show_demo: bool,
}

impl Devices {
    fn new(harness: Harness) -> Self {
        Self {
            harness,
            devices: Vec::new(),
            selected: 0,
            profile: 0,
            accent: [0.0; 4],
            show_demo: false,
        }
    }

    fn refresh(&mut self) {
        self.devices = vec![
            Device {
                name: "Built-in keyboard",
                kind: "keyboard",
                natural_scroll: false,
                left_handed: false,
            },
            Device {
                name: "Touchpad",
                kind: "touchpad",
                natural_scroll: true,
                left_handed: false,
            },
            Device {
                name: "Pen tablet",
                kind: "tablet_tool",
                natural_scroll: false,
                left_handed: false,
            },
        ];
        self.selected = 0;
    }

    fn menu_bar(&self, ui: &Ui) {
        let Some(_bar) = ui.begin_main_menu_bar() else {
            return;
        };
        if let Some(_menu) = ui.begin_menu("File") {
            if ui.menu_item("Exit") {
                self.harness.close();
            }
        }
        if let Some(_menu) = ui.begin_menu("Theme") {
            for (label, theme) in [
                ("Classic", Theme::Classic),
                ("Light", Theme::Light),
                ("Dark", Theme::Dark),
            ] {
                if ui.menu_item(label) {
                    let _ = self.harness.set_theme(theme);
                }
            }
        }
    }
}

impl App for Devices {
    fn on_create(&mut self) {
        self.refresh();
        self.accent = [0.26, 0.59, 0.98, 1.0];
        info!(devices = self.devices.len(), "device list loaded");
    }

    fn on_update(&mut self, ui: &Ui, _delta: f32) {
        self.menu_bar(ui);

        let viewport = ui.main_viewport();
        let flags = WindowFlags::NO_DECORATION | WindowFlags::NO_MOVE | WindowFlags::NO_SAVED_SETTINGS;
        ui.window("Input devices")
            .position(viewport.work_pos(), Condition::Always)
            .size(viewport.size(), Condition::Always)
            .flags(flags)
            .build(|| {
                let names: Vec<&str> = self.devices.iter().map(|d| d.name).collect();
                ui.combo_simple_string("Device", &mut self.selected, &names);
                if ui.button("Refresh") {
                    self.refresh();
                }
                ui.separator();

                if let Some(device) = self.devices.get_mut(self.selected) {
                    ui.label_text("Type", device.kind);
                    ui.checkbox("natural_scroll", &mut device.natural_scroll);
                    ui.checkbox("left_handed", &mut device.left_handed);
                }
                ui.combo_simple_string("accel_profile", &mut self.profile, &["adaptive", "flat"]);
                ui.color_edit4("Accent", &mut self.accent);
                ui.separator();
                ui.text("F1: demo window    Esc: quit");
            });

        if ui.is_key_pressed(Key::F1) {
            self.show_demo = !self.show_demo;
        }
        if self.show_demo {
            ui.show_demo_window(&mut self.show_demo);
        }
    }

    fn on_close(&mut self) {
        info!("closing device editor");
    }
}

fn main() {
    support::init_tracing();

    let config = HarnessConfig::default()
        .with_size(520, 650)
        .with_title("Input devices")
        .with_hint(WindowHint::Resizable, hint::FALSE)
        .with_features(FeatureFlags::default() - FeatureFlags::DOCKING);

    let harness = match dear_harness_glow::create(config) {
        Ok(harness) => harness,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut app = Devices::new(harness.clone());
    if let Err(e) = harness.run(&mut app).and_then(|()| harness.destroy()) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
