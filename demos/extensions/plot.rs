//! ImPlot through the plot hook: a live sine trace next to its controls.

#[path = "../support/mod.rs"]
mod support;

use dear_harness::imgui::{Condition, Ui};
use dear_harness::implot::PlotUi;
use dear_harness::{App, HarnessConfig};

struct Scope {
    time: f64,
    frequency: f32,
    paused: bool,
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl Scope {
    fn new() -> Self {
        Self {
            time: 0.0,
            frequency: 1.0,
            paused: false,
            xs: Vec::new(),
            ys: Vec::new(),
        }
    }
}

impl App for Scope {
    fn on_update(&mut self, ui: &Ui, delta: f32) {
        if !self.paused {
            self.time += f64::from(delta);
        }
        ui.window("Controls")
            .size([260.0, 100.0], Condition::FirstUseEver)
            .build(|| {
                ui.text(format!("frequency: {:.2} Hz", self.frequency));
                if ui.button("slower") {
                    self.frequency = (self.frequency * 0.5).max(0.125);
                }
                ui.same_line();
                if ui.button("faster") {
                    self.frequency = (self.frequency * 2.0).min(8.0);
                }
                ui.checkbox("paused", &mut self.paused);
            });

        let frequency = f64::from(self.frequency);
        self.xs = (0..256).map(|i| i as f64 / 64.0).collect();
        self.ys = self
            .xs
            .iter()
            .map(|x| (std::f64::consts::TAU * frequency * (x + self.time)).sin())
            .collect();
    }

    fn on_plot(&mut self, ui: &Ui, plot: &PlotUi<'_>, _delta: f32) {
        ui.window("Scope")
            .size([480.0, 320.0], Condition::FirstUseEver)
            .build(|| {
                if let Some(_token) = plot.begin_plot("sine") {
                    plot.plot_line("signal", &self.xs, &self.ys);
                }
            });
    }
}

fn main() {
    support::init_tracing();

    let config = HarnessConfig::default()
        .with_size(960, 600)
        .with_title("Plot hook");

    let harness = match dear_harness_glow::create(config) {
        Ok(harness) => harness,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut scope = Scope::new();
    if let Err(e) = harness.run(&mut scope).and_then(|()| harness.destroy()) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
