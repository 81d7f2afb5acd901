#![cfg(feature = "implot")]

mod common;

use std::ffi::c_void;
use std::mem::ManuallyDrop;

use common::{closing_after, create, test_guard};
use dear_harness::imgui::Ui;
use dear_harness::implot::{PlotContext, PlotUi};
use dear_harness::{App, Call, HarnessConfig};

// `PlotContext::current` hands out an owning wrapper; never let it drop.
fn current_plot_context() -> Option<*mut c_void> {
    PlotContext::current().map(|ctx| {
        let ctx = ManuallyDrop::new(ctx);
        unsafe { ctx.raw() }.cast::<c_void>()
    })
}

#[derive(Default)]
struct Plotter {
    updates: u32,
    plots: u32,
    contexts: Vec<Option<*mut c_void>>,
}

impl App for Plotter {
    fn on_update(&mut self, _ui: &Ui, _delta: f32) {
        self.updates += 1;
    }

    fn on_plot(&mut self, _ui: &Ui, _plot: &PlotUi<'_>, _delta: f32) {
        assert_eq!(self.plots + 1, self.updates);
        self.plots += 1;
        self.contexts.push(current_plot_context());
    }
}

#[test]
fn plot_hook_follows_every_update() {
    let _guard = test_guard();
    let (backend, _) = closing_after(3);
    let harness = create(HarnessConfig::default(), backend);
    let mut app = Plotter::default();

    harness.run(&mut app).unwrap();

    assert_eq!((app.updates, app.plots), (3, 3));
    let first = app.contexts[0];
    assert!(first.is_some());
    assert!(app.contexts.iter().all(|ctx| *ctx == first));

    harness.destroy().unwrap();
}

#[test]
fn destroy_releases_the_plot_context() {
    let _guard = test_guard();
    let (backend, journal) = closing_after(1);
    let harness = create(HarnessConfig::default(), backend);
    assert!(current_plot_context().is_some());
    journal.clear();

    harness.destroy().unwrap();

    assert!(current_plot_context().is_none());
    assert_eq!(
        journal.calls(),
        vec![
            Call::ShutdownRenderer,
            Call::ShutdownPlatform,
            Call::DestroyWindow,
            Call::Terminate,
        ]
    );
}

#[test]
fn recreated_harness_gets_a_fresh_plot_context() {
    let _guard = test_guard();
    let (backend, _) = closing_after(1);
    create(HarnessConfig::default(), backend).destroy().unwrap();

    let (backend, _) = closing_after(2);
    let harness = create(HarnessConfig::default(), backend);
    let mut app = Plotter::default();
    harness.run(&mut app).unwrap();

    assert_eq!(app.plots, 2);
    assert!(app.contexts.iter().all(Option::is_some));
    harness.destroy().unwrap();
}
