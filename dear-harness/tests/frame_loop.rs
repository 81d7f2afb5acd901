mod common;

use std::cell::Cell;

use common::{backend, closing_after, count, create, escape, is_frame_call, test_guard};
use dear_harness::imgui::{Key, Ui};
use dear_harness::{
    App, Call, Harness, HarnessConfig, HarnessError, HeadlessEvent, Hooks, KeyEvent,
};

#[derive(Default)]
struct Counter {
    created: u32,
    updated: u32,
    closed: u32,
    updated_after_close: bool,
}

impl App for Counter {
    fn on_create(&mut self) {
        self.created += 1;
    }

    fn on_update(&mut self, ui: &Ui, _delta: f32) {
        if self.closed > 0 {
            self.updated_after_close = true;
        }
        self.updated += 1;
        ui.text(format!("frame {}", self.updated));
    }

    fn on_close(&mut self) {
        self.closed += 1;
    }
}

#[test]
fn hooks_fire_once_around_every_frame() {
    let _guard = test_guard();
    let (backend, journal) = closing_after(3);
    let harness = create(HarnessConfig::default(), backend);
    let mut app = Counter::default();

    harness.run(&mut app).unwrap();

    assert_eq!(app.created, 1);
    assert_eq!(app.updated, 3);
    assert_eq!(app.closed, 1);
    assert!(!app.updated_after_close);
    assert_eq!(journal.count(is_frame_call), 3);
    assert_eq!(count(&journal, Call::SwapBuffers), 3);
    assert_eq!(count(&journal, Call::DisableDepthTest), 1);

    harness.destroy().unwrap();
}

#[test]
fn escape_on_first_frame_runs_exactly_one_iteration() {
    let _guard = test_guard();
    let (backend, journal) = backend();
    let backend = backend.then_poll(vec![escape()]);
    let config = HarnessConfig::default()
        .with_size(520, 650)
        .with_title("Hello")
        .with_exit_key(Key::Escape);
    let harness = create(config, backend);
    let mut app = Counter::default();

    harness.run(&mut app).unwrap();

    assert_eq!(app.updated, 1);
    assert!(harness.should_close());
    assert!(journal.contains(&Call::CreateWindow {
        width: 520,
        height: 650,
        title: "Hello".to_string(),
    }));

    harness.destroy().unwrap();
}

#[test]
fn update_only_object_closing_on_first_frame() {
    let _guard = test_guard();
    let (backend, journal) = backend();
    let config = HarnessConfig::default()
        .with_size(520, 650)
        .with_exit_key(Key::Escape);
    let harness = create(config, backend);
    assert_eq!((harness.width(), harness.height()), (520, 650));

    let mut updates = 0;
    harness
        .run(&mut |_: &Ui, _: f32| {
            updates += 1;
            harness.close();
        })
        .unwrap();

    assert_eq!(updates, 1);
    assert_eq!(count(&journal, Call::SwapBuffers), 1);
    harness.destroy().unwrap();
}

#[test]
fn frame_steps_run_in_order() {
    let _guard = test_guard();
    let (backend, journal) = closing_after(1);
    let clear = [0.1, 0.2, 0.3, 1.0];
    let harness = create(HarnessConfig::default().with_clear_color(clear), backend);
    journal.clear();

    harness.run(&mut |_: &Ui, _: f32| {}).unwrap();

    let calls: Vec<Call> = journal
        .calls()
        .into_iter()
        .map(|call| match call {
            Call::PlatformNewFrame(_) => Call::PlatformNewFrame(0.0),
            other => other,
        })
        .collect();
    assert_eq!(
        calls,
        vec![
            Call::DisableDepthTest,
            Call::RendererNewFrame,
            Call::PlatformNewFrame(0.0),
            Call::Clear(clear),
            Call::EndFrame,
            Call::RenderDrawData,
            Call::SwapBuffers,
            Call::PollEvents,
        ]
    );

    harness.destroy().unwrap();
}

#[test]
fn update_hook_sees_positive_deltas_from_the_clock() {
    let _guard = test_guard();
    let (backend, journal) = closing_after(4);
    let harness = create(HarnessConfig::default(), backend.with_time_step(0.25));
    let mut deltas = Vec::new();

    harness
        .run(&mut |_: &Ui, delta: f32| deltas.push(delta))
        .unwrap();

    assert_eq!(deltas, vec![0.25; 4]);
    assert!(journal.contains(&Call::PlatformNewFrame(0.25)));

    harness.destroy().unwrap();
}

#[test]
fn explicit_close_stops_after_the_current_frame() {
    let _guard = test_guard();
    let (backend, _) = backend();
    let harness = create(HarnessConfig::default(), backend);
    let frames = Cell::new(0);

    harness
        .run(&mut |_: &Ui, _: f32| {
            frames.set(frames.get() + 1);
            if frames.get() == 2 {
                harness.close();
            }
        })
        .unwrap();

    assert_eq!(frames.get(), 2);
    harness.destroy().unwrap();
}

#[test]
fn window_close_request_ends_the_loop() {
    let _guard = test_guard();
    let (backend, _) = backend();
    let backend = backend
        .then_poll(Vec::new())
        .then_poll(vec![HeadlessEvent::CloseRequested]);
    let harness = create(HarnessConfig::default(), backend);
    let mut app = Counter::default();

    harness.run(&mut app).unwrap();

    assert_eq!(app.updated, 2);
    assert_eq!(app.closed, 1);
    harness.destroy().unwrap();
}

#[test]
fn other_keys_and_releases_do_not_close() {
    let _guard = test_guard();
    let (backend, _) = backend();
    let backend = backend
        .then_poll(vec![
            HeadlessEvent::Key(KeyEvent::press(Key::A)),
            HeadlessEvent::Key(KeyEvent::release(Key::Escape)),
        ])
        .then_poll(vec![HeadlessEvent::Key(KeyEvent::press(Key::Q))]);
    let harness = create(HarnessConfig::default().with_exit_key(Key::Q), backend);
    let mut app = Counter::default();

    harness.run(&mut app).unwrap();

    assert_eq!(app.updated, 2);
    harness.destroy().unwrap();
}

thread_local! {
    static SEEN: Cell<u32> = const { Cell::new(0) };
}

fn counting_key_callback(_event: KeyEvent) {
    SEEN.with(|seen| seen.set(seen.get() + 1));
    if let Some(harness) = Harness::instance() {
        if SEEN.with(Cell::get) == 2 {
            harness.close();
        }
    }
}

#[test]
fn custom_key_callback_replaces_the_exit_key() {
    let _guard = test_guard();
    let (backend, _) = backend();
    let backend = backend
        .then_poll(vec![escape()])
        .then_poll(vec![escape()]);
    let config = HarnessConfig::default().with_key_callback(counting_key_callback);
    let harness = create(config, backend);
    let mut app = Counter::default();

    harness.run(&mut app).unwrap();

    assert_eq!(app.updated, 2);
    assert_eq!(SEEN.with(Cell::get), 2);
    harness.destroy().unwrap();
}

#[test]
fn resize_updates_size_and_viewport() {
    let _guard = test_guard();
    let (backend, journal) = backend();
    let backend = backend
        .then_poll(vec![HeadlessEvent::Resize(1024, 768)])
        .then_poll(vec![
            HeadlessEvent::Resize(1024, 768),
            escape(),
        ]);
    let harness = create(HarnessConfig::default(), backend);

    harness.run(&mut |_: &Ui, _: f32| {}).unwrap();

    assert_eq!((harness.width(), harness.height()), (1024, 768));
    assert_eq!(count(&journal, Call::SetViewport(1024, 768)), 2);
    let display = harness
        .with_imgui(|ctx| ctx.io().display_size())
        .unwrap();
    assert_eq!(display, [1024.0, 768.0]);

    harness.destroy().unwrap();
}

#[test]
fn platform_error_during_the_loop_ends_the_run() {
    let _guard = test_guard();
    let (backend, _) = backend();
    let backend = backend.then_poll(vec![HeadlessEvent::Error {
        code: 65545,
        description: "context lost".to_string(),
    }]);
    let harness = create(HarnessConfig::default(), backend);
    let mut app = Counter::default();

    let err = harness.run(&mut app).unwrap_err();

    assert!(matches!(err, HarnessError::Platform { code: 65545, .. }));
    assert_eq!(app.updated, 1);
    assert_eq!(app.closed, 0);
    harness.destroy().unwrap();
}

#[test]
fn closure_descriptor_supplies_optional_hooks() {
    let _guard = test_guard();
    let (backend, _) = closing_after(2);
    let harness = create(HarnessConfig::default(), backend);
    let created = Cell::new(0);
    let updated = Cell::new(0);
    let closed = Cell::new(0);

    let mut hooks = Hooks::new(|_: &Ui, _: f32| updated.set(updated.get() + 1))
        .on_create(|| created.set(created.get() + 1))
        .on_close(|| closed.set(closed.get() + 1));
    harness.run(&mut hooks).unwrap();

    assert_eq!((created.get(), updated.get(), closed.get()), (1, 2, 1));
    harness.destroy().unwrap();
}

#[test]
fn run_cannot_be_nested() {
    let _guard = test_guard();
    let (backend, _) = closing_after(1);
    let harness = create(HarnessConfig::default(), backend);
    let mut nested = None;

    harness
        .run(&mut |_: &Ui, _: f32| {
            nested = Some(harness.run(&mut |_: &Ui, _: f32| {}));
        })
        .unwrap();

    assert!(matches!(nested, Some(Err(HarnessError::Reentrant))));
    harness.destroy().unwrap();
}

#[test]
fn a_finished_harness_does_not_run_again() {
    let _guard = test_guard();
    let (backend, _) = closing_after(1);
    let harness = create(HarnessConfig::default(), backend);
    let mut app = Counter::default();

    harness.run(&mut app).unwrap();
    harness.run(&mut app).unwrap();

    assert_eq!(app.updated, 1);
    assert_eq!(app.created, 2);
    assert_eq!(app.closed, 2);
    harness.destroy().unwrap();
}

#[test]
fn multi_viewport_renders_platform_windows_and_restores_the_context() {
    let _guard = test_guard();
    let (backend, journal) = closing_after(1);
    let harness = create(HarnessConfig::default().with_multi_viewport(true), backend);
    journal.clear();

    harness.run(&mut |_: &Ui, _: f32| {}).unwrap();

    let render = journal.position(&Call::RenderPlatformWindows).unwrap();
    let current = journal.position(&Call::MakeCurrent).unwrap();
    let swap = journal.position(&Call::SwapBuffers).unwrap();
    assert!(render < current && current < swap);

    harness.destroy().unwrap();
}

#[test]
fn single_viewport_skips_platform_windows() {
    let _guard = test_guard();
    let (backend, journal) = closing_after(2);
    let harness = create(HarnessConfig::default(), backend);

    harness.run(&mut |_: &Ui, _: f32| {}).unwrap();

    assert_eq!(count(&journal, Call::RenderPlatformWindows), 0);
    harness.destroy().unwrap();
}
