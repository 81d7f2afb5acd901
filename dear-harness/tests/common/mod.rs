#![allow(dead_code)]

use std::sync::{Mutex, MutexGuard, OnceLock};

use dear_harness::{Call, Harness, HarnessConfig, HeadlessBackend, HeadlessEvent, Journal, KeyEvent};
use dear_harness::imgui::Key;

/// The GUI context is process-global; tests that create a harness run one at a time.
pub fn test_guard() -> MutexGuard<'static, ()> {
    static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    GUARD
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn backend() -> (HeadlessBackend, Journal) {
    let journal = Journal::new();
    let backend = HeadlessBackend::new().with_journal(journal.clone());
    (backend, journal)
}

pub fn escape() -> HeadlessEvent {
    HeadlessEvent::Key(KeyEvent::press(Key::Escape))
}

/// Backend that requests close after `frames` event pumps
pub fn closing_after(frames: usize) -> (HeadlessBackend, Journal) {
    let (mut backend, journal) = backend();
    for _ in 1..frames {
        backend = backend.then_poll(Vec::new());
    }
    (backend.then_poll(vec![escape()]), journal)
}

pub fn create(config: HarnessConfig, backend: HeadlessBackend) -> Harness {
    Harness::create(config, backend).expect("headless harness")
}

pub fn count(journal: &Journal, call: Call) -> usize {
    journal.count(|c| *c == call)
}

pub fn is_frame_call(call: &Call) -> bool {
    matches!(call, Call::PlatformNewFrame(_))
}
