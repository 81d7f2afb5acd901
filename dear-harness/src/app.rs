//! Capability dispatch for user objects driven by the frame loop
//!
//! Anything with an update hook can be run: implement [`App`] (only
//! [`App::on_update`] is required), pass a closure, or lend the methods of an
//! unrelated type through [`Hooks`]. Hooks that are absent cost nothing; the
//! empty defaults are inlined away at monomorphization.

use dear_imgui_rs::Ui;

/// Lifecycle hooks invoked by [`run`](crate::run)
pub trait App {
    /// Called once before the first frame
    fn on_create(&mut self) {}

    /// Called once per frame between frame begin and frame end
    fn on_update(&mut self, ui: &Ui, delta: f32);

    /// Called once per frame right after [`App::on_update`], in the same
    /// GUI frame, with the plot context bound to it
    #[cfg(feature = "implot")]
    fn on_plot(&mut self, _ui: &Ui, _plot: &dear_implot::PlotUi<'_>, _delta: f32) {}

    /// Called once after the loop observed the close request
    fn on_close(&mut self) {}
}

impl<F> App for F
where
    F: FnMut(&Ui, f32),
{
    fn on_update(&mut self, ui: &Ui, delta: f32) {
        self(ui, delta)
    }
}

/// An optional create/close hook slot
pub trait LifecycleHook {
    fn call(&mut self);
}

/// Marker for a hook that was not provided
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHook;

impl LifecycleHook for NoHook {
    #[inline(always)]
    fn call(&mut self) {}
}

impl<F> LifecycleHook for F
where
    F: FnMut(),
{
    fn call(&mut self) {
        self()
    }
}

/// Capability descriptor assembled from closures.
///
/// The update hook is required by construction; create and close hooks are
/// added with [`Hooks::on_create`] and [`Hooks::on_close`].
///
/// ```no_run
/// # use dear_harness::Hooks;
/// let hooks = Hooks::new(|ui: &dear_harness::imgui::Ui, _dt: f32| {
///     ui.text("hello");
/// })
/// .on_close(|| println!("bye"));
/// # let _ = hooks;
/// ```
pub struct Hooks<U, C = NoHook, X = NoHook> {
    update: U,
    create: C,
    close: X,
}

impl<U> Hooks<U>
where
    U: FnMut(&Ui, f32),
{
    pub fn new(update: U) -> Self {
        Self {
            update,
            create: NoHook,
            close: NoHook,
        }
    }
}

impl<U, C, X> Hooks<U, C, X> {
    pub fn on_create<F: FnMut()>(self, create: F) -> Hooks<U, F, X> {
        Hooks {
            update: self.update,
            create,
            close: self.close,
        }
    }

    pub fn on_close<F: FnMut()>(self, close: F) -> Hooks<U, C, F> {
        Hooks {
            update: self.update,
            create: self.create,
            close,
        }
    }
}

impl<U, C, X> App for Hooks<U, C, X>
where
    U: FnMut(&Ui, f32),
    C: LifecycleHook,
    X: LifecycleHook,
{
    fn on_create(&mut self) {
        self.create.call();
    }

    fn on_update(&mut self, ui: &Ui, delta: f32) {
        (self.update)(ui, delta)
    }

    fn on_close(&mut self) {
        self.close.call();
    }
}
