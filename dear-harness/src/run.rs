//! Frame loop driver

use tracing::{info, trace};

use crate::app::App;
use crate::context::{Harness, Live, take_platform_error};
use crate::error::HarnessResult;

/// Run `app` on `harness` until the close condition is set.
///
/// The create hook runs once before the first frame and the close hook once
/// after the loop observed the close request. Each frame:
///
/// 1. delta time since the previous frame (the first frame measures from
///    backend initialization)
/// 2. renderer, platform and GUI frame begin, in that order
/// 3. clear to the configured color
/// 4. update hook
/// 5. finalize the GUI frame and submit its draw data
/// 6. secondary platform windows, when the config enables multi-viewport,
///    then the main context is made current again
/// 7. present and pump window-system events
///
/// Errors from the backend or from the window system's error callback end
/// the run immediately; the close hook is not called in that case.
pub fn run<A: App + ?Sized>(harness: &Harness, app: &mut A) -> HarnessResult<()> {
    let mut live = harness.live()?;
    let clear_color = harness.config().clear_color;
    let multi_viewport = harness.config().multi_viewport;

    app.on_create();

    let mut previous = 0.0_f64;
    let mut frames = 0_u64;
    live.backend.disable_depth_test();
    info!("entering frame loop");

    while !harness.should_close() {
        let now = live.backend.time();
        let delta = (now - previous) as f32;
        previous = now;

        live.frame(app, delta, clear_color, multi_viewport)?;
        take_platform_error()?;
        frames += 1;
        trace!(frame = frames, delta, "frame presented");
    }

    info!(frames, "frame loop finished");
    app.on_close();
    Ok(())
}

impl Live {
    fn frame<A: App + ?Sized>(
        &mut self,
        app: &mut A,
        delta: f32,
        clear_color: [f32; 4],
        multi_viewport: bool,
    ) -> HarnessResult<()> {
        let Live {
            backend,
            imgui,
            #[cfg(feature = "implot")]
            plot,
        } = self;

        backend.renderer_new_frame()?;
        backend.platform_new_frame(imgui, delta);
        let ui = imgui.frame();

        backend.clear(clear_color);
        app.on_update(ui, delta);
        #[cfg(feature = "implot")]
        app.on_plot(ui, &plot.get_plot_ui(ui), delta);
        backend.end_frame(ui);

        let draw_data = imgui.render();
        backend.render_draw_data(draw_data)?;

        if multi_viewport {
            backend.render_platform_windows(imgui)?;
            backend.make_current()?;
        }

        backend.swap_buffers()?;
        backend.poll_events(imgui);
        Ok(())
    }
}
