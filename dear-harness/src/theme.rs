//! Built-in color themes

use dear_imgui_rs::sys;

/// Simple built-in themes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    #[default]
    Classic,
    Light,
    Dark,
}

/// Overwrite the current GUI context's style colors with `theme`.
///
/// Writes the active context's style, so it works between frames as well as
/// from inside a frame.
pub(crate) fn apply_theme(theme: Theme) {
    unsafe {
        match theme {
            Theme::Classic => sys::igStyleColorsClassic(std::ptr::null_mut()),
            Theme::Light => sys::igStyleColorsLight(std::ptr::null_mut()),
            Theme::Dark => sys::igStyleColorsDark(std::ptr::null_mut()),
        }
    }
}
