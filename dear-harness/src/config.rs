//! Configuration record consumed by [`Harness::create`](crate::Harness::create)

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use bitflags::bitflags;
use dear_imgui_rs::{ConfigFlags, Key};

use crate::backend::KeyCallback;
use crate::error::{HarnessError, HarnessResult};
use crate::theme::Theme;

/// Window and graphics-context hints understood by backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WindowHint {
    ContextVersionMajor,
    ContextVersionMinor,
    /// One of [`hint::ANY_PROFILE`], [`hint::CORE_PROFILE`], [`hint::COMPAT_PROFILE`]
    OpenGlProfile,
    /// One of [`hint::OPENGL_API`], [`hint::OPENGL_ES_API`]
    ClientApi,
    /// Number of MSAA samples, 0 disables multisampling
    Samples,
    Resizable,
    Visible,
    Decorated,
    Maximized,
    Transparent,
    DoubleBuffer,
    SrgbCapable,
}

/// Integer values for [`WindowHint`] entries
pub mod hint {
    pub const FALSE: i32 = 0;
    pub const TRUE: i32 = 1;

    pub const ANY_PROFILE: i32 = 0;
    pub const CORE_PROFILE: i32 = 1;
    pub const COMPAT_PROFILE: i32 = 2;

    pub const OPENGL_API: i32 = 0;
    pub const OPENGL_ES_API: i32 = 1;
}

bitflags! {
    /// GUI features switched on at construction
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FeatureFlags: u32 {
        const DOCKING = 1 << 0;
        const NAV_KEYBOARD = 1 << 1;
        const NAV_GAMEPAD = 1 << 2;
        const NO_MOUSE = 1 << 3;
        const NO_MOUSE_CURSOR_CHANGE = 1 << 4;
        const IS_SRGB = 1 << 5;
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        FeatureFlags::DOCKING
    }
}

impl FeatureFlags {
    /// Translate into the GUI backend's config flags
    pub fn to_config_flags(self) -> ConfigFlags {
        let mut flags = ConfigFlags::empty();
        if self.contains(FeatureFlags::DOCKING) {
            flags.insert(ConfigFlags::DOCKING_ENABLE);
        }
        if self.contains(FeatureFlags::NAV_KEYBOARD) {
            flags.insert(ConfigFlags::NAV_ENABLE_KEYBOARD);
        }
        if self.contains(FeatureFlags::NAV_GAMEPAD) {
            flags.insert(ConfigFlags::NAV_ENABLE_GAMEPAD);
        }
        if self.contains(FeatureFlags::NO_MOUSE) {
            flags.insert(ConfigFlags::NO_MOUSE);
        }
        if self.contains(FeatureFlags::NO_MOUSE_CURSOR_CHANGE) {
            flags.insert(ConfigFlags::NO_MOUSE_CURSOR_CHANGE);
        }
        if self.contains(FeatureFlags::IS_SRGB) {
            flags.insert(ConfigFlags::IS_SRGB);
        }
        flags
    }
}

/// Shader-language version handed to the renderer backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlslVersion {
    pub version_string: String,
}

impl GlslVersion {
    pub fn as_str(&self) -> &str {
        &self.version_string
    }
}

impl fmt::Display for GlslVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version_string)
    }
}

/// Everything the harness needs to open its window
///
/// The record is plain data; nothing is validated until it reaches
/// [`Harness::create`](crate::Harness::create).
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub window_title: String,
    pub window_hints: BTreeMap<WindowHint, i32>,
    /// 0 disables vsync, 1 waits for every vertical blank
    pub swap_interval: u32,
    pub exit_key: Key,
    /// Installed instead of the exit-key handler when set
    pub custom_key_callback: Option<KeyCallback>,
    pub theme: Theme,
    pub features: FeatureFlags,
    /// Let GUI windows be dragged out of the main window
    pub multi_viewport: bool,
    pub clear_color: [f32; 4],
    /// `None` disables settings persistence
    pub ini_filename: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        let mut window_hints = BTreeMap::new();
        window_hints.insert(WindowHint::ContextVersionMajor, 3);
        window_hints.insert(WindowHint::ContextVersionMinor, 3);
        window_hints.insert(WindowHint::OpenGlProfile, hint::CORE_PROFILE);

        Self {
            window_width: 800,
            window_height: 600,
            window_title: "Dear ImGui harness".to_string(),
            window_hints,
            swap_interval: 1,
            exit_key: Key::Escape,
            custom_key_callback: None,
            theme: Theme::Classic,
            features: FeatureFlags::default(),
            multi_viewport: false,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            ini_filename: None,
        }
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    /// Insert or replace a single hint
    pub fn with_hint(mut self, hint: WindowHint, value: i32) -> Self {
        self.window_hints.insert(hint, value);
        self
    }

    pub fn with_gl_version(self, major: i32, minor: i32) -> Self {
        self.with_hint(WindowHint::ContextVersionMajor, major)
            .with_hint(WindowHint::ContextVersionMinor, minor)
    }

    pub fn with_swap_interval(mut self, interval: u32) -> Self {
        self.swap_interval = interval;
        self
    }

    pub fn with_exit_key(mut self, key: Key) -> Self {
        self.exit_key = key;
        self
    }

    pub fn with_key_callback(mut self, callback: KeyCallback) -> Self {
        self.custom_key_callback = Some(callback);
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    pub fn with_multi_viewport(mut self, enable: bool) -> Self {
        self.multi_viewport = enable;
        self
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_ini_filename(mut self, path: impl Into<PathBuf>) -> Self {
        self.ini_filename = Some(path.into());
        self
    }

    /// GUI config flags implied by `features` and `multi_viewport`
    pub fn config_flags(&self) -> ConfigFlags {
        let mut flags = self.features.to_config_flags();
        if self.multi_viewport {
            flags.insert(ConfigFlags::VIEWPORTS_ENABLE);
        }
        flags
    }

    /// Derive the renderer's `#version` line from the context hints
    pub fn glsl_version(&self) -> HarnessResult<GlslVersion> {
        let major = self.required_hint(WindowHint::ContextVersionMajor)?;
        let minor = self.required_hint(WindowHint::ContextVersionMinor)?;
        let es = self.window_hints.get(&WindowHint::ClientApi) == Some(&hint::OPENGL_ES_API);
        let core = self.window_hints.get(&WindowHint::OpenGlProfile) == Some(&hint::CORE_PROFILE);

        let version_string = if es {
            match major {
                3 => "#version 300 es".to_string(),
                2 => "#version 100".to_string(),
                _ => return Err(unsupported(major, minor, "OpenGL ES")),
            }
        } else {
            match (major, minor) {
                (2, 0) => "#version 110".to_string(),
                (2, 1) => "#version 120".to_string(),
                (3, 0) => "#version 130".to_string(),
                (3, 1) => "#version 140".to_string(),
                (3, 2..=3) | (4, 0..=6) => {
                    let number = if (major, minor) == (3, 2) {
                        150
                    } else {
                        major * 100 + minor * 10
                    };
                    if core {
                        format!("#version {number} core")
                    } else {
                        format!("#version {number}")
                    }
                }
                _ => return Err(unsupported(major, minor, "OpenGL")),
            }
        };

        Ok(GlslVersion { version_string })
    }

    fn required_hint(&self, hint: WindowHint) -> HarnessResult<i32> {
        self.window_hints
            .get(&hint)
            .copied()
            .ok_or_else(|| HarnessError::InvalidHints(format!("missing {hint:?}")))
    }
}

fn unsupported(major: i32, minor: i32, api: &str) -> HarnessError {
    HarnessError::InvalidHints(format!("unsupported {api} version {major}.{minor}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hints_target_gl33_core() {
        let glsl = HarnessConfig::default().glsl_version().unwrap();
        assert_eq!(glsl.as_str(), "#version 330 core");
    }

    #[test]
    fn compat_profile_drops_core_suffix() {
        let cfg = HarnessConfig::default()
            .with_gl_version(4, 1)
            .with_hint(WindowHint::OpenGlProfile, hint::COMPAT_PROFILE);
        assert_eq!(cfg.glsl_version().unwrap().as_str(), "#version 410");
    }

    #[test]
    fn legacy_and_es_versions() {
        let gl32 = HarnessConfig::default().with_gl_version(3, 2);
        assert_eq!(gl32.glsl_version().unwrap().as_str(), "#version 150 core");

        let gl21 = HarnessConfig::default().with_gl_version(2, 1);
        assert_eq!(gl21.glsl_version().unwrap().as_str(), "#version 120");

        let es3 = HarnessConfig::default()
            .with_gl_version(3, 0)
            .with_hint(WindowHint::ClientApi, hint::OPENGL_ES_API);
        assert_eq!(es3.glsl_version().unwrap().as_str(), "#version 300 es");
    }

    #[test]
    fn malformed_hints_fail_fast() {
        let mut cfg = HarnessConfig::default();
        cfg.window_hints.remove(&WindowHint::ContextVersionMinor);
        assert!(matches!(
            cfg.glsl_version(),
            Err(HarnessError::InvalidHints(_))
        ));

        let cfg = HarnessConfig::default().with_gl_version(3, 7);
        assert!(matches!(
            cfg.glsl_version(),
            Err(HarnessError::InvalidHints(_))
        ));

        let cfg = HarnessConfig::default().with_gl_version(12, 0);
        assert!(cfg.glsl_version().is_err());
    }

    #[test]
    fn defaults_describe_a_minimal_window() {
        let cfg = HarnessConfig::default();
        assert_eq!((cfg.window_width, cfg.window_height), (800, 600));
        assert_eq!(cfg.swap_interval, 1);
        assert_eq!(cfg.exit_key, Key::Escape);
        assert_eq!(cfg.theme, Theme::Classic);
        assert_eq!(cfg.features, FeatureFlags::DOCKING);
        assert!(!cfg.multi_viewport);
        assert!(cfg.custom_key_callback.is_none());
    }

    #[test]
    fn viewport_flag_follows_multi_viewport() {
        let flags = HarnessConfig::default().with_multi_viewport(true).config_flags();
        assert!(flags.contains(ConfigFlags::VIEWPORTS_ENABLE));
        assert!(flags.contains(ConfigFlags::DOCKING_ENABLE));

        let flags = HarnessConfig::default().config_flags();
        assert!(!flags.contains(ConfigFlags::VIEWPORTS_ENABLE));
    }
}
