//! Window hints to winit window attributes and glutin context attributes

use dear_harness::{WindowDesc, WindowHint, hint};
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, GlProfile, Version};
use winit::dpi::LogicalSize;
use winit::window::{Window, WindowAttributes};

pub fn window_attributes(desc: &WindowDesc<'_>) -> WindowAttributes {
    Window::default_attributes()
        .with_title(desc.title)
        .with_inner_size(LogicalSize::new(desc.width as f64, desc.height as f64))
        .with_resizable(desc.flag(WindowHint::Resizable, true))
        .with_visible(desc.flag(WindowHint::Visible, true))
        .with_decorations(desc.flag(WindowHint::Decorated, true))
        .with_maximized(desc.flag(WindowHint::Maximized, false))
        .with_transparent(desc.flag(WindowHint::Transparent, false))
}

pub fn config_template(desc: &WindowDesc<'_>) -> ConfigTemplateBuilder {
    let mut template = ConfigTemplateBuilder::new()
        .with_transparency(desc.flag(WindowHint::Transparent, false))
        .with_single_buffering(!desc.flag(WindowHint::DoubleBuffer, true));
    if let Some(samples) = desc.hint(WindowHint::Samples).filter(|&s| s > 0) {
        template = template.with_multisampling(samples.clamp(1, u8::MAX as i32) as u8);
    }
    template
}

/// Requested client API and version; `None` lets the driver choose
pub fn context_api(desc: &WindowDesc<'_>) -> ContextApi {
    let version = match (
        desc.hint(WindowHint::ContextVersionMajor),
        desc.hint(WindowHint::ContextVersionMinor),
    ) {
        (Some(major), Some(minor)) => u8::try_from(major)
            .ok()
            .zip(u8::try_from(minor).ok())
            .map(|(major, minor)| Version::new(major, minor)),
        _ => None,
    };
    match desc.hint(WindowHint::ClientApi) {
        Some(hint::OPENGL_ES_API) => ContextApi::Gles(version),
        _ => ContextApi::OpenGl(version),
    }
}

pub fn gl_profile(desc: &WindowDesc<'_>) -> Option<GlProfile> {
    match desc.hint(WindowHint::OpenGlProfile)? {
        hint::CORE_PROFILE => Some(GlProfile::Core),
        hint::COMPAT_PROFILE => Some(GlProfile::Compatibility),
        _ => None,
    }
}

pub fn srgb(desc: &WindowDesc<'_>) -> Option<bool> {
    desc.hint(WindowHint::SrgbCapable).map(|v| v != hint::FALSE)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn desc(hints: &BTreeMap<WindowHint, i32>) -> WindowDesc<'_> {
        WindowDesc {
            width: 520,
            height: 650,
            title: "hints",
            hints,
        }
    }

    #[test]
    fn core_33_by_default() {
        let config = dear_harness::HarnessConfig::default();
        let desc = desc(&config.window_hints);
        assert_eq!(context_api(&desc), ContextApi::OpenGl(Some(Version::new(3, 3))));
        assert_eq!(gl_profile(&desc), Some(GlProfile::Core));
        assert_eq!(srgb(&desc), None);
    }

    #[test]
    fn es_and_compat_hints() {
        let mut hints = BTreeMap::new();
        hints.insert(WindowHint::ClientApi, hint::OPENGL_ES_API);
        hints.insert(WindowHint::ContextVersionMajor, 3);
        hints.insert(WindowHint::ContextVersionMinor, 0);
        hints.insert(WindowHint::OpenGlProfile, hint::COMPAT_PROFILE);
        let desc = desc(&hints);
        assert_eq!(context_api(&desc), ContextApi::Gles(Some(Version::new(3, 0))));
        assert_eq!(gl_profile(&desc), Some(GlProfile::Compatibility));
    }

    #[test]
    fn window_flags_follow_hints() {
        let mut hints = BTreeMap::new();
        hints.insert(WindowHint::Resizable, hint::FALSE);
        hints.insert(WindowHint::Decorated, hint::FALSE);
        let attrs = window_attributes(&desc(&hints));
        assert!(!attrs.resizable);
        assert!(!attrs.decorations);
        assert!(attrs.visible);
        assert_eq!(attrs.title, "hints");
    }
}
