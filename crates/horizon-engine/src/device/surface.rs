use winit::dpi::PhysicalSize;

use super::SurfaceErrorAction;

/// Depth format that scene renderers pair with the swapchain.
///
/// Used when resolving the sample count so color and depth attachments agree.
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = preferred.into_iter().find(|f| formats.contains(f)) {
            return Some(f);
        }
    }

    formats.first().copied()
}

pub(crate) fn choose_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| modes.contains(m))
        .or_else(|| modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Picks the highest power-of-two sample count `<= requested` accepted by `supported`.
///
/// A count of 1 is always valid.
pub(crate) fn choose_sample_count(requested: u32, supported: impl Fn(u32) -> bool) -> u32 {
    [16, 8, 4, 2]
        .into_iter()
        .filter(|&n| n <= requested)
        .find(|&n| supported(n))
        .unwrap_or(1)
}

pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    *size = new_size;

    // wgpu rejects 0x0 surfaces; configuration is deferred until the window is visible again.
    if new_size.width == 0 || new_size.height == 0 {
        return;
    }

    config.width = new_size.width;
    config.height = new_size.height;

    surface.configure(device, config);
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if size.width > 0 && size.height > 0 {
                surface.configure(device, config);
            }
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wgpu::TextureFormat as F;

    // ── surface format ────────────────────────────────────────────────────

    #[test]
    fn srgb_preferred_when_available() {
        let formats = [F::Bgra8Unorm, F::Rgba8UnormSrgb];
        assert_eq!(choose_surface_format(&formats, true), Some(F::Rgba8UnormSrgb));
    }

    #[test]
    fn first_format_when_srgb_not_requested() {
        let formats = [F::Bgra8Unorm, F::Rgba8UnormSrgb];
        assert_eq!(choose_surface_format(&formats, false), Some(F::Bgra8Unorm));
    }

    #[test]
    fn no_formats_yields_none() {
        assert_eq!(choose_surface_format(&[], true), None);
    }

    // ── alpha mode ────────────────────────────────────────────────────────

    #[test]
    fn unsupported_alpha_mode_falls_back_to_first() {
        let modes = [wgpu::CompositeAlphaMode::Opaque];
        let chosen = choose_alpha_mode(&modes, Some(wgpu::CompositeAlphaMode::PreMultiplied));
        assert_eq!(chosen, wgpu::CompositeAlphaMode::Opaque);
    }

    // ── sample count ──────────────────────────────────────────────────────

    #[test]
    fn sample_count_honours_request_when_supported() {
        assert_eq!(choose_sample_count(4, |n| n == 4 || n == 1), 4);
    }

    #[test]
    fn sample_count_steps_down_to_supported_value() {
        assert_eq!(choose_sample_count(8, |n| n <= 2), 2);
    }

    #[test]
    fn sample_count_never_exceeds_request() {
        assert_eq!(choose_sample_count(2, |_| true), 2);
        assert_eq!(choose_sample_count(1, |_| true), 1);
        assert_eq!(choose_sample_count(0, |_| true), 1);
    }
}
