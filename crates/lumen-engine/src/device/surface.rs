use wgpu::SurfaceError;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; the swapchain changed and the frame may be retried.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate.
    Fatal,
}

pub(crate) fn classify_surface_error(err: &SurfaceError) -> SurfaceErrorAction {
    match err {
        SurfaceError::Lost | SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        SurfaceError::Timeout | SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = preferred.into_iter().find(|f| caps.formats.contains(f)) {
            return Some(f);
        }
    }

    caps.formats.first().copied()
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// First candidate the adapter can render depth into.
pub(crate) fn choose_depth_format(
    candidates: &[wgpu::TextureFormat],
    supports_attachment: impl Fn(wgpu::TextureFormat) -> bool,
) -> Option<wgpu::TextureFormat> {
    candidates
        .iter()
        .copied()
        .find(|&f| f.is_depth_stencil_format() && supports_attachment(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat as F;

    fn caps(formats: Vec<F>) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats,
            ..Default::default()
        }
    }

    // ── surface format ────────────────────────────────────────────────────

    #[test]
    fn prefers_srgb_then_first() {
        let c = caps(vec![F::Bgra8Unorm, F::Rgba8UnormSrgb]);
        assert_eq!(choose_surface_format(&c, true), Some(F::Rgba8UnormSrgb));
        assert_eq!(choose_surface_format(&c, false), Some(F::Bgra8Unorm));
        assert_eq!(choose_surface_format(&caps(vec![]), true), None);
    }

    #[test]
    fn alpha_falls_back_to_first_supported() {
        let c = caps(vec![F::Bgra8Unorm]);
        assert_eq!(
            choose_alpha_mode(&c, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
        assert_eq!(
            choose_alpha_mode(&c, Some(wgpu::CompositeAlphaMode::Opaque)),
            wgpu::CompositeAlphaMode::Opaque
        );
    }

    // ── depth format ──────────────────────────────────────────────────────

    #[test]
    fn depth_takes_first_supported_candidate() {
        let candidates = [F::Depth32Float, F::Depth24Plus];
        assert_eq!(choose_depth_format(&candidates, |_| true), Some(F::Depth32Float));
        assert_eq!(
            choose_depth_format(&candidates, |f| f == F::Depth24Plus),
            Some(F::Depth24Plus)
        );
        assert_eq!(choose_depth_format(&candidates, |_| false), None);
    }

    #[test]
    fn color_formats_are_never_depth() {
        assert_eq!(choose_depth_format(&[F::Rgba8Unorm], |_| true), None);
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn surface_errors_map_to_actions() {
        assert_eq!(classify_surface_error(&SurfaceError::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(classify_surface_error(&SurfaceError::Outdated), SurfaceErrorAction::Reconfigured);
        assert_eq!(classify_surface_error(&SurfaceError::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(classify_surface_error(&SurfaceError::OutOfMemory), SurfaceErrorAction::Fatal);
    }
}
