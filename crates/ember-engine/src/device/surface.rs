use winit::dpi::PhysicalSize;

/// Outcome of a resize request, decided before touching the surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum ResizeAction {
    /// Size is unchanged; nothing to do (resize must be idempotent).
    Skip,
    /// Zero-area size; record it but defer surface reconfiguration.
    Defer,
    /// Apply the new size and reconfigure the surface.
    Reconfigure,
}

pub(crate) fn classify_resize(
    current: PhysicalSize<u32>,
    new: PhysicalSize<u32>,
) -> ResizeAction {
    if new == current {
        ResizeAction::Skip
    } else if new.width == 0 || new.height == 0 {
        ResizeAction::Defer
    } else {
        ResizeAction::Reconfigure
    }
}

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if caps.formats.is_empty() {
        return None;
    }

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if caps.formats.contains(&f) {
                return Some(f);
            }
        }
    }

    Some(caps.formats[0])
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

#[cfg(test)]
mod tests {
    use super::*;

    fn size(w: u32, h: u32) -> PhysicalSize<u32> {
        PhysicalSize::new(w, h)
    }

    // ── resize classification ─────────────────────────────────────────────

    #[test]
    fn identical_size_is_skipped() {
        assert_eq!(
            classify_resize(size(640, 480), size(640, 480)),
            ResizeAction::Skip
        );
    }

    #[test]
    fn zero_area_is_deferred() {
        assert_eq!(
            classify_resize(size(640, 480), size(0, 480)),
            ResizeAction::Defer
        );
        assert_eq!(
            classify_resize(size(640, 480), size(640, 0)),
            ResizeAction::Defer
        );
    }

    #[test]
    fn changed_size_reconfigures() {
        assert_eq!(
            classify_resize(size(640, 480), size(512, 512)),
            ResizeAction::Reconfigure
        );
    }

    #[test]
    fn restoring_from_zero_area_reconfigures() {
        assert_eq!(
            classify_resize(size(0, 0), size(640, 480)),
            ResizeAction::Reconfigure
        );
    }
}
