//! Utility functions

use crate::constants::APP_NAME;
use std::path::PathBuf;

// Square viewBox: bowl with steam, used for the window icon and the login logo
pub const ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64"><rect width="64" height="64" rx="14" fill="#2563eb"/><path d="M12 32h40c0 11-9 20-20 20s-20-9-20-20z" fill="#fff"/><rect x="10" y="29" width="44" height="4" rx="2" fill="#fff"/><path d="M24 12c-3 4 3 7 0 12M32 10c-3 4 3 7 0 12M40 12c-3 4 3 7 0 12" stroke="#bfdbfe" stroke-width="2.5" stroke-linecap="round" fill="none"/></svg>"##;

/// Rasterize the icon SVG to a square RGBA image.
/// Returns `None` if the SVG cannot be parsed or the size is zero.
pub fn rasterize_icon(size: u32) -> Option<(Vec<u8>, u32, u32)> {
    let tree = resvg::usvg::Tree::from_str(ICON_SVG, &resvg::usvg::Options::default()).ok()?;
    let scale = size as f32 / tree.size().width();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size, size)?;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Some((premul_to_straight(&pixmap), size, size))
}

fn premul_to_straight(pixmap: &resvg::tiny_skia::Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let a = p.alpha();
            if a == 0 {
                [0, 0, 0, 0]
            } else {
                let r = (p.red() as u16 * 255 / a as u16) as u8;
                let g = (p.green() as u16 * 255 / a as u16) as u8;
                let b = (p.blue() as u16 * 255 / a as u16) as u8;
                [r, g, b, a]
            }
        })
        .collect()
}

/// Directory holding settings, the local store and logs
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_rasterizes_to_requested_size() {
        let (pixels, w, h) = rasterize_icon(32).expect("icon renders");
        assert_eq!((w, h), (32, 32));
        assert_eq!(pixels.len(), 32 * 32 * 4);
        // Rounded corners are transparent, the middle is painted
        assert_eq!(pixels[3], 0);
        let center = ((16 * 32 + 16) * 4 + 3) as usize;
        assert_eq!(pixels[center], 255);
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(rasterize_icon(0).is_none());
    }

    #[test]
    fn data_dir_ends_with_app_name() {
        assert!(data_dir().ends_with(APP_NAME));
    }
}
