//! Caption rendering onto strip rasters.
//!
//! Uses cosmic-text for shaping and rasterization. Font discovery is slow, so
//! one font system is shared by the whole process.

use std::sync::{Mutex, PoisonError};

use cosmic_text::{Attrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, Style, SwashCache};
use image::{Rgba, RgbaImage};
use once_cell::sync::Lazy;

use super::pattern::blend_over;

static FONT_SYSTEM: Lazy<Mutex<FontSystem>> = Lazy::new(|| Mutex::new(FontSystem::new()));
static SWASH_CACHE: Lazy<Mutex<SwashCache>> = Lazy::new(|| Mutex::new(SwashCache::new()));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    Serif,
    SansSerif,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels.
    pub size: f32,
    pub family: FontFamily,
    pub italic: bool,
    pub color: Rgba<u8>,
}

/// Draw one line of text horizontally centered on `center_x`, with its
/// baseline on `baseline_y`. Returns the laid-out width in pixels.
///
/// Glyphs falling outside the canvas are clipped. If no usable font is
/// installed nothing is drawn and the width is zero.
pub fn draw_centered(
    canvas: &mut RgbaImage,
    text: &str,
    center_x: f32,
    baseline_y: f32,
    style: &TextStyle,
) -> f32 {
    if text.is_empty() {
        return 0.0;
    }

    let mut font_system = FONT_SYSTEM.lock().unwrap_or_else(PoisonError::into_inner);
    let mut swash_cache = SWASH_CACHE.lock().unwrap_or_else(PoisonError::into_inner);

    let metrics = Metrics::new(style.size, style.size * 1.2);
    let mut buffer = Buffer::new(&mut font_system, metrics);
    buffer.set_size(&mut font_system, None, None);

    let family = match style.family {
        FontFamily::Serif => Family::Serif,
        FontFamily::SansSerif => Family::SansSerif,
    };
    let mut attrs = Attrs::new().family(family);
    if style.italic {
        attrs = attrs.style(Style::Italic);
    }
    buffer.set_text(&mut font_system, text, attrs, Shaping::Advanced);
    buffer.shape_until_scroll(&mut font_system, false);

    let Some((width, line_y)) = buffer
        .layout_runs()
        .next()
        .filter(|run| !run.glyphs.is_empty())
        .map(|run| {
            let width = run
                .glyphs
                .iter()
                .map(|glyph| glyph.x + glyph.w)
                .fold(0.0f32, f32::max);
            (width, run.line_y)
        })
    else {
        log::warn!("No glyphs laid out for {:?}; text left off the strip", text);
        return 0.0;
    };

    let offset_x = (center_x - width / 2.0).round() as i32;
    let offset_y = (baseline_y - line_y).round() as i32;
    let [r, g, b, a] = style.color.0;
    let text_color = Color::rgba(r, g, b, a);
    let (canvas_width, canvas_height) = (canvas.width() as i32, canvas.height() as i32);

    buffer.draw(
        &mut font_system,
        &mut swash_cache,
        text_color,
        |x, y, w, h, color| {
            if color.a() == 0 {
                return;
            }
            let coverage = Rgba([color.r(), color.g(), color.b(), color.a()]);
            for dy in 0..h as i32 {
                for dx in 0..w as i32 {
                    let px = offset_x + x + dx;
                    let py = offset_y + y + dy;
                    if px < 0 || py < 0 || px >= canvas_width || py >= canvas_height {
                        continue;
                    }
                    blend_over(canvas.get_pixel_mut(px as u32, py as u32), coverage);
                }
            }
        },
    );

    width
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLE: TextStyle = TextStyle {
        size: 20.0,
        family: FontFamily::SansSerif,
        italic: false,
        color: Rgba([255, 255, 255, 255]),
    };

    #[test]
    fn empty_text_draws_nothing() {
        let mut canvas = RgbaImage::from_pixel(40, 40, Rgba([0, 0, 0, 255]));
        assert_eq!(draw_centered(&mut canvas, "", 20.0, 30.0, &STYLE), 0.0);
        assert!(canvas.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn text_without_glyphs_is_skipped() {
        let mut canvas = RgbaImage::from_pixel(40, 40, Rgba([0, 0, 0, 255]));
        assert_eq!(draw_centered(&mut canvas, "\n", 20.0, 30.0, &STYLE), 0.0);
        assert!(canvas.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn text_stays_inside_the_canvas() {
        // Positioned mostly off-canvas; must clip rather than panic.
        let mut canvas = RgbaImage::from_pixel(30, 20, Rgba([0, 0, 0, 255]));
        draw_centered(&mut canvas, "Happy Moments", -10.0, 5.0, &STYLE);
        draw_centered(&mut canvas, "1/2/2026", 40.0, 100.0, &STYLE);
        assert!(canvas.pixels().all(|p| p.0[3] == 255));
    }
}
