use std::{fmt::Display, str::FromStr};

use image::{Rgba, RgbaImage};
use rand::Rng;

pub const BASE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// White at 15% opacity.
pub const OVERLAY_COLOR: Rgba<u8> = Rgba([255, 255, 255, 38]);

const DOT_SPACING: usize = 40;
const DOT_OFFSET: u32 = 10;
const DOT_RADIUS: f32 = 2.0;

const STAR_COUNT: usize = 50;

const HEART_SPACING: usize = 60;
const HEART_OFFSET: u32 = 20;
const HEART_WIDTH: u32 = 12;
const HEART_HEIGHT: u32 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    #[default]
    Dots,
    Stars,
    Hearts,
    Solid,
}

impl PatternKind {
    pub const ALL: [PatternKind; 4] = [
        PatternKind::Dots,
        PatternKind::Stars,
        PatternKind::Hearts,
        PatternKind::Solid,
    ];

    pub fn identifier(self) -> &'static str {
        match self {
            PatternKind::Dots => "dots",
            PatternKind::Stars => "stars",
            PatternKind::Hearts => "hearts",
            PatternKind::Solid => "solid",
        }
    }
}

impl Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl FromStr for PatternKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatternKind::ALL
            .into_iter()
            .find(|kind| kind.identifier().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown pattern: {}", s))
    }
}

/// Paint the strip background over the whole buffer.
///
/// `stars` draws from the thread RNG, so it differs on every call.
pub fn render(canvas: &mut RgbaImage, kind: PatternKind) {
    render_with_rng(canvas, kind, &mut rand::thread_rng());
}

pub fn render_with_rng<R: Rng + ?Sized>(canvas: &mut RgbaImage, kind: PatternKind, rng: &mut R) {
    for pixel in canvas.pixels_mut() {
        *pixel = BASE_COLOR;
    }

    match kind {
        PatternKind::Solid => {}
        PatternKind::Dots => {
            for y in (DOT_OFFSET..canvas.height()).step_by(DOT_SPACING) {
                for x in (DOT_OFFSET..canvas.width()).step_by(DOT_SPACING) {
                    fill_circle(canvas, x as f32, y as f32, DOT_RADIUS, OVERLAY_COLOR);
                }
            }
        }
        PatternKind::Stars => {
            for mark in star_marks(rng, canvas.width(), canvas.height()) {
                let x0 = mark.x.floor() as u32;
                let y0 = mark.y.floor() as u32;
                let side = mark.side();
                fill_rect(canvas, x0, y0, side, side, OVERLAY_COLOR);
            }
        }
        PatternKind::Hearts => {
            for y in (HEART_OFFSET..canvas.height()).step_by(HEART_SPACING) {
                for x in (HEART_OFFSET..canvas.width()).step_by(HEART_SPACING) {
                    stamp_heart(canvas, x, y, OVERLAY_COLOR);
                }
            }
        }
    }
}

/// One random square of the `stars` pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarMark {
    pub x: f32,
    pub y: f32,
    /// Side length in `[1, 4)`.
    pub size: f32,
}

impl StarMark {
    /// Whole-pixel side length, kept below 4.
    pub fn side(&self) -> u32 {
        self.size.floor().clamp(1.0, 3.0) as u32
    }
}

pub fn star_marks<R: Rng + ?Sized>(rng: &mut R, width: u32, height: u32) -> Vec<StarMark> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    (0..STAR_COUNT)
        .map(|_| StarMark {
            x: rng.gen_range(0.0..width as f32),
            y: rng.gen_range(0.0..height as f32),
            size: rng.gen_range(1.0..4.0),
        })
        .collect()
}

/// Source-over compositing of `src` onto `dst`.
pub fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let alpha = src.0[3] as u32;
    if alpha == 0 {
        return;
    }
    let inverse = 255 - alpha;
    for c in 0..3 {
        dst.0[c] = ((src.0[c] as u32 * alpha + dst.0[c] as u32 * inverse + 127) / 255) as u8;
    }
    dst.0[3] = (alpha + (dst.0[3] as u32 * inverse + 127) / 255).min(255) as u8;
}

/// Blend `color` over every pixel whose center lies within `radius` of `(cx, cy)`.
pub fn fill_circle(canvas: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    let min_x = (cx - radius).floor().max(0.0) as u32;
    let min_y = (cy - radius).floor().max(0.0) as u32;
    let max_x = ((cx + radius).ceil() as u32).min(canvas.width());
    let max_y = ((cy + radius).ceil() as u32).min(canvas.height());

    for y in min_y..max_y {
        for x in min_x..max_x {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= radius * radius {
                blend_over(canvas.get_pixel_mut(x, y), color);
            }
        }
    }
}

/// Blend `color` over a rectangle, clipped to the canvas.
pub fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
    let max_x = x.saturating_add(width).min(canvas.width());
    let max_y = y.saturating_add(height).min(canvas.height());
    for py in y..max_y {
        for px in x..max_x {
            blend_over(canvas.get_pixel_mut(px, py), color);
        }
    }
}

/// Stamp a heart whose bottom-left sits on `(x, baseline)`, like a text glyph.
fn stamp_heart(canvas: &mut RgbaImage, x: u32, baseline: u32, color: Rgba<u8>) {
    let top = baseline.saturating_sub(HEART_HEIGHT);
    for py in top..baseline.min(canvas.height()) {
        for px in x..(x + HEART_WIDTH).min(canvas.width()) {
            // Map the cell onto the implicit heart curve's bounding box.
            let u = ((px - x) as f32 + 0.5) / HEART_WIDTH as f32 * 2.3 - 1.15;
            let v = 1.25 - ((py - top) as f32 + 0.5) / HEART_HEIGHT as f32 * 2.25;
            let a = u * u + v * v - 1.0;
            if a * a * a - u * u * v * v * v <= 0.0 {
                blend_over(canvas.get_pixel_mut(px, py), color);
            }
        }
    }
}
