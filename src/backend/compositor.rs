//! Lays captured photos out into the final strip.
//!
//! Every frame sits at a fixed position determined by its slot index and the
//! device class. Filled slots are cover-fit into their frame; empty slots are
//! left as bordered placeholders.

use std::{fmt::Display, str::FromStr};

use chrono::NaiveDate;
use image::{imageops, Rgba, RgbaImage};

use super::{
    color,
    pattern::{self, blend_over, PatternKind},
    slots::Photo,
    text::{self, FontFamily, TextStyle},
};

pub const STRIP_WIDTH: u32 = 500;
pub const FRAME_X: u32 = 30;
pub const FRAME_WIDTH: u32 = STRIP_WIDTH - 2 * FRAME_X;
pub const FIRST_FRAME_TOP: u32 = 120;
/// Gap added below each frame before the next one starts.
pub const FRAME_MARGIN: u32 = 80;
/// Height reserved for the header and footer.
pub const HEADER_ALLOWANCE: u32 = 200;
pub const BORDER_WIDTH: u32 = 8;

const LANDSCAPE_FRAME_HEIGHT: u32 = 350;
// 440 * 1.2
const PORTRAIT_FRAME_HEIGHT: u32 = FRAME_WIDTH * 6 / 5;

pub const DEFAULT_CAPTION: &str = "Happy Moments";
const HEADER_BASELINE: f32 = 60.0;
const FOOTER_INSET: f32 = 30.0;

const HEADER_STYLE: TextStyle = TextStyle {
    size: 36.0,
    family: FontFamily::Serif,
    italic: true,
    color: Rgba([255, 255, 255, 255]),
};

const FOOTER_STYLE: TextStyle = TextStyle {
    size: 20.0,
    family: FontFamily::SansSerif,
    italic: false,
    color: Rgba([255, 255, 255, 255]),
};

/// Picks the frame shape: tall frames on narrow screens, wide ones otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Portrait,
    #[default]
    Landscape,
}

impl DeviceClass {
    pub fn frame_height(self) -> u32 {
        match self {
            DeviceClass::Portrait => PORTRAIT_FRAME_HEIGHT,
            DeviceClass::Landscape => LANDSCAPE_FRAME_HEIGHT,
        }
    }
}

impl Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceClass::Portrait => write!(f, "portrait"),
            DeviceClass::Landscape => write!(f, "landscape"),
        }
    }
}

impl FromStr for DeviceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "portrait" => Ok(DeviceClass::Portrait),
            "landscape" => Ok(DeviceClass::Landscape),
            _ => Err(format!("unknown device class: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripLayout {
    frame_height: u32,
    slot_count: usize,
}

impl StripLayout {
    pub fn new(device_class: DeviceClass, slot_count: usize) -> Self {
        Self {
            frame_height: device_class.frame_height(),
            slot_count,
        }
    }

    pub fn frame_height(&self) -> u32 {
        self.frame_height
    }

    /// Distance between the tops of consecutive frames.
    pub fn spacing(&self) -> u32 {
        self.frame_height + FRAME_MARGIN
    }

    pub fn width(&self) -> u32 {
        STRIP_WIDTH
    }

    pub fn height(&self) -> u32 {
        HEADER_ALLOWANCE + self.slot_count as u32 * self.spacing()
    }

    pub fn frame_rect(&self, index: usize) -> Rect {
        Rect {
            x: FRAME_X,
            y: FIRST_FRAME_TOP + index as u32 * self.spacing(),
            width: FRAME_WIDTH,
            height: self.frame_height,
        }
    }
}

/// How a source image is cover-fit into a frame: the centered region of the
/// source that stays visible, and the scale applied to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    pub scale: f64,
    pub source: Rect,
}

pub fn cover_fit(source_width: u32, source_height: u32, frame_width: u32, frame_height: u32) -> CoverFit {
    let image_aspect = source_width as f64 / source_height as f64;
    let frame_aspect = frame_width as f64 / frame_height as f64;

    if image_aspect > frame_aspect {
        // wider than the frame: match heights, trim left and right
        let scale = frame_height as f64 / source_height as f64;
        let width = ((frame_width as f64 / scale).round() as u32).clamp(1, source_width);
        CoverFit {
            scale,
            source: Rect {
                x: (source_width - width) / 2,
                y: 0,
                width,
                height: source_height,
            },
        }
    } else {
        // taller than the frame: match widths, trim top and bottom
        let scale = frame_width as f64 / source_width as f64;
        let height = ((frame_height as f64 / scale).round() as u32).clamp(1, source_height);
        CoverFit {
            scale,
            source: Rect {
                x: 0,
                y: (source_height - height) / 2,
                width: source_width,
                height,
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("photo in slot {index} could not be decoded: {source}")]
    Decode {
        index: usize,
        source: image::ImageError,
    },
    #[error("decode task for slot {index} terminated unexpectedly: {source}")]
    DecodeTask {
        index: usize,
        source: tokio::task::JoinError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeOptions {
    /// Hex color string; unparsable values stroke in black.
    pub border_color: String,
    pub pattern: PatternKind,
    pub device_class: DeviceClass,
    pub caption: String,
    pub footer: String,
}

impl CompositeOptions {
    /// Options with the default caption and today's date as the footer.
    pub fn new(border_color: impl Into<String>, pattern: PatternKind, device_class: DeviceClass) -> Self {
        Self {
            border_color: border_color.into(),
            pattern,
            device_class,
            caption: DEFAULT_CAPTION.to_string(),
            footer: footer_date(chrono::Local::now().date_naive()),
        }
    }
}

pub fn footer_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// Render the whole strip from a snapshot of the slots.
///
/// All filled slots are decoded concurrently; drawing only starts once every
/// decode has finished and always proceeds in slot order. A single failed
/// decode fails the whole composite.
pub async fn compose(slots: &[Option<Photo>], options: &CompositeOptions) -> Result<RgbaImage, ComposeError> {
    let layout = StripLayout::new(options.device_class, slots.len());
    let border = color::stroke_color(&options.border_color);

    let decodes: Vec<_> = slots
        .iter()
        .enumerate()
        .filter_map(|(index, slot)| {
            let photo = slot.clone()?;
            let task = tokio::task::spawn_blocking(move || photo.decode());
            Some(async move {
                match task.await {
                    Ok(Ok(image)) => Ok((index, image)),
                    Ok(Err(source)) => Err(ComposeError::Decode { index, source }),
                    Err(source) => Err(ComposeError::DecodeTask { index, source }),
                }
            })
        })
        .collect();

    let mut canvas = RgbaImage::new(layout.width(), layout.height());
    pattern::render(&mut canvas, options.pattern);
    text::draw_centered(
        &mut canvas,
        &options.caption,
        layout.width() as f32 / 2.0,
        HEADER_BASELINE,
        &HEADER_STYLE,
    );

    let decoded = futures::future::try_join_all(decodes).await?;
    log::debug!("Decoded {} of {} slots", decoded.len(), slots.len());

    let mut decoded = decoded.into_iter().peekable();
    for index in 0..slots.len() {
        let frame = layout.frame_rect(index);
        stroke_rect(&mut canvas, frame, BORDER_WIDTH, border);
        if let Some((_, photo)) = decoded.next_if(|(i, _)| *i == index) {
            draw_cover(&mut canvas, &photo, frame);
        }
    }

    text::draw_centered(
        &mut canvas,
        &options.footer,
        layout.width() as f32 / 2.0,
        layout.height() as f32 - FOOTER_INSET,
        &FOOTER_STYLE,
    );

    Ok(canvas)
}

/// Stroke the outline of `rect` with the line centered on its edge.
pub fn stroke_rect(canvas: &mut RgbaImage, rect: Rect, line_width: u32, color: Rgba<u8>) {
    let half = (line_width / 2) as i64;
    let (x0, y0) = (rect.x as i64, rect.y as i64);
    let (x1, y1) = (x0 + rect.width as i64, y0 + rect.height as i64);

    let outer_x = (x0 - half).max(0)..(x1 + half).min(canvas.width() as i64);
    let outer_y = (y0 - half).max(0)..(y1 + half).min(canvas.height() as i64);
    let inner_x = (x0 + half)..(x1 - half);
    let inner_y = (y0 + half)..(y1 - half);

    for y in outer_y {
        for x in outer_x.clone() {
            if inner_x.contains(&x) && inner_y.contains(&y) {
                continue;
            }
            blend_over(canvas.get_pixel_mut(x as u32, y as u32), color);
        }
    }
}

/// Cover-fit `photo` into `frame`. Nothing is drawn outside the frame.
fn draw_cover(canvas: &mut RgbaImage, photo: &RgbaImage, frame: Rect) {
    if photo.width() == 0 || photo.height() == 0 {
        return;
    }
    let fit = cover_fit(photo.width(), photo.height(), frame.width, frame.height);
    let visible = imageops::crop_imm(
        photo,
        fit.source.x,
        fit.source.y,
        fit.source.width,
        fit.source.height,
    )
    .to_image();
    let scaled = imageops::resize(
        &visible,
        frame.width,
        frame.height,
        imageops::FilterType::Lanczos3,
    );

    let max_x = (frame.x + frame.width).min(canvas.width());
    let max_y = (frame.y + frame.height).min(canvas.height());
    for y in frame.y..max_y {
        for x in frame.x..max_x {
            let source = *scaled.get_pixel(x - frame.x, y - frame.y);
            blend_over(canvas.get_pixel_mut(x, y), source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOLD: Rgba<u8> = Rgba([0xd4, 0xaf, 0x37, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn photo(width: u32, height: u32, color: Rgba<u8>) -> Photo {
        Photo::encode(&RgbaImage::from_pixel(width, height, color)).unwrap()
    }

    fn options() -> CompositeOptions {
        CompositeOptions {
            border_color: "#D4AF37".to_string(),
            pattern: PatternKind::Solid,
            device_class: DeviceClass::Landscape,
            caption: String::new(),
            footer: String::new(),
        }
    }

    #[test]
    fn layout_matches_strip_geometry() {
        let layout = StripLayout::new(DeviceClass::Landscape, 3);
        assert_eq!(layout.height(), 200 + 3 * (350 + 80));
        assert_eq!(layout.frame_rect(0), Rect { x: 30, y: 120, width: 440, height: 350 });
        assert_eq!(layout.frame_rect(2).y, 120 + 2 * 430);

        let portrait = StripLayout::new(DeviceClass::Portrait, 2);
        assert_eq!(portrait.frame_height(), 528);
        assert_eq!(portrait.height(), 200 + 2 * (528 + 80));
    }

    #[test]
    fn wide_source_in_narrow_frame_trims_sides() {
        // 16:9 into 440x350
        let fit = cover_fit(1920, 1080, 440, 350);
        assert!((fit.scale - 350.0 / 1080.0).abs() < 1e-9);
        assert_eq!(fit.source.y, 0);
        assert_eq!(fit.source.height, 1080);
        assert!(fit.source.width < 1920);
        assert_eq!(fit.source.x, (1920 - fit.source.width) / 2);
        let shown_width = fit.source.width as f64 * fit.scale;
        assert!((shown_width - 440.0).abs() < 1.0);
    }

    #[test]
    fn narrow_source_in_wide_frame_trims_top_and_bottom() {
        // 16:9 into a frame wider than 16:9
        let fit = cover_fit(1920, 1080, 440, 200);
        assert!((fit.scale - 440.0 / 1920.0).abs() < 1e-9);
        assert_eq!(fit.source.x, 0);
        assert_eq!(fit.source.width, 1920);
        assert!(fit.source.height < 1080);
        assert_eq!(fit.source.y, (1080 - fit.source.height) / 2);
        let shown_height = fit.source.height as f64 * fit.scale;
        assert!((shown_height - 200.0).abs() < 1.0);
    }

    #[test]
    fn stroke_is_centered_on_the_edge() {
        let mut canvas = RgbaImage::from_pixel(100, 100, pattern::BASE_COLOR);
        let rect = Rect { x: 20, y: 20, width: 60, height: 60 };
        stroke_rect(&mut canvas, rect, 8, GOLD);
        assert_eq!(*canvas.get_pixel(16, 50), GOLD);
        assert_eq!(*canvas.get_pixel(23, 50), GOLD);
        assert_eq!(*canvas.get_pixel(15, 50), pattern::BASE_COLOR);
        assert_eq!(*canvas.get_pixel(24, 50), pattern::BASE_COLOR);
        assert_eq!(*canvas.get_pixel(50, 50), pattern::BASE_COLOR);
    }

    #[tokio::test]
    async fn photo_fills_frame_without_escaping() {
        let slots = vec![Some(photo(1920, 1080, RED)), None];
        let strip = compose(&slots, &options()).await.unwrap();
        let layout = StripLayout::new(DeviceClass::Landscape, 2);
        assert_eq!(strip.dimensions(), (500, layout.height()));

        let frame = layout.frame_rect(0);
        // every pixel inside the frame is photo, no background gaps
        for y in frame.y..frame.y + frame.height {
            for x in frame.x..frame.x + frame.width {
                assert_eq!(*strip.get_pixel(x, y), RED, "gap at ({}, {})", x, y);
            }
        }
        // the outer half of the border survives, nothing red past it
        assert_eq!(*strip.get_pixel(frame.x - 1, frame.y + 10), GOLD);
        assert_eq!(*strip.get_pixel(frame.x - 4, frame.y + 10), GOLD);
        assert_eq!(*strip.get_pixel(frame.x - 5, frame.y + 10), pattern::BASE_COLOR);
        assert_eq!(*strip.get_pixel(frame.x + 10, frame.y + frame.height), GOLD);
    }

    #[tokio::test]
    async fn empty_slots_are_bordered_placeholders() {
        let slots = vec![None, Some(photo(64, 64, RED)), None];
        let strip = compose(&slots, &options()).await.unwrap();
        let layout = StripLayout::new(DeviceClass::Landscape, 3);
        for index in [0, 2] {
            let frame = layout.frame_rect(index);
            assert_eq!(*strip.get_pixel(frame.x, frame.y + 20), GOLD);
            assert_eq!(*strip.get_pixel(frame.x + 3, frame.y + 20), GOLD);
            assert_eq!(
                *strip.get_pixel(frame.x + frame.width / 2, frame.y + frame.height / 2),
                pattern::BASE_COLOR
            );
        }
        let filled = layout.frame_rect(1);
        assert_eq!(
            *strip.get_pixel(filled.x + filled.width / 2, filled.y + filled.height / 2),
            RED
        );
    }

    #[tokio::test]
    async fn all_empty_still_composes() {
        let strip = compose(&[None, None], &options()).await.unwrap();
        assert_eq!(strip.height(), StripLayout::new(DeviceClass::Landscape, 2).height());
    }

    #[tokio::test]
    async fn undecodable_slot_fails_the_composite() {
        let slots = vec![
            Some(photo(32, 32, RED)),
            Some(Photo::from_encoded(&b"not an image"[..])),
        ];
        match compose(&slots, &options()).await {
            Err(ComposeError::Decode { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected a decode failure, got {:?}", other.map(|i| i.dimensions())),
        }
    }

    #[tokio::test]
    async fn invalid_border_color_strokes_black() {
        let mut options = options();
        options.border_color = "gold-ish".to_string();
        options.pattern = PatternKind::Dots;
        let strip = compose(&[None], &options).await.unwrap();
        let frame = StripLayout::new(DeviceClass::Landscape, 1).frame_rect(0);
        assert_eq!(*strip.get_pixel(frame.x + 2, frame.y + 100), color::FALLBACK_STROKE);
    }

    #[test]
    fn footer_uses_month_day_year() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(footer_date(date), "3/7/2026");
    }
}
