//! Capture filters.
//!
//! Each catalog entry is a short chain of CSS-style color operations. The
//! chain is applied to captured pixels on the CPU, and renders back to its CSS
//! text so a live preview can show the same effect.

use std::{fmt::Display, str::FromStr};

use image::RgbaImage;

/// One color operation, with the same matrix semantics as the CSS filter
/// function of the same name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    /// Amount in `[0, 1]`.
    Grayscale(f32),
    /// Amount in `[0, 1]`.
    Sepia(f32),
    /// Amount in `[0, 1]`.
    Invert(f32),
    /// Multiplier, `1.0` is the identity.
    Saturate(f32),
    /// Rotation in degrees.
    HueRotate(f32),
}

type Matrix = [[f32; 3]; 3];

impl FilterOp {
    fn matrix(self) -> Option<Matrix> {
        match self {
            FilterOp::Grayscale(amount) => {
                let a = 1.0 - amount.clamp(0.0, 1.0);
                Some([
                    [0.2126 + 0.7874 * a, 0.7152 - 0.7152 * a, 0.0722 - 0.0722 * a],
                    [0.2126 - 0.2126 * a, 0.7152 + 0.2848 * a, 0.0722 - 0.0722 * a],
                    [0.2126 - 0.2126 * a, 0.7152 - 0.7152 * a, 0.0722 + 0.9278 * a],
                ])
            }
            FilterOp::Sepia(amount) => {
                let a = 1.0 - amount.clamp(0.0, 1.0);
                Some([
                    [0.393 + 0.607 * a, 0.769 - 0.769 * a, 0.189 - 0.189 * a],
                    [0.349 - 0.349 * a, 0.686 + 0.314 * a, 0.168 - 0.168 * a],
                    [0.272 - 0.272 * a, 0.534 - 0.534 * a, 0.131 + 0.869 * a],
                ])
            }
            FilterOp::Saturate(s) => {
                let s = s.max(0.0);
                Some([
                    [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
                    [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
                    [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
                ])
            }
            FilterOp::HueRotate(degrees) => {
                let (sin, cos) = degrees.to_radians().sin_cos();
                Some([
                    [
                        0.213 + cos * 0.787 - sin * 0.213,
                        0.715 - cos * 0.715 - sin * 0.715,
                        0.072 - cos * 0.072 + sin * 0.928,
                    ],
                    [
                        0.213 - cos * 0.213 + sin * 0.143,
                        0.715 + cos * 0.285 + sin * 0.140,
                        0.072 - cos * 0.072 - sin * 0.283,
                    ],
                    [
                        0.213 - cos * 0.213 - sin * 0.787,
                        0.715 - cos * 0.715 + sin * 0.715,
                        0.072 + cos * 0.928 + sin * 0.072,
                    ],
                ])
            }
            FilterOp::Invert(_) => None,
        }
    }

    #[inline]
    fn apply(self, rgb: [f32; 3]) -> [f32; 3] {
        if let FilterOp::Invert(amount) = self {
            let a = amount.clamp(0.0, 1.0);
            return rgb.map(|c| (a + c * (1.0 - 2.0 * a)).clamp(0.0, 1.0));
        }
        let Some(m) = self.matrix() else {
            return rgb;
        };
        let [r, g, b] = rgb;
        [
            (m[0][0] * r + m[0][1] * g + m[0][2] * b).clamp(0.0, 1.0),
            (m[1][0] * r + m[1][1] * g + m[1][2] * b).clamp(0.0, 1.0),
            (m[2][0] * r + m[2][1] * g + m[2][2] * b).clamp(0.0, 1.0),
        ]
    }
}

fn percent(amount: f32) -> i32 {
    (amount * 100.0).round() as i32
}

impl Display for FilterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterOp::Grayscale(a) => write!(f, "grayscale({}%)", percent(*a)),
            FilterOp::Sepia(a) => write!(f, "sepia({}%)", percent(*a)),
            FilterOp::Invert(a) => write!(f, "invert({}%)", percent(*a)),
            FilterOp::Saturate(s) => write!(f, "saturate({}%)", percent(*s)),
            FilterOp::HueRotate(deg) => write!(f, "hue-rotate({}deg)", deg),
        }
    }
}

/// An ordered chain of operations, applied left to right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformDescriptor(&'static [FilterOp]);

impl TransformDescriptor {
    pub fn ops(&self) -> &'static [FilterOp] {
        self.0
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_empty()
    }

    pub fn apply_rgb(&self, rgb: [u8; 3]) -> [u8; 3] {
        let mut c = rgb.map(|v| v as f32 / 255.0);
        for op in self.0 {
            c = op.apply(c);
        }
        c.map(|v| (v * 255.0).round() as u8)
    }

    pub fn apply_in_place(&self, image: &mut RgbaImage) {
        if self.is_identity() {
            return;
        }
        for pixel in image.pixels_mut() {
            let [r, g, b, a] = pixel.0;
            let [r, g, b] = self.apply_rgb([r, g, b]);
            pixel.0 = [r, g, b, a];
        }
    }
}

/// Renders as a CSS `filter` value; the identity renders as `none`.
impl Display for TransformDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "none");
        }
        for (i, op) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    None,
    Grayscale,
    Sepia,
    Invert,
    Warm,
    Cool,
}

impl Filter {
    pub const ALL: [Filter; 6] = [
        Filter::None,
        Filter::Grayscale,
        Filter::Sepia,
        Filter::Invert,
        Filter::Warm,
        Filter::Cool,
    ];

    pub fn identifier(self) -> &'static str {
        match self {
            Filter::None => "none",
            Filter::Grayscale => "grayscale",
            Filter::Sepia => "sepia",
            Filter::Invert => "invert",
            Filter::Warm => "warm",
            Filter::Cool => "cool",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::None => "None",
            Filter::Grayscale => "B&W",
            Filter::Sepia => "Sepia",
            Filter::Invert => "Invert",
            Filter::Warm => "Warm",
            Filter::Cool => "Cool",
        }
    }

    pub fn descriptor(self) -> TransformDescriptor {
        TransformDescriptor(match self {
            Filter::None => &[],
            Filter::Grayscale => &[FilterOp::Grayscale(1.0)],
            Filter::Sepia => &[FilterOp::Sepia(1.0)],
            Filter::Invert => &[FilterOp::Invert(1.0)],
            Filter::Warm => &[FilterOp::Sepia(0.5), FilterOp::Saturate(1.5)],
            Filter::Cool => &[FilterOp::HueRotate(180.0), FilterOp::Saturate(1.2)],
        })
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::ALL
            .into_iter()
            .find(|filter| filter.identifier().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown filter: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_render_as_css() {
        assert_eq!(Filter::None.descriptor().to_string(), "none");
        assert_eq!(Filter::Grayscale.descriptor().to_string(), "grayscale(100%)");
        assert_eq!(
            Filter::Warm.descriptor().to_string(),
            "sepia(50%) saturate(150%)"
        );
        assert_eq!(
            Filter::Cool.descriptor().to_string(),
            "hue-rotate(180deg) saturate(120%)"
        );
    }

    #[test]
    fn none_is_identity() {
        let descriptor = Filter::None.descriptor();
        assert!(descriptor.is_identity());
        assert_eq!(descriptor.apply_rgb([12, 200, 99]), [12, 200, 99]);
    }

    #[test]
    fn grayscale_equalizes_channels() {
        let [r, g, b] = Filter::Grayscale.descriptor().apply_rgb([200, 40, 90]);
        assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1);
    }

    #[test]
    fn invert_flips_channels() {
        assert_eq!(
            Filter::Invert.descriptor().apply_rgb([0, 255, 100]),
            [255, 0, 155]
        );
    }

    #[test]
    fn sepia_tints_gray_toward_brown() {
        let [r, g, b] = Filter::Sepia.descriptor().apply_rgb([128, 128, 128]);
        assert!(r > g && g > b);
    }

    #[test]
    fn apply_in_place_keeps_alpha() {
        let mut image = RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 77]));
        Filter::Cool.descriptor().apply_in_place(&mut image);
        assert!(image.pixels().all(|p| p.0[3] == 77));
    }

    #[test]
    fn filter_parses_identifiers() {
        for filter in Filter::ALL {
            assert_eq!(filter.identifier().parse::<Filter>(), Ok(filter));
        }
    }
}
