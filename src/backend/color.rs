use image::Rgba;

/// Stroke color used when a border color can't be parsed, matching a canvas
/// that ignores an invalid stroke style and keeps its default.
pub const FALLBACK_STROKE: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex(value: &str) -> Option<Rgba<u8>> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, 255])),
        4 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?])),
        6 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, 255])),
        8 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => None,
    }
}

/// Resolve a user-supplied border color, falling back rather than failing.
pub fn stroke_color(value: &str) -> Rgba<u8> {
    parse_hex(value).unwrap_or_else(|| {
        log::warn!("Ignoring invalid border color {:?}", value);
        FALLBACK_STROKE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(parse_hex("#D4AF37"), Some(Rgba([0xd4, 0xaf, 0x37, 255])));
        assert_eq!(parse_hex("#fff"), Some(Rgba([255, 255, 255, 255])));
        assert_eq!(parse_hex("#0f08"), Some(Rgba([0, 255, 0, 136])));
        assert_eq!(parse_hex("#11223344"), Some(Rgba([0x11, 0x22, 0x33, 0x44])));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_hex("D4AF37"), None);
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
        assert_eq!(parse_hex("#ééé"), None);
        assert_eq!(parse_hex("#+f+f+f"), None);
    }

    #[test]
    fn invalid_stroke_falls_back() {
        assert_eq!(stroke_color("not a color"), FALLBACK_STROKE);
        assert_eq!(stroke_color("#ff0000"), Rgba([255, 0, 0, 255]));
    }
}
