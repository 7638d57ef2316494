//! Pixel classification: which colors get remapped
//!
//! A pixel is selected when either the HSV test (red or magenta hue with
//! some saturation and brightness) or the RGB test (red-dominant, or a
//! bright pale pink) fires. The RGB test catches desaturated pinks that the
//! HSV bounds miss.

/// Hue, saturation and value, each in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    /// Hue as a fraction of a full turn
    pub h: f64,
    /// Saturation
    pub s: f64,
    /// Value (brightness)
    pub v: f64,
}

/// Convert 8-bit RGB to HSV with hue as a fraction of a turn
///
/// Greys (all channels equal) have hue and saturation 0.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let (r, g, b) = (
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
    );
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == min {
        return Hsv { h: 0.0, s: 0.0, v: max };
    }

    let range = max - min;
    let s = range / max;
    let rc = (max - r) / range;
    let gc = (max - g) / range;
    let bc = (max - b) / range;
    let h = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };

    Hsv {
        h: (h / 6.0).rem_euclid(1.0),
        s,
        v: max,
    }
}

fn hsv_hit(r: u8, g: u8, b: u8) -> bool {
    let Hsv { h, s, v } = rgb_to_hsv(r, g, b);
    let red_hue = h <= 0.06 || h >= 0.85;
    let magenta_hue = (0.78..=0.85).contains(&h);
    (red_hue || magenta_hue) && s >= 0.08 && v >= 0.15
}

fn rgb_hit(r: u8, g: u8, b: u8) -> bool {
    let (r, g, b) = (u16::from(r), u16::from(g), u16::from(b));
    (r >= 140 && r >= g + 8 && r >= b + 8) || (r >= 200 && (g >= 150 || b >= 150))
}

/// Whether a color reads as red, pink or magenta
pub fn is_reddish_or_pink(r: u8, g: u8, b: u8) -> bool {
    hsv_hit(r, g, b) || rgb_hit(r, g, b)
}

/// Perceived luminance (Rec. 709 weights), in `[0, 255]`
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.2126 * f64::from(r) + 0.7152 * f64::from(g) + 0.0722 * f64::from(b)
}
