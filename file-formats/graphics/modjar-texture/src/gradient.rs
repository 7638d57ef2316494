//! Darkness to gradient position, gradient position to color

use crate::palette::{Palette, Rgb};

/// Number of interpolation segments between the five stops
const SEGMENTS: f64 = 4.0;

fn clamp01(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// Gradient position for a pixel of the given luminance
///
/// Bright pixels land near the first (lightest) stop, dark pixels near the
/// last.
pub fn gradient_position(luminance: f64, palette: &Palette) -> f64 {
    let t = 1.0 - luminance / 255.0;
    let t = clamp01(t * palette.scale() + palette.bias());
    let gamma = palette.gamma();
    if (gamma - 1.0).abs() > f64::EPSILON {
        clamp01(t.powf(gamma))
    } else {
        t
    }
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    let (a, b) = (f64::from(a), f64::from(b));
    (a + (b - a) * t).round_ties_even().clamp(0.0, 255.0) as u8
}

/// Piecewise-linear color at position `t` across the palette stops
///
/// `t` is clamped to `[0, 1]`. Segment boundaries (`0.25`, `0.5`, `0.75`)
/// yield the stop exactly.
pub fn gradient_color(stops: &[Rgb; 5], t: f64) -> Rgb {
    let t = clamp01(t);
    let seg = ((t * SEGMENTS).floor() as usize).min(3);
    let local = (t - seg as f64 / SEGMENTS) * SEGMENTS;
    let (from, to) = (stops[seg], stops[seg + 1]);
    [
        lerp(from[0], to[0], local),
        lerp(from[1], to[1], local),
        lerp(from[2], to[2], local),
    ]
}
