//! Whole-image recoloring

use crate::classify::{is_reddish_or_pink, luminance};
use crate::error::{Error, Result};
use crate::gradient::{gradient_color, gradient_position};
use crate::palette::Palette;
use image::{Rgba, RgbaImage};
use std::path::Path;

/// Counters from a recolor pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecolorStats {
    /// Pixels visited
    pub pixels: u64,
    /// Pixels that were classified and remapped
    pub recolored: u64,
}

impl std::ops::Add for RecolorStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            pixels: self.pixels + rhs.pixels,
            recolored: self.recolored + rhs.recolored,
        }
    }
}

/// Remap a single pixel, returning the new value and whether it was selected
///
/// Fully transparent pixels are returned unchanged.
pub fn recolor_pixel(pixel: Rgba<u8>, palette: &Palette) -> (Rgba<u8>, bool) {
    let [r, g, b, a] = pixel.0;
    if a == 0 || !is_reddish_or_pink(r, g, b) {
        return (pixel, false);
    }
    let t = gradient_position(luminance(r, g, b), palette);
    let [nr, ng, nb] = gradient_color(palette.stops(), t);
    (Rgba([nr, ng, nb, a]), true)
}

fn recolor_row(row: &mut [u8], palette: &Palette) -> RecolorStats {
    let mut stats = RecolorStats::default();
    for px in row.chunks_exact_mut(4) {
        let (out, hit) = recolor_pixel(Rgba([px[0], px[1], px[2], px[3]]), palette);
        px.copy_from_slice(&out.0);
        stats.pixels += 1;
        stats.recolored += u64::from(hit);
    }
    stats
}

/// Recolor an image in place
pub fn recolor(image: &mut RgbaImage, palette: &Palette) -> RecolorStats {
    let row_len = image.width() as usize * 4;
    if row_len == 0 {
        return RecolorStats::default();
    }
    let buf: &mut [u8] = image;

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        buf.par_chunks_mut(row_len)
            .map(|row| recolor_row(row, palette))
            .reduce(RecolorStats::default, |a, b| a + b)
    }

    #[cfg(not(feature = "parallel"))]
    {
        buf.chunks_mut(row_len)
            .map(|row| recolor_row(row, palette))
            .fold(RecolorStats::default(), |a, b| a + b)
    }
}

/// Recolor a copy of an image, leaving the source untouched
pub fn recolored(image: &RgbaImage, palette: &Palette) -> (RgbaImage, RecolorStats) {
    let mut out = image.clone();
    let stats = recolor(&mut out, palette);
    (out, stats)
}

/// Decode `input`, recolor it, and encode to `output`
///
/// The output format follows the output file extension. `input` and
/// `output` may be the same path.
pub fn recolor_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    palette: &Palette,
) -> Result<RecolorStats> {
    let input = input.as_ref();
    let output = output.as_ref();

    let mut image = image::open(input)
        .map_err(|e| Error::image(input, e))?
        .into_rgba8();
    let stats = recolor(&mut image, palette);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| Error::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    image.save(output).map_err(|e| Error::image(output, e))?;

    log::debug!(
        "Recolored {} of {} pixels in {} with palette {}",
        stats.recolored,
        stats.pixels,
        input.display(),
        palette.name()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PaletteRegistry;
    use pretty_assertions::assert_eq;

    fn v7() -> Palette {
        PaletteRegistry::builtin().get("v7").unwrap().clone()
    }

    #[test]
    fn test_transparent_pixel_passes_through() {
        let pixel = Rgba([255, 0, 0, 0]);
        assert_eq!(recolor_pixel(pixel, &v7()), (pixel, false));
    }

    #[test]
    fn test_unselected_pixel_passes_through() {
        let pixel = Rgba([100, 100, 100, 255]);
        assert_eq!(recolor_pixel(pixel, &v7()), (pixel, false));
    }

    #[test]
    fn test_selected_pixel_keeps_alpha() {
        let (out, hit) = recolor_pixel(Rgba([144, 50, 50, 77]), &v7());
        assert!(hit);
        assert_eq!(out.0[3], 77);
        assert_ne!(&out.0[..3], &[144, 50, 50]);
    }

    #[test]
    fn test_recolor_counts_and_is_deterministic() {
        let mut image = RgbaImage::new(3, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([255, 0, 0, 0]));
        image.put_pixel(2, 0, Rgba([20, 200, 20, 255]));
        image.put_pixel(0, 1, Rgba([230, 180, 200, 128]));

        let (first, stats) = recolored(&image, &v7());
        let (second, _) = recolored(&image, &v7());
        assert_eq!(first, second);
        assert_eq!(
            stats,
            RecolorStats {
                pixels: 6,
                recolored: 2
            }
        );
        assert_eq!(*first.get_pixel(1, 0), Rgba([255, 0, 0, 0]));
        assert_eq!(*first.get_pixel(2, 0), Rgba([20, 200, 20, 255]));
        assert_eq!(first.get_pixel(0, 1).0[3], 128);
    }

    #[test]
    fn test_empty_image() {
        let mut image = RgbaImage::new(0, 0);
        assert_eq!(recolor(&mut image, &v7()), RecolorStats::default());
    }
}
