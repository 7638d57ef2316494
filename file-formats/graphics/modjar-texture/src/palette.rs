//! Named gradient palettes
//!
//! A palette is five color stops (four interpolation segments) plus the
//! scalars that map pixel darkness onto a gradient position. Equal adjacent
//! stops make a plateau, which is how the later versions keep highlights
//! flat.

use crate::error::{Error, Result};

/// An RGB triple
pub type Rgb = [u8; 3];

/// Number of color stops in every palette
pub const STOP_COUNT: usize = 5;

/// Immutable named parameter set for the recolor transform
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    name: String,
    stops: [Rgb; STOP_COUNT],
    scale: f64,
    bias: f64,
    gamma: f64,
}

impl Palette {
    /// Create a palette, rejecting scalars that cannot produce a gradient position
    pub fn new(
        name: impl Into<String>,
        stops: [Rgb; STOP_COUNT],
        scale: f64,
        bias: f64,
        gamma: f64,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_palette(name, "palette name is empty"));
        }
        if !scale.is_finite() || !bias.is_finite() {
            return Err(Error::invalid_palette(name, "scale and bias must be finite"));
        }
        if !gamma.is_finite() || gamma <= 0.0 {
            return Err(Error::invalid_palette(
                name,
                format!("gamma must be positive, got {gamma}"),
            ));
        }
        Ok(Self {
            name,
            stops,
            scale,
            bias,
            gamma,
        })
    }

    // Built-in values are known-good, skip validation.
    fn builtin(name: &str, stops: [Rgb; STOP_COUNT], scale: f64, bias: f64, gamma: f64) -> Self {
        Self {
            name: name.to_string(),
            stops,
            scale,
            bias,
            gamma,
        }
    }

    /// Palette version name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color stops, lightest first
    pub fn stops(&self) -> &[Rgb; STOP_COUNT] {
        &self.stops
    }

    /// Multiplier applied to the raw darkness value
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Offset added after scaling
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Exponent applied to the clamped position
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

/// Lookup table of palettes by version name
#[derive(Debug, Clone)]
pub struct PaletteRegistry {
    palettes: Vec<Palette>,
}

impl PaletteRegistry {
    /// An empty registry
    pub fn empty() -> Self {
        Self {
            palettes: Vec::new(),
        }
    }

    /// Registry holding the built-in versions `v2` through `v7`
    pub fn builtin() -> Self {
        const LIGHT: Rgb = [180, 233, 255];
        const DEEP: Rgb = [18, 95, 155];
        const NAVY: Rgb = [22, 110, 170];

        Self {
            palettes: vec![
                Palette::builtin(
                    "v2",
                    [LIGHT, [125, 225, 255], [85, 205, 255], [55, 170, 220], [25, 120, 180]],
                    0.95,
                    0.05,
                    1.0,
                ),
                Palette::builtin(
                    "v3",
                    [[150, 215, 245], [100, 200, 240], [70, 175, 235], [42, 145, 205], DEEP],
                    1.18,
                    0.08,
                    0.92,
                ),
                Palette::builtin(
                    "v4",
                    [LIGHT, LIGHT, [70, 175, 235], [70, 175, 235], DEEP],
                    1.18,
                    0.08,
                    0.92,
                ),
                Palette::builtin(
                    "v5",
                    [LIGHT, LIGHT, [85, 205, 255], [85, 205, 255], DEEP],
                    1.18,
                    0.08,
                    0.92,
                ),
                Palette::builtin(
                    "v6",
                    [LIGHT, LIGHT, [85, 205, 255], [85, 205, 255], NAVY],
                    1.18,
                    0.08,
                    0.92,
                ),
                Palette::builtin(
                    "v7",
                    [LIGHT, LIGHT, [76, 187, 243], [76, 187, 243], NAVY],
                    1.18,
                    0.08,
                    0.92,
                ),
            ],
        }
    }

    /// Add a palette, replacing any existing one with the same name
    pub fn register(&mut self, palette: Palette) {
        match self.palettes.iter_mut().find(|p| p.name == palette.name) {
            Some(existing) => {
                log::debug!("Replacing palette '{}'", palette.name);
                *existing = palette;
            }
            None => self.palettes.push(palette),
        }
    }

    /// Look up a palette by version name
    pub fn get(&self, name: &str) -> Result<&Palette> {
        self.palettes
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::UnknownPalette {
                name: name.to_string(),
                known: self.names().map(str::to_string).collect(),
            })
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.palettes.iter().map(Palette::name)
    }
}

impl Default for PaletteRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_versions() {
        let registry = PaletteRegistry::default();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["v2", "v3", "v4", "v5", "v6", "v7"]
        );

        let v7 = registry.get("v7").unwrap();
        assert_eq!(v7.stops()[2], [76, 187, 243]);
        assert_eq!(v7.stops()[4], [22, 110, 170]);
        assert_eq!(v7.scale(), 1.18);
        assert_eq!(v7.gamma(), 0.92);

        let v2 = registry.get("v2").unwrap();
        assert_eq!(v2.bias(), 0.05);
        assert_eq!(v2.gamma(), 1.0);
    }

    #[test]
    fn test_unknown_version() {
        let err = PaletteRegistry::builtin().get("v1").unwrap_err();
        match err {
            Error::UnknownPalette { name, known } => {
                assert_eq!(name, "v1");
                assert_eq!(known.len(), 6);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_register_replaces_by_name() {
        let mut registry = PaletteRegistry::empty();
        assert!(registry.get("v7").is_err());

        let grey = Palette::new("v7", [[128, 128, 128]; STOP_COUNT], 1.0, 0.0, 1.0).unwrap();
        registry.register(grey.clone());
        registry.register(grey);
        assert_eq!(registry.names().count(), 1);
        assert_eq!(registry.get("v7").unwrap().stops()[0], [128, 128, 128]);
    }

    #[test]
    fn test_rejects_bad_scalars() {
        let stops = [[0, 0, 0]; STOP_COUNT];
        assert!(Palette::new("g", stops, 1.0, 0.0, 0.0).is_err());
        assert!(Palette::new("g", stops, 1.0, 0.0, -1.0).is_err());
        assert!(Palette::new("g", stops, f64::NAN, 0.0, 1.0).is_err());
        assert!(Palette::new("", stops, 1.0, 0.0, 1.0).is_err());
        assert!(Palette::new("g", stops, 1.0, 0.0, 1.0).is_ok());
    }
}
