//! Fixed color palette for cell rendering.
//!
//! Cell values are 1-based indices into the palette. Value 0 and
//! anything past the palette length are input-data errors — they are
//! rejected, never wrapped around or painted with a fallback color.

use crate::error::CavisError;

// ── Rgba ─────────────────────────────────────────────────────────

/// One RGBA8 color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b, 0xFF)
    }
}

// ── Palette ──────────────────────────────────────────────────────

/// Ordered list of cell colors, fixed per client build.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Rgba>,
}

impl Palette {
    pub fn new(colors: Vec<Rgba>) -> Self {
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Resolve a 1-based cell value to its color.
    pub fn color(&self, value: u32) -> Result<Rgba, CavisError> {
        if value == 0 || value as usize > self.colors.len() {
            return Err(CavisError::CellValue {
                value,
                row: 0,
                col: 0,
                palette_len: self.colors.len(),
            });
        }
        Ok(self.colors[value as usize - 1])
    }
}

impl Default for Palette {
    /// The stock three-species palette: red, green, blue.
    fn default() -> Self {
        Self::new(vec![
            Rgba::opaque(0xFF, 0x00, 0x00),
            Rgba::opaque(0x00, 0xFF, 0x00),
            Rgba::opaque(0x00, 0x00, 0xFF),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_based_lookup() {
        let palette = Palette::default();
        assert_eq!(palette.color(1).unwrap(), Rgba::opaque(0xFF, 0, 0));
        assert_eq!(palette.color(2).unwrap(), Rgba::opaque(0, 0xFF, 0));
        assert_eq!(palette.color(3).unwrap(), Rgba::opaque(0, 0, 0xFF));
    }

    #[test]
    fn zero_is_rejected() {
        let palette = Palette::default();
        assert!(matches!(
            palette.color(0),
            Err(CavisError::CellValue { value: 0, .. })
        ));
    }

    #[test]
    fn overflow_is_rejected() {
        let palette = Palette::default();
        assert!(palette.color(4).is_err());
        assert!(palette.color(u32::MAX).is_err());
    }
}
