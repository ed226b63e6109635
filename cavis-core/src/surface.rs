//! The drawing surface abstraction.
//!
//! [`Surface`] is an owned RGBA8 pixel buffer the renderer paints
//! into; [`FrameImage`] is an immutable snapshot of it, and the only
//! per-frame representation the client retains (raw cell grids are
//! discarded after rendering). The frame store depends on this module
//! alone — never on a real display — so replay is a buffer copy, not
//! a recomputation.

use crate::error::CavisError;
use crate::palette::Rgba;

const BPP: usize = 4;

// ── FrameImage ───────────────────────────────────────────────────

/// An immutable snapshot of a rendered surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixel data, `width * height * 4` bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Color at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = (y as usize * self.width as usize + x as usize) * BPP;
        Rgba(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        )
    }
}

// ── Surface ──────────────────────────────────────────────────────

/// A mutable RGBA8 drawing surface of fixed dimensions.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    /// Create a cleared (all-zero) surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * BPP],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Fill an axis-aligned rectangle, clipped to the surface.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        let x1 = x.min(self.width) as usize;
        let y1 = y.min(self.height) as usize;
        let x2 = x.saturating_add(w).min(self.width) as usize;
        let y2 = y.saturating_add(h).min(self.height) as usize;

        let Rgba(r, g, b, a) = color;
        for row in y1..y2 {
            let start = (row * self.width as usize + x1) * BPP;
            let end = (row * self.width as usize + x2) * BPP;
            for px in self.pixels[start..end].chunks_exact_mut(BPP) {
                px[0] = r;
                px[1] = g;
                px[2] = b;
                px[3] = a;
            }
        }
    }

    /// Color at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = (y as usize * self.width as usize + x as usize) * BPP;
        Rgba(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        )
    }

    /// Capture the current contents as an immutable snapshot.
    pub fn snapshot(&self) -> FrameImage {
        FrameImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }

    /// Repaint the surface from a snapshot. Dimensions must match.
    pub fn restore(&mut self, image: &FrameImage) -> Result<(), CavisError> {
        if image.width != self.width || image.height != self.height {
            return Err(CavisError::SurfaceMismatch {
                snap_w: image.width,
                snap_h: image.height,
                surf_w: self.width,
                surf_h: self.height,
            });
        }
        self.pixels.copy_from_slice(&image.pixels);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::opaque(0xFF, 0, 0);

    #[test]
    fn fill_and_read_back() {
        let mut surface = Surface::new(8, 8);
        surface.fill_rect(2, 2, 3, 3, RED);
        assert_eq!(surface.pixel(2, 2), RED);
        assert_eq!(surface.pixel(4, 4), RED);
        assert_eq!(surface.pixel(5, 5), Rgba(0, 0, 0, 0));
        assert_eq!(surface.pixel(1, 2), Rgba(0, 0, 0, 0));
    }

    #[test]
    fn fill_clips_to_surface() {
        let mut surface = Surface::new(4, 4);
        surface.fill_rect(2, 2, 100, 100, RED);
        assert_eq!(surface.pixel(3, 3), RED);
        // No panic is the real assertion; corners outside stay clipped.
        surface.fill_rect(100, 100, 5, 5, RED);
    }

    #[test]
    fn clear_resets_pixels() {
        let mut surface = Surface::new(4, 4);
        surface.fill_rect(0, 0, 4, 4, RED);
        surface.clear();
        assert_eq!(surface.pixel(0, 0), Rgba(0, 0, 0, 0));
        assert_eq!(surface.pixel(3, 3), Rgba(0, 0, 0, 0));
    }

    #[test]
    fn snapshot_restore_roundtrip() {
        let mut surface = Surface::new(4, 4);
        surface.fill_rect(0, 0, 2, 2, RED);
        let snap = surface.snapshot();

        surface.clear();
        assert_eq!(surface.pixel(0, 0), Rgba(0, 0, 0, 0));

        surface.restore(&snap).unwrap();
        assert_eq!(surface.pixel(0, 0), RED);
        assert_eq!(surface.pixel(1, 1), RED);
        assert_eq!(surface.pixel(2, 2), Rgba(0, 0, 0, 0));
    }

    #[test]
    fn restore_rejects_mismatched_dimensions() {
        let small = Surface::new(2, 2).snapshot();
        let mut surface = Surface::new(4, 4);
        assert!(matches!(
            surface.restore(&small),
            Err(CavisError::SurfaceMismatch { .. })
        ));
    }

    #[test]
    fn snapshot_is_independent_of_later_paints() {
        let mut surface = Surface::new(2, 2);
        let before = surface.snapshot();
        surface.fill_rect(0, 0, 2, 2, RED);
        assert_eq!(before.pixel(0, 0), Rgba(0, 0, 0, 0));
    }
}
