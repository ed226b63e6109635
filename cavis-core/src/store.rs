//! Frame store and renderer.
//!
//! Consumes the `setup → data* → finish` bracket of one run:
//! [`FrameStore::reset`] on setup, [`FrameStore::append_frame`] per
//! data message (render → snapshot → cache, then the raw grid is
//! dropped), [`FrameStore::finish`] to seal the run and open it for
//! full-range playback. [`FrameStore::show_frame`] repaints any cached
//! frame in O(1) without recomputation.
//!
//! Cell geometry is recomputed from the surface dimensions and `n` on
//! every append; the dimension math is never cached across calls.

use tracing::debug;

use crate::error::CavisError;
use crate::grid::CellGrid;
use crate::palette::Palette;
use crate::surface::{FrameImage, Surface};

/// Append-only cache of rendered frames for one run.
pub struct FrameStore {
    surface: Surface,
    palette: Palette,
    frames: Vec<FrameImage>,
    n: Option<usize>,
    sealed: bool,
}

impl FrameStore {
    /// Create a store painting into a fresh surface of the given size.
    pub fn new(width: u32, height: u32, palette: Palette) -> Self {
        Self {
            surface: Surface::new(width, height),
            palette,
            frames: Vec::new(),
            n: None,
            sealed: false,
        }
    }

    /// Begin a new run: drop every cached frame, record the grid
    /// dimension, clear the visible surface. Calling this mid-run
    /// discards the old run's frames.
    pub fn reset(&mut self, n: usize) -> Result<(), CavisError> {
        if n == 0 {
            return Err(CavisError::ZeroDimension);
        }
        let discarded = self.frames.len();
        self.frames.clear();
        self.n = Some(n);
        self.sealed = false;
        self.surface.clear();
        if discarded > 0 {
            debug!(discarded, n, "store reset mid-run");
        }
        Ok(())
    }

    /// Render one `n × n` frame, paint it live, cache the snapshot.
    ///
    /// The grid is validated before any pixel changes, so a malformed
    /// frame is a clean skip: surface and cache are left exactly as
    /// they were. Returns the new frame count.
    pub fn append_frame(&mut self, rows: &[Vec<u32>]) -> Result<usize, CavisError> {
        let n = self.n.ok_or(CavisError::NoActiveRun)?;
        let grid = CellGrid::from_rows(n, rows, self.palette.len())?;

        self.render(&grid)?;
        self.frames.push(self.surface.snapshot());
        Ok(self.frames.len())
    }

    /// Repaint the surface from cached frame `index` (0-based).
    ///
    /// Out-of-range indices are reported, never clamped — they mean a
    /// caller bug, and the cache and displayed frame stay untouched.
    pub fn show_frame(&mut self, index: usize) -> Result<(), CavisError> {
        let image = self.frames.get(index).ok_or(CavisError::FrameIndex {
            index,
            count: self.frames.len(),
        })?;
        self.surface.restore(image)
    }

    /// Number of cached frames in the current run.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Seal the run: the full index range is now stable for playback.
    pub fn finish(&mut self) {
        self.sealed = true;
    }

    /// Whether the run has been sealed by a `finish` message.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Grid dimension of the active run, if a setup has been seen.
    pub fn dimension(&self) -> Option<usize> {
        self.n
    }

    /// The live drawing surface (for the display boundary).
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Paint every cell of `grid` as an integer-tiled rectangle.
    ///
    /// Tile edges use `k * extent / n` so the cells cover the surface
    /// exactly, regardless of whether `n` divides the dimensions.
    fn render(&mut self, grid: &CellGrid) -> Result<(), CavisError> {
        let n = grid.n() as u64;
        let w = self.surface.width() as u64;
        let h = self.surface.height() as u64;

        for r in 0..grid.n() {
            let y0 = (r as u64 * h / n) as u32;
            let y1 = ((r as u64 + 1) * h / n) as u32;
            for c in 0..grid.n() {
                let x0 = (c as u64 * w / n) as u32;
                let x1 = ((c as u64 + 1) * w / n) as u32;
                let color = self.palette.color(grid.get(r, c))?;
                self.surface.fill_rect(x0, y0, x1 - x0, y1 - y0, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Rgba;

    const RED: Rgba = Rgba::opaque(0xFF, 0, 0);
    const GREEN: Rgba = Rgba::opaque(0, 0xFF, 0);
    const BLUE: Rgba = Rgba::opaque(0, 0, 0xFF);

    fn store() -> FrameStore {
        FrameStore::new(9, 9, Palette::default())
    }

    fn uniform(n: usize, value: u32) -> Vec<Vec<u32>> {
        vec![vec![value; n]; n]
    }

    #[test]
    fn append_counts_and_replay() {
        let mut store = store();
        store.reset(3).unwrap();

        for k in 1..=3u32 {
            let count = store.append_frame(&uniform(3, k)).unwrap();
            assert_eq!(count, k as usize);
        }
        assert_eq!(store.frame_count(), 3);

        // Frame 1 (0-based) was all-green; replay reproduces it.
        store.show_frame(1).unwrap();
        assert_eq!(store.surface().pixel(0, 0), GREEN);
        assert_eq!(store.surface().pixel(8, 8), GREEN);

        store.show_frame(0).unwrap();
        assert_eq!(store.surface().pixel(4, 4), RED);

        store.show_frame(2).unwrap();
        assert_eq!(store.surface().pixel(4, 4), BLUE);
    }

    #[test]
    fn show_out_of_range_reports_and_leaves_display() {
        let mut store = store();
        store.reset(3).unwrap();
        store.append_frame(&uniform(3, 1)).unwrap();

        let err = store.show_frame(1).unwrap_err();
        assert!(matches!(err, CavisError::FrameIndex { index: 1, count: 1 }));
        // Displayed frame unchanged.
        assert_eq!(store.surface().pixel(0, 0), RED);
        assert_eq!(store.frame_count(), 1);
    }

    #[test]
    fn reset_clears_everything() {
        let mut store = store();
        store.reset(3).unwrap();
        store.append_frame(&uniform(3, 1)).unwrap();
        store.finish();

        store.reset(2).unwrap();
        assert_eq!(store.frame_count(), 0);
        assert!(!store.is_sealed());
        assert_eq!(store.dimension(), Some(2));
        assert_eq!(store.surface().pixel(0, 0), Rgba(0, 0, 0, 0));
    }

    #[test]
    fn data_before_setup_is_a_fault() {
        let mut store = store();
        assert!(matches!(
            store.append_frame(&uniform(3, 1)),
            Err(CavisError::NoActiveRun)
        ));
    }

    #[test]
    fn malformed_frame_is_skipped_cleanly() {
        let mut store = store();
        store.reset(3).unwrap();
        store.append_frame(&uniform(3, 2)).unwrap();

        // Out-of-palette cell: rejected before any paint.
        let mut bad = uniform(3, 1);
        bad[1][1] = 7;
        assert!(store.append_frame(&bad).is_err());

        // Wrong shape: also rejected.
        assert!(store.append_frame(&uniform(2, 1)).is_err());

        assert_eq!(store.frame_count(), 1);
        assert_eq!(store.surface().pixel(4, 4), GREEN);
        store.show_frame(0).unwrap();
        assert_eq!(store.surface().pixel(0, 0), GREEN);
    }

    #[test]
    fn cells_tile_exactly() {
        // 9x9 surface, n=3: each cell is a 3x3 block.
        let mut store = store();
        store.reset(3).unwrap();
        let rows = vec![
            vec![1, 2, 3],
            vec![1, 2, 3],
            vec![1, 2, 3],
        ];
        store.append_frame(&rows).unwrap();

        for y in 0..9 {
            assert_eq!(store.surface().pixel(0, y), RED, "x=0 y={y}");
            assert_eq!(store.surface().pixel(2, y), RED);
            assert_eq!(store.surface().pixel(3, y), GREEN);
            assert_eq!(store.surface().pixel(5, y), GREEN);
            assert_eq!(store.surface().pixel(6, y), BLUE);
            assert_eq!(store.surface().pixel(8, y), BLUE);
        }
    }

    #[test]
    fn uneven_dimensions_still_cover_the_surface() {
        // 10x10 surface, n=3: edges at 0,3,6,10 — no gaps, no overflow.
        let mut store = FrameStore::new(10, 10, Palette::default());
        store.reset(3).unwrap();
        store.append_frame(&uniform(3, 3)).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(store.surface().pixel(x, y), BLUE);
            }
        }
    }

    #[test]
    fn finish_seals_until_next_reset() {
        let mut store = store();
        store.reset(3).unwrap();
        assert!(!store.is_sealed());
        store.finish();
        assert!(store.is_sealed());
        store.reset(3).unwrap();
        assert!(!store.is_sealed());
    }

    #[test]
    fn zero_dimension_reset_rejected() {
        let mut store = store();
        assert!(matches!(store.reset(0), Err(CavisError::ZeroDimension)));
    }
}
