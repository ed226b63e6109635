//! Terminal display — blits a rendered frame to the console.
//!
//! Each character cell shows two vertically stacked samples via the
//! upper-half-block glyph: foreground paints the top sample,
//! background the bottom. The frame is nearest-neighbor downsampled
//! to the display size, so any surface resolution maps onto any
//! terminal.

use std::io::{self, Write};

use cavis_core::palette::Rgba;
use cavis_core::surface::FrameImage;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, queue, terminal};

const HALF_BLOCK: &str = "▀";

/// Fixed-size character grid the frames are blitted into.
pub struct TerminalDisplay {
    cols: u16,
    rows: u16,
}

impl TerminalDisplay {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
        }
    }

    /// Size the display from the attached terminal, leaving a couple
    /// of rows for the console prompt and status line.
    pub fn from_terminal() -> Self {
        let (cols, rows) = terminal::size().unwrap_or((64, 34));
        Self::new(cols, rows.saturating_sub(2).max(1))
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Write the frame to `out`, top-left anchored.
    pub fn render<W: Write>(&self, image: &FrameImage, out: &mut W) -> io::Result<()> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(());
        }

        queue!(out, cursor::MoveTo(0, 0))?;
        let samples_y = u32::from(self.rows) * 2;

        for ty in 0..self.rows {
            for tx in 0..self.cols {
                let top = self.sample(image, tx, u32::from(ty) * 2, samples_y);
                let bottom = self.sample(image, tx, u32::from(ty) * 2 + 1, samples_y);
                queue!(
                    out,
                    SetForegroundColor(to_term(top)),
                    SetBackgroundColor(to_term(bottom)),
                    Print(HALF_BLOCK),
                )?;
            }
            queue!(out, ResetColor, Print("\r\n"))?;
        }
        out.flush()
    }

    /// Nearest source pixel for display sample `(tx, sy)`.
    fn sample(&self, image: &FrameImage, tx: u16, sy: u32, samples_y: u32) -> Rgba {
        let x = u32::from(tx) * image.width() / u32::from(self.cols);
        let y = sy * image.height() / samples_y;
        image.pixel(x.min(image.width() - 1), y.min(image.height() - 1))
    }
}

fn to_term(color: Rgba) -> Color {
    let Rgba(r, g, b, _) = color;
    Color::Rgb { r, g, b }
}
