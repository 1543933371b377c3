use crate::scale::Rgb;

/// Color canvas at half-block resolution. Each character cell holds two
/// vertically stacked pixels, rendered with `▀`/`▄` and fg/bg colors, so a
/// terminal cell of w×h characters gives a w×2h pixel surface.
pub struct HalfBlockCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    pixels: Vec<Option<Rgb>>,
}

impl HalfBlockCanvas {
    /// Create a canvas with the given character dimensions.
    /// Effective pixel resolution: width x height*2.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![None; width * height * 2],
        }
    }

    pub fn pixel_width(&self) -> usize {
        self.width
    }

    pub fn pixel_height(&self) -> usize {
        self.height * 2
    }

    /// Set a pixel; coordinates outside the canvas are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgb) {
        if x >= self.width || y >= self.height * 2 {
            return;
        }
        self.pixels[y * self.width + x] = Some(color);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height * 2 {
            return None;
        }
        self.pixels[y * self.width + x]
    }

    /// The two stacked pixels of one character cell.
    pub fn cell(&self, cx: usize, cy: usize) -> CellHalves {
        CellHalves {
            upper: self.pixel(cx, cy * 2),
            lower: self.pixel(cx, cy * 2 + 1),
        }
    }
}

/// Upper and lower pixel of one character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellHalves {
    pub upper: Option<Rgb>,
    pub lower: Option<Rgb>,
}

impl CellHalves {
    /// Glyph and colors for this cell: `(char, fg, bg)`. `None` for a blank
    /// cell, which keeps the terminal's own background.
    pub fn glyph(&self) -> Option<(char, Rgb, Option<Rgb>)> {
        match (self.upper, self.lower) {
            (None, None) => None,
            (Some(upper), Some(lower)) => Some(('▀', upper, Some(lower))),
            (Some(upper), None) => Some(('▀', upper, None)),
            (None, Some(lower)) => Some(('▄', lower, None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = (200, 30, 30);
    const BLUE: Rgb = (30, 30, 200);

    #[test]
    fn test_upper_pixel_renders_upper_half_block() {
        let mut canvas = HalfBlockCanvas::new(2, 1);
        canvas.set_pixel(0, 0, RED);
        assert_eq!(canvas.cell(0, 0).glyph(), Some(('▀', RED, None)));
        assert_eq!(canvas.cell(1, 0).glyph(), None);
    }

    #[test]
    fn test_lower_pixel_renders_lower_half_block() {
        let mut canvas = HalfBlockCanvas::new(1, 1);
        canvas.set_pixel(0, 1, BLUE);
        assert_eq!(canvas.cell(0, 0).glyph(), Some(('▄', BLUE, None)));
    }

    #[test]
    fn test_both_pixels_use_fg_and_bg() {
        let mut canvas = HalfBlockCanvas::new(1, 1);
        canvas.set_pixel(0, 0, RED);
        canvas.set_pixel(0, 1, BLUE);
        assert_eq!(canvas.cell(0, 0).glyph(), Some(('▀', RED, Some(BLUE))));
    }

    #[test]
    fn test_out_of_range_pixels_are_ignored() {
        let mut canvas = HalfBlockCanvas::new(2, 2);
        canvas.set_pixel(5, 0, RED);
        canvas.set_pixel(0, 9, RED);
        for cy in 0..2 {
            for cx in 0..2 {
                assert_eq!(canvas.cell(cx, cy).glyph(), None);
            }
        }
    }
}
