/// Viewport mapping lon/lat to canvas pixels.
///
/// Equirectangular projection fitted to the whole world: scale and
/// translation are functions of the canvas dimensions alone, so a resize
/// fully re-derives the projection with no other state.
#[derive(Debug, Clone)]
pub struct Viewport {
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

/// Horizontal breathing room at the antimeridian edges, in canvas pixels.
const MARGIN_PX: f64 = 4.0;

impl Viewport {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Adopt new canvas dimensions; scale and translation follow.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Pixels per degree, uniform on both axes so the map keeps its aspect.
    fn scale(&self) -> f64 {
        let fit_x = (self.width as f64 - MARGIN_PX) / 360.0;
        let fit_y = self.height as f64 / 180.0;
        fit_x.min(fit_y).max(1e-6)
    }

    /// Project a geographic coordinate to pixel coordinates.
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let s = self.scale();
        let px = self.width as f64 / 2.0 + lon * s;
        let py = self.height as f64 / 2.0 - lat * s;
        (px.round() as i32, py.round() as i32)
    }

    /// Inverse of `project`.
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let s = self.scale();
        let lon = (px as f64 - self.width as f64 / 2.0) / s;
        let lat = (self.height as f64 / 2.0 - py as f64) / s;
        (lon, lat)
    }
}
