use rayon::prelude::*;

use crate::data::World;
use crate::halfblock::HalfBlockCanvas;
use crate::map::projection::Viewport;
use crate::models::MetricMap;
use crate::scale::{ColorScale, Rgb, FALLBACK};

/// Choropleth renderer split into two independent passes:
///
/// - the geometry pass rebuilds the per-pixel country index from the current
///   projection (startup and resize);
/// - the color pass rebuilds the per-country fill table from the metric map
///   (fetch completion).
///
/// A resize never touches fills and a data arrival never re-projects.
pub struct ChoroplethRenderer {
    index: Vec<Option<u16>>,
    index_width: usize,
    index_height: usize,
    fills: Vec<Rgb>,
}

impl ChoroplethRenderer {
    pub fn new() -> Self {
        Self {
            index: Vec::new(),
            index_width: 0,
            index_height: 0,
            fills: Vec::new(),
        }
    }

    /// Geometry pass: country index for every canvas pixel under the
    /// viewport. Each pixel is independent, so rows run in parallel.
    pub fn reproject(&mut self, world: &World, viewport: &Viewport) {
        let width = viewport.width;
        let height = viewport.height;
        self.index = (0..height)
            .into_par_iter()
            .flat_map_iter(|py| {
                (0..width).map(move |px| {
                    let (lon, lat) = viewport.unproject(px as i32, py as i32);
                    world.locate(lon, lat)
                })
            })
            .collect();
        self.index_width = width;
        self.index_height = height;
    }

    /// Color pass: one fill per country, keyed by country code. Countries
    /// with a metric entry take the scaled color, the rest the fallback grey.
    /// The table is rebuilt wholesale, so codes that left the metric map
    /// drop back to grey and new codes pick up their color.
    pub fn recolor(&mut self, world: &World, metrics: &MetricMap, scale: &ColorScale) {
        self.fills = world
            .countries()
            .iter()
            .map(|country| {
                metrics
                    .get(&country.code)
                    .map(|&value| scale.color(value))
                    .unwrap_or(FALLBACK)
            })
            .collect();
    }

    /// Country index under a canvas pixel, if any.
    pub fn country_at(&self, x: usize, y: usize) -> Option<u16> {
        if x >= self.index_width || y >= self.index_height {
            return None;
        }
        self.index[y * self.index_width + x]
    }

    pub fn fill_for(&self, idx: u16) -> Rgb {
        self.fills.get(idx as usize).copied().unwrap_or(FALLBACK)
    }

    pub fn fills(&self) -> &[Rgb] {
        &self.fills
    }

    pub fn index_size(&self) -> (usize, usize) {
        (self.index_width, self.index_height)
    }

    /// Paint the index grid through the fill table onto the canvas. Water
    /// pixels stay unset and keep the terminal background.
    pub fn paint(&self, canvas: &mut HalfBlockCanvas) {
        let width = self.index_width.min(canvas.pixel_width());
        let height = self.index_height.min(canvas.pixel_height());
        for y in 0..height {
            for x in 0..width {
                if let Some(idx) = self.index[y * self.index_width + x] {
                    canvas.set_pixel(x, y, self.fill_for(idx));
                }
            }
        }
    }
}

impl Default for ChoroplethRenderer {
    fn default() -> Self {
        Self::new()
    }
}
