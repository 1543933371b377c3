/// RGB triple used for canvas pixels and country fills.
pub type Rgb = (u8, u8, u8);

/// Fill for countries without a metric entry.
pub const FALLBACK: Rgb = (128, 128, 128);

/// Viridis control stops, dark purple to yellow.
const VIRIDIS: [Rgb; 9] = [
    (68, 1, 84),
    (71, 44, 122),
    (59, 81, 139),
    (44, 113, 142),
    (33, 144, 141),
    (39, 173, 129),
    (92, 200, 99),
    (170, 220, 50),
    (253, 231, 37),
];

/// Diverging red-yellow-blue control stops (ColorBrewer RdYlBu).
const RD_YL_BU: [Rgb; 11] = [
    (165, 0, 38),
    (215, 48, 39),
    (244, 109, 67),
    (253, 174, 97),
    (254, 224, 144),
    (255, 255, 191),
    (224, 243, 248),
    (171, 217, 233),
    (116, 173, 209),
    (69, 117, 180),
    (49, 54, 149),
];

/// Pure metric-to-color mapping over a domain fixed at construction.
/// Values outside the domain clamp to its endpoints.
#[derive(Debug, Clone)]
pub struct ColorScale {
    stops: &'static [Rgb],
    min: f64,
    max: f64,
}

impl ColorScale {
    /// Sequential viridis scale over `[min, max]`.
    pub fn viridis(min: f64, max: f64) -> Self {
        Self {
            stops: &VIRIDIS,
            min,
            max,
        }
    }

    /// Diverging red-yellow-blue scale over `[min, max]`.
    pub fn rd_yl_bu(min: f64, max: f64) -> Self {
        Self {
            stops: &RD_YL_BU,
            min,
            max,
        }
    }

    pub fn color(&self, value: f64) -> Rgb {
        let t = if self.max > self.min {
            ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        sample(self.stops, t)
    }
}

/// Piecewise-linear interpolation between adjacent stops at `t` in [0, 1].
fn sample(stops: &[Rgb], t: f64) -> Rgb {
    let segs = (stops.len() - 1) as f64;
    let x = t * segs;
    let i = x.floor() as usize;
    if i >= stops.len() - 1 {
        return stops[stops.len() - 1];
    }
    let f = x - i as f64;
    let (r0, g0, b0) = stops[i];
    let (r1, g1, b1) = stops[i + 1];
    (
        (r0 as f64 + f * (r1 as f64 - r0 as f64)).round() as u8,
        (g0 as f64 + f * (g1 as f64 - g0 as f64)).round() as u8,
        (b0 as f64 + f * (b1 as f64 - b0 as f64)).round() as u8,
    )
}
