/// Closed ring of lon/lat vertices.
pub type Ring = Vec<(f64, f64)>;

/// Geographic bounding box for cheap rejection before the exact polygon test.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn of_ring(ring: &Ring) -> Self {
        let mut bounds = Self {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        };
        for &(lon, lat) in ring {
            bounds.min_lon = bounds.min_lon.min(lon);
            bounds.min_lat = bounds.min_lat.min(lat);
            bounds.max_lon = bounds.max_lon.max(lon);
            bounds.max_lat = bounds.max_lat.max(lat);
        }
        bounds
    }

    #[inline(always)]
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// One polygon: an exterior ring and zero or more holes.
#[derive(Debug, Clone)]
pub struct Polygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
    pub bounds: Bounds,
}

impl Polygon {
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        let bounds = Bounds::of_ring(&exterior);
        Self {
            exterior,
            holes,
            bounds,
        }
    }

    /// Exact containment test: inside the exterior and outside every hole.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.bounds.contains(lon, lat)
            && ring_contains(&self.exterior, lon, lat)
            && !self.holes.iter().any(|hole| ring_contains(hole, lon, lat))
    }
}

/// Even-odd ray-casting point-in-ring test.
pub fn ring_contains(ring: &Ring, lon: f64, lat: f64) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
