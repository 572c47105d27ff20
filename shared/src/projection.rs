use std::fmt::Write as _;

use crate::geo::{Dataset, Geometry, Ring, resolve_unit_identifier};

// Equal Earth polynomial coefficients (Šavrič, Patterson & Jenny 2018).
const A1: f64 = 1.340264;
const A2: f64 = -0.081106;
const A3: f64 = 0.000893;
const A4: f64 = 0.003796;
const M: f64 = 0.866_025_403_784_438_6; // sqrt(3) / 2

/// Equal Earth projection with a scale, a geographic centre and a screen
/// translation, matching the map component's `projectionConfig`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Projection {
    /// `center` is `(longitude, latitude)` in degrees and lands on `translate`.
    pub fn equal_earth(scale: f64, center: (f64, f64), translate: (f64, f64)) -> Self {
        let (cx, cy) = equal_earth_raw(
            (center.0 % 360.0).to_radians(),
            (center.1 % 360.0).to_radians(),
        );
        Self {
            scale,
            offset_x: translate.0 - scale * cx,
            offset_y: translate.1 + scale * cy,
        }
    }

    /// Projection centred in a `width` x `height` viewport.
    pub fn for_viewport(scale: f64, center: (f64, f64), width: f64, height: f64) -> Self {
        Self::equal_earth(scale, center, (width / 2.0, height / 2.0))
    }

    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = equal_earth_raw(lon.to_radians(), lat.to_radians());
        (self.offset_x + self.scale * x, self.offset_y - self.scale * y)
    }

    /// SVG path data for a polygonal geometry; empty for anything else.
    pub fn path_data(&self, geometry: &Geometry) -> String {
        let mut path = String::new();
        for polygon in geometry.polygons() {
            for ring in polygon {
                self.write_ring(&mut path, ring);
            }
        }
        path
    }

    fn write_ring(&self, path: &mut String, ring: &Ring) {
        // The closing vertex repeats the first; `Z` draws that edge.
        let open = match ring.as_slice() {
            [first, .., last] if first == last => &ring[..ring.len() - 1],
            all => all,
        };
        if open.len() < 3 {
            return;
        }
        for (i, &(lon, lat)) in open.iter().enumerate() {
            let (x, y) = self.project(lon, lat);
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(path, "{cmd}{},{}", round3(x), round3(y));
        }
        path.push('Z');
    }
}

fn equal_earth_raw(lambda: f64, phi: f64) -> (f64, f64) {
    let l = (M * phi.sin()).asin();
    let l2 = l * l;
    let l6 = l2 * l2 * l2;
    (
        lambda * l.cos() / (M * (A1 + 3.0 * A2 * l2 + l6 * (7.0 * A3 + 9.0 * A4 * l2))),
        l * (A1 + A2 * l2 + l6 * (A3 + A4 * l2)),
    )
}

fn round3(v: f64) -> f64 {
    let r = (v * 1000.0).round() / 1000.0;
    if r == 0.0 { 0.0 } else { r }
}

/// One drawable feature: its SVG path and the unit it selects, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub key: usize,
    pub unit: Option<String>,
    pub path: String,
}

/// Project every fillable feature of the dataset. Features without a unit
/// are still drawn so the map has no holes, they just cannot be selected.
pub fn render_dataset(
    dataset: &Dataset,
    projection: &Projection,
    unit_type: &str,
) -> Vec<RenderedFeature> {
    dataset
        .features
        .iter()
        .enumerate()
        .filter_map(|(key, feature)| {
            let path = projection.path_data(&feature.geometry);
            if path.is_empty() {
                return None;
            }
            Some(RenderedFeature {
                key,
                unit: resolve_unit_identifier(feature, unit_type).map(str::to_owned),
                path,
            })
        })
        .collect()
}
