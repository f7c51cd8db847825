//! Study regions: administrative boundaries used for clipping, masking and
//! scoping regional statistics.

use crate::error::{Error, Result};
use crate::raster::{GridDomain, Raster};
use geo::{BoundingRect, Contains, Intersects, Simplify};
use geo_types::{coord, Coord, LineString, MultiPolygon, Point, Polygon, Rect};

/// Mask value for cells whose centre lies inside a region
pub const INSIDE: u8 = 1;
/// Mask value for cells whose centre lies outside a region
pub const OUTSIDE: u8 = 0;

/// An immutable (multi)polygon boundary.
///
/// Shared by reference between stages; nothing in climstress mutates a
/// region once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    name: String,
    geometry: MultiPolygon<f64>,
    bbox: Rect<f64>,
}

impl Region {
    /// Build a region from a polygon or multipolygon.
    ///
    /// Fails if the geometry has no extent (no polygons, or empty rings).
    pub fn new(name: impl Into<String>, geometry: impl Into<MultiPolygon<f64>>) -> Result<Self> {
        let name = name.into();
        let geometry = geometry.into();
        let bbox = geometry
            .bounding_rect()
            .ok_or_else(|| Error::invalid_param("region", &name, "geometry is empty"))?;
        Ok(Self {
            name,
            geometry,
            bbox,
        })
    }

    /// Axis-aligned rectangular region
    pub fn from_rect(name: impl Into<String>, rect: Rect<f64>) -> Self {
        let polygon = rect.to_polygon();
        Self {
            name: name.into(),
            geometry: MultiPolygon::new(vec![polygon]),
            bbox: rect,
        }
    }

    /// Region from a single exterior ring given as `[x, y]` pairs
    pub fn from_exterior(name: impl Into<String>, ring: &[[f64; 2]]) -> Result<Self> {
        let coords: Vec<Coord<f64>> = ring.iter().map(|&[x, y]| coord! { x: x, y: y }).collect();
        if coords.len() < 3 {
            return Err(Error::invalid_param(
                "ring",
                coords.len(),
                "a polygon ring needs at least 3 vertices",
            ));
        }
        Self::new(name, Polygon::new(LineString::from(coords), vec![]))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    /// Bounding rectangle of the geometry
    pub fn bounding_rect(&self) -> Rect<f64> {
        self.bbox
    }

    /// Whether the point `(x, y)` lies strictly inside the geometry
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let min = self.bbox.min();
        let max = self.bbox.max();
        if x < min.x || x > max.x || y < min.y || y > max.y {
            return false;
        }
        self.geometry.contains(&Point::new(x, y))
    }

    /// Whether the region's bounding box overlaps `(min_x, min_y, max_x, max_y)`
    pub fn intersects_bounds(&self, bounds: (f64, f64, f64, f64)) -> bool {
        let (min_x, min_y, max_x, max_y) = bounds;
        let other = Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y });
        self.bbox.intersects(&other)
    }

    /// Douglas-Peucker simplification of every ring.
    ///
    /// Holes that collapse below a valid ring are dropped, as are polygons
    /// whose exterior collapses. Fails if nothing survives.
    pub fn simplified(&self, tolerance: f64) -> Result<Region> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(Error::invalid_param(
                "simplify_tolerance",
                tolerance,
                "must be finite and non-negative",
            ));
        }

        let polygons: Vec<Polygon<f64>> = self
            .geometry
            .0
            .iter()
            .filter_map(|p| simplify_polygon(p, tolerance))
            .collect();

        if polygons.is_empty() {
            return Err(Error::invalid_param(
                "simplify_tolerance",
                tolerance,
                format!("region '{}' collapses entirely", self.name),
            ));
        }

        Region::new(self.name.clone(), MultiPolygon::new(polygons))
    }

    /// Mask of `domain` cells whose centre lies inside the region
    /// ([`INSIDE`] / [`OUTSIDE`]).
    pub fn rasterize(&self, domain: &GridDomain) -> Raster<u8> {
        let mut mask = domain.filled(OUTSIDE);
        if !self.intersects_bounds(domain.bounds()) {
            return mask;
        }
        let data = mask.data_mut();
        for row in 0..domain.rows {
            for col in 0..domain.cols {
                let (x, y) = domain.transform.pixel_to_geo(col, row);
                if self.contains(x, y) {
                    data[(row, col)] = INSIDE;
                }
            }
        }
        mask
    }
}

fn simplify_polygon(polygon: &Polygon<f64>, tolerance: f64) -> Option<Polygon<f64>> {
    let exterior = polygon.exterior().simplify(&tolerance);
    if exterior.0.len() < 4 {
        return None;
    }
    let interiors: Vec<LineString<f64>> = polygon
        .interiors()
        .iter()
        .map(|ring| ring.simplify(&tolerance))
        .filter(|ring| ring.0.len() >= 4)
        .collect();
    Some(Polygon::new(exterior, interiors))
}
