//! Geographic primitives: coordinates, bounding rectangles, and the fixed
//! projection from latitude/longitude into map-view world space.

use bevy::prelude::*;

/// A geographic coordinate in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// An axis-aligned geographic rectangle. `south <= north`, `west <= east`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// Fallback frame covering the whole ranger district, used whenever there
/// are no coordinates to fit.
pub const DISTRICT_BOUNDS: GeoBounds = GeoBounds {
    south: 40.45,
    west: -105.95,
    north: 40.95,
    east: -105.25,
};

/// Fractional padding applied around fitted bounds so edge markers are not
/// clipped by the viewport.
pub const BOUNDS_PADDING_FRACTION: f64 = 0.1;

/// Minimum absolute padding in degrees. Keeps a single-point fit from
/// collapsing to a zero-area rectangle.
const MIN_PADDING_DEG: f64 = 0.004;

impl GeoBounds {
    /// Smallest rectangle covering all points, or `None` for an empty slice.
    pub fn from_points(points: &[LatLon]) -> Option<GeoBounds> {
        let first = points.first()?;
        let mut bounds = GeoBounds {
            south: first.lat,
            west: first.lon,
            north: first.lat,
            east: first.lon,
        };

        for point in &points[1..] {
            bounds.south = bounds.south.min(point.lat);
            bounds.west = bounds.west.min(point.lon);
            bounds.north = bounds.north.max(point.lat);
            bounds.east = bounds.east.max(point.lon);
        }

        Some(bounds)
    }

    pub fn padded(self, fraction: f64) -> GeoBounds {
        if fraction <= 0.0 {
            return self;
        }

        let pad_lat = (self.lat_span() * fraction).max(MIN_PADDING_DEG);
        let pad_lon = (self.lon_span() * fraction).max(MIN_PADDING_DEG);

        GeoBounds {
            south: self.south - pad_lat,
            west: self.west - pad_lon,
            north: self.north + pad_lat,
            east: self.east + pad_lon,
        }
    }

    pub fn center(self) -> LatLon {
        LatLon::new(
            (self.south + self.north) * 0.5,
            (self.west + self.east) * 0.5,
        )
    }

    pub fn lat_span(self) -> f64 {
        self.north - self.south
    }

    pub fn lon_span(self) -> f64 {
        self.east - self.west
    }

    pub fn contains(self, point: LatLon) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lon >= self.west
            && point.lon <= self.east
    }

    /// True when every part of `point`'s neighborhood is strictly inside,
    /// i.e. the point does not touch any edge.
    pub fn strictly_contains(self, point: LatLon) -> bool {
        point.lat > self.south
            && point.lat < self.north
            && point.lon > self.west
            && point.lon < self.east
    }
}

/// Padded frame around a point set. An empty set frames the whole district
/// rather than computing bounds over zero points.
pub fn frame_points(points: &[LatLon]) -> GeoBounds {
    match GeoBounds::from_points(points) {
        Some(bounds) => bounds.padded(BOUNDS_PADDING_FRACTION),
        None => DISTRICT_BOUNDS,
    }
}

/// Projection origin: the district center. World (0, 0) sits here.
pub const MAP_ORIGIN: LatLon = LatLon::new(40.70, -105.60);

const KM_PER_DEGREE_LAT: f64 = 110.97;
const KM_PER_DEGREE_LON_EQUATOR: f64 = 111.32;

/// Map-view scale. The district is a few dozen kilometers across, which
/// puts the projected extent comfortably inside a window at scale 1.0.
pub const PIXELS_PER_KM: f64 = 8.0;

fn km_per_degree_lon(lat: f64) -> f64 {
    KM_PER_DEGREE_LON_EQUATOR * lat.to_radians().cos()
}

/// Equirectangular projection around [`MAP_ORIGIN`]. Adequate at district
/// scale; distortion across half a degree of latitude is invisible here.
pub fn project(point: LatLon) -> Vec2 {
    let x = (point.lon - MAP_ORIGIN.lon) * km_per_degree_lon(MAP_ORIGIN.lat) * PIXELS_PER_KM;
    let y = (point.lat - MAP_ORIGIN.lat) * KM_PER_DEGREE_LAT * PIXELS_PER_KM;
    Vec2::new(x as f32, y as f32)
}

pub fn bounds_world_center(bounds: &GeoBounds) -> Vec2 {
    project(bounds.center())
}

pub fn bounds_world_size(bounds: &GeoBounds) -> Vec2 {
    let sw = project(LatLon::new(bounds.south, bounds.west));
    let ne = project(LatLon::new(bounds.north, bounds.east));
    (ne - sw).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        let diff = (a - b).abs();
        assert!(diff < 1e-9, "expected {} close to {}", a, b);
    }

    #[test]
    fn from_points_empty_is_none() {
        assert!(GeoBounds::from_points(&[]).is_none());
    }

    #[test]
    fn from_points_single_point_is_degenerate() {
        let p = LatLon::new(40.6, -105.5);
        let bounds = GeoBounds::from_points(&[p]).unwrap();
        assert_close(bounds.south, 40.6);
        assert_close(bounds.north, 40.6);
        assert_close(bounds.west, -105.5);
        assert_close(bounds.east, -105.5);
    }

    #[test]
    fn from_points_covers_all_points() {
        let points = [
            LatLon::new(40.6, -105.5),
            LatLon::new(40.8, -105.3),
            LatLon::new(40.5, -105.7),
        ];
        let bounds = GeoBounds::from_points(&points).unwrap();
        assert_close(bounds.south, 40.5);
        assert_close(bounds.north, 40.8);
        assert_close(bounds.west, -105.7);
        assert_close(bounds.east, -105.3);
        for point in points {
            assert!(bounds.contains(point));
        }
    }

    #[test]
    fn frame_points_empty_uses_district_fallback() {
        assert_eq!(frame_points(&[]), DISTRICT_BOUNDS);
    }

    #[test]
    fn frame_points_single_point_strictly_contains_it() {
        let p = LatLon::new(40.66, -105.47);
        let framed = frame_points(&[p]);
        assert!(framed.strictly_contains(p));
        assert!(framed.lat_span() > 0.0);
        assert!(framed.lon_span() > 0.0);
    }

    #[test]
    fn padded_zero_fraction_is_identity() {
        let bounds = GeoBounds {
            south: 40.5,
            west: -105.7,
            north: 40.8,
            east: -105.3,
        };
        assert_eq!(bounds.padded(0.0), bounds);
    }

    #[test]
    fn padded_expands_every_edge() {
        let bounds = GeoBounds {
            south: 40.5,
            west: -105.7,
            north: 40.8,
            east: -105.3,
        };
        let padded = bounds.padded(BOUNDS_PADDING_FRACTION);
        assert!(padded.south < bounds.south);
        assert!(padded.west < bounds.west);
        assert!(padded.north > bounds.north);
        assert!(padded.east > bounds.east);
    }

    #[test]
    fn padded_fraction_matches_span() {
        let bounds = GeoBounds {
            south: 40.0,
            west: -106.0,
            north: 41.0,
            east: -105.0,
        };
        let padded = bounds.padded(0.1);
        assert_close(padded.north - bounds.north, 0.1);
        assert_close(bounds.south - padded.south, 0.1);
        assert_close(bounds.west - padded.west, 0.1);
        assert_close(padded.east - bounds.east, 0.1);
    }

    #[test]
    fn district_bounds_cover_origin() {
        assert!(DISTRICT_BOUNDS.contains(MAP_ORIGIN));
    }

    #[test]
    fn center_is_midpoint() {
        let bounds = GeoBounds {
            south: 40.0,
            west: -106.0,
            north: 41.0,
            east: -105.0,
        };
        let center = bounds.center();
        assert_close(center.lat, 40.5);
        assert_close(center.lon, -105.5);
    }

    #[test]
    fn project_origin_is_world_zero() {
        let world = project(MAP_ORIGIN);
        assert!(world.x.abs() < 1e-4);
        assert!(world.y.abs() < 1e-4);
    }

    #[test]
    fn project_north_increases_y() {
        let south = project(LatLon::new(40.5, MAP_ORIGIN.lon));
        let north = project(LatLon::new(40.9, MAP_ORIGIN.lon));
        assert!(north.y > south.y);
    }

    #[test]
    fn project_east_increases_x() {
        let west = project(LatLon::new(MAP_ORIGIN.lat, -105.9));
        let east = project(LatLon::new(MAP_ORIGIN.lat, -105.3));
        assert!(east.x > west.x);
    }

    #[test]
    fn bounds_world_size_positive_for_district() {
        let size = bounds_world_size(&DISTRICT_BOUNDS);
        assert!(size.x > 0.0);
        assert!(size.y > 0.0);
    }

    #[test]
    fn bounds_world_center_matches_projected_center() {
        let bounds = GeoBounds {
            south: 40.5,
            west: -105.7,
            north: 40.8,
            east: -105.3,
        };
        let center = bounds_world_center(&bounds);
        let direct = project(bounds.center());
        assert!((center - direct).length() < 1e-4);
    }
}
