use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Latitude limit of the Web Mercator projection
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// A WGS84 position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside ±90 / ±180
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }

    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Brings a longitude back into ±180; values already in range are kept
    pub fn wrap_lng(lng: f64) -> f64 {
        if (-180.0..=180.0).contains(&lng) {
            lng
        } else {
            (lng + 180.0).rem_euclid(360.0) - 180.0
        }
    }

    /// Parses a `"lat, lng"` or `"lat lng"` pair, as stored in a
    /// location column
    pub fn parse_pair(text: &str) -> Option<LatLng> {
        let mut parts = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty());
        let lat = parts.next()?.parse::<f64>().ok()?;
        let lng = parts.next()?.parse::<f64>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        let lat_lng = LatLng::new(lat, lng);
        lat_lng.is_valid().then_some(lat_lng)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Screen or world pixel coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }
}

/// Box between two corners. When `south_west.lng > north_east.lng` the box
/// crosses the antimeridian and runs east from the south-west corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.south_west.lng > self.north_east.lng
    }

    /// Width in degrees of longitude, measured eastwards
    pub fn lng_span(&self) -> f64 {
        let span = self.north_east.lng - self.south_west.lng;
        if self.crosses_antimeridian() {
            span + 360.0
        } else {
            span
        }
    }

    pub fn contains(&self, point: &LatLng) -> bool {
        let (west, east) = (self.south_west.lng, self.north_east.lng);
        let in_lng = if self.crosses_antimeridian() {
            point.lng >= west || point.lng <= east
        } else {
            (west..=east).contains(&point.lng)
        };
        in_lng && (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
    }

    pub fn contains_bounds(&self, other: &LatLngBounds) -> bool {
        self.contains(&other.south_west)
            && self.contains(&other.north_east)
            && other.lng_span() <= self.lng_span()
    }

    /// Midpoint in degrees, not in projected space
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            LatLng::wrap_lng(self.south_west.lng + self.lng_span() / 2.0),
        )
    }

    pub fn north_west(&self) -> LatLng {
        LatLng::new(self.north_east.lat, self.south_west.lng)
    }

    pub fn south_east(&self) -> LatLng {
        LatLng::new(self.south_west.lat, self.north_east.lng)
    }
}
