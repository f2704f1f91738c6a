use crate::core::constants::{MAX_ZOOM, MIN_ZOOM, TILE_SIZE};
use crate::core::geo::{LatLng, LatLngBounds, Point, MAX_LATITUDE};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Padding, in pixels, kept around bounds passed to `fit_bounds`
const DEFAULT_FIT_PADDING: f64 = 20.0;

/// The visible window onto a Web Mercator world: center, zoom and canvas size.
///
/// Container pixels are measured from the canvas' top-left corner, with the
/// center always at `size / 2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
    pub size: Point,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center: clamp_center(center),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            size,
        }
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.center = clamp_center(center);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Resizes the canvas with its top-left corner pinned.
    ///
    /// This is what a bare canvas does when its container changes size: the
    /// content stays anchored to the origin, so the geographic center drifts
    /// by half the size change.
    pub fn resize_from_origin(&mut self, size: Point) {
        let top_left = self.project(&self.center, self.zoom) - self.size * 0.5;
        let new_center = top_left + size * 0.5;

        self.size = size;
        self.center = clamp_center(self.unproject(&new_center, self.zoom));
    }

    fn world_size(zoom: f64) -> f64 {
        TILE_SIZE * 2_f64.powf(zoom)
    }

    /// World pixel coordinates at `zoom` (EPSG:3857)
    fn project(&self, lat_lng: &LatLng, zoom: f64) -> Point {
        let scale = Self::world_size(zoom);
        let lat_rad = LatLng::clamp_lat(lat_lng.lat).to_radians();

        Point::new(
            (lat_lng.lng + 180.0) / 360.0 * scale,
            (1.0 - (PI / 4.0 + lat_rad / 2.0).tan().ln() / PI) / 2.0 * scale,
        )
    }

    fn unproject(&self, world: &Point, zoom: f64) -> LatLng {
        let scale = Self::world_size(zoom);
        let n = PI * (1.0 - 2.0 * world.y / scale);

        LatLng::new(n.sinh().atan().to_degrees(), world.x / scale * 360.0 - 180.0)
    }

    /// Container pixel of a position, taken from the world copy nearest
    /// the center so stations just across the antimeridian stay close
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        let world = Self::world_size(self.zoom);
        let mut offset = self.project(lat_lng, self.zoom) - self.project(&self.center, self.zoom);
        if offset.x > world / 2.0 {
            offset.x -= world;
        } else if offset.x < -world / 2.0 {
            offset.x += world;
        }
        offset + self.size * 0.5
    }

    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let origin = self.project(&self.center, self.zoom);
        let lat_lng = self.unproject(&(*pixel - self.size * 0.5 + origin), self.zoom);
        LatLng::new(lat_lng.lat, LatLng::wrap_lng(lat_lng.lng))
    }

    /// Geographic extent of the canvas. A canvas wider than the world spans
    /// every longitude; otherwise the box may cross the antimeridian.
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.pixel_to_lat_lng(&Point::default());
        let se = self.pixel_to_lat_lng(&self.size);

        if self.size.x >= Self::world_size(self.zoom) {
            LatLngBounds::from_coords(se.lat, -180.0, nw.lat, 180.0)
        } else {
            LatLngBounds::from_coords(se.lat, nw.lng, nw.lat, se.lng)
        }
    }

    /// Centers on `bounds` and picks the largest whole zoom that shows them
    /// inside the padded canvas. Falls back to the minimum zoom when even
    /// that is too tight.
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: Option<f64>) {
        let padding = padding.unwrap_or(DEFAULT_FIT_PADDING);
        let available_x = (self.size.x - 2.0 * padding).max(0.0);
        let available_y = (self.size.y - 2.0 * padding).max(0.0);

        let fits = |zoom: f64| {
            let width = bounds.lng_span() / 360.0 * Self::world_size(zoom);
            let height = self.project(&bounds.south_east(), zoom).y
                - self.project(&bounds.north_west(), zoom).y;
            width <= available_x && height.abs() <= available_y
        };
        let best_zoom = (MIN_ZOOM as i32..=MAX_ZOOM as i32)
            .map(f64::from)
            .take_while(|zoom| fits(*zoom))
            .last()
            .unwrap_or(MIN_ZOOM);

        self.set_center(bounds.center());
        self.set_zoom(best_zoom);
    }
}

fn clamp_center(center: LatLng) -> LatLng {
    LatLng::new(
        center.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
        LatLng::wrap_lng(center.lng),
    )
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::default(), MIN_ZOOM, Point::new(800.0, 600.0))
    }
}
