//! Pannable, zoomable map view that publishes its center.
//!
//! Every move writes the new center to the shared [`CoordinateHolder`]. There
//! is no bounds validation and no debouncing, and the view never touches the
//! network: fetching weather is a separate, explicit action.

use std::collections::HashMap;
use std::f64::consts::PI;

use tracing::debug;

use crate::{
    coordinate::CoordinateHolder,
    model::{Coordinate, DEFAULT_CENTER},
};

pub const DEFAULT_ZOOM: f64 = 1.5;

/// Web-mercator tile size in pixels at zoom 0.
pub const TILE_SIZE: f64 = 512.0;

/// Highest zoom the tile math will request.
pub const MAX_TILE_ZOOM: u8 = 22;

pub const MAPBOX_TILE_TEMPLATE: &str =
    "https://api.mapbox.com/styles/v1/mapbox/streets-v12/tiles/512/{z}/{x}/{y}?access_token={token}";

#[derive(Debug, Clone)]
pub struct MapView {
    holder: CoordinateHolder,
    center: Coordinate,
    zoom: f64,
}

impl MapView {
    /// Start at the default center and zoom, publishing the initial center.
    pub fn new(holder: CoordinateHolder) -> Self {
        holder.set(DEFAULT_CENTER);
        Self { holder, center: DEFAULT_CENTER, zoom: DEFAULT_ZOOM }
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn holder(&self) -> &CoordinateHolder {
        &self.holder
    }

    pub fn move_to(&mut self, center: Coordinate) {
        self.center = center;
        debug!(longitude = center.longitude, latitude = center.latitude, "map moved");
        self.holder.set(center);
    }

    pub fn pan_by(&mut self, d_longitude: f64, d_latitude: f64) {
        let next = Coordinate::new(self.center.longitude + d_longitude, self.center.latitude + d_latitude);
        self.move_to(next);
    }

    /// Pan by screen pixels: positive `dx` moves east, positive `dy` moves south.
    pub fn pan_pixels(&mut self, dx: f64, dy: f64) {
        let world = world_size(self.zoom);
        let (x, y) = project(self.center, world);
        self.move_to(unproject(x + dx, y + dy, world));
    }

    /// Zooming keeps the center and publishes it again, like any other move event.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
        self.holder.set(self.center);
    }

    /// Interpolate a slippy-map tile URL for the tile under the current center.
    pub fn tile_url(&self, template: &str, access_token: &str) -> String {
        let (z, x, y) = tile_for(self.center, self.zoom);

        let mut values: HashMap<&str, String> = HashMap::new();
        values.insert("z", z.to_string());
        values.insert("x", x.to_string());
        values.insert("y", y.to_string());
        values.insert("token", access_token.to_string());

        let mut url = template.to_string();
        for (key, value) in &values {
            url = url.replace(&format!("{{{key}}}"), value);
        }
        url
    }
}

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

fn project(c: Coordinate, world: f64) -> (f64, f64) {
    let x = (c.longitude + 180.0) / 360.0 * world;
    let lat_rad = c.latitude.to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * world;
    (x, y)
}

fn unproject(x: f64, y: f64, world: f64) -> Coordinate {
    let longitude = x / world * 360.0 - 180.0;
    let latitude = (PI * (1.0 - 2.0 * y / world)).sinh().atan().to_degrees();
    Coordinate::new(longitude, latitude)
}

fn tile_for(c: Coordinate, zoom: f64) -> (u8, i64, i64) {
    let z = zoom.floor().clamp(0.0, f64::from(MAX_TILE_ZOOM)) as u8;
    let n = 1_i64 << z;
    let (x, y) = project(c, n as f64);

    let x_tile = ((x.floor() as i64 % n) + n) % n;
    let y_tile = (y.floor() as i64).clamp(0, n - 1);
    (z, x_tile, y_tile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn counting_view() -> (MapView, Arc<Mutex<Vec<Coordinate>>>) {
        let holder = CoordinateHolder::default();
        let view = MapView::new(holder.clone());
        let writes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&writes);
        holder.subscribe(move |c| sink.lock().push(c));
        (view, writes)
    }

    #[test]
    fn starts_at_default_center_and_zoom() {
        let holder = CoordinateHolder::new(Coordinate::new(0.0, 0.0));
        let view = MapView::new(holder.clone());

        assert_eq!(view.center(), DEFAULT_CENTER);
        assert_eq!(view.zoom(), DEFAULT_ZOOM);
        assert_eq!(holder.get(), DEFAULT_CENTER);
    }

    #[test]
    fn every_pan_publishes_once() {
        let (mut view, writes) = counting_view();

        view.pan_by(1.0, 0.0);
        view.pan_by(0.0, -1.0);
        view.pan_pixels(3.0, 4.0);

        let writes = writes.lock();
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[0], Coordinate::new(-73.006, 40.7128));
        assert_eq!(*writes.last().unwrap(), view.center());
        assert_eq!(view.holder().get(), view.center());
    }

    #[test]
    fn out_of_range_coordinates_are_published_unchanged() {
        let (mut view, writes) = counting_view();

        view.move_to(Coordinate::new(400.0, -95.0));

        assert_eq!(writes.lock()[0], Coordinate::new(400.0, -95.0));
    }

    #[test]
    fn zero_pixel_pan_keeps_center() {
        let (mut view, _) = counting_view();
        view.pan_pixels(0.0, 0.0);

        assert!(approx(view.center().longitude, DEFAULT_CENTER.longitude));
        assert!(approx(view.center().latitude, DEFAULT_CENTER.latitude));
    }

    #[test]
    fn pixel_pan_direction_follows_screen_axes() {
        let (mut view, _) = counting_view();
        view.set_zoom(3.0);

        view.pan_pixels(100.0, 100.0);

        assert!(view.center().longitude > DEFAULT_CENTER.longitude);
        assert!(view.center().latitude < DEFAULT_CENTER.latitude);
    }

    #[test]
    fn pixel_pan_scales_with_zoom() {
        let (mut view, _) = counting_view();
        view.set_zoom(0.0);
        view.pan_pixels(TILE_SIZE / 4.0, 0.0);

        assert!(approx(view.center().longitude, DEFAULT_CENTER.longitude + 90.0));
    }

    #[test]
    fn tile_url_interpolates_center_tile() {
        let holder = CoordinateHolder::default();
        let mut view = MapView::new(holder);
        view.set_zoom(10.0);
        view.move_to(Coordinate::new(-74.006, 40.7128));

        let url = view.tile_url("https://tiles/{z}/{x}/{y}?access_token={token}", "TOKEN");

        assert_eq!(url, "https://tiles/10/301/385?access_token=TOKEN");
    }

    #[test]
    fn tile_url_floors_fractional_zoom() {
        let holder = CoordinateHolder::default();
        let view = MapView::new(holder);

        let url = view.tile_url("{z}/{x}/{y}", "");

        assert_eq!(url, "1/0/0");
    }
}
