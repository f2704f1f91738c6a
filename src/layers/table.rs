//! Overlay layer backed by a hosted table of stations.
//!
//! Rows are positioned from the query's location column when it holds a
//! `"lat, lng"` pair, otherwise from the `Latitude`/`Longitude` columns.
//! Rows without a usable position stay in the layer but cannot be clicked.

use crate::core::config::OverlayConfig;
use crate::core::constants::{LATITUDE_FIELD, LONGITUDE_FIELD};
use crate::core::geo::{LatLng, LatLngBounds, Point};
use crate::core::viewport::Viewport;
use crate::data::table::{TableQuery, TableRow};
use crate::layers::base::{LayerProperties, LayerTrait, LayerType};
use crate::spatial::index::{SpatialIndex, SpatialItem};

pub struct TableLayer {
    properties: LayerProperties,
    query: TableQuery,
    style_id: u32,
    template_id: u32,
    hit_tolerance_px: f64,
    rows: Vec<TableRow>,
    index: SpatialIndex<usize>,
    loaded: bool,
}

impl TableLayer {
    pub fn new(id: impl Into<String>, query: TableQuery) -> Self {
        let id = id.into();
        Self {
            properties: LayerProperties::new(id.clone(), id, LayerType::Table),
            query,
            style_id: 0,
            template_id: 0,
            hit_tolerance_px: crate::core::constants::DEFAULT_HIT_TOLERANCE_PX,
            rows: Vec::new(),
            index: SpatialIndex::new(),
            loaded: false,
        }
    }

    pub fn from_config(id: impl Into<String>, config: &OverlayConfig) -> Self {
        Self::new(id, TableQuery::from(config))
            .with_style(config.style_id, config.template_id)
            .with_hit_tolerance(config.hit_tolerance_px)
    }

    pub fn with_style(mut self, style_id: u32, template_id: u32) -> Self {
        self.style_id = style_id;
        self.template_id = template_id;
        self
    }

    pub fn with_hit_tolerance(mut self, pixels: f64) -> Self {
        self.hit_tolerance_px = pixels.max(0.0);
        self
    }

    pub fn query(&self) -> &TableQuery {
        &self.query
    }

    pub fn style_id(&self) -> u32 {
        self.style_id
    }

    pub fn template_id(&self) -> u32 {
        self.template_id
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Number of rows that have a position and can be clicked
    pub fn clickable_count(&self) -> usize {
        self.index.len()
    }

    /// True once rows have been delivered, even if there were none
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Replaces the layer's rows and rebuilds the hit-test index
    pub fn set_rows(&mut self, rows: Vec<TableRow>) {
        let items: Vec<_> = rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| self.row_position(row).map(|pos| SpatialItem::new(pos, i)))
            .collect();

        let unplaced = rows.len() - items.len();
        if unplaced > 0 {
            log::debug!(
                "Layer {}: {} of {} rows have no usable position",
                self.properties.id,
                unplaced,
                rows.len()
            );
        }

        self.index = SpatialIndex::bulk_load(items);
        self.rows = rows;
        self.loaded = true;
    }

    /// Position of a row, from the location column or the coordinate columns
    pub fn row_position(&self, row: &TableRow) -> Option<LatLng> {
        if let Some(position) = row
            .get(&self.query.select)
            .and_then(|cell| LatLng::parse_pair(&cell.value()))
        {
            return Some(position);
        }

        let lat = row.get(LATITUDE_FIELD)?.as_f64()?;
        let lng = row.get(LONGITUDE_FIELD)?.as_f64()?;
        let position = LatLng::new(lat, lng);
        position.is_valid().then_some(position)
    }
}

impl LayerTrait for TableLayer {
    fn id(&self) -> &str {
        &self.properties.id
    }

    fn name(&self) -> &str {
        &self.properties.name
    }

    fn layer_type(&self) -> LayerType {
        self.properties.layer_type
    }

    fn z_index(&self) -> i32 {
        self.properties.z_index
    }

    fn set_z_index(&mut self, z_index: i32) {
        self.properties.z_index = z_index;
    }

    fn is_visible(&self) -> bool {
        self.properties.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.properties.visible = visible;
    }

    fn is_interactive(&self) -> bool {
        self.properties.interactive
    }

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "query": {
                "select": self.query.select,
                "from": self.query.from,
                "where": self.query.where_clause,
            },
            "styleId": self.style_id,
            "templateId": self.template_id,
        })
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        self.index.bounds()
    }

    fn feature_at(&self, viewport: &Viewport, pixel: &Point) -> Option<TableRow> {
        if self.index.is_empty() {
            return None;
        }

        // Geographic box covering the tolerance square around the click
        let tolerance = self.hit_tolerance_px;
        let nw = viewport.pixel_to_lat_lng(&Point::new(pixel.x - tolerance, pixel.y - tolerance));
        let se = viewport.pixel_to_lat_lng(&Point::new(pixel.x + tolerance, pixel.y + tolerance));
        let search = LatLngBounds::from_coords(se.lat, nw.lng, nw.lat, se.lng);

        self.index
            .query(&search)
            .into_iter()
            .map(|item| {
                let distance = viewport.lat_lng_to_pixel(&item.position).distance_to(pixel);
                (distance, item.data)
            })
            .filter(|(distance, _)| *distance <= tolerance)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .and_then(|(_, i)| self.rows.get(i).cloned())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
