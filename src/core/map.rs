use crate::{
    core::{
        config::{ControlOptions, MapConfig, MapType},
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    data::table::TableRow,
    input::{EventManager, MapEvent},
    layers::{base::LayerTrait, manager::LayerManager, table::TableLayer},
    Result,
};

/// Handle to one map view: viewport, layer stack and event queue.
///
/// A fresh `Map` is built on every session initialization; listeners and
/// layers die with it.
pub struct Map {
    viewport: Viewport,
    layer_manager: LayerManager,
    event_manager: EventManager,
    map_type: MapType,
    controls: ControlOptions,
}

impl Map {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            viewport: Viewport::new(center, zoom, size),
            layer_manager: LayerManager::new(),
            event_manager: EventManager::new(),
            map_type: MapType::default(),
            controls: ControlOptions::default(),
        }
    }

    pub fn from_config(config: &MapConfig) -> Self {
        let mut map = Self::new(config.center, config.zoom, config.size);
        map.map_type = config.map_type;
        map.controls = config.controls.clone();
        map
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn center(&self) -> LatLng {
        self.viewport.center
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    pub fn size(&self) -> Point {
        self.viewport.size
    }

    /// Geographic extent currently on screen
    pub fn bounds(&self) -> LatLngBounds {
        self.viewport.bounds()
    }

    pub fn map_type(&self) -> MapType {
        self.map_type
    }

    pub fn controls(&self) -> &ControlOptions {
        &self.controls
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.update_view(|viewport| viewport.set_center(center));
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.update_view(|viewport| viewport.set_zoom(zoom));
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.update_view(|viewport| {
            viewport.set_center(center);
            viewport.set_zoom(zoom);
        });
    }

    pub fn fit_bounds(&mut self, bounds: &LatLngBounds) {
        self.update_view(|viewport| viewport.fit_bounds(bounds, None));
    }

    /// Tells the view its canvas changed size.
    ///
    /// The view keeps its top-left corner where it was, so the center moves;
    /// callers that care restore it afterwards.
    pub fn trigger_resize(&mut self, size: Point) {
        if !(size.x > 0.0 && size.y > 0.0) {
            log::warn!("Ignoring resize to {}x{}", size.x, size.y);
            return;
        }
        if size == self.viewport.size {
            return;
        }

        self.update_view(|viewport| viewport.resize_from_origin(size));
        self.event_manager.emit(MapEvent::Resize { size });
    }

    fn update_view<F>(&mut self, change: F)
    where
        F: FnOnce(&mut Viewport),
    {
        let old_center = self.viewport.center;
        let old_zoom = self.viewport.zoom;

        change(&mut self.viewport);

        if self.viewport.center != old_center || self.viewport.zoom != old_zoom {
            self.event_manager.emit(MapEvent::ViewChanged {
                center: self.viewport.center,
                zoom: self.viewport.zoom,
            });
        }
    }

    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        self.layer_manager.add_layer(layer)?;
        self.event_manager.emit(MapEvent::LayerAdd { layer_id });
        Ok(())
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        let removed = self.layer_manager.remove_layer(layer_id);
        if removed.is_some() {
            self.event_manager.emit(MapEvent::LayerRemove {
                layer_id: layer_id.to_string(),
            });
        }
        removed
    }

    pub fn layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layer_manager.get_layer(layer_id)
    }

    pub fn layer_mut(&mut self, layer_id: &str) -> Option<&mut (dyn LayerTrait + 'static)> {
        self.layer_manager.get_layer_mut(layer_id)
    }

    pub fn layer_ids(&self) -> Vec<String> {
        self.layer_manager.list_layers()
    }

    /// Typed access to a table overlay
    pub fn table_layer(&self, layer_id: &str) -> Option<&TableLayer> {
        self.layer_manager
            .get_layer(layer_id)?
            .as_any()
            .downcast_ref::<TableLayer>()
    }

    pub fn table_layer_mut(&mut self, layer_id: &str) -> Option<&mut TableLayer> {
        self.layer_mut(layer_id)?
            .as_any_mut()
            .downcast_mut::<TableLayer>()
    }

    /// Hands rows to a table overlay and announces them
    pub fn set_table_rows(&mut self, layer_id: &str, rows: Vec<TableRow>) -> bool {
        let count = rows.len();
        let Some(layer) = self.table_layer_mut(layer_id) else {
            return false;
        };
        layer.set_rows(rows);

        self.event_manager.emit(MapEvent::OverlayLoaded {
            layer_id: layer_id.to_string(),
            rows: count,
        });
        true
    }

    /// Queues an overlay failure for listeners
    pub fn report_overlay_error(&mut self, layer_id: &str, message: String) {
        self.event_manager.emit(MapEvent::OverlayError {
            layer_id: layer_id.to_string(),
            message,
        });
    }

    /// Hit-tests a click and queues `FeatureClick` for the topmost feature,
    /// or a plain `Click` when nothing is under the pointer
    pub fn handle_click(&mut self, pixel: Point) {
        let lat_lng = self.viewport.pixel_to_lat_lng(&pixel);

        let event = match self.layer_manager.hit_test(&self.viewport, &pixel) {
            Some((layer_id, row)) => MapEvent::FeatureClick {
                layer_id,
                row,
                lat_lng,
            },
            None => MapEvent::Click { lat_lng, pixel },
        };

        self.event_manager.emit(event);
    }

    /// Register an event listener on this map
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.event_manager.on(event_type, callback);
    }

    /// Dispatch queued events to listeners and return them
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        self.event_manager.process_events()
    }

    pub fn pending_events(&self) -> usize {
        self.event_manager.pending_events()
    }
}
