//! The station map session.
//!
//! `MapSession` owns everything the page-level script used to keep in
//! globals: the map handle, the selected station and the info-window
//! marker. It is driven from one thread: host events come in through
//! [`MapSession::handle_input`], and async work (overlay rows, geocoding)
//! runs detached on tokio and reports back over a channel drained by
//! [`MapSession::process_pending`].

use crate::{
    core::{
        builder::SessionBuilder,
        config::SessionConfig,
        constants::{LAST_INFO_UNSET, STATION_LAYER_ID},
        geo::{LatLng, LatLngBounds, Point},
        map::Map,
        selection::{SelectedStation, SelectionEvent},
    },
    data::table::{TableQuery, TableRow, TableSource},
    geocoding::{GeocodeRequest, GeocodeResponse, Geocoder, GeocoderStatus},
    input::{InputEvent, MapEvent, MouseButton},
    layers::table::TableLayer,
    runtime::{self, TaskHandle},
    MapError, Result,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;

/// What a finished geocode did to the map
#[derive(Debug, Clone, PartialEq)]
pub enum PanOutcome {
    /// The map was fitted to `viewport`; `center` is where it ended up,
    /// which is the viewport's middle rather than the geocoded location
    Moved {
        center: LatLng,
        viewport: LatLngBounds,
    },
    /// The service had no usable answer; the map was left alone
    Ignored(GeocoderStatus),
}

/// Results of detached work, tagged with the generation that started it
enum Completion {
    OverlayLoaded {
        generation: u64,
        layer_id: String,
        result: Result<Vec<TableRow>>,
    },
    Geocoded {
        generation: u64,
        query: String,
        result: Result<GeocodeResponse>,
    },
}

impl Completion {
    fn generation(&self) -> u64 {
        match self {
            Completion::OverlayLoaded { generation, .. } => *generation,
            Completion::Geocoded { generation, .. } => *generation,
        }
    }
}

pub struct MapSession {
    config: SessionConfig,
    geocoder: Arc<dyn Geocoder>,
    table_source: Arc<dyn TableSource>,
    map: Option<Map>,
    selected: SelectedStation,
    /// Info-window marker; reset on initialize and otherwise untouched
    last_info: i32,
    /// Bumped on every initialize so stale completions can be dropped
    generation: u64,
    completions_tx: Sender<Completion>,
    completions_rx: Receiver<Completion>,
}

impl MapSession {
    pub fn new(
        config: SessionConfig,
        geocoder: Arc<dyn Geocoder>,
        table_source: Arc<dyn TableSource>,
    ) -> Self {
        let (completions_tx, completions_rx) = unbounded();
        Self {
            config,
            geocoder,
            table_source,
            map: None,
            selected: SelectedStation::default(),
            last_info: LAST_INFO_UNSET,
            generation: 0,
            completions_tx,
            completions_rx,
        }
    }

    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Session backed by the hosted table and geocoding services
    pub fn from_config(config: SessionConfig) -> Result<Self> {
        SessionBuilder::new().config(config).build()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.map.is_some()
    }

    pub fn map(&self) -> Option<&Map> {
        self.map.as_ref()
    }

    pub fn map_mut(&mut self) -> Option<&mut Map> {
        self.map.as_mut()
    }

    fn require_map(&mut self) -> Result<&mut Map> {
        Ok(self.map.as_mut().ok_or(MapError::NotInitialized)?)
    }

    pub fn selected_station(&self) -> &SelectedStation {
        &self.selected
    }

    /// `name;longitude;latitude` of the last selected station
    pub fn station_id(&self) -> String {
        self.selected.station_id()
    }

    pub fn last_info(&self) -> i32 {
        self.last_info
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Builds a fresh map with the station overlay and starts loading its rows.
    ///
    /// Any previous map, its listeners, the current selection and all
    /// in-flight completions are discarded. If there is no async runtime the
    /// map is still usable; rows can then be loaded with
    /// [`load_overlay`](Self::load_overlay).
    pub fn initialize(&mut self) -> Result<()> {
        self.generation += 1;
        self.last_info = LAST_INFO_UNSET;
        self.selected = SelectedStation::default();

        let mut map = Map::from_config(&self.config.map);
        let overlay = TableLayer::from_config(STATION_LAYER_ID, &self.config.overlay);
        map.add_layer(Box::new(overlay))?;
        self.map = Some(map);

        log::info!(
            "Map initialized at ({}, {}) zoom {} with overlay from table {}",
            self.config.map.center.lat,
            self.config.map.center.lng,
            self.config.map.zoom,
            self.config.overlay.from
        );

        if let Err(e) = self.spawn_overlay_load() {
            log::warn!("Overlay rows not requested: {}", e);
        }

        Ok(())
    }

    fn spawn_overlay_load(&self) -> Result<TaskHandle> {
        let source = Arc::clone(&self.table_source);
        let query = TableQuery::from(&self.config.overlay);
        let tx = self.completions_tx.clone();
        let generation = self.generation;

        log::debug!("Requesting overlay rows from {}", source.describe());

        runtime::spawn(async move {
            let result = source.fetch(&query).await;
            // A closed channel means the session is gone
            let _ = tx.send(Completion::OverlayLoaded {
                generation,
                layer_id: STATION_LAYER_ID.to_string(),
                result,
            });
        })
    }

    /// Loads overlay rows inline and returns how many arrived
    pub async fn load_overlay(&mut self) -> Result<usize> {
        self.require_map()?;

        let source = Arc::clone(&self.table_source);
        let query = TableQuery::from(&self.config.overlay);
        let result = source.fetch(&query).await;

        self.apply_overlay(STATION_LAYER_ID, result)
    }

    fn apply_overlay(&mut self, layer_id: &str, result: Result<Vec<TableRow>>) -> Result<usize> {
        let map = self.require_map()?;

        match result {
            Ok(rows) => {
                let count = rows.len();
                if !map.set_table_rows(layer_id, rows) {
                    return Err(Box::new(MapError::Layer(format!(
                        "overlay layer `{}` is not attached",
                        layer_id
                    ))));
                }
                log::info!("Overlay {} loaded {} rows", layer_id, count);
                Ok(count)
            }
            Err(e) => {
                log::error!("Overlay {} failed to load: {}", layer_id, e);
                map.report_overlay_error(layer_id, e.to_string());
                Err(e)
            }
        }
    }

    /// Stores the station described by a clicked row.
    ///
    /// Rows missing `StationName`, `Latitude` or `Longitude` (or carrying
    /// non-numeric coordinates) are rejected and the previous selection stays.
    pub fn selection_handler(&mut self, row: &TableRow) -> Result<()> {
        match SelectionEvent::try_from(row) {
            Ok(event) => {
                log::debug!(
                    "Selected station {} at ({}, {})",
                    event.name,
                    event.latitude,
                    event.longitude
                );
                self.selected = SelectedStation::from(event);
                Ok(())
            }
            Err(e) => {
                log::warn!("Rejected station click: {}", e);
                Err(Box::new(e))
            }
        }
    }

    /// Routes a host event to the matching handler
    pub fn handle_input(&mut self, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::Click {
                position,
                button: MouseButton::Left,
            } => self.handle_click(position).map(|_| ()),
            InputEvent::Click { .. } => Ok(()),
            InputEvent::Resize { size } => {
                self.resize_handler(size)?;
                self.dispatch_events().map(|_| ())
            }
        }
    }

    /// Hit-tests a click and applies any station selection.
    /// Returns whether a station on the overlay was hit.
    pub fn handle_click(&mut self, pixel: Point) -> Result<bool> {
        self.require_map()?.handle_click(pixel);
        let events = self.dispatch_events()?;

        Ok(events.iter().any(|event| {
            matches!(event, MapEvent::FeatureClick { layer_id, .. } if layer_id == STATION_LAYER_ID)
        }))
    }

    /// Delivers queued map events to listeners and feeds overlay clicks to
    /// the selection handler. Every event is delivered even if a selection
    /// fails; the first failure is returned afterwards.
    pub fn dispatch_events(&mut self) -> Result<Vec<MapEvent>> {
        let events = match self.map.as_mut() {
            Some(map) => map.process_events(),
            None => return Ok(Vec::new()),
        };

        let mut first_error = None;
        for event in &events {
            if let MapEvent::FeatureClick { layer_id, row, .. } = event {
                if layer_id == STATION_LAYER_ID {
                    if let Err(e) = self.selection_handler(row) {
                        first_error.get_or_insert(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(events),
        }
    }

    /// Keeps the map centered across a canvas size change
    pub fn resize_handler(&mut self, size: Point) -> Result<()> {
        let map = self.require_map()?;
        let center = map.center();
        map.trigger_resize(size);
        map.set_center(center);
        Ok(())
    }

    /// Starts geocoding `query` in the background. The map moves when the
    /// answer is applied by [`process_pending`](Self::process_pending); a
    /// miss or a failed request leaves it unchanged.
    pub fn pan_to(&mut self, query: &str) -> Result<TaskHandle> {
        self.require_map()?;

        let geocoder = Arc::clone(&self.geocoder);
        let tx = self.completions_tx.clone();
        let generation = self.generation;
        let request = GeocodeRequest::new(query);

        runtime::spawn(async move {
            let result = geocoder.geocode(&request).await;
            // A closed channel means the session is gone
            let _ = tx.send(Completion::Geocoded {
                generation,
                query: request.address,
                result,
            });
        })
    }

    /// Geocodes `query` and applies the answer before returning
    pub async fn pan_to_now(&mut self, query: &str) -> Result<PanOutcome> {
        self.require_map()?;

        let geocoder = Arc::clone(&self.geocoder);
        let response = geocoder.geocode(&GeocodeRequest::new(query)).await?;

        self.apply_geocode(query, &response)
    }

    fn apply_geocode(&mut self, query: &str, response: &GeocodeResponse) -> Result<PanOutcome> {
        let map = self.require_map()?;

        let outcome = match response.best() {
            Some(best) => {
                let viewport = best.viewport();
                map.set_center(best.location());
                map.fit_bounds(&viewport);
                let center = map.center();
                log::debug!("Panned to `{}` at ({}, {})", query, center.lat, center.lng);
                PanOutcome::Moved { center, viewport }
            }
            None => {
                let status = response.effective_status();
                log::debug!("Geocoder returned {} for `{}`; map unchanged", status, query);
                PanOutcome::Ignored(status)
            }
        };

        Ok(outcome)
    }

    /// Applies every completion that has arrived, then dispatches the
    /// resulting map events. Returns how many completions were applied.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;

        while let Ok(completion) = self.completions_rx.try_recv() {
            if completion.generation() != self.generation {
                log::debug!(
                    "Dropping completion from generation {} (current {})",
                    completion.generation(),
                    self.generation
                );
                continue;
            }

            match completion {
                Completion::OverlayLoaded {
                    layer_id, result, ..
                } => {
                    // Failures are already logged and queued as OverlayError
                    let _ = self.apply_overlay(&layer_id, result);
                }
                Completion::Geocoded { query, result, .. } => match result {
                    Ok(response) => {
                        if let Err(e) = self.apply_geocode(&query, &response) {
                            log::warn!("Could not apply geocode for `{}`: {}", query, e);
                        }
                    }
                    Err(e) => log::warn!("Geocoding `{}` failed: {}", query, e),
                },
            }
            applied += 1;
        }

        if let Err(e) = self.dispatch_events() {
            log::warn!("Event dispatch reported: {}", e);
        }

        applied
    }

    /// Register a listener on the current map. Listeners do not survive
    /// re-initialization.
    pub fn on<F>(&mut self, event_type: &str, callback: F) -> Result<()>
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.require_map()?.on(event_type, callback);
        Ok(())
    }
}
