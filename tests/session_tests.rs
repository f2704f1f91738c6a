use async_trait::async_trait;
use stationmap::prelude::*;
use stationmap::constants::STATION_LAYER_ID;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Session-level scenarios: clicks, resizes, geocoded panning and
/// re-initialization, driven through stub backends
#[cfg(test)]
mod session_tests {
    use super::*;

    /// Answers every request with the same canned response
    struct FixedGeocoder(GeocodeResponse);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn geocode(&self, _request: &GeocodeRequest) -> Result<GeocodeResponse> {
            Ok(self.0.clone())
        }
    }

    /// Fails like a dropped connection
    struct UnreachableGeocoder;

    #[async_trait]
    impl Geocoder for UnreachableGeocoder {
        async fn geocode(&self, _request: &GeocodeRequest) -> Result<GeocodeResponse> {
            Err(Box::new(MapError::Geocoding("connection refused".to_string())))
        }
    }

    struct BrokenTable;

    #[async_trait]
    impl TableSource for BrokenTable {
        async fn fetch(&self, _query: &TableQuery) -> Result<Vec<TableRow>> {
            Err(Box::new(MapError::Layer("table is gone".to_string())))
        }

        fn describe(&self) -> String {
            "broken table".to_string()
        }
    }

    fn station(name: &str, lat: &str, lng: &str) -> TableRow {
        TableRow::new()
            .with("StationName", name)
            .with("Latitude", lat)
            .with("Longitude", lng)
    }

    fn boston() -> GeocodeResponse {
        let viewport = LatLngBounds::from_coords(42.23, -71.19, 42.40, -70.92);
        GeocodeResponse::ok(vec![GeocodeResult::new(
            "Boston, MA, USA",
            LatLng::new(42.3601, -71.0589),
            viewport,
        )])
    }

    fn fiji() -> GeocodeResponse {
        let viewport = LatLngBounds::from_coords(-21.0, 176.8, -12.4, -178.2);
        GeocodeResponse::ok(vec![GeocodeResult::new(
            "Fiji",
            LatLng::new(-17.7, 178.0),
            viewport,
        )])
    }

    fn session(geocoder: Arc<dyn Geocoder>, rows: Vec<TableRow>) -> MapSession {
        let _ = env_logger::builder().is_test(true).try_init();
        MapSession::new(
            SessionConfig::default(),
            geocoder,
            Arc::new(InMemoryTableSource::new(rows)),
        )
    }

    /// Drain completions until the overlay reports back
    async fn wait_for_overlay(session: &mut MapSession) {
        for _ in 0..100 {
            session.process_pending();
            let loaded = session
                .map()
                .and_then(|map| map.table_layer(STATION_LAYER_ID))
                .map(|layer| layer.is_loaded())
                .unwrap_or(false);
            if loaded {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("overlay never loaded");
    }

    /// Drain completions until `count` have been applied
    async fn wait_for_completions(session: &mut MapSession, count: usize) {
        let mut applied = 0;
        for _ in 0..100 {
            applied += session.process_pending();
            if applied >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("only {} of {} completions arrived", applied, count);
    }

    /// A fresh session reports no station
    #[tokio::test]
    async fn test_station_id_before_any_click() {
        let mut session = session(Arc::new(FixedGeocoder(boston())), vec![]);
        session.initialize().unwrap();

        assert_eq!(session.station_id(), "none;undefined;undefined");
        assert_eq!(session.last_info(), -1);
    }

    /// Station ids are name, longitude, latitude
    #[tokio::test]
    async fn test_selection_reports_longitude_first() {
        let mut session = session(Arc::new(FixedGeocoder(boston())), vec![]);
        session.initialize().unwrap();

        session.selection_handler(&station("Buoy1", "10.5", "-20.25")).unwrap();

        assert_eq!(session.station_id(), "Buoy1;-20.25;10.5");
    }

    /// Coordinates are reported exactly as the table spells them
    #[tokio::test]
    async fn test_station_id_keeps_cell_text() {
        let mut session = session(Arc::new(FixedGeocoder(boston())), vec![]);
        session.initialize().unwrap();

        session.selection_handler(&station("S", "29.3100", "-94.7900")).unwrap();
        assert_eq!(session.station_id(), "S;-94.7900;29.3100");

        let numeric = TableRow::new()
            .with("StationName", "Origin")
            .with("Latitude", 0.0000001)
            .with("Longitude", -0.0);
        session.selection_handler(&numeric).unwrap();
        assert_eq!(session.station_id(), "Origin;0;1e-7");
    }

    /// Clicking a loaded station selects it; clicking empty map does not
    #[tokio::test]
    async fn test_click_on_overlay_selects_station() {
        let rows = vec![
            station("Galveston Pier 21", "29.31", "-94.79"),
            station("Buoy1", "40.0", "-95.0"),
        ];
        let mut session = session(Arc::new(FixedGeocoder(boston())), rows);
        session.initialize().unwrap();
        wait_for_overlay(&mut session).await;

        let pixel = session
            .map()
            .unwrap()
            .viewport()
            .lat_lng_to_pixel(&LatLng::new(40.0, -95.0));

        assert!(!session.handle_click(Point::new(2.0, 2.0)).unwrap());
        assert_eq!(session.station_id(), "none;undefined;undefined");

        session
            .handle_input(InputEvent::Click {
                position: pixel,
                button: MouseButton::Left,
            })
            .unwrap();
        assert_eq!(session.station_id(), "Buoy1;-95.0;40.0");
    }

    /// A row without usable coordinates keeps the previous selection
    #[tokio::test]
    async fn test_malformed_click_keeps_previous_station() {
        let mut session = session(Arc::new(FixedGeocoder(boston())), vec![]);
        session.initialize().unwrap();
        session.selection_handler(&station("Buoy1", "10.5", "-20.25")).unwrap();

        let missing_name = TableRow::new().with("Latitude", "1").with("Longitude", "2");
        let err = session.selection_handler(&missing_name).unwrap_err();

        assert!(err.to_string().contains("StationName"));
        assert_eq!(session.station_id(), "Buoy1;-20.25;10.5");
    }

    /// Resizing never moves the center, whatever the size or view
    #[tokio::test]
    async fn test_resize_keeps_center() {
        let mut session = session(Arc::new(FixedGeocoder(boston())), vec![]);
        session.initialize().unwrap();

        let views = [
            (LatLng::new(45.0, -100.0), 3.0),
            (LatLng::new(84.9, 20.0), 4.0),
            (LatLng::new(-33.0, 179.9), 6.0),
            (LatLng::new(10.0, -179.9), 6.0),
            (LatLng::new(30.0, 40.0), 0.0),
        ];
        for (view_center, zoom) in views {
            let map = session.map_mut().unwrap();
            map.set_zoom(zoom);
            map.set_center(view_center);
            let center = map.center();

            for size in [
                Point::new(1024.0, 768.0),
                Point::new(320.0, 240.0),
                Point::new(1920.0, 200.0),
            ] {
                session.handle_input(InputEvent::Resize { size }).unwrap();

                let map = session.map().unwrap();
                assert_eq!(map.size(), size);
                assert_eq!(map.center(), center);
                assert_eq!(map.zoom(), zoom);
            }
        }
    }

    /// Every non-OK geocoder status leaves the view untouched
    #[tokio::test]
    async fn test_pan_without_match_is_ignored() {
        for status in [
            GeocoderStatus::ZeroResults,
            GeocoderStatus::OverQueryLimit,
            GeocoderStatus::RequestDenied,
        ] {
            let geocoder = Arc::new(FixedGeocoder(GeocodeResponse::with_status(status)));
            let mut session = session(geocoder, vec![]);
            session.initialize().unwrap();
            let map = session.map().unwrap();
            let (center, zoom) = (map.center(), map.zoom());

            let outcome = session.pan_to_now("Atlantis").await.unwrap();

            assert_eq!(outcome, PanOutcome::Ignored(status));
            let map = session.map().unwrap();
            assert_eq!(map.center(), center);
            assert_eq!(map.zoom(), zoom);
        }
    }

    /// An OK answer with no results counts as a miss
    #[tokio::test]
    async fn test_pan_with_empty_ok_answer_is_ignored() {
        let mut session = session(Arc::new(FixedGeocoder(GeocodeResponse::ok(vec![]))), vec![]);
        session.initialize().unwrap();

        let outcome = session.pan_to_now("Boston").await.unwrap();

        assert_eq!(outcome, PanOutcome::Ignored(GeocoderStatus::ZeroResults));
    }

    /// A transport failure surfaces as an error and moves nothing
    #[tokio::test]
    async fn test_pan_transport_failure() {
        let mut session = session(Arc::new(UnreachableGeocoder), vec![]);
        session.initialize().unwrap();
        let center = session.map().unwrap().center();

        assert!(session.pan_to_now("Boston").await.is_err());

        session.pan_to("Boston").unwrap();
        wait_for_completions(&mut session, 2).await;
        assert_eq!(session.map().unwrap().center(), center);
    }

    /// Background panning centers on the result and shows its viewport
    #[tokio::test]
    async fn test_pan_to_in_background() {
        let mut session = session(Arc::new(FixedGeocoder(boston())), vec![]);
        session.initialize().unwrap();
        let zoom_before = session.map().unwrap().zoom();

        session.pan_to("Boston, MA").unwrap();
        wait_for_completions(&mut session, 2).await;

        let map = session.map().unwrap();
        let target = LatLngBounds::from_coords(42.23, -71.19, 42.40, -70.92);
        assert!(map.bounds().contains_bounds(&target));
        assert!(map.bounds().contains(&LatLng::new(42.3601, -71.0589)));
        assert!(map.zoom() > zoom_before);
        assert_eq!(map.center(), target.center());
    }

    /// The fitted viewport decides the final center, not the geocoded point
    #[tokio::test]
    async fn test_pan_reports_fitted_center() {
        let mut session = session(Arc::new(FixedGeocoder(boston())), vec![]);
        session.initialize().unwrap();

        let outcome = session.pan_to_now("Boston").await.unwrap();

        let target = LatLngBounds::from_coords(42.23, -71.19, 42.40, -70.92);
        assert_eq!(
            outcome,
            PanOutcome::Moved {
                center: target.center(),
                viewport: target.clone(),
            }
        );
        assert_ne!(session.map().unwrap().center(), LatLng::new(42.3601, -71.0589));
    }

    /// A place spanning the antimeridian is centered on itself, not on
    /// the far side of the world
    #[tokio::test]
    async fn test_pan_across_antimeridian() {
        let mut session = session(Arc::new(FixedGeocoder(fiji())), vec![]);
        session.initialize().unwrap();

        session.pan_to_now("Fiji").await.unwrap();

        let map = session.map().unwrap();
        assert!((map.center().lng - 179.3).abs() < 1e-9);
        assert!((map.center().lat + 16.7).abs() < 1e-9);
        assert!(map.zoom() >= 5.0);
        assert!(map.bounds().contains(&LatLng::new(-17.7, 178.0)));
        assert!(map
            .bounds()
            .contains_bounds(&LatLngBounds::from_coords(-21.0, 176.8, -12.4, -178.2)));
    }

    /// Stations just east of the antimeridian are still clickable from
    /// the west side
    #[tokio::test]
    async fn test_click_across_antimeridian() {
        let rows = vec![station("Suva", "-18.1", "-179.9")];
        let mut session = session(Arc::new(FixedGeocoder(fiji())), rows);
        session.initialize().unwrap();
        wait_for_overlay(&mut session).await;
        session.pan_to_now("Fiji").await.unwrap();

        let pixel = session
            .map()
            .unwrap()
            .viewport()
            .lat_lng_to_pixel(&LatLng::new(-18.1, -179.9));
        assert!(pixel.x > 0.0 && pixel.x < 800.0);

        assert!(session.handle_click(pixel).unwrap());
        assert_eq!(session.station_id(), "Suva;-179.9;-18.1");
    }

    /// Re-initialization resets the selection and the view
    #[tokio::test]
    async fn test_initialize_twice_resets_state() {
        let mut session = session(Arc::new(FixedGeocoder(boston())), vec![]);
        session.initialize().unwrap();
        session.selection_handler(&station("Buoy1", "10.5", "-20.25")).unwrap();
        session.pan_to_now("Boston").await.unwrap();

        session.initialize().unwrap();

        assert_eq!(session.station_id(), "none;undefined;undefined");
        assert_eq!(session.map().unwrap().center(), LatLng::new(45.0, -100.0));
        assert_eq!(session.map().unwrap().zoom(), 3.0);
    }

    /// A geocode started before re-initialization never moves the new map
    #[tokio::test]
    async fn test_stale_completion_is_dropped() {
        let mut session = session(Arc::new(FixedGeocoder(boston())), vec![]);
        session.initialize().unwrap();
        session.pan_to("Boston").unwrap();

        session.initialize().unwrap();
        wait_for_overlay(&mut session).await;
        for _ in 0..10 {
            session.process_pending();
            tokio::task::yield_now().await;
        }

        assert_eq!(session.map().unwrap().center(), LatLng::new(45.0, -100.0));
    }

    /// Listeners belong to one map and are dropped on re-initialization
    #[tokio::test]
    async fn test_listeners_do_not_survive_initialize() {
        let mut session = session(Arc::new(FixedGeocoder(boston())), vec![]);
        session.initialize().unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        session
            .on("viewchanged", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        session.pan_to_now("Boston").await.unwrap();
        session.dispatch_events().unwrap();
        let after_first = seen.load(Ordering::SeqCst);
        assert!(after_first > 0);

        session.initialize().unwrap();
        session.pan_to_now("Boston").await.unwrap();
        session.dispatch_events().unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), after_first);
    }

    /// A failing table leaves the overlay empty and tells listeners why
    #[tokio::test]
    async fn test_overlay_failure_is_reported() {
        let mut session = MapSession::new(
            SessionConfig::default(),
            Arc::new(FixedGeocoder(boston())),
            Arc::new(BrokenTable),
        );
        session.initialize().unwrap();

        let errors = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&errors);
        session
            .on("overlayerror", move |event| {
                if let MapEvent::OverlayError { message, .. } = event {
                    assert!(message.contains("table is gone"));
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            })
            .unwrap();

        wait_for_completions(&mut session, 1).await;

        assert_eq!(errors.load(Ordering::SeqCst), 1);
        let layer = session.map().unwrap().table_layer(STATION_LAYER_ID).unwrap();
        assert!(layer.rows().is_empty());
        assert!(session.load_overlay().await.is_err());
    }

    /// Overlay rows can come from a local CSV export
    #[tokio::test]
    async fn test_csv_table_file() {
        let path = std::env::temp_dir().join(format!("stationmap-{}.csv", std::process::id()));
        std::fs::write(
            &path,
            "StationName,Latitude,Longitude,Geocodable address\n\
             Buoy1,40.0,-95.0,\"40.0, -95.0\"\n\
             Pier 21,29.31,-94.79,\"29.31, -94.79\"\n",
        )
        .unwrap();

        let mut session = MapSession::builder()
            .geocoder(Arc::new(FixedGeocoder(boston())))
            .table_file(&path)
            .build()
            .unwrap();
        session.initialize().unwrap();
        let loaded = session.load_overlay().await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, 2);
        let layer = session.map().unwrap().table_layer(STATION_LAYER_ID).unwrap();
        assert_eq!(layer.clickable_count(), 2);
    }
}
