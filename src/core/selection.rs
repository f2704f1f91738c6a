//! Identity of the most recently clicked station.

use crate::core::constants::{
    LATITUDE_FIELD, LONGITUDE_FIELD, NO_SELECTION_NAME, STATION_ID_SEPARATOR, STATION_NAME_FIELD,
    UNDEFINED_COORDINATE,
};
use crate::data::table::{format_number, CellValue, TableRow};
use crate::MapError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated coordinate that remembers how its cell spelled it, so
/// `"29.3100"` is reported back as `29.3100` rather than `29.31`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    value: f64,
    text: String,
}

impl Coordinate {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            text: format_number(value),
        }
    }

    /// Reads a cell, keeping trimmed text as written. `None` unless the cell
    /// holds a finite number no larger than `limit` in magnitude.
    pub fn from_cell(cell: &CellValue, limit: f64) -> Option<Self> {
        let value = cell.as_f64().filter(|value| value.abs() <= limit)?;
        let text = match cell {
            CellValue::Text(text) => text.trim().to_string(),
            CellValue::Number(number) => format_number(*number),
        };
        Some(Self { value, text })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Validated payload of a click on a station row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionEvent {
    pub name: String,
    pub latitude: Coordinate,
    pub longitude: Coordinate,
}

impl SelectionEvent {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude: Coordinate::new(latitude),
            longitude: Coordinate::new(longitude),
        }
    }
}

fn malformed(field: &str) -> MapError {
    MapError::MalformedSelection {
        field: field.to_string(),
    }
}

fn coordinate(row: &TableRow, field: &str, limit: f64) -> Result<Coordinate, MapError> {
    row.get(field)
        .and_then(|cell| Coordinate::from_cell(cell, limit))
        .ok_or_else(|| malformed(field))
}

impl TryFrom<&TableRow> for SelectionEvent {
    type Error = MapError;

    /// All three fields are checked before anything is returned, so a bad
    /// row never yields a partial selection.
    fn try_from(row: &TableRow) -> Result<Self, Self::Error> {
        let name = row
            .get(STATION_NAME_FIELD)
            .map(|cell| cell.value().into_owned())
            .ok_or_else(|| malformed(STATION_NAME_FIELD))?;
        let latitude = coordinate(row, LATITUDE_FIELD, 90.0)?;
        let longitude = coordinate(row, LONGITUDE_FIELD, 180.0)?;

        Ok(Self {
            name,
            latitude,
            longitude,
        })
    }
}

/// The last station picked on the overlay.
///
/// Before any pick the name is `"none"` and both coordinates are unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedStation {
    pub name: String,
    pub latitude: Option<Coordinate>,
    pub longitude: Option<Coordinate>,
}

impl SelectedStation {
    pub fn is_selected(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// `name;longitude;latitude`, with `undefined` for unset coordinates
    pub fn station_id(&self) -> String {
        self.to_string()
    }
}

impl Default for SelectedStation {
    fn default() -> Self {
        Self {
            name: NO_SELECTION_NAME.to_string(),
            latitude: None,
            longitude: None,
        }
    }
}

impl From<SelectionEvent> for SelectedStation {
    fn from(event: SelectionEvent) -> Self {
        Self {
            name: event.name,
            latitude: Some(event.latitude),
            longitude: Some(event.longitude),
        }
    }
}

fn write_coordinate(f: &mut fmt::Formatter<'_>, value: Option<&Coordinate>) -> fmt::Result {
    match value {
        Some(value) => write!(f, "{}", value),
        None => f.write_str(UNDEFINED_COORDINATE),
    }
}

impl fmt::Display for SelectedStation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, STATION_ID_SEPARATOR)?;
        write_coordinate(f, self.longitude.as_ref())?;
        write!(f, "{}", STATION_ID_SEPARATOR)?;
        write_coordinate(f, self.latitude.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, lat: &str, lng: &str) -> TableRow {
        TableRow::new()
            .with("StationName", name)
            .with("Latitude", lat)
            .with("Longitude", lng)
    }

    #[test]
    fn test_default_station_id() {
        assert_eq!(
            SelectedStation::default().station_id(),
            "none;undefined;undefined"
        );
        assert!(!SelectedStation::default().is_selected());
    }

    #[test]
    fn test_station_id_longitude_first() {
        let station = SelectedStation::from(SelectionEvent::new("Buoy1", 10.5, -20.25));
        assert_eq!(station.station_id(), "Buoy1;-20.25;10.5");
    }

    #[test]
    fn test_whole_degrees_have_no_fraction() {
        let station = SelectedStation::from(SelectionEvent::new("Grid", 45.0, -100.0));
        assert_eq!(station.station_id(), "Grid;-100;45");
    }

    #[test]
    fn test_row_conversion() {
        let event = SelectionEvent::try_from(&row("Galveston Pier 21", "29.31", "-94.79")).unwrap();
        assert_eq!(event, SelectionEvent::new("Galveston Pier 21", 29.31, -94.79));

        let numeric = TableRow::new()
            .with("StationName", "Buoy1")
            .with("Latitude", 10.5)
            .with("Longitude", -20.25);
        assert_eq!(
            SelectionEvent::try_from(&numeric).unwrap(),
            SelectionEvent::new("Buoy1", 10.5, -20.25)
        );
    }

    #[test]
    fn test_cell_text_is_kept() {
        let event = SelectionEvent::try_from(&row("S", " 29.3100 ", "-94.7900")).unwrap();
        assert_eq!(event.latitude.value(), 29.31);
        assert_eq!(SelectedStation::from(event).station_id(), "S;-94.7900;29.3100");

        let whole = SelectionEvent::try_from(&row("Grid", "45.0", "-100.0")).unwrap();
        assert_eq!(SelectedStation::from(whole).station_id(), "Grid;-100.0;45.0");
    }

    #[test]
    fn test_numeric_cells_print_like_the_table_service() {
        let cases = [
            (-0.0, "0"),
            (0.0000001, "1e-7"),
            (-0.0000015, "-0.0000015"),
            (12.5, "12.5"),
        ];

        for (latitude, expected) in cases {
            let numeric = TableRow::new()
                .with("StationName", "N")
                .with("Latitude", latitude)
                .with("Longitude", -0.0);
            let station = SelectedStation::from(SelectionEvent::try_from(&numeric).unwrap());
            assert_eq!(station.station_id(), format!("N;0;{}", expected));
        }

        assert_eq!(Coordinate::new(1e21).to_string(), "1e+21");
    }

    #[test]
    fn test_malformed_rows_name_the_field() {
        let cases = [
            (TableRow::new().with("Latitude", "1").with("Longitude", "2"), "StationName"),
            (row("A", "north", "2"), "Latitude"),
            (row("A", "1", ""), "Longitude"),
            (row("A", "91", "2"), "Latitude"),
            (row("A", "1", "-181"), "Longitude"),
        ];

        for (row, expected) in cases {
            match SelectionEvent::try_from(&row) {
                Err(MapError::MalformedSelection { field }) => assert_eq!(field, expected),
                other => panic!("expected malformed {}, got {:?}", expected, other),
            }
        }
    }
}
