use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Measurement – one row of a station export
// ---------------------------------------------------------------------------

/// One hourly reading from a monitoring station.
///
/// Numeric readings are `None` when the export holds `NA` or an empty cell;
/// they are never coerced to zero. Any other unparseable cell fails the row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Measurement {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    #[serde(rename = "PM2.5", default, deserialize_with = "reading")]
    pub pm25: Option<f64>,
    #[serde(rename = "PM10", default, deserialize_with = "reading")]
    pub pm10: Option<f64>,
    #[serde(rename = "SO2", default, deserialize_with = "reading")]
    pub so2: Option<f64>,
    #[serde(rename = "NO2", default, deserialize_with = "reading")]
    pub no2: Option<f64>,
    #[serde(rename = "CO", default, deserialize_with = "reading")]
    pub co: Option<f64>,
    #[serde(rename = "O3", default, deserialize_with = "reading")]
    pub o3: Option<f64>,
    #[serde(rename = "TEMP", default, deserialize_with = "reading")]
    pub temp: Option<f64>,
    #[serde(rename = "PRES", default, deserialize_with = "reading")]
    pub pres: Option<f64>,
    #[serde(rename = "DEWP", default, deserialize_with = "reading")]
    pub dewp: Option<f64>,
    #[serde(rename = "RAIN", default, deserialize_with = "reading")]
    pub rain: Option<f64>,
    /// Wind direction as a compass label (e.g. `NNW`).
    #[serde(rename = "wd", default, deserialize_with = "label")]
    pub wind_direction: Option<String>,
    #[serde(rename = "WSPM", default, deserialize_with = "reading")]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub station: String,
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell == "NA"
}

/// `NA` or empty → `None`; anything else must parse as a number.
fn reading<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let cell = raw.trim();
    if is_missing(cell) {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|e| D::Error::custom(format!("invalid number '{cell}': {e}")))
}

fn label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !is_missing(s)))
}

impl Measurement {
    /// Read a numeric column of this row.
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Pm25 => self.pm25,
            Column::Pm10 => self.pm10,
            Column::So2 => self.so2,
            Column::No2 => self.no2,
            Column::Co => self.co,
            Column::O3 => self.o3,
            Column::Temp => self.temp,
            Column::Pres => self.pres,
            Column::Dewp => self.dewp,
            Column::Rain => self.rain,
            Column::WindSpeed => self.wind_speed,
        }
    }
}

// ---------------------------------------------------------------------------
// Column – the numeric columns of the export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Pm25,
    Pm10,
    So2,
    No2,
    Co,
    O3,
    Temp,
    Pres,
    Dewp,
    Rain,
    WindSpeed,
}

impl Column {
    /// Pollutant columns in display order.
    pub const POLLUTANTS: [Column; 6] = [
        Column::Pm25,
        Column::Pm10,
        Column::So2,
        Column::No2,
        Column::Co,
        Column::O3,
    ];

    /// Weather columns in display order.
    pub const WEATHER: [Column; 5] = [
        Column::Temp,
        Column::Pres,
        Column::Dewp,
        Column::Rain,
        Column::WindSpeed,
    ];

    /// Header name as written in the CSV export.
    pub fn header(self) -> &'static str {
        match self {
            Column::Pm25 => "PM2.5",
            Column::Pm10 => "PM10",
            Column::So2 => "SO2",
            Column::No2 => "NO2",
            Column::Co => "CO",
            Column::O3 => "O3",
            Column::Temp => "TEMP",
            Column::Pres => "PRES",
            Column::Dewp => "DEWP",
            Column::Rain => "RAIN",
            Column::WindSpeed => "WSPM",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Column::Pm25 | Column::Pm10 | Column::So2 | Column::No2 | Column::Co | Column::O3 => {
                "µg/m³"
            }
            Column::Temp | Column::Dewp => "°C",
            Column::Pres => "hPa",
            Column::Rain => "mm",
            Column::WindSpeed => "m/s",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// StationTable / Dataset – the loaded exports
// ---------------------------------------------------------------------------

/// All measurements of one monitoring station.
#[derive(Debug, Clone, Default)]
pub struct StationTable {
    pub station: String,
    pub rows: Vec<Measurement>,
}

impl StationTable {
    pub fn new(station: impl Into<String>, rows: Vec<Measurement>) -> Self {
        StationTable {
            station: station.into(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Station id → table. Iteration follows station id order, which is also the
/// concatenation order of the "all locations" view.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    tables: BTreeMap<String, StationTable>,
}

impl Dataset {
    #[cfg(test)]
    pub fn from_tables(tables: impl IntoIterator<Item = StationTable>) -> Self {
        let mut dataset = Dataset::default();
        for table in tables {
            dataset.insert(table);
        }
        dataset
    }

    /// Add a table, appending to an existing station with the same id.
    pub fn insert(&mut self, table: StationTable) {
        match self.tables.get_mut(&table.station) {
            Some(existing) => existing.rows.extend(table.rows),
            None => {
                self.tables.insert(table.station.clone(), table);
            }
        }
    }

    pub fn get(&self, station: &str) -> Option<&StationTable> {
        self.tables.get(station)
    }

    pub fn contains(&self, station: &str) -> bool {
        self.tables.contains_key(station)
    }

    pub fn stations(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn tables(&self) -> impl Iterator<Item = &StationTable> {
        self.tables.values()
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total rows across all stations.
    pub fn row_count(&self) -> usize {
        self.tables.values().map(StationTable::len).sum()
    }
}

// ---------------------------------------------------------------------------
// TableView – a filtered, borrowed subset of rows
// ---------------------------------------------------------------------------

/// Rows selected from a [`Dataset`]. Borrowing keeps every render pass from
/// touching the loaded tables.
#[derive(Debug, Clone, Default)]
pub struct TableView<'a> {
    pub rows: Vec<&'a Measurement>,
}

impl<'a> TableView<'a> {
    pub fn new(rows: Vec<&'a Measurement>) -> Self {
        TableView { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Measurement> + '_ {
        self.rows.iter().copied()
    }

    /// Keep only rows matching `predicate`.
    pub fn retain(mut self, predicate: impl Fn(&Measurement) -> bool) -> Self {
        self.rows.retain(|row| predicate(*row));
        self
    }

    /// Values of one column, missing readings included as `None`.
    pub fn values(&self, column: Column) -> impl Iterator<Item = Option<f64>> + '_ {
        self.rows.iter().map(move |row| row.value(column))
    }

    /// Values of one column with missing readings (and NaN) dropped.
    pub fn present(&self, column: Column) -> impl Iterator<Item = f64> + '_ {
        self.values(column).flatten().filter(|v| !v.is_nan())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::row;
    use super::*;

    #[test]
    fn test_dataset_merges_tables_with_same_station() {
        let dataset = Dataset::from_tables([
            StationTable::new("Dongsi", vec![row("Dongsi", 2013, 3, 1, Some(1.0))]),
            StationTable::new("Dongsi", vec![row("Dongsi", 2013, 3, 2, Some(2.0))]),
            StationTable::new("Tiantan", vec![row("Tiantan", 2013, 3, 1, None)]),
        ]);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.get("Dongsi").map(StationTable::len), Some(2));
        assert_eq!(dataset.stations().collect::<Vec<_>>(), ["Dongsi", "Tiantan"]);
    }

    #[test]
    fn test_present_skips_missing_values() {
        let rows = [
            row("A", 2013, 1, 1, Some(10.0)),
            row("A", 2013, 1, 1, None),
            row("A", 2013, 1, 1, Some(f64::NAN)),
        ];
        let view = TableView::new(rows.iter().collect());
        assert_eq!(view.values(Column::Pm25).count(), 3);
        assert_eq!(view.present(Column::Pm25).collect::<Vec<_>>(), [10.0]);
    }
}
