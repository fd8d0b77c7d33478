//! Station coordinates, map sampling and the heat-map layer.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::data::model::{Column, TableView};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Coordinate { lat, lon }
    }
}

/// Station id → coordinate lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationCoordinates(BTreeMap<String, Coordinate>);

impl StationCoordinates {
    pub fn new(entries: impl IntoIterator<Item = (String, Coordinate)>) -> Self {
        StationCoordinates(entries.into_iter().collect())
    }

    /// The twelve Beijing monitoring sites of the PRSA dataset.
    pub fn beijing() -> Self {
        const SITES: [(&str, f64, f64); 12] = [
            ("Aotizhongxin", 39.982, 116.397),
            ("Changping", 40.2207, 116.2312),
            ("Dingling", 40.2865, 116.17),
            ("Dongsi", 39.9293, 116.4174),
            ("Guanyuan", 39.9425, 116.361),
            ("Gucheng", 39.9136, 116.1846),
            ("Huairou", 40.3272, 116.6283),
            ("Nongzhanguan", 39.9373, 116.4683),
            ("Shunyi", 40.1272, 116.6544),
            ("Tiantan", 39.8863, 116.4074),
            ("Wanliu", 39.9934, 116.315),
            ("Wanshouxigong", 39.8785, 116.3516),
        ];
        Self::new(
            SITES
                .iter()
                .map(|(name, lat, lon)| (name.to_string(), Coordinate::new(*lat, *lon))),
        )
    }

    pub fn coordinate(&self, station: &str) -> Result<Coordinate> {
        self.0
            .get(station)
            .copied()
            .ok_or_else(|| DashboardError::UnmappedStation(station.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Coordinate)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for StationCoordinates {
    fn default() -> Self {
        Self::beijing()
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Maximum number of rows drawn on the map.
    pub sample_size: usize,
    pub seed: u64,
    /// Heat-map kernel radius in screen pixels.
    pub heat_radius: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        MapSettings {
            sample_size: 500,
            seed: 42,
            heat_radius: 65.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// `min(size, len)` distinct row indices, ascending. Same inputs, same output.
pub fn sample_indices(len: usize, size: usize, seed: u64) -> Vec<usize> {
    let amount = size.min(len);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices = rand::seq::index::sample(&mut rng, len, amount).into_vec();
    indices.sort_unstable();
    indices
}

// ---------------------------------------------------------------------------
// Map artifact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub station: String,
    pub coordinate: Coordinate,
    pub pm25: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatPoint {
    pub coordinate: Coordinate,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatLayer {
    pub points: Vec<HeatPoint>,
    pub radius: f64,
}

/// Lat/lon rectangle covered by a raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl GeoBounds {
    /// Smallest box around `coords`, grown by `margin` degrees on each side.
    pub fn around(coords: impl IntoIterator<Item = Coordinate>, margin: f64) -> Option<Self> {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for c in iter {
            min.lat = min.lat.min(c.lat);
            min.lon = min.lon.min(c.lon);
            max.lat = max.lat.max(c.lat);
            max.lon = max.lon.max(c.lon);
        }
        Some(GeoBounds {
            min: Coordinate::new(min.lat - margin, min.lon - margin),
            max: Coordinate::new(max.lat + margin, max.lon + margin),
        })
    }

    pub fn width(&self) -> f64 {
        self.max.lon - self.min.lon
    }

    pub fn height(&self) -> f64 {
        self.max.lat - self.min.lat
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min.lat + self.max.lat) / 2.0,
            (self.min.lon + self.max.lon) / 2.0,
        )
    }
}

/// Kernel-density grid, row-major from the north-west corner, values in
/// `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatRaster {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f32>,
}

impl HeatRaster {
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.width + x]
    }
}

impl HeatLayer {
    /// Accumulate every point into a `width` × `height` grid over `bounds`
    /// with an Epanechnikov kernel of `radius_px` pixels, weighted by PM2.5,
    /// then normalize by the maximum cell.
    pub fn rasterize(
        &self,
        bounds: GeoBounds,
        width: usize,
        height: usize,
        radius_px: f64,
    ) -> HeatRaster {
        let mut values = vec![0.0f32; width * height];
        if width == 0 || height == 0 || radius_px <= 0.0 {
            return HeatRaster { width, height, values };
        }

        let sx = width as f64 / bounds.width().max(f64::EPSILON);
        let sy = height as f64 / bounds.height().max(f64::EPSILON);
        let r2 = radius_px * radius_px;

        for p in &self.points {
            let cx = (p.coordinate.lon - bounds.min.lon) * sx;
            let cy = (bounds.max.lat - p.coordinate.lat) * sy;

            let x0 = (cx - radius_px).floor().max(0.0) as usize;
            let y0 = (cy - radius_px).floor().max(0.0) as usize;
            let x1 = ((cx + radius_px).ceil().max(0.0) as usize).min(width);
            let y1 = ((cy + radius_px).ceil().max(0.0) as usize).min(height);

            for y in y0..y1 {
                for x in x0..x1 {
                    let dx = x as f64 + 0.5 - cx;
                    let dy = y as f64 + 0.5 - cy;
                    let d2 = dx * dx + dy * dy;
                    if d2 < r2 {
                        values[y * width + x] += (p.weight * (1.0 - d2 / r2)) as f32;
                    }
                }
            }
        }

        let max = values.iter().copied().fold(0.0f32, f32::max);
        if max > 0.0 {
            values.iter_mut().for_each(|v| *v /= max);
        }
        HeatRaster { width, height, values }
    }
}

/// Markers plus heat layer for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapArtifact {
    pub center: Coordinate,
    pub markers: Vec<Marker>,
    pub heat: HeatLayer,
}

impl MapArtifact {
    /// Markers as a GeoJSON `FeatureCollection` (coordinates are `[lon, lat]`).
    pub fn to_geojson(&self) -> JsonValue {
        let features: Vec<JsonValue> = self
            .markers
            .iter()
            .map(|m| {
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [m.coordinate.lon, m.coordinate.lat],
                    },
                    "properties": {
                        "station": m.station,
                        "pm25": m.pm25,
                    },
                })
            })
            .collect();
        json!({
            "type": "FeatureCollection",
            "features": features,
            "properties": {
                "heat_radius": self.heat.radius,
                "center": [self.center.lon, self.center.lat],
            },
        })
    }
}

fn centroid(coords: impl Iterator<Item = Coordinate>) -> Option<Coordinate> {
    let (lat, lon, n) = coords.fold((0.0, 0.0, 0usize), |(lat, lon, n), c| {
        (lat + c.lat, lon + c.lon, n + 1)
    });
    (n > 0).then(|| Coordinate::new(lat / n as f64, lon / n as f64))
}

/// Join coordinates onto `view`, sample it and build markers and heat layer.
///
/// Every station in `view` must be mapped, sampled or not.
pub fn build_map(
    view: &TableView<'_>,
    coords: &StationCoordinates,
    settings: &MapSettings,
) -> Result<MapArtifact> {
    let stations: BTreeSet<&str> = view.iter().map(|row| row.station.as_str()).collect();
    let lookup: BTreeMap<&str, Coordinate> = stations
        .into_iter()
        .map(|s| Ok((s, coords.coordinate(s)?)))
        .collect::<Result<_>>()?;

    let markers: Vec<Marker> = sample_indices(view.len(), settings.sample_size, settings.seed)
        .into_iter()
        .map(|i| {
            let row = view.rows[i];
            Marker {
                station: row.station.clone(),
                coordinate: lookup[row.station.as_str()],
                pm25: row.value(Column::Pm25).filter(|v| !v.is_nan()),
            }
        })
        .collect();

    let points: Vec<HeatPoint> = markers
        .iter()
        .filter_map(|m| {
            m.pm25.map(|weight| HeatPoint {
                coordinate: m.coordinate,
                weight,
            })
        })
        .collect();

    // An empty selection still gets a sensible viewport.
    let center = centroid(lookup.values().copied())
        .or_else(|| centroid(coords.iter().map(|(_, c)| c)))
        .unwrap_or(Coordinate::new(0.0, 0.0));

    log::debug!(
        "Map: {} markers, {} heat points from {} rows",
        markers.len(),
        points.len(),
        view.len()
    );

    Ok(MapArtifact {
        center,
        markers,
        heat: HeatLayer {
            points,
            radius: settings.heat_radius,
        },
    })
}
