//! Chart specifications built from aggregates.
//!
//! These are plain data: the UI layer decides how to draw them.

use palette::Srgb;

use crate::color;
use crate::data::model::{Column, TableView};
use crate::metrics::{DailyAggregate, DayGrouping, Metric, WeekdayAggregate};

/// Fixed y-range of the long-form (all months) trend chart.
pub const TREND_Y_BOUNDS: (f64, f64) = (0.0, 1000.0);

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub color: Srgb<u8>,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    /// When set, the y-axis is pinned to this range.
    pub y_bounds: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub color: Srgb<u8>,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSpec {
    pub label: String,
    pub value: Metric,
    pub color: Srgb<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub y_label: String,
    pub bars: Vec<BarSpec>,
}

/// PM2.5, PM10 and CO per aggregate row. The x-axis is the row index, not a
/// calendar date.
pub fn trend_chart(daily: &[DailyAggregate], grouping: DayGrouping, title: &str) -> LineChart {
    let series = DailyAggregate::COLUMNS
        .iter()
        .map(|&column| Series {
            name: column.header().to_string(),
            color: color::series_color(column),
            points: daily
                .iter()
                .enumerate()
                .filter_map(|(i, d)| d.metric(column).value().map(|v| [i as f64, v]))
                .collect(),
        })
        .collect();

    LineChart {
        title: title.to_string(),
        x_label: "Day".to_string(),
        y_label: "Concentration (µg/m³)".to_string(),
        series,
        y_bounds: match grouping {
            DayGrouping::Calendar => Some(TREND_Y_BOUNDS),
            DayGrouping::DayOfMonth => None,
        },
    }
}

/// PM2.5 against `x_column`, dropping rows missing either value.
pub fn scatter_chart(view: &TableView<'_>, x_column: Column, title: &str) -> ScatterChart {
    let points = view
        .iter()
        .filter_map(|row| Some([row.value(x_column)?, row.value(Column::Pm25)?]))
        .filter(|[x, y]| !x.is_nan() && !y.is_nan())
        .collect();

    ScatterChart {
        title: title.to_string(),
        x_label: format!("{} ({})", x_column.header(), x_column.unit()),
        y_label: format!("PM2.5 ({})", Column::Pm25.unit()),
        color: color::STEEL,
        points,
    }
}

pub fn weekday_chart(split: &WeekdayAggregate) -> BarChart {
    BarChart {
        title: "Mean PM2.5: workday vs weekend".to_string(),
        y_label: format!("PM2.5 ({})", Column::Pm25.unit()),
        bars: vec![
            BarSpec {
                label: "Workday".to_string(),
                value: split.workday,
                color: color::STEEL,
            },
            BarSpec {
                label: "Weekend".to_string(),
                value: split.weekend,
                color: color::ORANGE,
            },
        ],
    }
}
