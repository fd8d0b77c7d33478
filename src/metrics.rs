//! Summary statistics over a filtered [`TableView`].
//!
//! Every statistic that can be undefined for a selection returns
//! [`Metric::NoData`] instead of zero or NaN.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::data::filter::Choice;
use crate::data::model::{Column, TableView};

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Value(f64),
    NoData,
}

impl Metric {
    pub fn value(self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(v),
            Metric::NoData => None,
        }
    }

    pub fn is_no_data(self) -> bool {
        matches!(self, Metric::NoData)
    }
}

impl From<Option<f64>> for Metric {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if !v.is_nan() => Metric::Value(v),
            _ => Metric::NoData,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{v:.2}"),
            Metric::NoData => write!(f, "data unavailable"),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Metric {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        Metric::NoData
    } else {
        Metric::Value(sum / n as f64)
    }
}

fn median(mut values: Vec<f64>) -> Metric {
    if values.is_empty() {
        return Metric::NoData;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Metric::Value((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Metric::Value(values[mid])
    }
}

// ---------------------------------------------------------------------------
// Means and air-quality label
// ---------------------------------------------------------------------------

/// Mean of `column`, ignoring missing readings.
pub fn mean_pollutant(view: &TableView<'_>, column: Column) -> Metric {
    mean(view.present(column))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirQuality {
    Good,
    Moderate,
    Unhealthy,
    Poor,
    /// The PM2.5 mean is undefined for the selection.
    Unknown,
}

impl AirQuality {
    pub fn label(self) -> &'static str {
        match self {
            AirQuality::Good => "Good",
            AirQuality::Moderate => "Moderate",
            AirQuality::Unhealthy => "Unhealthy",
            AirQuality::Poor => "Poor",
            AirQuality::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AirQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label a mean PM2.5 concentration (µg/m³).
pub fn categorize(pm25_mean: f64) -> AirQuality {
    if pm25_mean.is_nan() {
        AirQuality::Unknown
    } else if pm25_mean <= 12.0 {
        AirQuality::Good
    } else if pm25_mean <= 35.0 {
        AirQuality::Moderate
    } else if pm25_mean <= 55.0 {
        AirQuality::Unhealthy
    } else {
        AirQuality::Poor
    }
}

pub fn categorize_metric(pm25_mean: Metric) -> AirQuality {
    pm25_mean.value().map_or(AirQuality::Unknown, categorize)
}

/// Pollutant and weather means of a selection plus the PM2.5 label.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub rows: usize,
    pub means: Vec<(Column, Metric)>,
    pub weather: Vec<(Column, Metric)>,
    /// Most frequent wind direction; ties go to the label sorting first.
    pub prevailing_wind: Option<String>,
    pub quality: AirQuality,
}

impl Summary {
    pub fn mean(&self, column: Column) -> Metric {
        self.means
            .iter()
            .chain(&self.weather)
            .find(|(c, _)| *c == column)
            .map_or(Metric::NoData, |(_, m)| *m)
    }
}

fn column_means(view: &TableView<'_>, columns: &[Column]) -> Vec<(Column, Metric)> {
    columns.iter().map(|&c| (c, mean_pollutant(view, c))).collect()
}

pub fn summarize(view: &TableView<'_>) -> Summary {
    Summary {
        rows: view.len(),
        means: column_means(view, &Column::POLLUTANTS),
        weather: column_means(view, &Column::WEATHER),
        prevailing_wind: prevailing_wind(view),
        quality: categorize_metric(mean_pollutant(view, Column::Pm25)),
    }
}

pub fn prevailing_wind(view: &TableView<'_>) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for direction in view.iter().filter_map(|row| row.wind_direction.as_deref()) {
        *counts.entry(direction).or_default() += 1;
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (dir, n)| match best {
            Some((_, top)) if top >= n => best,
            _ => Some((dir, n)),
        })
        .map(|(dir, _)| dir.to_string())
}

// ---------------------------------------------------------------------------
// Daily aggregate
// ---------------------------------------------------------------------------

/// How rows are bucketed into days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayGrouping {
    /// By (year, month, day); used when all months are shown.
    Calendar,
    /// By day of month only; used when a single month is shown.
    DayOfMonth,
}

impl DayGrouping {
    pub fn for_month(month: &Choice<u32>) -> Self {
        if month.is_all() {
            DayGrouping::Calendar
        } else {
            DayGrouping::DayOfMonth
        }
    }
}

/// Per-day means of PM2.5, PM10 and CO.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAggregate {
    /// `None` under [`DayGrouping::DayOfMonth`].
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: u32,
    pub pm25: Metric,
    pub pm10: Metric,
    pub co: Metric,
}

impl DailyAggregate {
    pub const COLUMNS: [Column; 3] = [Column::Pm25, Column::Pm10, Column::Co];

    pub fn metric(&self, column: Column) -> Metric {
        match column {
            Column::Pm25 => self.pm25,
            Column::Pm10 => self.pm10,
            Column::Co => self.co,
            _ => Metric::NoData,
        }
    }

    pub fn date_label(&self) -> String {
        match (self.year, self.month) {
            (Some(y), Some(m)) => format!("{y:04}-{m:02}-{:02}", self.day),
            _ => format!("{}", self.day),
        }
    }
}

#[derive(Default)]
struct Accumulator {
    sums: [f64; 3],
    counts: [usize; 3],
}

impl Accumulator {
    fn add(&mut self, idx: usize, value: Option<f64>) {
        if let Some(v) = value.filter(|v| !v.is_nan()) {
            self.sums[idx] += v;
            self.counts[idx] += 1;
        }
    }

    fn mean(&self, idx: usize) -> Metric {
        if self.counts[idx] == 0 {
            Metric::NoData
        } else {
            Metric::Value(self.sums[idx] / self.counts[idx] as f64)
        }
    }
}

/// Group rows by day and average PM2.5/PM10/CO per group, in chronological
/// order.
pub fn daily_aggregate(view: &TableView<'_>, grouping: DayGrouping) -> Vec<DailyAggregate> {
    let mut groups: BTreeMap<(Option<i32>, Option<u32>, u32), Accumulator> = BTreeMap::new();

    for row in view.iter() {
        let key = match grouping {
            DayGrouping::Calendar => (Some(row.year), Some(row.month), row.day),
            DayGrouping::DayOfMonth => (None, None, row.day),
        };
        let acc = groups.entry(key).or_default();
        for (idx, column) in DailyAggregate::COLUMNS.iter().enumerate() {
            acc.add(idx, row.value(*column));
        }
    }

    groups
        .into_iter()
        .map(|((year, month, day), acc)| DailyAggregate {
            year,
            month,
            day,
            pm25: acc.mean(0),
            pm10: acc.mean(1),
            co: acc.mean(2),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Weekday / weekend split
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekdayAggregate {
    /// Monday to Friday.
    pub workday: Metric,
    /// Saturday and Sunday.
    pub weekend: Metric,
}

/// Mean PM2.5 on workdays and weekends.
///
/// Missing PM2.5 readings are replaced by the median PM2.5 of `view` itself
/// before grouping.
pub fn weekday_split(view: &TableView<'_>) -> WeekdayAggregate {
    let fill = median(view.present(Column::Pm25).collect()).value();

    let mut workday = Vec::new();
    let mut weekend = Vec::new();

    for row in view.iter() {
        let Some(date) = NaiveDate::from_ymd_opt(row.year, row.month, row.day) else {
            log::debug!(
                "Skipping invalid date {}-{}-{} at {}",
                row.year,
                row.month,
                row.day,
                row.station
            );
            continue;
        };
        let Some(pm25) = row.pm25.filter(|v| !v.is_nan()).or(fill) else {
            continue;
        };
        if date.weekday().num_days_from_monday() < 5 {
            workday.push(pm25);
        } else {
            weekend.push(pm25);
        }
    }

    WeekdayAggregate {
        workday: mean(workday.into_iter()),
        weekend: mean(weekend.into_iter()),
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation of two columns over rows where both are present.
///
/// Returns [`Metric::NoData`] with fewer than two complete pairs or when
/// either column is constant over those pairs.
pub fn correlation(view: &TableView<'_>, a: Column, b: Column) -> Metric {
    let pairs: Vec<(f64, f64)> = view
        .iter()
        .filter_map(|row| Some((row.value(a)?, row.value(b)?)))
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .collect();

    if pairs.len() < 2 {
        return Metric::NoData;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        return Metric::NoData;
    }
    Metric::Value((cov / denom).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::row;
    use crate::data::model::Measurement;

    fn view(rows: &[Measurement]) -> TableView<'_> {
        TableView::new(rows.iter().collect())
    }

    fn approx(metric: Metric, expected: f64) {
        match metric {
            Metric::Value(v) => assert!((v - expected).abs() < 1e-9, "{v} != {expected}"),
            Metric::NoData => panic!("expected {expected}, got NoData"),
        }
    }

    #[test]
    fn test_mean_ignores_missing() {
        let rows = [
            row("A", 2013, 1, 1, Some(10.0)),
            row("A", 2013, 1, 1, Some(20.0)),
            row("A", 2013, 1, 1, None),
            row("A", 2013, 1, 1, Some(30.0)),
        ];
        approx(mean_pollutant(&view(&rows), Column::Pm25), 20.0);
    }

    #[test]
    fn test_mean_no_data() {
        let rows = [row("A", 2013, 1, 1, Some(10.0))];
        assert_eq!(mean_pollutant(&view(&rows), Column::So2), Metric::NoData);
        assert_eq!(mean_pollutant(&view(&[]), Column::Pm25), Metric::NoData);
        assert_eq!(Metric::NoData.to_string(), "data unavailable");
    }

    #[test]
    fn test_categorize_thresholds() {
        let cases = [
            (0.0, AirQuality::Good),
            (12.0, AirQuality::Good),
            (12.01, AirQuality::Moderate),
            (35.0, AirQuality::Moderate),
            (35.01, AirQuality::Unhealthy),
            (55.0, AirQuality::Unhealthy),
            (55.01, AirQuality::Poor),
            (1000.0, AirQuality::Poor),
        ];
        for (input, expected) in cases {
            assert_eq!(categorize(input), expected, "input {input}");
        }
        assert_eq!(categorize(f64::NAN), AirQuality::Unknown);
        assert_eq!(categorize_metric(Metric::NoData), AirQuality::Unknown);
    }

    #[test]
    fn test_summary() {
        let mut rows = vec![row("A", 2013, 1, 1, Some(40.0)), row("A", 2013, 1, 2, Some(50.0))];
        rows[0].co = Some(900.0);
        let summary = summarize(&view(&rows));
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.quality, AirQuality::Unhealthy);
        approx(summary.mean(Column::Pm25), 45.0);
        approx(summary.mean(Column::Co), 900.0);
        assert_eq!(summary.mean(Column::O3), Metric::NoData);
        assert_eq!(summary.mean(Column::Rain), Metric::NoData);
        assert_eq!(summary.prevailing_wind, None);
    }

    #[test]
    fn test_summary_weather() {
        let mut rows = vec![
            row("A", 2013, 1, 1, Some(10.0)),
            row("A", 2013, 1, 1, Some(20.0)),
            row("A", 2013, 1, 1, Some(30.0)),
        ];
        rows[0].pres = Some(1020.0);
        rows[1].pres = Some(1010.0);
        rows[0].rain = Some(0.0);
        rows[2].wind_speed = Some(3.5);
        rows[0].wind_direction = Some("NW".to_string());
        rows[1].wind_direction = Some("E".to_string());
        rows[2].wind_direction = Some("NW".to_string());

        let summary = summarize(&view(&rows));
        let order: Vec<Column> = summary.weather.iter().map(|(c, _)| *c).collect();
        assert_eq!(order, Column::WEATHER);
        approx(summary.mean(Column::Pres), 1015.0);
        approx(summary.mean(Column::Rain), 0.0);
        approx(summary.mean(Column::WindSpeed), 3.5);
        assert_eq!(summary.mean(Column::Temp), Metric::NoData);
        assert_eq!(summary.prevailing_wind.as_deref(), Some("NW"));
    }

    #[test]
    fn test_prevailing_wind_tie_takes_first_label() {
        let mut rows = vec![row("A", 2013, 1, 1, None), row("A", 2013, 1, 2, None)];
        rows[0].wind_direction = Some("SW".to_string());
        rows[1].wind_direction = Some("E".to_string());
        assert_eq!(prevailing_wind(&view(&rows)).as_deref(), Some("E"));
    }

    #[test]
    fn test_daily_aggregate_calendar() {
        let mut rows = vec![
            row("A", 2014, 1, 2, Some(10.0)),
            row("A", 2013, 12, 31, Some(4.0)),
            row("A", 2014, 1, 2, Some(30.0)),
            row("B", 2013, 12, 31, None),
        ];
        rows[1].co = Some(500.0);
        let daily = daily_aggregate(&view(&rows), DayGrouping::Calendar);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date_label(), "2013-12-31");
        approx(daily[0].pm25, 4.0);
        approx(daily[0].co, 500.0);
        assert_eq!(daily[0].pm10, Metric::NoData);
        assert_eq!(daily[1].date_label(), "2014-01-02");
        approx(daily[1].pm25, 20.0);
        assert_eq!(daily[1].co, Metric::NoData);
    }

    #[test]
    fn test_daily_aggregate_day_of_month() {
        let rows = [
            row("A", 2013, 3, 2, Some(10.0)),
            row("A", 2014, 3, 2, Some(20.0)),
            row("A", 2014, 3, 1, Some(5.0)),
        ];
        let daily = daily_aggregate(&view(&rows), DayGrouping::DayOfMonth);
        assert_eq!(daily.iter().map(|d| d.day).collect::<Vec<_>>(), [1, 2]);
        assert_eq!(daily[1].year, None);
        approx(daily[1].pm25, 15.0);
        assert_eq!(DayGrouping::for_month(&Choice::Only(3)), DayGrouping::DayOfMonth);
        assert_eq!(DayGrouping::for_month(&Choice::All), DayGrouping::Calendar);
    }

    #[test]
    fn test_weekday_split_full_week() {
        // 2013-03-04 is a Monday.
        let values = [10.0, 20.0, 30.0, 40.0, 50.0, 100.0, 200.0];
        let rows: Vec<Measurement> = values
            .iter()
            .enumerate()
            .map(|(i, v)| row("A", 2013, 3, 4 + i as u32, Some(*v)))
            .collect();
        let split = weekday_split(&view(&rows));
        approx(split.workday, 30.0);
        approx(split.weekend, 150.0);
    }

    #[test]
    fn test_weekday_split_imputes_view_median() {
        let rows = [
            row("A", 2013, 3, 4, Some(10.0)),
            row("A", 2013, 3, 5, Some(20.0)),
            row("A", 2013, 3, 6, Some(90.0)),
            row("A", 2013, 3, 9, None),
            row("A", 2013, 2, 30, Some(1000.0)),
        ];
        // median over present values {10, 20, 90, 1000} = 55
        let split = weekday_split(&view(&rows));
        approx(split.workday, 40.0);
        approx(split.weekend, 55.0);
    }

    #[test]
    fn test_weekday_split_without_pm25() {
        let rows = [row("A", 2013, 3, 4, None)];
        let split = weekday_split(&view(&rows));
        assert_eq!(split.workday, Metric::NoData);
        assert_eq!(split.weekend, Metric::NoData);
    }

    #[test]
    fn test_correlation() {
        let mut rows: Vec<Measurement> =
            (1..=4).map(|d| row("A", 2013, 3, d, Some(d as f64 * 10.0))).collect();
        for (i, r) in rows.iter_mut().enumerate() {
            r.temp = Some(i as f64);
            r.dewp = Some(-(i as f64));
        }
        rows.push(row("A", 2013, 3, 5, Some(999.0)));
        approx(correlation(&view(&rows), Column::Pm25, Column::Temp), 1.0);
        approx(correlation(&view(&rows), Column::Pm25, Column::Dewp), -1.0);
    }

    #[test]
    fn test_correlation_needs_two_pairs() {
        let mut rows = vec![row("A", 2013, 3, 1, Some(10.0)), row("A", 2013, 3, 2, None)];
        rows[0].temp = Some(1.0);
        rows[1].temp = Some(2.0);
        assert_eq!(correlation(&view(&rows), Column::Pm25, Column::Temp), Metric::NoData);
        assert_eq!(correlation(&view(&[]), Column::Pm25, Column::Temp), Metric::NoData);
    }
}
