use crate::charts::{self, BarChart, LineChart, ScatterChart};
use crate::config::DashboardConfig;
use crate::data::filter::{self, FilterSelection};
use crate::data::model::{Column, Dataset};
use crate::error::Result;
use crate::geo::{self, MapArtifact};
use crate::metrics::{self, DailyAggregate, DayGrouping, Metric, Summary, WeekdayAggregate};

// ---------------------------------------------------------------------------
// Report – everything derived for one selection
// ---------------------------------------------------------------------------

/// The output of one render pass. Owns all of its data so the shell can keep
/// it between frames without borrowing the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub selection: FilterSelection,
    pub title: String,
    pub summary: Summary,
    pub grouping: DayGrouping,
    pub daily: Vec<DailyAggregate>,
    pub trend: LineChart,
    pub temp_scatter: ScatterChart,
    pub dewp_scatter: ScatterChart,
    pub corr_temp: Metric,
    pub corr_dewp: Metric,
    pub weekday: WeekdayAggregate,
    pub weekday_chart: BarChart,
    pub map: MapArtifact,
}

impl Report {
    /// Filter → metrics → charts and map. Fails on an unknown station or a
    /// station without coordinates; `dataset` is only read.
    pub fn build(
        dataset: &Dataset,
        selection: &FilterSelection,
        config: &DashboardConfig,
    ) -> Result<Report> {
        let view = filter::select(dataset, selection)?;
        let station = selection.station_label();
        let period = selection.period_label();
        if view.is_empty() {
            log::info!("No rows for {station} {period}");
        }

        let summary = metrics::summarize(&view);
        let grouping = DayGrouping::for_month(&selection.month);
        let daily = metrics::daily_aggregate(&view, grouping);
        let trend = charts::trend_chart(
            &daily,
            grouping,
            &format!("PM2.5, PM10 and CO at {station} - {period}"),
        );

        let temp_scatter =
            charts::scatter_chart(&view, Column::Temp, "Effect of temperature on PM2.5");
        let dewp_scatter =
            charts::scatter_chart(&view, Column::Dewp, "Effect of dew point on PM2.5");
        let corr_temp = metrics::correlation(&view, Column::Pm25, Column::Temp);
        let corr_dewp = metrics::correlation(&view, Column::Pm25, Column::Dewp);

        let weekday = metrics::weekday_split(&view);
        let weekday_chart = charts::weekday_chart(&weekday);

        let map = geo::build_map(&view, &config.stations, &config.map)?;

        log::info!(
            "Rendered {station} {period}: {} rows, {} days, PM2.5 {}",
            view.len(),
            daily.len(),
            summary.mean(Column::Pm25)
        );

        Ok(Report {
            selection: selection.clone(),
            title: format!("Air quality dashboard - {station}"),
            summary,
            grouping,
            daily,
            trend,
            temp_scatter,
            dewp_scatter,
            corr_temp,
            corr_dewp,
            weekday,
            weekday_chart,
            map,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::Choice;
    use crate::data::model::fixtures::row;
    use crate::data::model::StationTable;
    use crate::error::DashboardError;
    use crate::geo::{Coordinate, StationCoordinates};
    use crate::metrics::AirQuality;

    fn dataset() -> Dataset {
        let mut dongsi: Vec<_> = (1..=28)
            .map(|d| row("Dongsi", 2013, 2, d, Some(d as f64)))
            .collect();
        for (i, r) in dongsi.iter_mut().enumerate() {
            r.temp = Some(i as f64);
            r.dewp = Some(-(i as f64) / 2.0);
        }
        dongsi.push(row("Dongsi", 2013, 3, 1, None));
        Dataset::from_tables([
            StationTable::new("Dongsi", dongsi),
            StationTable::new("Tiantan", vec![row("Tiantan", 2014, 3, 1, Some(100.0))]),
        ])
    }

    #[test]
    fn test_single_month_report() {
        let ds = dataset();
        let selection = FilterSelection {
            station: Choice::Only("Dongsi".to_string()),
            year: Choice::Only(2013),
            month: Choice::Only(2),
        };
        let report = Report::build(&ds, &selection, &DashboardConfig::default()).unwrap();
        assert_eq!(report.title, "Air quality dashboard - Dongsi");
        assert_eq!(report.summary.rows, 28);
        assert_eq!(report.summary.mean(Column::Pm25), Metric::Value(14.5));
        assert_eq!(report.summary.quality, AirQuality::Moderate);
        assert_eq!(report.grouping, DayGrouping::DayOfMonth);
        assert_eq!(report.daily.len(), 28);
        assert_eq!(report.trend.y_bounds, None);
        assert_eq!(report.temp_scatter.points.len(), 28);
        assert!(report.corr_temp.value().is_some_and(|r| r > 0.999));
        assert_eq!(report.map.markers.len(), 28);
    }

    #[test]
    fn test_all_locations_report() {
        let ds = dataset();
        let report =
            Report::build(&ds, &FilterSelection::default(), &DashboardConfig::default()).unwrap();
        assert_eq!(report.summary.rows, 30);
        assert_eq!(report.grouping, DayGrouping::Calendar);
        assert_eq!(report.trend.y_bounds, Some((0.0, 1000.0)));
        assert_eq!(report.daily.len(), 30);
        assert!(report.trend.title.contains("All locations - All months/All years"));
    }

    #[test]
    fn test_empty_selection_reports_no_data() {
        let ds = dataset();
        let selection = FilterSelection {
            year: Choice::Only(1999),
            ..Default::default()
        };
        let report = Report::build(&ds, &selection, &DashboardConfig::default()).unwrap();
        assert_eq!(report.summary.mean(Column::Pm25), Metric::NoData);
        assert_eq!(report.summary.quality, AirQuality::Unknown);
        assert_eq!(report.corr_dewp, Metric::NoData);
        assert!(report.daily.is_empty());
        assert!(report.map.markers.is_empty());
    }

    #[test]
    fn test_failed_pass_leaves_dataset_usable() {
        let ds = dataset();
        let mut config = DashboardConfig::default();
        config.stations =
            StationCoordinates::new([("Dongsi".to_string(), Coordinate::new(39.9, 116.4))]);

        let err = Report::build(&ds, &FilterSelection::default(), &config).unwrap_err();
        assert!(matches!(err, DashboardError::UnmappedStation(ref s) if s == "Tiantan"));
        assert!(err.is_render_warning());

        let dongsi = FilterSelection {
            station: Choice::Only("Dongsi".to_string()),
            ..Default::default()
        };
        assert!(Report::build(&ds, &dongsi, &config).is_ok());
        assert_eq!(ds.row_count(), 30);
    }
}
