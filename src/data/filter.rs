use std::collections::BTreeSet;
use std::fmt;

use crate::error::{DashboardError, Result};

use super::model::{Dataset, TableView};

// ---------------------------------------------------------------------------
// Filter selection: one choice per sidebar selector
// ---------------------------------------------------------------------------

/// A selector value: everything, or a single value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Choice<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Choice<T> {
    /// Whether `value` passes this choice.
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(selected) => selected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }
}

impl<T: fmt::Display> Choice<T> {
    /// Label for the UI; `all_label` is shown for [`Choice::All`].
    pub fn label(&self, all_label: &str) -> String {
        match self {
            Choice::All => all_label.to_string(),
            Choice::Only(v) => v.to_string(),
        }
    }
}

pub const ALL_LOCATIONS: &str = "All locations";
pub const ALL_YEARS: &str = "All years";
pub const ALL_MONTHS: &str = "All months";

/// Station, year and month chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSelection {
    pub station: Choice<String>,
    pub year: Choice<i32>,
    pub month: Choice<u32>,
}

impl FilterSelection {
    pub fn station_label(&self) -> String {
        self.station.label(ALL_LOCATIONS)
    }

    /// `month/year` as shown in titles, e.g. `3/2014` or `All months/All years`.
    pub fn period_label(&self) -> String {
        format!("{}/{}", self.month.label(ALL_MONTHS), self.year.label(ALL_YEARS))
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Unfiltered rows of the chosen station, or of every station for
/// [`Choice::All`] (concatenated in station id order).
pub fn station_view<'a>(dataset: &'a Dataset, station: &Choice<String>) -> Result<TableView<'a>> {
    match station {
        Choice::All => Ok(TableView::new(
            dataset.tables().flat_map(|t| t.rows.iter()).collect(),
        )),
        Choice::Only(name) => dataset
            .get(name)
            .map(|t| TableView::new(t.rows.iter().collect()))
            .ok_or_else(|| DashboardError::UnknownStation(name.clone())),
    }
}

/// Narrow the dataset to `selection`: station first, then year, then month.
///
/// A year or month with no rows yields an empty view rather than an error.
pub fn select<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> Result<TableView<'a>> {
    let view = station_view(dataset, &selection.station)?
        .retain(|row| selection.year.accepts(&row.year))
        .retain(|row| selection.month.accepts(&row.month));
    Ok(view)
}

// ---------------------------------------------------------------------------
// Selector options
// ---------------------------------------------------------------------------

/// Distinct years of `view`, ascending.
pub fn year_options(view: &TableView<'_>) -> Vec<i32> {
    view.iter()
        .map(|row| row.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct months of `view`, ascending.
pub fn month_options(view: &TableView<'_>) -> Vec<u32> {
    view.iter()
        .map(|row| row.month)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
