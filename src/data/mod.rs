/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  PRSA_Data_<station>_*.csv  (one per station)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + schema check → StationTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  station id → StationTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  station / year / month → TableView
///   └──────────┘
///        │
///        ├──▶ metrics   means, daily aggregate, weekday split, correlation
///        ├──▶ charts    trend / scatter / bar specs
///        └──▶ geo       sampled markers + heat layer
/// ```
///
/// A `TableView` borrows rows from the `Dataset`, so a failed render pass
/// never disturbs the loaded tables.

pub mod filter;
pub mod loader;
pub mod model;
