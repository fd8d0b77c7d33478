use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DashboardError, Result};

use super::model::{Column, Dataset, Measurement, StationTable};

/// File-name prefix of the per-station exports.
pub const DEFAULT_FILE_PREFIX: &str = "PRSA_Data_";

/// Columns every station export must carry. Everything else is optional.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "year",
    "month",
    "day",
    "hour",
    "PM2.5",
    "PM10",
    "CO",
    "TEMP",
    "DEWP",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Result of scanning a dataset folder.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub dataset: Dataset,
    /// Files that could not be parsed. They are left out of `dataset`.
    pub skipped: Vec<DashboardError>,
}

/// Load every `*.csv` station export found directly inside `dir`.
///
/// Unparseable files are skipped with a warning rather than aborting the
/// whole load; the errors are returned in [`LoadReport::skipped`].
pub fn load_directory(dir: &Path, file_prefix: &str) -> Result<LoadReport> {
    if !dir.is_dir() {
        return Err(DashboardError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_csv_extension(path))
        .collect();
    files.sort();

    let mut report = LoadReport::default();

    for path in files {
        let Some(station) = station_id(&path, file_prefix) else {
            log::debug!("Ignoring {}: no station id in file name", path.display());
            continue;
        };

        match load_station_file(&path, &station) {
            Ok(table) => {
                if table.is_empty() {
                    log::warn!("{} holds a header but no rows", path.display());
                }
                log::debug!("Parsed {} rows for {station} from {}", table.len(), path.display());
                if report.dataset.contains(&station) {
                    log::warn!("Station {station} appears in several files; merging rows");
                }
                report.dataset.insert(table);
            }
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.display());
                report.skipped.push(e);
            }
        }
    }

    log::info!(
        "Loaded {} stations ({} rows) from {}, {} file(s) skipped",
        report.dataset.len(),
        report.dataset.row_count(),
        dir.display(),
        report.skipped.len()
    );

    Ok(report)
}

/// Station id encoded in a file name: the stem without `prefix`, up to the
/// first `_`. `PRSA_Data_Dongsi_20130301-20170228.csv` → `Dongsi`.
pub fn station_id(path: &Path, prefix: &str) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let rest = stem.strip_prefix(prefix).unwrap_or(stem);
    let id = rest.split('_').next().unwrap_or(rest).trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse one station export. Headers and cells are trimmed, so padded column
/// names, readings and station ids still load. A cell that is neither `NA`,
/// empty nor a number fails the whole file.
pub fn load_station_file(path: &Path, station: &str) -> Result<StationTable> {
    let parse_err = |reason: String| DashboardError::Parse {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| parse_err(e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| parse_err(format!("reading headers: {e}")))?
        .clone();

    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|required| !headers.iter().any(|h| h == **required))
    {
        return Err(parse_err(format!("missing required column '{missing}'")));
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.deserialize::<Measurement>().enumerate() {
        let mut row = result.map_err(|e| parse_err(format!("row {}: {e}", row_no + 1)))?;
        if row.station.is_empty() {
            row.station = station.to_string();
        }
        rows.push(row);
    }

    let missing_pm25 = rows.iter().filter(|r| r.value(Column::Pm25).is_none()).count();
    if missing_pm25 > 0 {
        log::debug!("{station}: {missing_pm25} of {} rows without PM2.5", rows.len());
    }

    Ok(StationTable::new(station, rows))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HEADER: &str =
        "No,year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,wd,WSPM,station";

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_station_id_from_file_name() {
        let id = station_id(
            Path::new("data/PRSA_Data_Aotizhongxin_20130301-20170228.csv"),
            DEFAULT_FILE_PREFIX,
        );
        assert_eq!(id.as_deref(), Some("Aotizhongxin"));
        assert_eq!(
            station_id(Path::new("Dongsi.csv"), DEFAULT_FILE_PREFIX).as_deref(),
            Some("Dongsi")
        );
        assert_eq!(station_id(Path::new("PRSA_Data_.csv"), DEFAULT_FILE_PREFIX), None);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = load_directory(&missing, DEFAULT_FILE_PREFIX).unwrap_err();
        assert!(matches!(err, DashboardError::DirectoryNotFound(p) if p == missing));
    }

    #[test]
    fn test_load_directory_parses_stations() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "PRSA_Data_Dongsi_20130301-20170228.csv",
            &format!(
                "{HEADER}\n\
                 1,2013,3,1,0,9,9,3,17,300,89,-0.5,1024.5,-21.4,0,NNW,5.7,Dongsi\n\
                 2,2013,3,1,1,NA,12,6,18,NA,85,-0.7,1025.1,-22.1,0,N,3.9,Dongsi\n"
            ),
        );
        write_file(
            dir.path(),
            "PRSA_Data_Tiantan_20130301-20170228.csv",
            &format!("{HEADER}\n1,2013,3,1,0,6,18,5,NA,800,88,0.1,1021.1,-18.6,0,NW,4.4,Tiantan\n"),
        );
        write_file(dir.path(), "notes.txt", "not a station");

        let report = load_directory(dir.path(), DEFAULT_FILE_PREFIX).unwrap();
        assert!(report.skipped.is_empty());
        assert_eq!(report.dataset.stations().collect::<Vec<_>>(), ["Dongsi", "Tiantan"]);
        assert_eq!(report.dataset.row_count(), 3);

        let dongsi = report.dataset.get("Dongsi").unwrap();
        assert_eq!(dongsi.rows[0].pm25, Some(9.0));
        assert_eq!(dongsi.rows[0].wind_direction.as_deref(), Some("NNW"));
        assert_eq!(dongsi.rows[1].pm25, None);
        assert_eq!(dongsi.rows[1].co, None);
        assert_eq!(dongsi.rows[1].temp, Some(-0.7));

        let tiantan = report.dataset.get("Tiantan").unwrap();
        assert_eq!(tiantan.rows[0].no2, None);
    }

    #[test]
    fn test_headers_are_trimmed_and_station_filled_from_file_name() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "PRSA_Data_Gucheng_x.csv",
            "year , month,day,hour, PM2.5 ,PM10,CO,TEMP,DEWP\n2014,5,2,13,41.0,60,700,22.5,3.1\n",
        );

        let report = load_directory(dir.path(), DEFAULT_FILE_PREFIX).unwrap();
        let table = report.dataset.get("Gucheng").unwrap();
        assert_eq!(table.rows[0].pm25, Some(41.0));
        assert_eq!(table.rows[0].station, "Gucheng");
        assert_eq!(table.rows[0].so2, None);
    }

    #[test]
    fn test_bad_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "PRSA_Data_Shunyi_x.csv",
            "year,month,day,hour,PM2.5,PM10,CO,TEMP\n2013,3,1,0,1,2,3,4\n",
        );
        write_file(
            dir.path(),
            "PRSA_Data_Wanliu_x.csv",
            "year,month,day,hour,PM2.5,PM10,CO,TEMP,DEWP\nabc,3,1,0,1,2,3,4,5\n",
        );
        write_file(
            dir.path(),
            "PRSA_Data_Huairou_x.csv",
            "year,month,day,hour,PM2.5,PM10,CO,TEMP,DEWP\n2013,3,1,0,1,2,3,4,5\n",
        );

        let report = load_directory(dir.path(), DEFAULT_FILE_PREFIX).unwrap();
        assert_eq!(report.dataset.stations().collect::<Vec<_>>(), ["Huairou"]);
        assert_eq!(report.skipped.len(), 2);

        let reasons: Vec<String> = report.skipped.iter().map(|e| e.to_string()).collect();
        assert!(reasons.iter().any(|r| r.contains("missing required column 'DEWP'")));
        assert!(reasons.iter().any(|r| r.contains("row 1")));
    }

    #[test]
    fn test_malformed_reading_skips_file() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "PRSA_Data_Dongsi_x.csv",
            "year,month,day,hour,PM2.5,PM10,CO,TEMP,DEWP\n\
             2013,3,1,0,12abc,oops,300,1,2\n",
        );
        write_file(
            dir.path(),
            "PRSA_Data_Tiantan_x.csv",
            "year,month,day,hour,PM2.5,PM10,CO,TEMP,DEWP\n2013,3,1,0,NA,,300,1,2\n",
        );

        let report = load_directory(dir.path(), DEFAULT_FILE_PREFIX).unwrap();
        assert_eq!(report.dataset.stations().collect::<Vec<_>>(), ["Tiantan"]);
        assert_eq!(report.skipped.len(), 1);
        let reason = report.skipped[0].to_string();
        assert!(reason.contains("row 1"), "{reason}");
        assert!(reason.contains("12abc"), "{reason}");

        let tiantan = &report.dataset.get("Tiantan").unwrap().rows[0];
        assert_eq!(tiantan.pm25, None);
        assert_eq!(tiantan.pm10, None);
    }

    #[test]
    fn test_padded_cells_are_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "PRSA_Data_Dongsi_x.csv",
            &format!(
                "{HEADER}\n\
                 1, 2013 ,3,1,0, 15 ,20,3,17, 300 ,89,-0.5,1024.5,-21.4,0, NA ,5.7,Dongsi \n\
                 2,2013,3,1,1,NA,12,6,18,NA,85,-0.7,1025.1,-22.1,0, NW ,3.9,Dongsi\n"
            ),
        );

        let report = load_directory(dir.path(), DEFAULT_FILE_PREFIX).unwrap();
        assert!(report.skipped.is_empty());
        let rows = &report.dataset.get("Dongsi").unwrap().rows;
        assert_eq!(rows[0].year, 2013);
        assert_eq!(rows[0].pm25, Some(15.0));
        assert_eq!(rows[0].co, Some(300.0));
        assert_eq!(rows[0].station, "Dongsi");
        assert_eq!(rows[0].wind_direction, None);
        assert_eq!(rows[1].wind_direction.as_deref(), Some("NW"));
    }

    #[test]
    fn test_header_only_file_loads_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "PRSA_Data_Shunyi_x.csv", &format!("{HEADER}\n"));

        let report = load_directory(dir.path(), DEFAULT_FILE_PREFIX).unwrap();
        assert!(report.skipped.is_empty());
        assert!(report.dataset.get("Shunyi").unwrap().is_empty());
    }
}
