//! Write a synthetic PRSA-style dataset: one hourly CSV per Beijing station.
//!
//! Usage: `generate_sample [OUT_DIR] [DAYS]`

use std::f64::consts::PI;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

const STATIONS: [(&str, f64); 12] = [
    ("Aotizhongxin", 1.05),
    ("Changping", 0.85),
    ("Dingling", 0.75),
    ("Dongsi", 1.1),
    ("Guanyuan", 1.05),
    ("Gucheng", 1.0),
    ("Huairou", 0.7),
    ("Nongzhanguan", 1.05),
    ("Shunyi", 0.9),
    ("Tiantan", 1.0),
    ("Wanliu", 1.0),
    ("Wanshouxigong", 1.1),
];

const WIND: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

const HEADER: [&str; 18] = [
    "No", "year", "month", "day", "hour", "PM2.5", "PM10", "SO2", "NO2", "CO", "O3", "TEMP",
    "PRES", "DEWP", "RAIN", "wd", "WSPM", "station",
];

/// Fraction of readings written as `NA`.
const MISSING_RATE: f64 = 0.02;

fn cell(rng: &mut StdRng, value: f64) -> String {
    if rng.gen_bool(MISSING_RATE) {
        "NA".to_string()
    } else {
        format!("{value:.1}")
    }
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "sample_data".to_string()));
    let days: i64 = match args.next() {
        Some(d) => d.parse().with_context(|| format!("invalid day count '{d}'"))?,
        None => 90,
    };

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = StdRng::seed_from_u64(42);
    let noise = Normal::new(0.0, 1.0).context("building noise distribution")?;
    let start = NaiveDate::from_ymd_opt(2013, 3, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;

    let mut total = 0usize;
    for (station, level) in STATIONS {
        let path = out_dir.join(format!("PRSA_Data_{station}_20130301-20170228.csv"));
        let mut writer =
            csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
        writer.write_record(HEADER)?;

        for i in 0..days * 24 {
            let t = start + Duration::hours(i);
            let day_of_year = i as f64 / 24.0;
            let season = (2.0 * PI * (day_of_year - 100.0) / 365.0).sin();
            let diurnal = (2.0 * PI * (t.hour() as f64 - 14.0) / 24.0).cos();

            let temp = 13.0 + 14.0 * season + 4.0 * diurnal + noise.sample(&mut rng);
            let dewp = temp - 8.0 - 3.0 * noise.sample(&mut rng).abs();
            let pm25 = (level * (80.0 - 1.5 * temp + 25.0 * noise.sample(&mut rng))).max(3.0);
            let pm10 = pm25 * (1.2 + 0.2 * noise.sample(&mut rng).abs());
            let co = (pm25 * 12.0 + 200.0 + 50.0 * noise.sample(&mut rng)).max(100.0);
            let so2 = (8.0 + 4.0 * noise.sample(&mut rng)).max(1.0);
            let no2 = (45.0 + 15.0 * noise.sample(&mut rng)).max(2.0);
            let o3 = (60.0 + 20.0 * diurnal + 10.0 * noise.sample(&mut rng)).max(1.0);
            let pres = 1012.0 - 10.0 * season + 2.0 * noise.sample(&mut rng);
            let wspm = (2.0 + noise.sample(&mut rng)).abs();

            let record = [
                (i + 1).to_string(),
                t.format("%Y").to_string(),
                t.format("%-m").to_string(),
                t.format("%-d").to_string(),
                t.hour().to_string(),
                cell(&mut rng, pm25),
                cell(&mut rng, pm10),
                cell(&mut rng, so2),
                cell(&mut rng, no2),
                cell(&mut rng, co),
                cell(&mut rng, o3),
                cell(&mut rng, temp),
                cell(&mut rng, pres),
                cell(&mut rng, dewp),
                "0.0".to_string(),
                WIND[rng.gen_range(0..WIND.len())].to_string(),
                cell(&mut rng, wspm),
                station.to_string(),
            ];
            writer.write_record(&record)?;
        }
        writer.flush()?;
        total += (days * 24) as usize;
        println!("Wrote {}", path.display());
    }

    println!(
        "Wrote {total} rows for {} stations to {}",
        STATIONS.len(),
        out_dir.display()
    );
    Ok(())
}
