//! CSV bar source.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use replay_core::error::DataError;
use replay_core::types::Bar;
use tracing::debug;

/// CSV record format. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "timestamp", alias = "Timestamp", alias = "日期")]
    date: String,
    #[serde(alias = "Close", alias = "收盘")]
    close: f64,
}

/// Daily close series stored as CSV.
pub struct CsvBarSource {
    path: PathBuf,
}

impl CsvBarSource {
    /// Create a new CSV bar source.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::NoDataAvailable(path.display().to_string()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Load every bar in the file, oldest first.
    ///
    /// Rows with a non-positive or non-finite close are dropped.
    pub fn load(&self) -> Result<Vec<Bar>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        let mut bars = Vec::new();
        let mut skipped = 0usize;

        for result in reader.deserialize() {
            let record: CsvRecord = result.map_err(|e| DataError::ParseError(e.to_string()))?;
            if !(record.close.is_finite() && record.close > 0.0) {
                skipped += 1;
                continue;
            }
            bars.push(Bar::new(parse_timestamp(&record.date)?, record.close));
        }

        bars.sort_by_key(|b| b.timestamp);
        debug!(path = %self.path.display(), bars = bars.len(), skipped, "loaded csv");

        Ok(bars)
    }
}

/// Parse various timestamp formats.
fn parse_timestamp(date_str: &str) -> Result<DateTime<Utc>, DataError> {
    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

    for format in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc());
        }
    }
    for format in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc());
            }
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Unix timestamp; assume milliseconds if > 10 digits
    if let Ok(ts) = date_str.parse::<i64>() {
        let parsed = if ts > 10_000_000_000 {
            DateTime::from_timestamp_millis(ts)
        } else {
            DateTime::from_timestamp(ts, 0)
        };
        if let Some(dt) = parsed {
            return Ok(dt);
        }
    }

    Err(DataError::ParseError(format!(
        "Could not parse date: {}",
        date_str
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("replay-data-{}-{}.csv", name, std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2024-01-15").is_ok());
        assert!(parse_timestamp("2024-01-15 10:30:00").is_ok());
        assert!(parse_timestamp("1705312800000").is_ok()); // Unix ms
        assert!(parse_timestamp("1705312800").is_ok()); // Unix sec
        assert!(parse_timestamp("not a date").is_err());

        let dt = parse_timestamp("2024/02/29").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_missing_file() {
        let result = CsvBarSource::new("/definitely/not/here.csv");
        assert!(matches!(result, Err(DataError::NoDataAvailable(_))));
    }

    #[test]
    fn test_load_sorts_and_drops_non_positive() {
        let path = write_temp(
            "sort",
            "Date,Open,Close\n2024-01-03,1,12.5\n2024-01-01,1,10\n2024-01-02,1,0\n",
        );
        let bars = CsvBarSource::new(&path).unwrap().load().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp.day(), 1);
        assert_eq!(bars[1].close, 12.5);
    }

    #[test]
    fn test_load_drops_non_finite() {
        let path = write_temp(
            "nan",
            "date,close\n2024-01-01,10\n2024-01-02,NaN\n2024-01-03,inf\n2024-01-04,11\n",
        );
        let bars = CsvBarSource::new(&path).unwrap().load().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(bars.len(), 2);
        assert!(bars.iter().all(|b| b.close.is_finite()));
    }

    #[test]
    fn test_load_chinese_headers() {
        let path = write_temp("zh", "日期,收盘\n2020-01-02,16.87\n2020-01-03,17.18\n");
        let bars = CsvBarSource::new(&path).unwrap().load().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(bars.len(), 2);
        assert!((bars[1].close - 17.18).abs() < 1e-9);
    }
}
