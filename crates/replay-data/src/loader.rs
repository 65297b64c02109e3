//! Data source selection.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use replay_core::error::DataError;
use replay_core::types::Bar;
use replay_core::EventPublisher;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{CsvBarSource, HistoricBars};

/// Where historical bars come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    /// A CSV file (single symbol) or a directory of `{symbol}.csv` files
    Csv,
}

impl FromStr for DataSourceKind {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(DataSourceKind::Csv),
            other => Err(DataError::UnsupportedSource(other.to_string())),
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceKind::Csv => write!(f, "csv"),
        }
    }
}

/// Builds a [`HistoricBars`] handler for a symbol list from a data source.
#[derive(Debug, Clone)]
pub struct DataLoader {
    symbols: Vec<String>,
    source: DataSourceKind,
    path: PathBuf,
}

impl DataLoader {
    /// Create a loader. Fails on an empty symbol list.
    pub fn new(
        symbols: Vec<String>,
        source: DataSourceKind,
        path: impl Into<PathBuf>,
    ) -> Result<Self, DataError> {
        if symbols.is_empty() {
            return Err(DataError::EmptyUniverse);
        }
        Ok(Self {
            symbols,
            source,
            path: path.into(),
        })
    }

    /// Load every symbol's bars.
    pub fn load_bars(&self) -> Result<HashMap<String, Vec<Bar>>, DataError> {
        let data = match self.source {
            DataSourceKind::Csv => load_csv_bars(&self.path, &self.symbols)?,
        };

        if data.is_empty() {
            return Err(DataError::NoDataAvailable(self.path.display().to_string()));
        }

        info!(source = %self.source, symbols = data.len(), "loaded historical data");
        Ok(data)
    }

    /// Load the bars and wrap them in a replay handler.
    pub fn into_handler(self, events: EventPublisher) -> Result<HistoricBars, DataError> {
        let data = self.load_bars()?;
        HistoricBars::new(self.symbols, data, events)
    }
}

/// If `path` is a file, it holds the bars of a single-symbol universe. If it is a directory,
/// each symbol is read from the first of `{symbol}.csv`, `{symbol_lower}.csv`,
/// `{symbol}_daily.csv`, `{symbol_lower}_daily.csv` that exists.
fn load_csv_bars(path: &Path, symbols: &[String]) -> Result<HashMap<String, Vec<Bar>>, DataError> {
    let mut data = HashMap::new();

    if path.is_file() {
        if let Some(extra) = symbols.get(1) {
            return Err(DataError::SymbolNotFound(extra.clone()));
        }
        if let Some(symbol) = symbols.first() {
            data.insert(symbol.clone(), CsvBarSource::new(path)?.load()?);
        }
        return Ok(data);
    }

    for symbol in symbols {
        let lower = symbol.to_lowercase();
        let candidates = [
            path.join(format!("{}.csv", symbol)),
            path.join(format!("{}.csv", lower)),
            path.join(format!("{}_daily.csv", symbol)),
            path.join(format!("{}_daily.csv", lower)),
        ];
        match candidates.iter().find(|p| p.exists()) {
            Some(file_path) => {
                data.insert(symbol.clone(), CsvBarSource::new(file_path)?.load()?);
            }
            None => return Err(DataError::SymbolNotFound(symbol.clone())),
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_core::traits::DataHandler;
    use replay_core::EventQueue;

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("csv".parse::<DataSourceKind>().unwrap(), DataSourceKind::Csv);
        assert_eq!("CSV".parse::<DataSourceKind>().unwrap(), DataSourceKind::Csv);
        assert!(matches!(
            "akshare".parse::<DataSourceKind>(),
            Err(DataError::UnsupportedSource(_))
        ));
    }

    #[test]
    fn test_empty_symbols_rejected() {
        let result = DataLoader::new(vec![], DataSourceKind::Csv, "data");
        assert!(matches!(result, Err(DataError::EmptyUniverse)));
    }

    #[test]
    fn test_directory_loading() {
        let dir = std::env::temp_dir().join(format!("replay-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("abc.csv"), "date,close\n2024-01-01,5\n2024-01-02,6\n").unwrap();

        let loader = DataLoader::new(vec!["ABC".to_string()], DataSourceKind::Csv, &dir).unwrap();
        let queue = EventQueue::new();
        let mut handler = loader.into_handler(queue.publisher()).unwrap();
        handler.update_bars().unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(handler.latest_bar("ABC").unwrap().close, 5.0);
    }

    #[test]
    fn test_single_file_serves_one_symbol_only() {
        let dir = std::env::temp_dir().join(format!("replay-loader-file-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("bars.csv");
        std::fs::write(&file, "date,close\n2024-01-01,5\n2024-01-02,6\n2024-01-03,7\n").unwrap();

        let single = DataLoader::new(vec!["AAA".to_string()], DataSourceKind::Csv, &file)
            .unwrap()
            .load_bars();
        let multi = DataLoader::new(
            vec!["AAA".to_string(), "BBB".to_string()],
            DataSourceKind::Csv,
            &file,
        )
        .unwrap()
        .load_bars();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(single.unwrap()["AAA"].len(), 3);
        assert!(matches!(multi, Err(DataError::SymbolNotFound(s)) if s == "BBB"));
    }

    #[test]
    fn test_directory_missing_symbol() {
        let dir = std::env::temp_dir().join(format!("replay-loader-missing-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let loader = DataLoader::new(vec!["NOPE".to_string()], DataSourceKind::Csv, &dir).unwrap();
        let result = loader.load_bars();
        std::fs::remove_dir_all(&dir).ok();

        assert!(matches!(result, Err(DataError::SymbolNotFound(_))));
    }
}
