//! Historical bar sources for the backtest engine.

mod csv_source;
mod historic;
mod loader;

pub use csv_source::CsvBarSource;
pub use historic::HistoricBars;
pub use loader::{DataLoader, DataSourceKind};
