pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::storage::LocalStorage;
pub use config::PlotSettings;
pub use core::engine::PlotEngine;
pub use domain::layout::SensorLayout;
pub use domain::model::{ColumnRange, Hand, LabeledTable, Table};
pub use domain::ports::{ConfigProvider, PlotStyle, Storage};
pub use utils::error::{PlotError, Result};
