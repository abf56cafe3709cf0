pub mod engine;
pub mod loader;
pub mod naming;
pub mod render;
pub mod transform;

pub use crate::domain::model::{ColumnRange, Hand, LabeledTable, Recording, Table};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
