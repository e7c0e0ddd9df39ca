pub mod aggregator;
pub mod cache;
pub mod engine;
pub mod filter;
pub mod lookup;
pub mod offers;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{BatchOutcome, Report, Title};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage, StreamingCatalog};
pub use crate::utils::error::Result;
