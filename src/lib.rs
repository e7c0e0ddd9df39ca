pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use adapters::justwatch::JustWatchClient;
pub use app::pipeline::AvailabilityPipeline;
pub use core::{
    aggregator::{BatchAggregator, BatchRequest},
    engine::ScoutEngine,
};
pub use utils::error::{Result, ScoutError};
