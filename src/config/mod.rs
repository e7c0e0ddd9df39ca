pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::{GroupBy, OutputFormat};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, ScoutError};
use crate::utils::validation::{
    validate_country_code, validate_file_extension, validate_monetization_types,
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub use crate::adapters::justwatch::DEFAULT_GRAPHQL_URL;

pub const DEFAULT_COUNTRY: &str = "IT";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TITLE_COLUMN: usize = 1;
pub const MAX_CONCURRENCY: usize = 32;
pub const MAX_TIMEOUT_SECS: u64 = 300;

pub fn default_monetization_types() -> Vec<String> {
    vec!["flatrate".to_string(), "ads".to_string()]
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "stream-scout")]
#[command(about = "Check which streaming services offer the titles of a watchlist")]
pub struct CliConfig {
    #[arg(long, short, default_value = "watchlist.csv", help = "Watchlist CSV file")]
    pub input: String,

    #[arg(long, default_value_t = DEFAULT_TITLE_COLUMN, help = "Zero-based CSV column holding the title")]
    pub title_column: usize,

    #[arg(long, short, default_value = DEFAULT_COUNTRY)]
    pub country: String,

    #[arg(long, value_delimiter = ',', help = "Scan these countries and report service -> countries per title")]
    pub countries: Vec<String>,

    #[arg(long, value_delimiter = ',', default_value = "flatrate,ads")]
    pub monetization_types: Vec<String>,

    #[arg(long, value_delimiter = ',', help = "Only report these services (by-service mode)")]
    pub services: Vec<String>,

    #[arg(long, help = "Group the report by service instead of by title")]
    pub by_service: bool,

    #[arg(long, short, help = "Append the report to this file instead of stdout")]
    pub output: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    #[arg(long, default_value = DEFAULT_GRAPHQL_URL)]
    pub api_endpoint: String,

    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    #[arg(long, help = "Load settings from a TOML file instead of the flags above")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn language(&self) -> &str {
        &self.language
    }

    fn input_path(&self) -> &str {
        &self.input
    }

    fn title_column(&self) -> usize {
        self.title_column
    }

    fn output_path(&self) -> Option<&str> {
        self.output.as_deref()
    }

    fn output_format(&self) -> OutputFormat {
        self.format
    }

    fn country(&self) -> &str {
        &self.country
    }

    fn countries(&self) -> &[String] {
        &self.countries
    }

    fn monetization_types(&self) -> &[String] {
        &self.monetization_types
    }

    fn services(&self) -> &[String] {
        &self.services
    }

    fn group_by(&self) -> GroupBy {
        if self.by_service {
            GroupBy::ByService
        } else {
            GroupBy::ByTitle
        }
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn request_timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

/// CLI 與 TOML 共用的檢查
pub fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_url("api_endpoint", config.api_endpoint())?;
    validate_non_empty_string("language", config.language())?;
    if config.input_path().trim().is_empty() {
        return Err(ScoutError::MissingConfigError {
            field: "input".to_string(),
        });
    }
    validate_path("input", config.input_path())?;
    validate_file_extension("input", config.input_path(), &["csv"])?;
    if let Some(output) = config.output_path() {
        validate_path("output", output)?;
    }
    validate_country_code("country", config.country())?;
    for country in config.countries().iter().filter(|c| !c.trim().is_empty()) {
        validate_country_code("countries", country)?;
    }
    validate_monetization_types("monetization_types", config.monetization_types())?;
    validate_range("concurrency", config.concurrency(), 1, MAX_CONCURRENCY)?;
    validate_range(
        "timeout_secs",
        config.request_timeout_secs(),
        1,
        MAX_TIMEOUT_SECS,
    )?;
    Ok(())
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
