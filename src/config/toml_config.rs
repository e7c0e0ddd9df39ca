use crate::config::{
    default_monetization_types, validate_provider, DEFAULT_CONCURRENCY, DEFAULT_COUNTRY,
    DEFAULT_GRAPHQL_URL, DEFAULT_LANGUAGE, DEFAULT_TIMEOUT_SECS, DEFAULT_TITLE_COLUMN,
};
use crate::domain::model::{GroupBy, OutputFormat};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, ScoutError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub query: QueryConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub performance: Option<PerformanceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: Option<String>,
    pub language: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            language: None,
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub country: Option<String>,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default = "default_monetization_types")]
    pub monetization_types: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub group_by: GroupBy,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            country: None,
            countries: Vec::new(),
            monetization_types: default_monetization_types(),
            services: Vec::new(),
            group_by: GroupBy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
    pub title_column: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: Option<String>,
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    pub concurrency: Option<usize>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScoutError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SCOUT_COUNTRY})；未設定的變數保留原字串
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScoutError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        self.source.endpoint.as_deref().unwrap_or(DEFAULT_GRAPHQL_URL)
    }

    fn language(&self) -> &str {
        self.source.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn title_column(&self) -> usize {
        self.input.title_column.unwrap_or(DEFAULT_TITLE_COLUMN)
    }

    fn output_path(&self) -> Option<&str> {
        self.output.path.as_deref()
    }

    fn output_format(&self) -> OutputFormat {
        self.output.format
    }

    fn country(&self) -> &str {
        self.query.country.as_deref().unwrap_or(DEFAULT_COUNTRY)
    }

    fn countries(&self) -> &[String] {
        &self.query.countries
    }

    fn monetization_types(&self) -> &[String] {
        &self.query.monetization_types
    }

    fn services(&self) -> &[String] {
        &self.query.services
    }

    fn group_by(&self) -> GroupBy {
        self.query.group_by
    }

    fn concurrency(&self) -> usize {
        self.performance
            .as_ref()
            .and_then(|p| p.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY)
    }

    fn request_timeout_secs(&self) -> u64 {
        self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
