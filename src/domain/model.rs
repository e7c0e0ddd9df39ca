use crate::utils::error::ScoutError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// 輸入清單中的片名（尚未解析，不保證唯一）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Title(String);

impl Title {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Title {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Title {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// 兩碼國家代碼，一律存成大寫
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CountryCode {
    type Err = ScoutError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let code = raw.trim();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ScoutError::InvalidConfigValueError {
                field: "country".to_string(),
                value: raw.to_string(),
                reason: "Country must be a two-letter code such as IT or US".to_string(),
            });
        }
        Ok(Self(code.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for CountryCode {
    type Error = ScoutError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 目錄條目的型別標籤；只有 Movie 能取得 offers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    Movie,
    Show,
    Unsupported(String),
}

impl ContentKind {
    /// 解析上游的 `objectType`（MOVIE）或 `__typename`（Movie），不分大小寫
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "movie" => ContentKind::Movie,
            "show" => ContentKind::Show,
            _ => ContentKind::Unsupported(tag.to_string()),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Movie => f.write_str("Movie"),
            ContentKind::Show => f.write_str("Show"),
            ContentKind::Unsupported(tag) => f.write_str(tag),
        }
    }
}

/// Catalog Lookup 解析出的條目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRef {
    pub id: String,
    pub object_id: Option<i64>,
    pub kind: ContentKind,
    pub display_title: Option<String>,
    pub full_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MonetizationType {
    Flatrate,
    Ads,
    Rent,
    Buy,
    Free,
    Cinema,
    Other(String),
}

impl MonetizationType {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "flatrate" | "subscription" => MonetizationType::Flatrate,
            "ads" | "ad-supported" | "ads_supported" | "ad_supported" => MonetizationType::Ads,
            "rent" | "rental" => MonetizationType::Rent,
            "buy" | "purchase" => MonetizationType::Buy,
            "free" => MonetizationType::Free,
            "cinema" => MonetizationType::Cinema,
            _ => MonetizationType::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MonetizationType::Flatrate => "flatrate",
            MonetizationType::Ads => "ads",
            MonetizationType::Rent => "rent",
            MonetizationType::Buy => "buy",
            MonetizationType::Free => "free",
            MonetizationType::Cinema => "cinema",
            MonetizationType::Other(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, MonetizationType::Other(_))
    }
}

impl From<&str> for MonetizationType {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for MonetizationType {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl fmt::Display for MonetizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 串流服務的顯示名稱（例如 "Netflix"）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub monetization_type: MonetizationType,
    pub technical_name: String,
    pub clear_name: Option<String>,
    pub available_from: Option<DateTime<Utc>>,
    pub available_to: Option<DateTime<Utc>>,
}

impl Offer {
    pub fn service_name(&self) -> ServiceName {
        match self.clear_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => ServiceName::new(name),
            _ => ServiceName::new(self.technical_name.clone()),
        }
    }
}

/// 一個國家內 technical name -> clear name 的對照表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderDirectory {
    entries: HashMap<String, String>,
}

impl ProviderDirectory {
    pub fn clear_name(&self, technical_name: &str) -> Option<&str> {
        self.entries.get(technical_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 依 technical name 排序輸出
    pub fn sorted_entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(technical, clear)| (technical.as_str(), clear.as_str()))
            .collect();
        entries.sort();
        entries
    }
}

impl FromIterator<(String, String)> for ProviderDirectory {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// 以 id 取回的目錄節點
#[derive(Debug, Clone, PartialEq)]
pub struct ContentNode {
    pub id: String,
    pub kind: ContentKind,
    pub offers: Vec<Offer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub country: CountryCode,
    pub result_limit: usize,
}

/// 同一服務下所有符合條件的 offers
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOffers {
    pub service: ServiceName,
    pub offers: Vec<Offer>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    ByTitle,
    ByService,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleEntry {
    pub title: Title,
    pub services: Vec<ServiceName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceEntry {
    pub service: ServiceName,
    pub titles: Vec<Title>,
}

/// 多國掃描時，一個服務在哪些國家提供該片名
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceCountries {
    pub service: ServiceName,
    pub countries: Vec<CountryCode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryScanEntry {
    pub title: Title,
    pub services: Vec<ServiceCountries>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "group_by", content = "entries", rename_all = "snake_case")]
pub enum Report {
    ByTitle(Vec<TitleEntry>),
    ByService(Vec<ServiceEntry>),
    ByCountry(Vec<CountryScanEntry>),
}

impl Report {
    pub fn len(&self) -> usize {
        match self {
            Report::ByTitle(entries) => entries.len(),
            Report::ByService(entries) => entries.len(),
            Report::ByCountry(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn services_for(&self, title: &Title) -> Option<&[ServiceName]> {
        match self {
            Report::ByTitle(entries) => entries
                .iter()
                .find(|entry| &entry.title == title)
                .map(|entry| entry.services.as_slice()),
            Report::ByService(_) | Report::ByCountry(_) => None,
        }
    }

    pub fn titles_for(&self, service: &ServiceName) -> Option<&[Title]> {
        match self {
            Report::ByService(entries) => entries
                .iter()
                .find(|entry| &entry.service == service)
                .map(|entry| entry.titles.as_slice()),
            Report::ByTitle(_) | Report::ByCountry(_) => None,
        }
    }

    pub fn countries_for(&self, title: &Title, service: &ServiceName) -> Option<&[CountryCode]> {
        match self {
            Report::ByCountry(entries) => entries
                .iter()
                .find(|entry| &entry.title == title)?
                .services
                .iter()
                .find(|s| &s.service == service)
                .map(|s| s.countries.as_slice()),
            Report::ByTitle(_) | Report::ByService(_) => None,
        }
    }
}

/// 單一片名的處理結果；查無與請求失敗分開記錄，但在報表中都視為「無可用服務」
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TitleOutcome {
    Available { services: usize },
    NotFound,
    Unsupported { kind: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleResult {
    pub title: Title,
    pub outcome: TitleOutcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub attempted: usize,
    pub available: usize,
    pub not_found: usize,
    pub unsupported: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &TitleOutcome) {
        self.attempted += 1;
        match outcome {
            TitleOutcome::Available { .. } => self.available += 1,
            TitleOutcome::NotFound => self.not_found += 1,
            TitleOutcome::Unsupported { .. } => self.unsupported += 1,
            TitleOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub report: Report,
    pub results: Vec<TitleResult>,
    pub summary: BatchSummary,
}
