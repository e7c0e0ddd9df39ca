use crate::domain::model::{
    ContentKind, ContentNode, ContentRef, CountryCode, MonetizationType, Offer, ProviderDirectory,
    SearchQuery,
};
use crate::domain::ports::StreamingCatalog;
use crate::utils::error::{Result, ScoutError};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;

pub const DEFAULT_GRAPHQL_URL: &str = "https://apis.justwatch.com/graphql";

const SEARCH_TITLES_QUERY: &str = r#"
query GetSuggestedTitles($country: Country!, $language: Language!, $first: Int!, $filter: TitleFilter) {
    popularTitles(country: $country, first: $first, filter: $filter) {
        edges {
            node {
                id
                objectType
                objectId
                content(country: $country, language: $language) {
                    fullPath
                    title
                }
            }
        }
    }
}
"#;

const NODE_BY_ID_QUERY: &str = r#"
fragment Movie on Movie {
    __typename
    id
    offers(country: $country, platform: WEB) {
        monetizationType
        availableToTime
        availableFromTime
        package {
            clearName
            technicalName
        }
    }
}

fragment Node on Node {
    __typename
    id
    ...Movie
}

query GetNodeById($nodeId: ID!, $country: Country!) {
    node(id: $nodeId) {
        ...Node
    }
}
"#;

const PROVIDERS_QUERY: &str = r#"
query GetProviders($country: Country!) {
    packages(country: $country, platform: WEB, includeAddons: true) {
        technicalName
        clearName
        monetizationTypes
    }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PopularTitlesData {
    popular_titles: TitleConnection,
}

#[derive(Debug, Deserialize)]
struct TitleConnection {
    #[serde(default)]
    edges: Vec<TitleEdge>,
}

#[derive(Debug, Deserialize)]
struct TitleEdge {
    node: TitleNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitleNode {
    id: String,
    object_type: String,
    object_id: Option<i64>,
    content: Option<TitleContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitleContent {
    full_path: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NodeData {
    node: Option<RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(rename = "__typename")]
    typename: String,
    id: String,
    #[serde(default)]
    offers: Option<Vec<RawOffer>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOffer {
    monetization_type: String,
    available_from_time: Option<DateTime<Utc>>,
    available_to_time: Option<DateTime<Utc>>,
    package: RawPackage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPackage {
    technical_name: String,
    clear_name: Option<String>,
    #[serde(default)]
    monetization_types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PackagesData {
    packages: Vec<RawPackage>,
}

impl From<TitleNode> for ContentRef {
    fn from(node: TitleNode) -> Self {
        let (full_path, display_title) = match node.content {
            Some(content) => (content.full_path, content.title),
            None => (None, None),
        };
        ContentRef {
            id: node.id,
            object_id: node.object_id,
            kind: ContentKind::from_tag(&node.object_type),
            display_title,
            full_path,
        }
    }
}

impl From<RawOffer> for Offer {
    fn from(raw: RawOffer) -> Self {
        Offer {
            monetization_type: MonetizationType::parse(&raw.monetization_type),
            technical_name: raw.package.technical_name,
            clear_name: raw.package.clear_name,
            available_from: raw.available_from_time,
            available_to: raw.available_to_time,
        }
    }
}

/// JustWatch GraphQL API 的用戶端
#[derive(Debug, Clone)]
pub struct JustWatchClient {
    client: Client,
    endpoint: String,
    language: String,
}

impl JustWatchClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            language: "en".to_string(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// 執行一個 GraphQL query，回傳 `data` 欄位。
    ///
    /// 非 2xx 狀態碼視為傳輸錯誤；有 `errors` 但沒有 `data` 時回傳
    /// `ScoutError::GraphQlError`。
    pub async fn query<T: DeserializeOwned>(
        &self,
        document: &str,
        operation_name: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let body = serde_json::json!({
            "query": document,
            "operationName": operation_name,
            "variables": variables,
        });

        tracing::debug!("📡 GraphQL {} -> {}", operation_name, self.endpoint);
        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        tracing::debug!("📡 GraphQL {} status: {}", operation_name, response.status());

        let text = response.error_for_status()?.text().await?;
        let envelope: GraphQlResponse<T> =
            serde_json::from_str(&text).map_err(|e| ScoutError::MalformedResponse {
                message: format!("{}: {}", operation_name, e),
            })?;

        let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
        match envelope.data {
            Some(data) => {
                if !messages.is_empty() {
                    tracing::warn!("⚠️ GraphQL {} returned errors: {:?}", operation_name, messages);
                }
                Ok(data)
            }
            None if !messages.is_empty() => Err(ScoutError::GraphQlError { messages }),
            None => Err(ScoutError::MalformedResponse {
                message: format!("{}: response has no data", operation_name),
            }),
        }
    }

    /// 該國可用的 monetization types（小寫、排序）
    pub async fn monetization_types(&self, country: &CountryCode) -> Result<BTreeSet<String>> {
        let data: PackagesData = self
            .query(
                PROVIDERS_QUERY,
                "GetProviders",
                serde_json::json!({ "country": country.as_str() }),
            )
            .await?;

        Ok(data
            .packages
            .into_iter()
            .flat_map(|package| package.monetization_types)
            .map(|t| t.to_lowercase())
            .collect())
    }
}

#[async_trait::async_trait]
impl StreamingCatalog for JustWatchClient {
    async fn search_titles(&self, query: &SearchQuery) -> Result<Vec<ContentRef>> {
        let data: PopularTitlesData = self
            .query(
                SEARCH_TITLES_QUERY,
                "GetSuggestedTitles",
                serde_json::json!({
                    "country": query.country.as_str(),
                    "language": self.language,
                    "first": query.result_limit,
                    "filter": { "searchQuery": query.term },
                }),
            )
            .await?;

        Ok(data
            .popular_titles
            .edges
            .into_iter()
            .map(|edge| ContentRef::from(edge.node))
            .collect())
    }

    async fn fetch_node(&self, node_id: &str, country: &CountryCode) -> Result<ContentNode> {
        let data: NodeData = self
            .query(
                NODE_BY_ID_QUERY,
                "GetNodeById",
                serde_json::json!({
                    "nodeId": node_id,
                    "country": country.as_str(),
                }),
            )
            .await?;

        let node = data.node.ok_or_else(|| ScoutError::MalformedResponse {
            message: format!("GetNodeById: node {} is null", node_id),
        })?;

        Ok(ContentNode {
            id: node.id,
            kind: ContentKind::from_tag(&node.typename),
            offers: node
                .offers
                .unwrap_or_default()
                .into_iter()
                .map(Offer::from)
                .collect(),
        })
    }

    async fn providers(&self, country: &CountryCode) -> Result<ProviderDirectory> {
        let data: PackagesData = self
            .query(
                PROVIDERS_QUERY,
                "GetProviders",
                serde_json::json!({ "country": country.as_str() }),
            )
            .await?;

        Ok(data
            .packages
            .into_iter()
            .filter_map(|package| {
                let clear_name = package.clear_name?;
                Some((package.technical_name, clear_name))
            })
            .collect())
    }
}
