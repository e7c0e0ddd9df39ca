//! 測試用的記憶體內目錄實作

use crate::domain::model::{
    ContentKind, ContentNode, ContentRef, CountryCode, MonetizationType, Offer, ProviderDirectory,
    SearchQuery,
};
use crate::domain::ports::StreamingCatalog;
use crate::utils::error::{Result, ScoutError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct MockCalls {
    searches: Vec<SearchQuery>,
    nodes: Vec<String>,
    providers: usize,
}

#[derive(Clone, Default)]
pub struct MockCatalog {
    candidates: HashMap<String, Vec<ContentRef>>,
    nodes: HashMap<String, ContentNode>,
    regional_offers: HashMap<(String, String), Vec<Offer>>,
    regional_misses: HashSet<(String, String)>,
    providers: Vec<(String, String)>,
    failing_searches: HashSet<String>,
    failing_nodes: HashSet<String>,
    slow_searches: HashMap<String, Duration>,
    calls: Arc<Mutex<MockCalls>>,
}

pub fn offer(monetization_type: &str, technical_name: &str, clear_name: &str) -> Offer {
    Offer {
        monetization_type: MonetizationType::parse(monetization_type),
        technical_name: technical_name.to_string(),
        clear_name: if clear_name.is_empty() {
            None
        } else {
            Some(clear_name.to_string())
        },
        available_from: None,
        available_to: None,
    }
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidates(mut self, term: &str, candidates: Vec<(&str, ContentKind)>) -> Self {
        let refs = candidates
            .into_iter()
            .map(|(id, kind)| ContentRef {
                id: id.to_string(),
                object_id: None,
                kind,
                display_title: Some(term.to_string()),
                full_path: None,
            })
            .collect();
        self.candidates.insert(term.to_string(), refs);
        self
    }

    pub fn with_movie(self, term: &str, id: &str, offers: Vec<Offer>) -> Self {
        self.with_candidates(term, vec![(id, ContentKind::Movie)])
            .with_node(id, ContentKind::Movie, offers)
    }

    pub fn with_node(mut self, id: &str, kind: ContentKind, offers: Vec<Offer>) -> Self {
        self.nodes.insert(
            id.to_string(),
            ContentNode {
                id: id.to_string(),
                kind,
                offers,
            },
        );
        self
    }

    /// 覆寫某國家的 offers（其他國家沿用 `with_node` 的設定）
    pub fn with_offers_in(mut self, country: &str, id: &str, offers: Vec<Offer>) -> Self {
        self.regional_offers
            .insert((country.to_string(), id.to_string()), offers);
        self
    }

    /// 在某國家搜尋不到該片名
    pub fn with_missing_in(mut self, country: &str, term: &str) -> Self {
        self.regional_misses
            .insert((country.to_string(), term.to_string()));
        self
    }

    pub fn with_providers(mut self, entries: Vec<(&str, &str)>) -> Self {
        self.providers = entries
            .into_iter()
            .map(|(technical, clear)| (technical.to_string(), clear.to_string()))
            .collect();
        self
    }

    pub fn with_failing_search(mut self, term: &str) -> Self {
        self.failing_searches.insert(term.to_string());
        self
    }

    pub fn with_failing_node(mut self, id: &str) -> Self {
        self.failing_nodes.insert(id.to_string());
        self
    }

    pub fn with_slow_search(mut self, term: &str, delay: Duration) -> Self {
        self.slow_searches.insert(term.to_string(), delay);
        self
    }

    pub async fn search_count(&self) -> usize {
        self.calls.lock().await.searches.len()
    }

    pub async fn search_limits(&self) -> Vec<usize> {
        let calls = self.calls.lock().await;
        calls.searches.iter().map(|q| q.result_limit).collect()
    }

    pub async fn node_fetches(&self) -> Vec<String> {
        self.calls.lock().await.nodes.clone()
    }

    pub async fn provider_fetches(&self) -> usize {
        self.calls.lock().await.providers
    }
}

#[async_trait::async_trait]
impl StreamingCatalog for MockCatalog {
    async fn search_titles(&self, query: &SearchQuery) -> Result<Vec<ContentRef>> {
        self.calls.lock().await.searches.push(query.clone());

        if let Some(delay) = self.slow_searches.get(&query.term) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_searches.contains(&query.term) {
            return Err(ScoutError::MalformedResponse {
                message: format!("search for '{}' failed", query.term),
            });
        }

        if self
            .regional_misses
            .contains(&(query.country.to_string(), query.term.clone()))
        {
            return Ok(Vec::new());
        }

        let mut candidates = self.candidates.get(&query.term).cloned().unwrap_or_default();
        candidates.truncate(query.result_limit);
        Ok(candidates)
    }

    async fn fetch_node(&self, node_id: &str, country: &CountryCode) -> Result<ContentNode> {
        self.calls.lock().await.nodes.push(node_id.to_string());

        if self.failing_nodes.contains(node_id) {
            return Err(ScoutError::GraphQlError {
                messages: vec![format!("node {} unavailable", node_id)],
            });
        }

        let mut node = self
            .nodes
            .get(node_id)
            .cloned()
            .ok_or_else(|| ScoutError::MalformedResponse {
                message: format!("node {} is null", node_id),
            })?;
        if let Some(offers) = self
            .regional_offers
            .get(&(country.to_string(), node_id.to_string()))
        {
            node.offers = offers.clone();
        }
        Ok(node)
    }

    async fn providers(&self, _country: &CountryCode) -> Result<ProviderDirectory> {
        self.calls.lock().await.providers += 1;
        Ok(self.providers.iter().cloned().collect())
    }
}
