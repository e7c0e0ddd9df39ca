use crate::domain::model::{ContentNode, ContentRef, CountryCode, ProviderDirectory};
use crate::utils::error::Result;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

type CountryKey = (CountryCode, String);
type Slots<K, V> = Mutex<HashMap<K, Arc<OnceCell<V>>>>;

/// 單次批次執行內的快取：同一次執行裡，相同片名與節點只查一次，
/// 使重複出現的片名得到一致的結果。每次執行建立新的實例，不跨執行保留。
///
/// 同一個 key 的併發請求會等待第一個請求的結果，不會重複發出。
/// 只快取成功的回應與「查無結果」；失敗時 slot 保持空白，下一個呼叫者重試。
#[derive(Debug, Default)]
pub struct RunCache {
    lookups: Slots<CountryKey, Option<ContentRef>>,
    nodes: Slots<CountryKey, ContentNode>,
    providers: Slots<CountryCode, ProviderDirectory>,
}

impl RunCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Ok(None)` 代表已確認查無結果
    pub async fn lookup<F, Fut>(
        &self,
        country: &CountryCode,
        term: &str,
        search: F,
    ) -> Result<Option<ContentRef>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<ContentRef>>>,
    {
        get_or_fill(&self.lookups, (country.clone(), term.to_string()), search).await
    }

    pub async fn node<F, Fut>(&self, country: &CountryCode, node_id: &str, fetch: F) -> Result<ContentNode>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ContentNode>>,
    {
        get_or_fill(&self.nodes, (country.clone(), node_id.to_string()), fetch).await
    }

    pub async fn providers<F, Fut>(&self, country: &CountryCode, fetch: F) -> Result<ProviderDirectory>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ProviderDirectory>>,
    {
        get_or_fill(&self.providers, country.clone(), fetch).await
    }
}

async fn get_or_fill<K, V, F, Fut>(slots: &Slots<K, V>, key: K, fill: F) -> Result<V>
where
    K: Eq + Hash,
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V>>,
{
    // 鎖只用來取出 slot，await 前就釋放
    let slot = slots
        .lock()
        .ok()
        .map(|mut slots| slots.entry(key).or_default().clone());

    match slot {
        Some(slot) => slot.get_or_try_init(fill).await.cloned(),
        None => fill().await,
    }
}
