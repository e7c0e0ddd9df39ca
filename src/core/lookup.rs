use crate::core::cache::RunCache;
use crate::domain::model::{ContentRef, CountryCode, SearchQuery, Title};
use crate::domain::ports::StreamingCatalog;
use crate::utils::error::{Result, ScoutError};

/// 片名消歧策略。
///
/// 目前只有 `MostPopular`：搜尋只要求一筆候選，並假設最熱門的結果就是
/// 使用者要的片名。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LookupPolicy {
    #[default]
    MostPopular,
}

impl LookupPolicy {
    pub fn result_limit(&self) -> usize {
        match self {
            LookupPolicy::MostPopular => 1,
        }
    }

    pub fn select(&self, candidates: Vec<ContentRef>) -> Option<ContentRef> {
        match self {
            LookupPolicy::MostPopular => candidates.into_iter().next(),
        }
    }
}

pub struct CatalogLookup<'a, C: StreamingCatalog> {
    catalog: &'a C,
    cache: &'a RunCache,
    policy: LookupPolicy,
}

impl<'a, C: StreamingCatalog> CatalogLookup<'a, C> {
    pub fn new(catalog: &'a C, cache: &'a RunCache, policy: LookupPolicy) -> Self {
        Self {
            catalog,
            cache,
            policy,
        }
    }

    /// 將片名解析成目錄條目。
    ///
    /// 查無候選時回傳 `ScoutError::LookupMiss`；傳輸或解析失敗則原樣回傳，
    /// 由呼叫端決定如何降級。
    pub async fn resolve(&self, title: &Title, country: &CountryCode) -> Result<ContentRef> {
        if title.is_blank() {
            return Err(ScoutError::LookupMiss {
                title: title.to_string(),
            });
        }
        let term = title.as_str().trim();

        let resolved = self
            .cache
            .lookup(country, term, move || async move {
                let query = SearchQuery {
                    term: term.to_string(),
                    country: country.clone(),
                    result_limit: self.policy.result_limit(),
                };
                let candidates = self.catalog.search_titles(&query).await?;
                tracing::debug!(
                    "🔎 '{}' ({}): {} candidate(s)",
                    term,
                    country,
                    candidates.len()
                );
                Ok::<_, ScoutError>(self.policy.select(candidates))
            })
            .await?;

        resolved.ok_or_else(|| ScoutError::LookupMiss {
            title: title.to_string(),
        })
    }
}
