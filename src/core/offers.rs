use crate::core::cache::RunCache;
use crate::domain::model::{ContentKind, ContentRef, CountryCode, Offer, ProviderDirectory};
use crate::domain::ports::StreamingCatalog;
use crate::utils::error::{Result, ScoutError};

pub struct OfferFetcher<'a, C: StreamingCatalog> {
    catalog: &'a C,
    cache: &'a RunCache,
}

impl<'a, C: StreamingCatalog> OfferFetcher<'a, C> {
    pub fn new(catalog: &'a C, cache: &'a RunCache) -> Self {
        Self { catalog, cache }
    }

    /// 取得條目在指定國家的所有 offers。非電影條目直接回傳
    /// `ScoutError::UnsupportedContentType`，不發出請求。
    pub async fn fetch_offers(&self, content: &ContentRef, country: &CountryCode) -> Result<Vec<Offer>> {
        match &content.kind {
            ContentKind::Movie => {}
            ContentKind::Show | ContentKind::Unsupported(_) => {
                return Err(ScoutError::UnsupportedContentType {
                    kind: content.kind.to_string(),
                });
            }
        }

        let catalog = self.catalog;
        let node = self
            .cache
            .node(country, &content.id, move || async move {
                catalog.fetch_node(&content.id, country).await
            })
            .await?;

        // 搜尋結果與節點的型別標籤可能不一致，以節點為準
        match node.kind {
            ContentKind::Movie => {}
            ContentKind::Show | ContentKind::Unsupported(_) => {
                return Err(ScoutError::UnsupportedContentType {
                    kind: node.kind.to_string(),
                });
            }
        }

        tracing::debug!("🎬 {} ({}): {} offer(s)", content.id, country, node.offers.len());
        Ok(self.fill_clear_names(node.offers, country).await)
    }

    async fn fill_clear_names(&self, offers: Vec<Offer>, country: &CountryCode) -> Vec<Offer> {
        let missing = offers
            .iter()
            .any(|offer| offer.clear_name.as_deref().map_or(true, |n| n.trim().is_empty()));
        if !missing {
            return offers;
        }

        let directory = match self.provider_directory(country).await {
            Ok(directory) => directory,
            Err(e) => {
                tracing::warn!("⚠️ Provider directory for {} unavailable: {}", country, e);
                return offers;
            }
        };

        offers
            .into_iter()
            .map(|mut offer| {
                if offer.clear_name.as_deref().map_or(true, |n| n.trim().is_empty()) {
                    offer.clear_name = directory
                        .clear_name(&offer.technical_name)
                        .map(str::to_string);
                }
                offer
            })
            .collect()
    }

    async fn provider_directory(&self, country: &CountryCode) -> Result<ProviderDirectory> {
        let catalog = self.catalog;
        self.cache
            .providers(country, move || async move {
                let directory = catalog.providers(country).await?;
                tracing::debug!("📇 Loaded {} providers for {}", directory.len(), country);
                Ok::<_, ScoutError>(directory)
            })
            .await
    }
}
