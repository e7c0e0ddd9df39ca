use crate::domain::model::{
    BatchOutcome, ContentNode, ContentRef, CountryCode, GroupBy, OutputFormat, ProviderDirectory,
    SearchQuery, Title,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn append_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn language(&self) -> &str;
    fn input_path(&self) -> &str;
    fn title_column(&self) -> usize;
    fn output_path(&self) -> Option<&str>;
    fn output_format(&self) -> OutputFormat;
    fn country(&self) -> &str;
    /// 多國掃描的國家清單；空清單代表只查 `country`
    fn countries(&self) -> &[String];
    fn monetization_types(&self) -> &[String];
    fn services(&self) -> &[String];
    fn group_by(&self) -> GroupBy;
    fn concurrency(&self) -> usize;
    fn request_timeout_secs(&self) -> u64;
}

/// 串流目錄的查詢介面（GraphQL 傳輸層的抽象）
#[async_trait]
pub trait StreamingCatalog: Send + Sync {
    async fn search_titles(&self, query: &SearchQuery) -> Result<Vec<ContentRef>>;
    async fn fetch_node(&self, node_id: &str, country: &CountryCode) -> Result<ContentNode>;
    async fn providers(&self, country: &CountryCode) -> Result<ProviderDirectory>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Title>>;
    async fn transform(&self, titles: Vec<Title>) -> Result<BatchOutcome>;
    async fn load(&self, outcome: BatchOutcome) -> Result<String>;
}
