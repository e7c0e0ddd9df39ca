use crate::app::render::render;
use crate::app::watchlist::parse_watchlist;
use crate::core::aggregator::{BatchAggregator, BatchRequest};
use crate::core::{BatchOutcome, ConfigProvider, Pipeline, Storage, StreamingCatalog, Title};
use crate::domain::model::OutputFormat;
use crate::utils::error::Result;
use std::io::Write;

pub const STDOUT_DESTINATION: &str = "stdout";

/// 片單 -> 可用服務報表
pub struct AvailabilityPipeline<S: Storage, C: ConfigProvider, K: StreamingCatalog> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) aggregator: BatchAggregator<K>,
}

impl<S: Storage, C: ConfigProvider, K: StreamingCatalog> AvailabilityPipeline<S, C, K> {
    pub fn new(storage: S, config: C, catalog: K) -> Self {
        Self {
            storage,
            config,
            aggregator: BatchAggregator::new(catalog),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, K: StreamingCatalog> Pipeline for AvailabilityPipeline<S, C, K> {
    async fn extract(&self) -> Result<Vec<Title>> {
        let path = self.config.input_path();
        tracing::debug!("Reading watchlist from: {}", path);

        let data = self.storage.read_file(path).await?;
        parse_watchlist(&data, self.config.title_column())
    }

    async fn transform(&self, titles: Vec<Title>) -> Result<BatchOutcome> {
        let request = BatchRequest::from_config(&self.config)?;
        Ok(self.aggregator.run(&titles, &request).await)
    }

    async fn load(&self, outcome: BatchOutcome) -> Result<String> {
        let rendered = render(&outcome, self.config.output_format())?;

        match (self.config.output_path(), self.config.output_format()) {
            (Some(path), OutputFormat::Text) => {
                // 文字報表追加寫入，保留先前的內容
                self.storage.append_file(path, rendered.as_bytes()).await?;
                Ok(path.to_string())
            }
            (Some(path), OutputFormat::Json) => {
                // JSON 必須是單一文件，覆寫
                self.storage.write_file(path, rendered.as_bytes()).await?;
                Ok(path.to_string())
            }
            (None, _) => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(rendered.as_bytes())?;
                stdout.flush()?;
                Ok(STDOUT_DESTINATION.to_string())
            }
        }
    }
}
