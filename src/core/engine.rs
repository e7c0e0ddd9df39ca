use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct ScoutEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ScoutEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// 讀取片單 -> 查詢可用服務 -> 輸出報表，回傳輸出位置
    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting availability check...");
        self.monitor.log_stats("start");

        let titles = self.pipeline.extract().await?;
        tracing::info!("📥 Read {} title(s)", titles.len());
        self.monitor.log_stats("extract");

        let outcome = self.pipeline.transform(titles).await?;
        tracing::info!("🧮 Report has {} entr(ies)", outcome.report.len());
        self.monitor.log_stats("transform");

        let destination = self.pipeline.load(outcome).await?;
        tracing::info!("📁 Report written to: {}", destination);
        self.monitor.log_final_stats();

        Ok(destination)
    }
}
