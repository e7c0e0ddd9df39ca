use crate::domain::model::Title;
use crate::utils::error::{Result, ScoutError};

/// 解析片單 CSV：第一列視為標題列，片名取自 `title_column` 欄
pub fn parse_watchlist(data: &[u8], title_column: usize) -> Result<Vec<Title>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?;
    if !headers.is_empty() && headers.len() <= title_column {
        return Err(ScoutError::ValidationError {
            message: format!(
                "watchlist header has {} column(s), title column {} is out of range",
                headers.len(),
                title_column
            ),
        });
    }

    let mut titles = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // 第 1 列是標題列，資料從第 2 列開始
        let line = index + 2;

        match record.get(title_column) {
            Some(value) if !value.is_empty() => titles.push(Title::new(value)),
            Some(_) => tracing::warn!("⚠️ Skipping row {}: empty title", line),
            None => tracing::warn!(
                "⚠️ Skipping row {}: no column {} ({} field(s))",
                line,
                title_column,
                record.len()
            ),
        }
    }

    tracing::debug!("Parsed {} title(s) from watchlist", titles.len());
    Ok(titles)
}
