use crate::domain::model::{BatchOutcome, OutputFormat, Report};
use crate::utils::error::Result;
use std::fmt::Display;

/// 每個項目一行：`<名稱>: [<a>, <b>]`，沒有服務時輸出空括號
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    match report {
        Report::ByTitle(entries) => {
            for entry in entries {
                push_line(&mut out, &entry.title, &entry.services);
            }
        }
        Report::ByService(entries) => {
            for entry in entries {
                push_line(&mut out, &entry.service, &entry.titles);
            }
        }
        Report::ByCountry(entries) => {
            for entry in entries {
                let services: Vec<String> = entry
                    .services
                    .iter()
                    .map(|s| format!("{} ({})", s.service, join(&s.countries)))
                    .collect();
                push_line(&mut out, &entry.title, &services);
            }
        }
    }
    out
}

fn push_line<K: Display, V: Display>(out: &mut String, key: &K, values: &[V]) {
    out.push_str(&format!("{}: [{}]\n", key, join(values)));
}

fn join<V: Display>(values: &[V]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_json(outcome: &BatchOutcome) -> Result<String> {
    let mut json = serde_json::to_string_pretty(outcome)?;
    json.push('\n');
    Ok(json)
}

pub fn render(outcome: &BatchOutcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(&outcome.report)),
        OutputFormat::Json => render_json(outcome),
    }
}
