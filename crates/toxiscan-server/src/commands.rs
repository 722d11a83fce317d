//! One-shot CLI commands

use crate::config::AppConfig;
use crate::server::build_orchestrator;
use toxiscan_core::ClassificationRecord;
use toxiscan_history::HistoryStore;

/// Classify one comment and print the result
pub async fn classify(config: &AppConfig, comment: &str, as_json: bool) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(config)?;

    match orchestrator.submit(comment).await {
        Ok(record) => {
            if as_json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("{}", format_record(&record));
            }
            Ok(())
        }
        Err(e) => anyhow::bail!("{} [{}]", e.user_message(), e.kind()),
    }
}

/// Print the most recent history entries
pub fn history(config: &AppConfig, limit: usize, as_json: bool) -> anyhow::Result<()> {
    let store = HistoryStore::from_config(&config.history)?;
    let records: Vec<_> = store.iter().take(limit).cloned().collect();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No classifications yet.");
        return Ok(());
    }

    for record in &records {
        println!("{}", format_record(record));
    }
    if store.len() > records.len() {
        println!("... {} more", store.len() - records.len());
    }

    Ok(())
}

/// Remove all local history
pub fn clear_history(config: &AppConfig) -> anyhow::Result<()> {
    let mut store = HistoryStore::from_config(&config.history)?;
    let removed = store.len();
    store.clear();
    store.persist()?;
    println!("Cleared {} classifications.", removed);
    Ok(())
}

/// One-line summary of a record
pub fn format_record(record: &ClassificationRecord) -> String {
    let classification = &record.classification;
    format!(
        "[{}] {:<9} {:>5.1}%  {:>5} ms  {}",
        classification.created_at.format("%Y-%m-%d %H:%M:%S"),
        classification.result.as_str(),
        classification.confidence * 100.0,
        classification.processing_time_ms,
        truncate(&classification.comment, 60)
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_format_record() {
        let record: ClassificationRecord = serde_json::from_value(serde_json::json!({
            "id": "cls_1",
            "comment": "you are awful",
            "result": "TOXIC",
            "confidence": 0.92,
            "processing_time_ms": 143,
            "created_at": "2024-05-01T12:00:00Z"
        }))
        .unwrap();

        let line = format_record(&record);
        assert!(line.starts_with("[2024-05-01 12:00:00] TOXIC"));
        assert!(line.contains("92.0%"));
        assert!(line.contains("143 ms"));
        assert!(line.ends_with("you are awful"));
    }
}
