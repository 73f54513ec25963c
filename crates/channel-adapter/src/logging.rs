//! Interaction logger.
//!
//! Writes one structured JSON entry per dispatched chat message, through
//! `tracing` and optionally to a JSON-lines file.

use std::path::PathBuf;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::types::{InteractionAction, InteractionLog};

/// Structured interaction logger that writes JSON lines to a file or the tracing output.
pub struct InteractionLogger {
    log_path: Option<PathBuf>,
    count: RwLock<u64>,
}

impl InteractionLogger {
    /// Create a logger that writes to the given file path.
    /// If `None`, logs to tracing output only.
    pub fn new(log_path: Option<PathBuf>) -> Self {
        Self {
            log_path,
            count: RwLock::new(0),
        }
    }

    /// Log an interaction.
    pub async fn log(&self, entry: &InteractionLog) {
        let json = serde_json::to_string(entry).unwrap_or_else(|e| {
            format!(
                r#"{{"error":"serialization failed: {}","ts":"{}"}}"#,
                e,
                Utc::now().to_rfc3339()
            )
        });

        tracing::info!(target: "bot_interaction", "{}", json);

        if let Some(ref path) = self.log_path {
            if let Err(e) = append_log_line(path, &json).await {
                tracing::warn!("Failed to write interaction log: {}", e);
            }
        }

        *self.count.write().await += 1;
    }

    /// Build a log entry for one dispatched post.
    #[allow(clippy::too_many_arguments)]
    pub fn entry(
        user: &str,
        channel: &str,
        post: &str,
        rule: Option<u64>,
        action: InteractionAction,
        success: bool,
        duration_ms: Option<u64>,
        error: Option<String>,
    ) -> InteractionLog {
        InteractionLog {
            ts: Utc::now(),
            user: user.to_string(),
            channel: channel.to_string(),
            post: post.to_string(),
            rule,
            action,
            success,
            duration_ms,
            error,
        }
    }

    /// Get the total number of interactions logged.
    pub async fn interaction_count(&self) -> u64 {
        *self.count.read().await
    }
}

async fn append_log_line(path: &std::path::Path, line: &str) -> Result<(), std::io::Error> {
    use tokio::io::AsyncWriteExt;

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.write_all(b"\n").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn logger_counts_interactions() {
        let logger = InteractionLogger::new(None);
        assert_eq!(logger.interaction_count().await, 0);

        let entry = InteractionLogger::entry(
            "u1",
            "c1",
            "p1",
            Some(4),
            InteractionAction::Reply,
            true,
            Some(2),
            None,
        );
        logger.log(&entry).await;
        assert_eq!(logger.interaction_count().await, 1);
    }

    #[tokio::test]
    async fn logger_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interactions.jsonl");
        let logger = InteractionLogger::new(Some(path.clone()));

        for action in [InteractionAction::Admin, InteractionAction::NoMatch] {
            let entry = InteractionLogger::entry("u1", "c1", "p1", None, action, true, None, None);
            logger.log(&entry).await;
        }

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"action\":\"admin\""));
        assert!(lines[1].contains("\"action\":\"no_match\""));
    }

    #[test]
    fn entry_fields() {
        let entry = InteractionLogger::entry(
            "u2",
            "c2",
            "p2",
            Some(1),
            InteractionAction::Admin,
            false,
            None,
            Some("send failed".to_string()),
        );
        assert_eq!(entry.user, "u2");
        assert_eq!(entry.rule, Some(1));
        assert!(!entry.success);
        assert_eq!(entry.error.as_deref(), Some("send failed"));
    }
}
