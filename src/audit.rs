/// Audit logging for simulation runs
///
/// This module provides structured logging of each run: what was loaded,
/// how many decisions were produced, and where they were written.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Types of auditable events
#[derive(Debug, Clone, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    RunSimulation,
    SaveLog,
    LoadFailed,
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// When the event occurred (UTC)
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Type of event
    pub event_type: EventType,

    /// Whether the operation succeeded
    pub success: bool,

    /// Additional structured data about the event
    pub details: serde_json::Value,

    /// Error message if operation failed
    pub error: Option<String>,
}

impl AuditEvent {
    /// Creates a new audit event
    pub fn new(
        event_type: EventType,
        success: bool,
        details: serde_json::Value,
        error: Option<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            event_type,
            success,
            details,
            error,
        }
    }

    /// One-line rendering for `fwsim audit`
    pub fn summary_line(&self) -> String {
        let status = if self.success { "ok" } else { "FAILED" };
        let mut line = format!(
            "{}  {:<14}  {:<6}  {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.event_type.to_string(),
            status,
            self.details
        );
        if let Some(error) = &self.error {
            line.push_str(&format!("  ({error})"));
        }
        line
    }
}

/// Audit log writer
pub struct AuditLog {
    log_path: PathBuf,
}

impl AuditLog {
    /// Creates an audit log in the state directory
    ///
    /// # Errors
    ///
    /// Returns `Err` if state directory cannot be determined
    pub fn new() -> std::io::Result<Self> {
        let mut log_path = crate::utils::get_state_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "State directory not found")
        })?;
        log_path.push("audit.log");

        Ok(Self::at(log_path))
    }

    /// Creates an audit log at an explicit path
    pub fn at(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
        }
    }

    /// Appends an event to the audit log
    ///
    /// Events are written as JSON-lines format (one JSON object per line)
    ///
    /// # Errors
    ///
    /// Returns `Err` if file cannot be opened or written
    pub async fn log(&self, event: AuditEvent) -> std::io::Result<()> {
        let json = serde_json::to_string(&event)?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .await?;

        file.write_all(json.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.sync_all().await?;

        Ok(())
    }

    /// Reads the most recent events from the log, newest first
    ///
    /// # Errors
    ///
    /// Returns `Err` if file cannot be read
    pub async fn read_recent(&self, count: usize) -> std::io::Result<Vec<AuditEvent>> {
        let content = tokio::fs::read_to_string(&self.log_path).await?;

        let events: Vec<AuditEvent> = content
            .lines()
            .rev()
            .take(count)
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        Ok(events)
    }

    /// Returns the path to the audit log file
    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

async fn write_event(event: AuditEvent) {
    if let Ok(audit) = AuditLog::new()
        && let Err(e) = audit.log(event).await
    {
        tracing::warn!("Failed to write audit log: {}", e);
    }
}

/// Logs a completed simulation run
pub async fn log_run(packet_count: usize, rule_count: usize, decision_count: usize) {
    write_event(AuditEvent::new(
        EventType::RunSimulation,
        true,
        serde_json::json!({
            "packet_count": packet_count,
            "rule_count": rule_count,
            "decision_count": decision_count,
        }),
        None,
    ))
    .await;
}

/// Logs a decision log write
pub async fn log_save(path: &Path, success: bool, error: Option<String>) {
    write_event(AuditEvent::new(
        EventType::SaveLog,
        success,
        serde_json::json!({ "path": path.display().to_string() }),
        error,
    ))
    .await;
}

/// Logs an input that could not be loaded
pub async fn log_load_failed(path: &Path, error: String) {
    write_event(AuditEvent::new(
        EventType::LoadFailed,
        false,
        serde_json::json!({ "path": path.display().to_string() }),
        Some(error),
    ))
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_audit_event_creation() {
        let event = AuditEvent::new(
            EventType::RunSimulation,
            true,
            serde_json::json!({"decision_count": 5}),
            None,
        );

        assert!(event.success);
        assert!(event.error.is_none());
        assert_eq!(event.details["decision_count"], 5);
    }

    #[test]
    fn test_event_serialization() {
        let event = AuditEvent::new(
            EventType::LoadFailed,
            false,
            serde_json::json!({"path": "rules.json"}),
            Some("rules.json not found".to_string()),
        );

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("load_failed"));
        assert!(json.contains("rules.json not found"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"timestamp":"2024-01-01T00:00:00Z","event_type":"run_simulation","success":true,"details":{},"error":null}"#;
        let event: AuditEvent = serde_json::from_str(json).unwrap();

        assert!(event.success);
        assert!(matches!(event.event_type, EventType::RunSimulation));
    }

    #[test]
    fn test_summary_line() {
        let mut event = AuditEvent::new(
            EventType::LoadFailed,
            false,
            serde_json::json!({"path": "rules.json"}),
            Some("rules.json not found".to_string()),
        );
        event.timestamp = chrono::DateTime::parse_from_rfc3339("2024-01-01T12:30:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);

        let line = event.summary_line();

        assert!(line.starts_with("2024-01-01 12:30:00  load_failed"));
        assert!(line.contains("FAILED"));
        assert!(line.contains(r#"{"path":"rules.json"}"#));
        assert!(line.ends_with("(rules.json not found)"));
    }

    #[tokio::test]
    async fn test_read_recent_missing_log_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditLog::at(dir.path().join("audit.log"));

        let err = audit.read_recent(5).await.unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        assert_eq!(audit.path(), dir.path().join("audit.log"));
    }

    #[tokio::test]
    async fn test_log_and_read_recent() {
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditLog::at(dir.path().join("audit.log"));

        for count in 0..3 {
            let event = AuditEvent::new(
                EventType::RunSimulation,
                true,
                serde_json::json!({ "decision_count": count }),
                None,
            );
            audit.log(event).await.unwrap();
        }

        let recent = audit.read_recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].details["decision_count"], 2);
        assert_eq!(recent[1].details["decision_count"], 1);
    }
}
