//! Decision log persistence
//!
//! The log is a JSON array of `{packet, action, matched_rule}` objects,
//! indented with four spaces and written as UTF-8 (non-ASCII is kept
//! literal, not escaped). A `<file>.sha256` sidecar holds the checksum of
//! the JSON text so edits can be detected when the log is read back.

use crate::core::error::{LoadError, Result};
use crate::core::firewall::Decision;
use crate::core::loader::read_input;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default decision log file name, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "firewall_log.json";

/// Serializes decisions the way they are written to disk.
pub fn to_json(decisions: &[Decision]) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    decisions.serialize(&mut ser)?;
    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Lowercase hex SHA-256 of the given text
pub fn checksum(json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Path of the checksum sidecar for a log file (`log.json` → `log.json.sha256`)
pub fn checksum_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".sha256");
    PathBuf::from(name)
}

/// Saves decisions atomically.
/// Uses a temporary file + rename pattern so a crash mid-write never leaves
/// a truncated log behind. The checksum sidecar is written afterwards when
/// `with_checksum` is set; otherwise any sidecar left by an earlier save is
/// removed so it can't be checked against the new log.
///
/// # Async
/// Uses `tokio::fs` for non-blocking file I/O.
pub async fn save_decisions(path: &Path, decisions: &[Decision], with_checksum: bool) -> Result<()> {
    let json = to_json(decisions)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !tokio::fs::try_exists(parent).await?
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    #[cfg(unix)]
    {
        use tokio::fs::OpenOptions;
        use tokio::io::AsyncWriteExt;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .mode(0o600)
            .open(&temp_path)
            .await?;

        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
    }

    #[cfg(not(unix))]
    {
        tokio::fs::write(&temp_path, &json).await?;
    }

    tokio::fs::rename(&temp_path, path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::StorageFull {
            std::io::Error::new(
                std::io::ErrorKind::StorageFull,
                "Disk full: cannot save decision log. Free up space and try again.",
            )
        } else {
            e
        }
    })?;

    let sidecar = checksum_path(path);
    if with_checksum {
        tokio::fs::write(&sidecar, checksum(&json)).await?;
    } else {
        match tokio::fs::remove_file(&sidecar).await {
            Ok(()) => info!("Removed stale checksum {}", sidecar.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    info!("Saved {} decisions to {}", decisions.len(), path.display());
    Ok(())
}

/// Loads a decision log.
/// Verifies the checksum if a sidecar is present (warns but doesn't fail
/// for manually edited logs). Read and parse failures name the log file.
///
/// # Async
/// Uses `tokio::fs` for non-blocking file I/O.
pub async fn load_decisions(path: &Path) -> Result<Vec<Decision>> {
    let json = read_input(path).await?;

    if let Ok(expected) = tokio::fs::read_to_string(checksum_path(path)).await {
        let actual = checksum(&json);
        if expected.trim() != actual {
            warn!(
                "Decision log '{}' checksum mismatch (expected: {}, got: {})",
                path.display(),
                expected.trim(),
                actual
            );
        }
    }

    let decisions = serde_json::from_str(&json).map_err(|source| LoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decisions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::apply_rules;
    use crate::core::error::Error;
    use crate::core::firewall::{Packet, Rule};
    use crate::core::test_helpers::{example_packets, example_rules};

    #[test]
    fn test_json_layout() {
        let decisions = apply_rules(&example_packets(), &example_rules());
        let json = to_json(&decisions).unwrap();

        assert!(json.starts_with("[\n    {\n        \"packet\": {"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = value[0].as_object().unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first["action"], "ALLOW");
        assert_eq!(first["packet"].as_object().unwrap().len(), 4);
        assert_eq!(first["matched_rule"].as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_non_ascii_is_not_escaped() {
        let rule = Rule::new("*", "*", "*", "*", "許可");
        let packet = Packet::new("ホスト", "b", "1", "tcp");
        let json = to_json(&apply_rules(&[packet], &[rule])).unwrap();
        assert!(json.contains("ホスト"));
        assert!(json.contains("許可"));
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn test_empty_log_is_empty_array() {
        assert_eq!(to_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_checksum_path() {
        assert_eq!(
            checksum_path(Path::new("out/firewall_log.json")),
            PathBuf::from("out/firewall_log.json.sha256")
        );
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("firewall_log.json");
        let decisions = apply_rules(&example_packets(), &example_rules());

        save_decisions(&path, &decisions, true).await.unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        let sidecar = std::fs::read_to_string(checksum_path(&path)).unwrap();
        assert_eq!(sidecar, checksum(&json));
        assert_eq!(load_decisions(&path).await.unwrap(), decisions);
    }

    #[tokio::test]
    async fn test_save_without_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("firewall_log.json");

        save_decisions(&path, &[], false).await.unwrap();

        assert!(path.exists());
        assert!(!checksum_path(&path).exists());
    }

    #[tokio::test]
    async fn test_checksum_mismatch_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("firewall_log.json");
        let decisions = apply_rules(&example_packets(), &example_rules());
        save_decisions(&path, &decisions, true).await.unwrap();

        std::fs::write(checksum_path(&path), "0000").unwrap();

        assert_eq!(load_decisions(&path).await.unwrap(), decisions);
    }

    #[tokio::test]
    async fn test_save_without_checksum_removes_stale_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("firewall_log.json");
        let decisions = apply_rules(&example_packets(), &example_rules());
        save_decisions(&path, &decisions, true).await.unwrap();
        assert!(checksum_path(&path).exists());

        save_decisions(&path, &[], false).await.unwrap();

        assert!(!checksum_path(&path).exists());
        assert!(load_decisions(&path).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_log_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved_log.json");

        let err = load_decisions(&path).await.unwrap_err();

        assert!(matches!(err, Error::Load(LoadError::NotFound { .. })));
        assert!(err.translate().user_message.contains("saved_log.json not found"));
    }

    #[tokio::test]
    async fn test_load_malformed_log_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved_log.json");
        std::fs::write(&path, "[{not json").unwrap();

        let err = load_decisions(&path).await.unwrap_err();

        assert!(matches!(err, Error::Load(LoadError::Malformed { .. })));
        assert!(
            err.translate()
                .user_message
                .contains("Invalid JSON format in")
        );
        assert!(err.translate().user_message.contains("saved_log.json"));
    }
}
