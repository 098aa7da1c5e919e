//! Rule and packet loading
//!
//! Inputs are JSON files holding an array of objects. Loading fails fast and
//! tells "file not found" apart from "malformed content", so the engine only
//! ever runs on a complete, well-formed set of records.

use crate::core::error::LoadError;
use crate::core::firewall::{Packet, Rule};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

/// Maximum number of rules accepted from one file
///
/// Limit prevents memory exhaustion from malformed/malicious inputs.
pub const MAX_RULES: usize = 10_000;

/// Maximum number of packets accepted from one file
pub const MAX_PACKETS: usize = 1_000_000;

/// Default rules file name, relative to the working directory
pub const DEFAULT_RULES_FILE: &str = "rules.json";

/// Default packets file name, relative to the working directory
pub const DEFAULT_PACKETS_FILE: &str = "packets.json";

/// Reads an input file, telling a missing file apart from other I/O failures.
pub(crate) async fn read_input(path: &Path) -> Result<String, LoadError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

async fn load_records<T: DeserializeOwned>(path: &Path, max: usize) -> Result<Vec<T>, LoadError> {
    let json = read_input(path).await?;

    let records: Vec<T> = serde_json::from_str(&json).map_err(|source| LoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    if records.len() > max {
        return Err(LoadError::TooManyRecords {
            path: path.to_path_buf(),
            count: records.len(),
            max,
        });
    }

    Ok(records)
}

/// Loads an ordered rule list. Order is preserved: it defines match priority.
///
/// # Async
/// Uses `tokio::fs` for non-blocking file I/O.
pub async fn load_rules(path: &Path) -> Result<Vec<Rule>, LoadError> {
    let rules = load_records::<Rule>(path, MAX_RULES).await?;
    info!("Loaded {} rules from {}", rules.len(), path.display());
    Ok(rules)
}

/// Loads an ordered packet batch.
///
/// # Async
/// Uses `tokio::fs` for non-blocking file I/O.
pub async fn load_packets(path: &Path) -> Result<Vec<Packet>, LoadError> {
    let packets = load_records::<Packet>(path, MAX_PACKETS).await?;
    info!("Loaded {} packets from {}", packets.len(), path.display());
    Ok(packets)
}

/// Loads rules, then packets. The first failure aborts the whole load.
pub async fn load_inputs(
    rules_path: &Path,
    packets_path: &Path,
) -> Result<(Vec<Rule>, Vec<Packet>), LoadError> {
    let rules = load_rules(rules_path).await?;
    let packets = load_packets(packets_path).await?;
    Ok((rules, packets))
}
