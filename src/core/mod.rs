//! Core rule-matching functionality
//!
//! This module contains the types and logic for classifying packets against
//! an ordered rule list. It provides:
//!
//! - [`matcher`]: Field pattern matching (exact, `*`, `prefix*`)
//! - [`firewall`]: Packet, rule and decision records
//! - [`engine`]: First-match evaluation producing decisions
//! - [`loader`]: Loading rules and packets from JSON files
//! - [`decision_log`]: Persisting decisions with a checksum sidecar
//! - [`error`]: Error types for loading and persistence

pub mod decision_log;
pub mod engine;
pub mod error;
pub mod firewall;
pub mod loader;
pub mod matcher;

#[cfg(test)]
pub mod test_helpers;
