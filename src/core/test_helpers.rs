//! Shared test utilities for core module tests
//!
//! Provides common fixtures to avoid duplication across test suites.
//! This module is only compiled in test mode.

use crate::core::firewall::{ACTION_ALLOW, ACTION_DENY, Packet, Rule};
use std::path::{Path, PathBuf};

/// Rules of the reference scenario: allow web traffic from 10.0.0.x, deny the rest.
pub const EXAMPLE_RULES_JSON: &str = r#"[
    {"src": "10.0.0.*", "dst": "*", "port": "80", "protocol": "tcp", "action": "ALLOW"},
    {"src": "*", "dst": "*", "port": "*", "protocol": "*", "action": "DENY"}
]"#;

/// Packets of the reference scenario: the first is allowed, the second denied.
pub const EXAMPLE_PACKETS_JSON: &str = r#"[
    {"src": "10.0.0.5", "dst": "8.8.8.8", "port": "80", "protocol": "tcp"},
    {"src": "192.168.1.1", "dst": "8.8.8.8", "port": "443", "protocol": "tcp"}
]"#;

pub fn example_rules() -> Vec<Rule> {
    vec![
        Rule::new("10.0.0.*", "*", "80", "tcp", ACTION_ALLOW),
        deny_all(),
    ]
}

pub fn example_packets() -> Vec<Packet> {
    vec![
        Packet::new("10.0.0.5", "8.8.8.8", "80", "tcp"),
        Packet::new("192.168.1.1", "8.8.8.8", "443", "tcp"),
    ]
}

pub fn allow_all() -> Rule {
    Rule::new("*", "*", "*", "*", ACTION_ALLOW)
}

pub fn deny_all() -> Rule {
    Rule::new("*", "*", "*", "*", ACTION_DENY)
}

/// Writes `contents` to `dir/name` and returns the full path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write test fixture");
    path
}
