//! Packet, rule and decision records
//!
//! This module defines the fixed-field records the simulator works on.
//!
//! # Record Structure
//!
//! - A [`Packet`] carries four text fields: `src`, `dst`, `port`, `protocol`.
//!   The port is text so wildcard prefixes apply to it like any other field.
//! - A [`Rule`] carries the same four fields as patterns plus an opaque
//!   `action` label (canonically `"ALLOW"` or `"DENY"`).
//! - A [`Decision`] pairs a packet with the first rule that matched it.
//!
//! Every field is required. A JSON object missing one of them fails to
//! deserialize, so the engine never sees a partial record. Unknown keys are
//! ignored.
//!
//! # Example
//!
//! ```
//! use fwsim::core::firewall::{Packet, Rule};
//!
//! let rule = Rule::new("10.0.0.*", "*", "80", "tcp", "ALLOW");
//! let packet = Packet::new("10.0.0.5", "8.8.8.8", "80", "tcp");
//! assert!(rule.matches(&packet));
//! ```

use crate::core::matcher::matches;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical action label for permitted traffic
pub const ACTION_ALLOW: &str = "ALLOW";

/// Canonical action label for blocked traffic
pub const ACTION_DENY: &str = "DENY";

/// A packet to classify
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Packet {
    pub src: String,
    pub dst: String,
    pub port: String,
    pub protocol: String,
}

impl Packet {
    pub fn new(
        src: impl Into<String>,
        dst: impl Into<String>,
        port: impl Into<String>,
        protocol: impl Into<String>,
    ) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            port: port.into(),
            protocol: protocol.into(),
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{'src': '{}', 'dst': '{}', 'port': '{}', 'protocol': '{}'}}",
            self.src, self.dst, self.port, self.protocol
        )
    }
}

/// A firewall rule: four field patterns and the action to take on a match
///
/// Pattern syntax per field:
/// - `*` matches anything
/// - `prefix*` matches values starting with `prefix` (anything after the
///   first `*` is ignored)
/// - anything else must match exactly
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rule {
    pub src: String,
    pub dst: String,
    pub port: String,
    pub protocol: String,
    pub action: String,
}

impl Rule {
    pub fn new(
        src: impl Into<String>,
        dst: impl Into<String>,
        port: impl Into<String>,
        protocol: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            port: port.into(),
            protocol: protocol.into(),
            action: action.into(),
        }
    }

    /// Returns true if all four field patterns match the packet.
    pub fn matches(&self, packet: &Packet) -> bool {
        matches(&packet.src, &self.src)
            && matches(&packet.dst, &self.dst)
            && matches(&packet.port, &self.port)
            && matches(&packet.protocol, &self.protocol)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{'src': '{}', 'dst': '{}', 'port': '{}', 'protocol': '{}', 'action': '{}'}}",
            self.src, self.dst, self.port, self.protocol, self.action
        )
    }
}

/// Outcome of classifying one packet
///
/// Field order is the serialized key order: `packet`, `action`, `matched_rule`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Decision {
    pub packet: Packet,
    pub action: String,
    pub matched_rule: Rule,
}

impl Decision {
    pub fn new(packet: &Packet, rule: &Rule) -> Self {
        Self {
            packet: packet.clone(),
            action: rule.action.clone(),
            matched_rule: rule.clone(),
        }
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::classify(&self.action)
    }
}

/// Display classification of an action label
///
/// The engine treats actions as opaque text. Reports and renderers use this
/// to pick colors and group counts.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Verdict {
    #[strum(serialize = "allow")]
    Allow,
    #[strum(serialize = "deny")]
    Deny,
    #[strum(serialize = "other")]
    Other,
}

impl Verdict {
    /// Classifies an action label, case-insensitively. Unknown labels are `Other`.
    pub fn classify(action: &str) -> Self {
        Self::from_str(action.trim()).unwrap_or(Verdict::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_matches_all_four_fields() {
        let rule = Rule::new("10.0.0.*", "*", "80", "tcp", ACTION_ALLOW);
        assert!(rule.matches(&Packet::new("10.0.0.5", "8.8.8.8", "80", "tcp")));
        assert!(!rule.matches(&Packet::new("10.0.0.5", "8.8.8.8", "80", "udp")));
        assert!(!rule.matches(&Packet::new("10.0.0.5", "8.8.8.8", "8080", "tcp")));
        assert!(!rule.matches(&Packet::new("192.168.1.1", "8.8.8.8", "80", "tcp")));
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let json = r#"{"src": "1.1.1.1", "dst": "2.2.2.2", "port": "53"}"#;
        let err = serde_json::from_str::<Packet>(json).unwrap_err();
        assert!(err.to_string().contains("protocol"));

        let json = r#"{"src": "*", "dst": "*", "port": "*", "protocol": "*"}"#;
        let err = serde_json::from_str::<Rule>(json).unwrap_err();
        assert!(err.to_string().contains("action"));
    }

    #[test]
    fn test_non_string_field_is_rejected() {
        let json = r#"{"src": "1.1.1.1", "dst": "2.2.2.2", "port": 53, "protocol": "udp"}"#;
        assert!(serde_json::from_str::<Packet>(json).is_err());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let json = r#"{"src": "a", "dst": "b", "port": "1", "protocol": "tcp", "comment": "x"}"#;
        let packet: Packet = serde_json::from_str(json).unwrap();
        assert_eq!(packet, Packet::new("a", "b", "1", "tcp"));
    }

    #[test]
    fn test_decision_key_order() {
        let rule = Rule::new("*", "*", "*", "*", ACTION_DENY);
        let packet = Packet::new("a", "b", "1", "tcp");
        let json = serde_json::to_string(&Decision::new(&packet, &rule)).unwrap();

        let packet_pos = json.find("\"packet\"").unwrap();
        let action_pos = json.find("\"action\":\"DENY\"").unwrap();
        let rule_pos = json.find("\"matched_rule\"").unwrap();
        assert!(packet_pos < action_pos && action_pos < rule_pos);
    }

    #[test]
    fn test_display_quotes_values() {
        let rule = Rule::new("10.0.0.*", "*", "80", "tcp", ACTION_ALLOW);
        let packet = Packet::new("10.0.0.5", "8.8.8.8", "80", "tcp");

        assert_eq!(
            packet.to_string(),
            "{'src': '10.0.0.5', 'dst': '8.8.8.8', 'port': '80', 'protocol': 'tcp'}"
        );
        assert_eq!(
            rule.to_string(),
            "{'src': '10.0.0.*', 'dst': '*', 'port': '80', 'protocol': 'tcp', 'action': 'ALLOW'}"
        );
    }

    #[test]
    fn test_verdict_classification() {
        assert_eq!(Verdict::classify("ALLOW"), Verdict::Allow);
        assert_eq!(Verdict::classify("allow"), Verdict::Allow);
        assert_eq!(Verdict::classify("DENY"), Verdict::Deny);
        assert_eq!(Verdict::classify("Deny"), Verdict::Deny);
        assert_eq!(Verdict::classify("LOG"), Verdict::Other);
        assert_eq!(Verdict::classify("other"), Verdict::Other);
        assert_eq!(Verdict::classify(""), Verdict::Other);
    }
}
