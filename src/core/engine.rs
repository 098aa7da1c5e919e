//! First-match rule evaluation
//!
//! Rules are scanned in declaration order and the first rule whose four
//! patterns all match decides the packet. Packets that match no rule produce
//! no decision at all; they are simply absent from the output.

use crate::core::firewall::{Decision, Packet, Rule};
use tracing::debug;

/// Returns the first rule (in declaration order) matching the packet.
pub fn first_match<'r>(packet: &Packet, rules: &'r [Rule]) -> Option<&'r Rule> {
    rules.iter().find(|rule| rule.matches(packet))
}

/// Classifies every packet against the ordered rule list.
///
/// The output keeps the input order of the packets that matched. Inputs are
/// not modified; decisions hold copies of the packet and the matched rule.
pub fn apply_rules(packets: &[Packet], rules: &[Rule]) -> Vec<Decision> {
    let decisions: Vec<Decision> = packets
        .iter()
        .filter_map(|packet| first_match(packet, rules).map(|rule| Decision::new(packet, rule)))
        .collect();

    debug!(
        packets = packets.len(),
        rules = rules.len(),
        decisions = decisions.len(),
        "Applied rules"
    );

    decisions
}
