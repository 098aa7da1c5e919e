//! Human-readable console report
//!
//! Prints every decision as a `Packet:` / `Matched Rule:` / `Action:` block,
//! followed by a per-action summary. Unmatched packets never appear.

use crate::core::firewall::Decision;
use std::io::{self, Write};

pub const REPORT_HEADER: &str = "=== FIREWALL SIMULATION RESULTS ===";

/// Decision counts for one run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Summary {
    pub packet_count: usize,
    pub rule_count: usize,
    pub decision_count: usize,
    /// Decisions per action label, in order of first appearance
    pub by_action: Vec<(String, usize)>,
}

impl Summary {
    pub fn new(packet_count: usize, rule_count: usize, decisions: &[Decision]) -> Self {
        let mut by_action: Vec<(String, usize)> = Vec::new();
        for decision in decisions {
            match by_action.iter_mut().find(|(a, _)| *a == decision.action) {
                Some((_, count)) => *count += 1,
                None => by_action.push((decision.action.clone(), 1)),
            }
        }

        Self {
            packet_count,
            rule_count,
            decision_count: decisions.len(),
            by_action,
        }
    }
}

/// Writes the per-decision listing.
pub fn write_decisions(out: &mut impl Write, decisions: &[Decision]) -> io::Result<()> {
    writeln!(out, "\n{REPORT_HEADER}\n")?;
    for decision in decisions {
        writeln!(out, "Packet: {}", decision.packet)?;
        writeln!(out, "Matched Rule: {}", decision.matched_rule)?;
        writeln!(out, "Action: {}\n", decision.action)?;
    }
    Ok(())
}

/// Writes the summary block.
pub fn write_summary(out: &mut impl Write, summary: &Summary) -> io::Result<()> {
    writeln!(
        out,
        "Evaluated {} packets against {} rules: {} decisions",
        summary.packet_count, summary.rule_count, summary.decision_count
    )?;
    for (action, count) in &summary.by_action {
        writeln!(out, "  {action:<10} {count}")?;
    }
    Ok(())
}
