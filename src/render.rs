//! Flow rendering
//!
//! Renders decisions as source → destination flows, colored by verdict.
//! Two outputs are supported:
//!
//! - terminal text, one flow per line, optionally with ANSI colors
//! - a Graphviz DOT digraph (`fwsim flows --format dot | dot -Tsvg`)
//!
//! Rendering depends only on the decision sequence.

use crate::core::firewall::{Decision, Verdict};
use crate::utils::truncate_string;
use crossterm::style::{Color, Stylize};
use std::collections::HashMap;
use std::fmt::Write;

/// Output format for `fwsim flows`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString, clap::ValueEnum,
)]
pub enum FlowFormat {
    #[default]
    #[strum(serialize = "text")]
    Text,
    #[strum(serialize = "dot")]
    Dot,
}

/// Endpoint column width in terminal output
const ENDPOINT_WIDTH: usize = 21;

fn verdict_color(verdict: Verdict) -> Color {
    match verdict {
        Verdict::Allow => Color::Green,
        Verdict::Deny => Color::Red,
        Verdict::Other => Color::Yellow,
    }
}

fn dot_color(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Allow => "green",
        Verdict::Deny => "red",
        Verdict::Other => "orange",
    }
}

/// Renders one line per decision: `src ─▶ dst  port/protocol  ACTION`.
pub fn render_flows_terminal(decisions: &[Decision], color: bool) -> String {
    let mut out = String::new();
    for decision in decisions {
        let packet = &decision.packet;
        let src = truncate_string(&packet.src, ENDPOINT_WIDTH);
        let dst = truncate_string(&packet.dst, ENDPOINT_WIDTH);
        let service = format!("{}/{}", packet.port, packet.protocol);

        if color {
            let action = decision
                .action
                .as_str()
                .with(verdict_color(decision.verdict()))
                .bold();
            let _ = writeln!(
                out,
                "{src:>ENDPOINT_WIDTH$} ─▶ {dst:<ENDPOINT_WIDTH$}  {service:<12}  {action}"
            );
        } else {
            let _ = writeln!(
                out,
                "{src:>ENDPOINT_WIDTH$} ─▶ {dst:<ENDPOINT_WIDTH$}  {service:<12}  {}",
                decision.action
            );
        }
    }
    out
}

/// Escapes a string for use inside a double-quoted DOT identifier
pub fn escape_dot(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' | '\r' => escaped.push(' '),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Renders decisions as a Graphviz digraph.
///
/// Each distinct endpoint is one node; each decision is one edge labelled
/// `port/protocol` and colored by verdict.
pub fn render_flows_dot(decisions: &[Decision]) -> String {
    let mut node_ids: HashMap<&str, usize> = HashMap::new();
    let mut nodes = String::new();
    let mut edges = String::new();

    for decision in decisions {
        let packet = &decision.packet;
        let mut ids = [0usize; 2];
        for (slot, endpoint) in [packet.src.as_str(), packet.dst.as_str()].into_iter().enumerate() {
            let next_id = node_ids.len();
            ids[slot] = *node_ids.entry(endpoint).or_insert_with(|| {
                let _ = writeln!(nodes, "    n{next_id} [label=\"{}\"];", escape_dot(endpoint));
                next_id
            });
        }

        let verdict = decision.verdict();
        let _ = writeln!(
            edges,
            "    n{} -> n{} [label=\"{}/{} {}\", color={}, fontcolor={}];",
            ids[0],
            ids[1],
            escape_dot(&packet.port),
            escape_dot(&packet.protocol),
            escape_dot(&decision.action),
            dot_color(verdict),
            dot_color(verdict),
        );
    }

    let mut out = String::from("digraph flows {\n    rankdir=LR;\n    node [shape=box];\n");
    out.push_str(&nodes);
    out.push_str(&edges);
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::apply_rules;
    use crate::core::firewall::{Packet, Rule};
    use crate::core::test_helpers::{example_packets, example_rules};

    #[test]
    fn test_plain_terminal_flows() {
        let decisions = apply_rules(&example_packets(), &example_rules());

        let text = render_flows_terminal(&decisions, false);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("10.0.0.5 ─▶ 8.8.8.8"));
        assert!(lines[0].contains("80/tcp"));
        assert!(lines[0].ends_with("ALLOW"));
        assert!(lines[1].ends_with("DENY"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_colored_terminal_flows() {
        let decisions = apply_rules(&example_packets(), &example_rules());

        let text = render_flows_terminal(&decisions, true);

        assert!(text.contains('\x1b'));
        assert!(text.contains("ALLOW"));
        assert!(text.contains("DENY"));
    }

    #[test]
    fn test_dot_nodes_are_shared() {
        let decisions = apply_rules(&example_packets(), &example_rules());

        let dot = render_flows_dot(&decisions);

        assert!(dot.starts_with("digraph flows {"));
        assert!(dot.trim_end().ends_with('}'));
        // 10.0.0.5, 8.8.8.8, 192.168.1.1
        assert_eq!(dot.matches("[label=\"").count() - dot.matches(" -> ").count(), 3);
        assert!(dot.contains("n0 -> n1 [label=\"80/tcp ALLOW\", color=green"));
        assert!(dot.contains("n2 -> n1 [label=\"443/tcp DENY\", color=red"));
    }

    #[test]
    fn test_dot_escapes_labels() {
        let rule = Rule::new("*", "*", "*", "*", "LOG");
        let packet = Packet::new("a\"b", "c\\d", "1", "tcp");
        let dot = render_flows_dot(&apply_rules(&[packet], &[rule]));

        assert!(dot.contains("label=\"a\\\"b\""));
        assert!(dot.contains("label=\"c\\\\d\""));
        assert!(dot.contains("color=orange"));
    }

    #[test]
    fn test_empty_dot_graph() {
        let dot = render_flows_dot(&[]);
        assert!(!dot.contains("->"));
    }
}
