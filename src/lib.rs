//! fwsim - Firewall rule simulator
//!
//! Classifies a batch of packets against an ordered list of firewall rules.
//! Each packet is decided by the first rule whose four field patterns
//! (`src`, `dst`, `port`, `protocol`) all match it.
//!
//! # Architecture
//!
//! - [`core`] - Pattern matching, first-match engine, loading and persistence
//! - [`report`] - Human-readable console report
//! - [`render`] - Flow rendering (terminal and Graphviz DOT)
//! - [`config`] - Default paths and output preferences
//! - [`audit`] - Audit logging of simulation runs
//! - [`utils`] - Utility functions (XDG directories, terminal helpers)
//!
//! # Example
//!
//! ```
//! use fwsim::{Packet, Rule, apply_rules};
//!
//! let rules = vec![
//!     Rule::new("10.0.0.*", "*", "80", "tcp", "ALLOW"),
//!     Rule::new("*", "*", "*", "*", "DENY"),
//! ];
//! let packets = vec![
//!     Packet::new("10.0.0.5", "8.8.8.8", "80", "tcp"),
//!     Packet::new("192.168.1.1", "8.8.8.8", "443", "tcp"),
//! ];
//!
//! let decisions = apply_rules(&packets, &rules);
//! assert_eq!(decisions[0].action, "ALLOW");
//! assert_eq!(decisions[1].action, "DENY");
//! ```

// Allow pedantic clippy warnings that are not worth fixing for this codebase
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod audit;
pub mod config;
pub mod core;
pub mod render;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use core::engine::{apply_rules, first_match};
pub use core::error::{Error, LoadError, Result};
pub use core::firewall::{Decision, Packet, Rule, Verdict};
pub use core::matcher::matches;
