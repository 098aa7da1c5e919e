//! Traffic Generator for fwsim
//!
//! Generates rule and packet files for exercising the simulator:
//! - Rules mixing exact, prefix (`10.0.*`) and match-any (`*`) patterns
//! - Packets drawn from the same address pools so most of them match
//! - An optional trailing catch-all rule
//!
//! # Usage
//!
//! ```bash
//! # 20 rules, 1000 packets into the current directory
//! cargo run --features traffic_gen --bin gen_traffic -- --rules 20 --packets 1000
//!
//! # Reproducible generation for bug reports
//! cargo run --features traffic_gen --bin gen_traffic -- --seed 12345 -o /tmp/traffic
//!
//! # No catch-all: some packets stay unmatched
//! cargo run --features traffic_gen --bin gen_traffic -- --no-default-rule
//! ```
//!
//! Each output file gets a `.sha256` checksum file alongside it.

use std::path::{Path, PathBuf};

use clap::Parser;
use fwsim::core::decision_log::checksum;
use fwsim::core::firewall::{ACTION_ALLOW, ACTION_DENY, Packet, Rule};
use rand::prelude::*;
use rand::seq::IndexedRandom;

/// fwsim traffic generator
#[derive(Parser)]
#[command(name = "gen_traffic")]
#[command(about = "Generate rules.json / packets.json inputs for fwsim")]
struct Args {
    /// Number of rules to generate (excluding the catch-all)
    #[arg(long, default_value = "20")]
    rules: usize,

    /// Number of packets to generate
    #[arg(long, default_value = "200")]
    packets: usize,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Random seed for reproducible generation
    #[arg(long)]
    seed: Option<u64>,

    /// Don't append the trailing `* * * * DENY` rule
    #[arg(long)]
    no_default_rule: bool,
}

const SUBNETS: &[&str] = &["10.0.0.", "10.0.1.", "172.16.5.", "192.168.1.", "8.8.8."];
const PORTS: &[&str] = &["22", "53", "80", "443", "3306", "8080", "8443"];
const PROTOCOLS: &[&str] = &["tcp", "udp", "icmp"];

fn random_address(rng: &mut impl Rng) -> String {
    let subnet = SUBNETS.choose(rng).copied().unwrap_or("10.0.0.");
    format!("{subnet}{}", rng.random_range(1..=254))
}

fn random_address_pattern(rng: &mut impl Rng) -> String {
    match rng.random_range(0..10) {
        0..=3 => "*".to_string(),
        4..=7 => format!("{}*", SUBNETS.choose(rng).copied().unwrap_or("10.")),
        _ => random_address(rng),
    }
}

fn random_port_pattern(rng: &mut impl Rng) -> String {
    match rng.random_range(0..10) {
        0..=2 => "*".to_string(),
        3 => "8*".to_string(),
        _ => PORTS.choose(rng).copied().unwrap_or("80").to_string(),
    }
}

fn random_rule(rng: &mut impl Rng) -> Rule {
    let protocol = if rng.random_bool(0.3) {
        "*"
    } else {
        PROTOCOLS.choose(rng).copied().unwrap_or("tcp")
    };
    let action = if rng.random_bool(0.6) {
        ACTION_ALLOW
    } else {
        ACTION_DENY
    };
    Rule::new(
        random_address_pattern(rng),
        random_address_pattern(rng),
        random_port_pattern(rng),
        protocol,
        action,
    )
}

fn random_packet(rng: &mut impl Rng) -> Packet {
    Packet::new(
        random_address(rng),
        random_address(rng),
        PORTS.choose(rng).copied().unwrap_or("80"),
        PROTOCOLS.choose(rng).copied().unwrap_or("tcp"),
    )
}

fn write_json(path: &Path, json: &str) -> std::io::Result<()> {
    std::fs::write(path, json)?;
    let mut checksum_path = path.as_os_str().to_owned();
    checksum_path.push(".sha256");
    std::fs::write(PathBuf::from(checksum_path), checksum(json))?;
    println!("Wrote: {}", path.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut rng: Box<dyn RngCore> = match args.seed {
        Some(seed) => {
            println!("Using seed: {seed}");
            Box::new(rand::rngs::StdRng::seed_from_u64(seed))
        }
        None => Box::new(rand::rng()),
    };

    let mut rules: Vec<Rule> = (0..args.rules).map(|_| random_rule(&mut rng)).collect();
    if !args.no_default_rule {
        rules.push(Rule::new("*", "*", "*", "*", ACTION_DENY));
    }
    let packets: Vec<Packet> = (0..args.packets).map(|_| random_packet(&mut rng)).collect();

    std::fs::create_dir_all(&args.output)?;
    write_json(
        &args.output.join("rules.json"),
        &serde_json::to_string_pretty(&rules)?,
    )?;
    write_json(
        &args.output.join("packets.json"),
        &serde_json::to_string_pretty(&packets)?,
    )?;

    let matched = fwsim::apply_rules(&packets, &rules).len();
    println!(
        "Generated {} rules and {} packets ({} would match)",
        rules.len(),
        packets.len(),
        matched
    );
    Ok(())
}
