//! Qkd command implementation.

use anyhow::Result;
use console::style;

use qnet_sim::{LinkProfile, NetworkSimulator, NodeId, QkdConfig, SimError};

use super::common::hex_key;

/// Execute the qkd command: one entanglement-based key exchange between
/// two nodes, printed with its quality figures.
pub fn execute(rounds: usize, noise: f64, key_bytes: usize, seed: Option<u64>) -> Result<()> {
    let link = LinkProfile {
        noise,
        ..LinkProfile::ideal()
    };
    link.validate()?;
    if key_bytes == 0 {
        anyhow::bail!("key_bytes must be positive");
    }

    println!(
        "{} Key exchange: {} rounds budget, link noise {}, {} byte target",
        style("→").cyan().bold(),
        style(rounds).green(),
        style(noise).yellow(),
        key_bytes
    );

    let mut sim = NetworkSimulator::new()
        .with_qkd_config(QkdConfig {
            rounds,
            ..QkdConfig::default()
        })
        .with_default_link(link);
    if let Some(seed) = seed {
        sim = sim.with_seed(seed);
        println!("  Seed: {seed}");
    }

    sim.add_node(NodeId(1), (0.0, 0.0))?;
    sim.add_node(NodeId(2), (1.0, 0.0))?;
    sim.entangle(NodeId(1), NodeId(2))?;

    match sim.establish_key(NodeId(1), NodeId(2), key_bytes) {
        Ok(outcome) => {
            println!("  Rounds used:  {}", outcome.rounds);
            println!("  Sifted bits:  {}", outcome.sifted);
            println!(
                "  Checked bits: {} ({} errors)",
                outcome.checked, outcome.errors
            );
            println!("  QBER:         {:.4}", outcome.qber);
            println!();
            println!(
                "{} {} byte key: {}",
                style("✓").green().bold(),
                outcome.key.len(),
                style(hex_key(&outcome.key)).dim()
            );
        }
        Err(SimError::QberTooHigh { qber, limit }) => {
            println!(
                "{} aborted: QBER {qber:.4} exceeds the {limit:.4} threshold, no key kept",
                style("✗").red().bold()
            );
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
