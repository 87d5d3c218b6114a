//! Shared helpers for CLI commands.

use std::f64::consts::TAU;

/// Position of node `index` on a unit-radius ring of `count` nodes.
///
/// Node 0 sits on the positive x axis; the rest follow counterclockwise.
pub fn ring_position(index: u32, count: u32) -> (f64, f64) {
    let angle = TAU * f64::from(index) / f64::from(count);
    (angle.cos(), angle.sin())
}

/// Lowercase hex rendering of key material.
pub fn hex_key(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
