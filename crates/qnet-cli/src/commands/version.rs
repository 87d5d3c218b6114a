//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - quantum network simulation and key distribution",
        style("qnet").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qnet-core  Qubit states, gates, channels and measurement");
    println!("  qnet-sim   Network model and protocol simulator");
    println!("  qnet-api   HTTP API server");
    println!("  qnet-cli   Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
