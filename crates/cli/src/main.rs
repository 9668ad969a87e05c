//! Command-line interface for the `agentdeck` application.
//!
//! This crate serves as the main entry point for the executable, delegating
//! its core functionality to the `agentdeck-server` crate.

fn main() -> anyhow::Result<()> {
    agentdeck_server::run()
}
