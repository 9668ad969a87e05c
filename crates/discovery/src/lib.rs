//! Agent catalog: discovering agent profiles and answering catalog queries.
//!
//! This crate provides mechanisms for:
//! - Parsing agent markdown files (YAML frontmatter plus a prompt body).
//! - Scanning a directory for agent files, with built-in defaults as fallback.
//! - Searching the catalog and recommending agents for a task.
//!
//! # Examples
//!
//! ```
//! use agentdeck_discovery::load_catalog;
//! use tempfile::tempdir;
//!
//! let temp = tempdir().unwrap();
//! std::fs::write(
//!     temp.path().join("alpha.md"),
//!     "---\nname: alpha\ndescription: First agent\n---\nYou are alpha.",
//! )
//! .unwrap();
//!
//! let catalog = load_catalog(temp.path());
//! assert_eq!(catalog.len(), 1);
//! assert_eq!(catalog.get("alpha").unwrap().system_prompt, "You are alpha.");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Error type for discovery operations.
pub type Error = anyhow::Error;
/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Catalog queries and recommendation.
pub mod catalog;
/// Agent directory scanning and built-in agents.
pub mod scanner;
/// Agent profile type and markdown parsing.
pub mod types;

pub use catalog::{approaches, load_catalog, AgentCatalog, CatalogAgent, MAX_RECOMMENDATIONS};
pub use scanner::{default_agents, discover_agents};
pub use types::{parse_agent_markdown, AgentProfile, DEFAULT_MODEL};
