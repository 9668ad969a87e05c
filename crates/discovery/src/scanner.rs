use crate::types::{parse_agent_markdown, AgentProfile};
use crate::Result;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn is_agent_file(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_file() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.ends_with(".md") && !name.eq_ignore_ascii_case("README.md")
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn load_agent_file(path: &Path) -> Option<AgentProfile> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::error!(
                target: "agentdeck::discovery",
                path = %path.display(),
                error = %e,
                "failed to read agent file"
            );
            return None;
        }
    };
    match parse_agent_markdown(&content, &file_stem(path)) {
        Ok(agent) => {
            tracing::debug!(
                target: "agentdeck::discovery",
                agent = %agent.name,
                path = %path.display(),
                "loaded agent"
            );
            Some(agent)
        }
        Err(e) => {
            tracing::warn!(
                target: "agentdeck::discovery",
                path = %path.display(),
                error = %e,
                "skipping agent file"
            );
            None
        }
    }
}

/// Discovers agent profiles under `dir`.
///
/// Every `*.md` file except `README.md` is parsed; files that fail to parse
/// are logged and skipped. Results follow path order. A missing directory
/// yields an empty list.
pub fn discover_agents(dir: &Path) -> Result<Vec<AgentProfile>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(6) {
        let entry = entry?;
        if is_agent_file(&entry) {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    Ok(paths
        .par_iter()
        .filter_map(|path| load_agent_file(path))
        .collect())
}

/// The built-in agents served when no agent directory is available.
pub fn default_agents() -> Vec<AgentProfile> {
    vec![
        AgentProfile::new(
            "ai-engineer",
            "Build production-ready LLM applications, advanced RAG systems, and intelligent agents",
            "You are an AI engineer specializing in production-grade LLM applications and intelligent agent architectures.",
        ),
        AgentProfile::new(
            "backend-architect",
            "Design RESTful APIs, microservice boundaries, and database schemas",
            "You are a backend system architect specializing in scalable API design and microservices.",
        ),
        AgentProfile::new(
            "frontend-developer",
            "Build React components, implement responsive layouts, and handle client-side state management",
            "You are a frontend developer specializing in React, modern JavaScript, and responsive design.",
        ),
        AgentProfile::new(
            "code-reviewer",
            "Elite code review expert specializing in security, performance, and production reliability",
            "You are a code review expert focusing on security, performance optimization, and production reliability.",
        ),
        AgentProfile::new(
            "debugger",
            "Debugging specialist for errors, test failures, and unexpected behavior",
            "You are a debugging specialist expert at resolving errors, test failures, and unexpected behavior.",
        ),
    ]
}
