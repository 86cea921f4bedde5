use std::path::Path;

use anyhow::{Context, Result};

use prompthub::PromptIdentifier;

use crate::cli::{Overrides, connect};

pub async fn run(
    config_dir: Option<&Path>,
    overrides: &Overrides,
    prompt: String,
    limit: u32,
    offset: u32,
) -> Result<()> {
    let id = PromptIdentifier::parse(&prompt)?;
    let client = connect(config_dir, overrides)?;

    let list = client
        .list_commits(&id, limit, offset)
        .await
        .with_context(|| format!("failed to list commits for '{prompt}'"))?;

    if list.commits.is_empty() {
        println!("No commits for {}", id.repo_path());
        return Ok(());
    }

    println!("Commits for {} ({} total):", id.repo_path(), list.total);
    for commit in &list.commits {
        let short: String = commit.commit_hash.chars().take(8).collect();
        match &commit.created_at {
            Some(at) => println!("  {short}  {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
            None => println!("  {short}"),
        }
    }
    Ok(())
}
