use std::path::Path;

use anyhow::{Context, Result};

use prompthub::PromptIdentifier;

use crate::cli::{Overrides, connect};

pub async fn run(config_dir: Option<&Path>, overrides: &Overrides, prompt: String) -> Result<()> {
    let id = PromptIdentifier::parse(&prompt)?;
    let client = connect(config_dir, overrides)?;

    let Some(repo) = client
        .get_prompt(&id)
        .await
        .with_context(|| format!("failed to look up '{prompt}'"))?
    else {
        anyhow::bail!("prompt not found: {}", id.repo_path());
    };

    println!("Name:        {}", repo.full_name.as_deref().unwrap_or(&repo.repo_handle));
    if let Some(desc) = &repo.description {
        println!("Description: {desc}");
    }
    if !repo.tags.is_empty() {
        println!("Tags:        {}", repo.tags.join(", "));
    }
    println!("Public:      {}", if repo.is_public { "yes" } else { "no" });
    println!("Commits:     {}", repo.num_commits);
    if let Some(hash) = &repo.last_commit_hash {
        println!("Latest:      {hash}");
    }
    println!("Likes:       {}", repo.num_likes);
    println!("Downloads:   {}", repo.num_downloads);
    if let Some(created) = &repo.created_at {
        println!("Created:     {}", created.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(updated) = &repo.updated_at {
        println!("Updated:     {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if repo.is_archived {
        println!("Archived:    yes");
    }

    let url = client.prompt_url(&id).await?;
    println!("URL:         {url}");
    Ok(())
}
