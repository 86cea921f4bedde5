use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use prompthub::hub::{self, PushOptions};
use prompthub::load::Loader;

use crate::cli::{Overrides, connect};

#[allow(clippy::too_many_arguments)]
pub async fn run(
    config_dir: Option<&Path>,
    overrides: &Overrides,
    repo: String,
    manifest: PathBuf,
    parent_commit: Option<String>,
    public: bool,
    private: bool,
    description: Option<String>,
    readme: Option<String>,
    tags: Vec<String>,
) -> Result<()> {
    let text = read_manifest(&manifest)?;

    // Secrets stay as references; the hub never receives their values.
    let loader = Loader::new()
        .with_imports(hub::known_model_imports())
        .secrets_from_env(false)
        .require_secrets(false);
    let runnable = loader
        .load_str(&text)
        .with_context(|| format!("failed to load manifest {}", manifest.display()))?;

    let options = PushOptions {
        parent_commit_hash: parent_commit,
        is_public: if public {
            Some(true)
        } else if private {
            Some(false)
        } else {
            None
        },
        description,
        readme,
        tags: (!tags.is_empty()).then_some(tags),
        ..Default::default()
    };

    let client = connect(config_dir, overrides)?;
    let url = hub::push_with(&client, &repo, runnable.as_ref(), &options)
        .await
        .with_context(|| format!("failed to push '{repo}'"))?;

    println!("{url}");
    Ok(())
}

fn read_manifest(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read manifest from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
