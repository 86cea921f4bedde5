pub mod commits;
pub mod config;
pub mod info;
pub mod pull;
pub mod push;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use prompthub::HubClient;
use prompthub::store::ConfigStore;

#[derive(Debug, Parser)]
#[command(
    name = "prompthub",
    about = "Push and pull versioned prompts from a prompt hub",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Override the config directory (default: ~/.config/prompthub)
    #[arg(long, env = "PROMPTHUB_CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Hub API endpoint (falls back to LANGCHAIN_ENDPOINT)
    #[arg(long, env = "LANGSMITH_ENDPOINT", global = true)]
    pub api_url: Option<String>,

    /// Hub API key (falls back to LANGCHAIN_API_KEY)
    #[arg(long, env = "LANGSMITH_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Push a serialized prompt manifest as a new commit
    Push {
        /// Target prompt, e.g. "my-prompt" or "owner/my-prompt"
        repo: String,

        /// Path to the manifest JSON file ("-" for stdin)
        manifest: PathBuf,

        /// Commit to base the push on (default: latest)
        #[arg(long)]
        parent_commit: Option<String>,

        /// Make the prompt public
        #[arg(long, conflicts_with = "private")]
        public: bool,

        /// Make the prompt private
        #[arg(long)]
        private: bool,

        /// Prompt description
        #[arg(short, long)]
        description: Option<String>,

        /// Prompt readme
        #[arg(long)]
        readme: Option<String>,

        /// Tags for the prompt
        #[arg(short, long)]
        tag: Vec<String>,
    },

    /// Pull a prompt commit and load it
    Pull {
        /// Prompt identifier, e.g. "owner/my-prompt:abc123"
        prompt: String,

        /// Also pull the model bound to the prompt
        #[arg(long)]
        include_model: bool,

        /// Model class to load a non-OpenAI model with (e.g. ChatAnthropic)
        #[arg(long)]
        model_class: Option<String>,

        /// Secret value for the loader, as NAME=VALUE
        #[arg(long = "secret", value_parser = parse_secret)]
        secrets: Vec<(String, String)>,

        /// Print the patched manifest as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Write the patched manifest to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show details about a prompt
    Info {
        /// Prompt identifier
        prompt: String,
    },

    /// List the commit history of a prompt
    Commits {
        /// Prompt identifier
        prompt: String,

        /// Maximum number of commits to show
        #[arg(short, long, default_value_t = 10)]
        limit: u32,

        /// Number of commits to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Manage client configuration
    #[command(subcommand)]
    Config(ConfigSubcommand),
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (api_url, api_key, web_url, timeout_secs)
        key: String,
        /// Configuration value ("none" to unset)
        value: String,
    },

    /// Get a specific configuration value
    Get {
        /// Configuration key
        key: String,
    },
}

/// Endpoint and key given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

/// Build a client from the stored config, with command-line overrides on top.
pub fn connect(config_dir: Option<&Path>, overrides: &Overrides) -> Result<HubClient> {
    let store = ConfigStore::open(config_dir).context("failed to open config")?;
    let config = store
        .config()
        .clone()
        .with_overrides(overrides.api_url.clone(), overrides.api_key.clone());
    tracing::debug!(api_url = %config.api_url(), "connecting to hub");
    HubClient::new(&config).context("failed to build hub client")
}

fn parse_secret(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("invalid secret '{s}' (expected NAME=VALUE)")),
    }
}
