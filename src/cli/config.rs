use std::path::Path;

use anyhow::{Context, Result};

use prompthub::store::ConfigStore;

use crate::cli::ConfigSubcommand;

const KEYS: &str = "api_url, api_key, web_url, timeout_secs";

pub fn run(config_dir: Option<&Path>, cmd: ConfigSubcommand) -> Result<()> {
    match cmd {
        ConfigSubcommand::Show => run_show(config_dir),
        ConfigSubcommand::Set { key, value } => run_set(config_dir, key, value),
        ConfigSubcommand::Get { key } => run_get(config_dir, key),
    }
}

fn run_show(config_dir: Option<&Path>) -> Result<()> {
    let store = ConfigStore::open(config_dir).context("failed to open config")?;

    let config = store.config();
    println!("Config file:  {}", store.path().display());
    println!("API URL:      {}", config.api_url());
    println!("API key:      {}", mask(config.api_key.as_deref()));
    if let Some(web) = &config.web_url {
        println!("Web URL:      {web}");
    }
    println!("Timeout:      {}s", config.timeout_secs);
    Ok(())
}

fn run_set(config_dir: Option<&Path>, key: String, value: String) -> Result<()> {
    let mut store = ConfigStore::open(config_dir).context("failed to open config")?;

    let config = store.config_mut();
    match key.as_str() {
        "api_url" => config.api_url = optional(&value),
        "api_key" => config.api_key = optional(&value),
        "web_url" => config.web_url = optional(&value),
        "timeout_secs" => {
            config.timeout_secs = value
                .parse::<u64>()
                .with_context(|| format!("invalid timeout_secs value: {value} (expected a number)"))?;
        }
        _ => anyhow::bail!("unknown config key: {key}\nValid keys: {KEYS}"),
    }

    store.save_config().context("failed to save config")?;
    if key == "api_key" {
        println!("Set {key} = {}", mask(optional(&value).as_deref()));
    } else {
        println!("Set {key} = {value}");
    }
    Ok(())
}

fn run_get(config_dir: Option<&Path>, key: String) -> Result<()> {
    let store = ConfigStore::open(config_dir).context("failed to open config")?;

    let config = store.config();
    match key.as_str() {
        "api_url" => println!("{}", config.api_url()),
        "api_key" => println!("{}", mask(config.api_key.as_deref())),
        "web_url" => println!("{}", config.web_url.as_deref().unwrap_or("(not set)")),
        "timeout_secs" => println!("{}", config.timeout_secs),
        _ => anyhow::bail!("unknown config key: {key}\nValid keys: {KEYS}"),
    }
    Ok(())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

fn mask(key: Option<&str>) -> String {
    match key {
        None => "(not set)".to_string(),
        Some(key) if key.chars().count() <= 8 => "****".to_string(),
        Some(key) => {
            let tail: String = key.chars().skip(key.chars().count() - 4).collect();
            format!("****{tail}")
        }
    }
}
