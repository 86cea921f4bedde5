use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if cli.verbose {
                "prompthub=debug"
            } else {
                "prompthub=info"
            })
        }))
        .with_writer(std::io::stderr)
        .init();

    let config_dir = cli.config_dir.as_deref();
    let env = prompthub::ClientConfig::from_env();
    let overrides = cli::Overrides {
        api_url: cli.api_url.clone().or(env.api_url),
        api_key: cli.api_key.clone().or(env.api_key),
    };

    match cli.command {
        cli::Command::Push {
            repo,
            manifest,
            parent_commit,
            public,
            private,
            description,
            readme,
            tag,
        } => {
            cli::push::run(
                config_dir,
                &overrides,
                repo,
                manifest,
                parent_commit,
                public,
                private,
                description,
                readme,
                tag,
            )
            .await
        }
        cli::Command::Pull {
            prompt,
            include_model,
            model_class,
            secrets,
            json,
            output,
        } => {
            cli::pull::run(
                config_dir,
                &overrides,
                prompt,
                include_model,
                model_class,
                secrets,
                json,
                output,
            )
            .await
        }
        cli::Command::Info { prompt } => cli::info::run(config_dir, &overrides, prompt).await,
        cli::Command::Commits {
            prompt,
            limit,
            offset,
        } => cli::commits::run(config_dir, &overrides, prompt, limit, offset).await,
        cli::Command::Config(cmd) => cli::config::run(config_dir, cmd),
    }
}
