// ABOUTME: Entry point for the kit-deployer CLI application.
// ABOUTME: Parses arguments, loads configuration, and dispatches to the deploy coordinator.

mod cli;

use clap::Parser;
use cli::{Cli, CommitOptions, Commands};
use kit_deployer::codec::YamlCodec;
use kit_deployer::config::{self, Config, InitOptions};
use kit_deployer::deploy::{CommitOutcome, DeployCoordinator, Manifest, RetryPolicy};
use kit_deployer::error::{Error, Result};
use kit_deployer::output::{Output, OutputMode};
use kit_deployer::store::GithubStore;
use kit_deployer::types::{Committer, ImageReference};
use std::env;
use std::future::Future;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let output = Output::new(mode);

    if let Err(e) = run(cli, output).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mut output: Output) -> Result<()> {
    match cli.command {
        Commands::Init {
            registry,
            repository,
            github_repository,
            force,
        } => {
            let cwd = env::current_dir()?;
            let options = InitOptions {
                registry: registry.as_deref(),
                repository: repository.as_deref(),
                github_repository: github_repository.as_deref(),
            };
            config::init_config(&cwd, &options, force)?;
            output.progress(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Image { image, options } => {
            let config = load_config(cli.config.as_deref())?;
            let image = ImageReference::parse(&image)?;
            let committer = resolve_committer(&options, &config);
            let message = options
                .message
                .clone()
                .unwrap_or_else(|| format!("Deploy {image}"));

            output.start_timer();
            output.progress(&format!(
                "Deploying {} to branch {}",
                image, options.branch
            ));
            let coordinator = build_coordinator(&config, &options, &output)?;
            let outcome = with_timeout(
                options.timeout,
                coordinator.deploy_image(
                    &image,
                    &options.branch,
                    committer.as_ref(),
                    &message,
                    options.dry_run,
                ),
            )
            .await?;
            finish(&output, outcome)
        }
        Commands::Commit { commit_id, options } => {
            let config = load_config(cli.config.as_deref())?;
            let committer = resolve_committer(&options, &config);

            output.start_timer();
            let coordinator = build_coordinator(&config, &options, &output)?;
            let image = coordinator.image_for_commit(&commit_id, &options.branch)?;
            let message = options
                .message
                .clone()
                .unwrap_or_else(|| format!("Deploy {image}"));
            output.progress(&format!(
                "Deploying {} to branch {}",
                image, options.branch
            ));
            let outcome = with_timeout(
                options.timeout,
                coordinator.deploy_commit_id(
                    &commit_id,
                    &options.branch,
                    committer.as_ref(),
                    &message,
                    options.dry_run,
                ),
            )
            .await?;
            finish(&output, outcome)
        }
        Commands::Target { branch, manifest } => {
            let config = load_config(cli.config.as_deref())?;
            let mut settings = config.deploy_settings()?;
            if let Some(path) = manifest {
                settings = settings.manifest(Manifest::load(&path)?);
            }
            let store = GithubStore::new(config.github_config()?)?;
            let coordinator = DeployCoordinator::new(store, settings).with_observer(&output);

            let target = coordinator.resolve_target(&branch).await?;
            println!("file: {}", target.file_path());
            println!("property: {}", target.property());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::discover(&env::current_dir()?),
    }
}

/// Command-line committer wins over the configured one.
fn resolve_committer(options: &CommitOptions, config: &Config) -> Option<Committer> {
    match (&options.committer_name, &options.committer_email) {
        (Some(name), Some(email)) => Some(Committer::new(name, email)),
        _ => config.committer.clone(),
    }
}

fn build_coordinator<'o>(
    config: &Config,
    options: &CommitOptions,
    output: &'o Output,
) -> Result<DeployCoordinator<GithubStore, YamlCodec, &'o Output>> {
    let mut settings = config.deploy_settings()?;

    if let Some(path) = &options.manifest {
        settings = settings.manifest(Manifest::load(path)?);
    }
    if let Some(max_attempts) = options.max_attempts {
        let base_delay = settings.retry.base_delay();
        settings = settings.retry(RetryPolicy::new(max_attempts, base_delay)?);
    }

    if options.dry_run {
        output.warning("dry run, nothing will be committed");
    }

    let store = GithubStore::new(config.github_config()?)?;
    Ok(DeployCoordinator::new(store, settings).with_observer(output))
}

async fn with_timeout<F>(timeout: Option<std::time::Duration>, fut: F) -> Result<CommitOutcome>
where
    F: Future<Output = CommitOutcome>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| Error::Timeout(limit)),
        None => Ok(fut.await),
    }
}

fn finish(output: &Output, outcome: CommitOutcome) -> Result<()> {
    let outcome = outcome.into_result()?;
    output.outcome(&outcome);
    Ok(())
}
