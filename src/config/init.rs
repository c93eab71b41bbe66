// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates a kit-deployer.yml template file.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::RepoSlug;

use super::{CONFIG_FILENAME, Config};

/// Optional values that replace the template defaults.
#[derive(Debug, Default, Clone)]
pub struct InitOptions<'a> {
    pub registry: Option<&'a str>,
    pub repository: Option<&'a str>,
    pub github_repository: Option<&'a str>,
}

pub fn init_config(dir: &Path, options: &InitOptions<'_>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();

    if let Some(registry) = options.registry {
        config.docker.registry = non_empty("registry", registry)?;
    }

    if let Some(repository) = options.repository {
        config.docker.repository = non_empty("repository", repository)?;
    }

    if let Some(slug) = options.github_repository {
        config.github.repository =
            RepoSlug::new(slug).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    }

    std::fs::write(&config_path, generate_template_yaml(&config))?;

    Ok(())
}

fn non_empty(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidConfig(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"docker:
  registry: {}
  repository: {}
github:
  repository: {}
  token:
    env: GITHUB_TOKEN
  # api_url: {}
  # branch: main
# Location of the manifest in the GitHub repository
manifest_path: {}
# Or supply the manifest here to skip fetching it
# manifest:
#   images:
#     path: /deploy
#     property: image
retry:
  max_attempts: {}
  base_delay: {}
# committer:
#   name: Deploy Bot
#   email: deploy@example.com
"#,
        config.docker.registry,
        config.docker.repository,
        config.github.repository,
        config.github.api_url,
        config.manifest_path,
        config.retry.max_attempts,
        humantime::format_duration(config.retry.base_delay),
    )
}
