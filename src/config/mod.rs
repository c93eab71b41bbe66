// ABOUTME: Configuration types and parsing for kit-deployer.yml.
// ABOUTME: Handles YAML parsing, token interpolation, and conversion into runtime settings.

mod deserialize;
mod env_value;
mod init;

pub use env_value::EnvValue;
pub use init::{InitOptions, init_config};

use crate::deploy::{DeploySettings, MANIFEST_PATH, Manifest, RetryPolicy};
use crate::error::{Error, Result};
use crate::store::{DEFAULT_API_URL, GithubConfig};
use crate::types::{Committer, RepoSlug};
use deserialize::{deserialize_max_attempts, deserialize_non_empty};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "kit-deployer.yml";
pub const CONFIG_FILENAME_ALT: &str = "kit-deployer.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".kit-deployer/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub docker: DockerConfig,

    pub github: GithubSection,

    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,

    #[serde(default)]
    pub manifest: Option<Manifest>,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub committer: Option<Committer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DockerConfig {
    #[serde(deserialize_with = "deserialize_non_empty")]
    pub registry: String,

    #[serde(deserialize_with = "deserialize_non_empty")]
    pub repository: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubSection {
    pub repository: RepoSlug,

    #[serde(default)]
    pub token: Option<EnvValue>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(
        default = "default_max_attempts",
        deserialize_with = "deserialize_max_attempts"
    )]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay", with = "humantime_serde")]
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay: default_base_delay(),
        }
    }
}

fn default_manifest_path() -> String {
    MANIFEST_PATH.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_max_attempts() -> u32 {
    crate::deploy::DEFAULT_MAX_ATTEMPTS
}

fn default_base_delay() -> Duration {
    crate::deploy::DEFAULT_BASE_DELAY
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Connection settings for the GitHub store, with the token resolved.
    pub fn github_config(&self) -> Result<GithubConfig> {
        let mut config =
            GithubConfig::new(self.github.repository.clone()).api_url(&self.github.api_url);

        if let Some(token) = &self.github.token {
            config = config.token(token.resolve()?);
        }
        if let Some(branch) = &self.github.branch {
            config = config.branch(branch);
        }

        Ok(config)
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        Ok(RetryPolicy::new(
            self.retry.max_attempts,
            self.retry.base_delay,
        )?)
    }

    /// Coordinator settings derived from this configuration.
    pub fn deploy_settings(&self) -> Result<DeploySettings> {
        let mut settings = DeploySettings::new(&self.docker.registry, &self.docker.repository)
            .manifest_path(&self.manifest_path)
            .retry(self.retry_policy()?);

        if let Some(manifest) = &self.manifest {
            settings = settings.manifest(manifest.clone());
        }

        Ok(settings)
    }

    pub fn template() -> Self {
        Config {
            docker: DockerConfig {
                registry: "registry.example.com".to_string(),
                repository: "my-app".to_string(),
            },
            github: GithubSection {
                repository: RepoSlug::from_parts("my-org", "kit-config"),
                token: Some(EnvValue::FromEnv {
                    var: "GITHUB_TOKEN".to_string(),
                    default: None,
                }),
                api_url: default_api_url(),
                branch: None,
            },
            manifest_path: default_manifest_path(),
            manifest: None,
            retry: RetryConfig::default(),
            committer: None,
        }
    }
}
