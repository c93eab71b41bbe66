// ABOUTME: Integration tests for configuration parsing and validation.
// ABOUTME: Tests YAML parsing, defaults, token resolution, and init scaffolding.

use kit_deployer::config::*;
use std::time::Duration;

const MINIMAL: &str = r#"
docker:
  registry: registry.example.com
  repository: svc
github:
  repository: acme/kit-config
"#;

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.docker.registry, "registry.example.com");
        assert_eq!(config.docker.repository, "svc");
        assert_eq!(config.github.repository.to_string(), "acme/kit-config");
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert!(config.github.token.is_none());
        assert_eq!(config.manifest_path, "kit.yaml");
        assert!(config.manifest.is_none());
        assert_eq!(config.retry.max_attempts, 10);
        assert_eq!(config.retry.base_delay, Duration::from_secs(15));
        assert!(config.committer.is_none());
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
docker:
  registry: ghcr.io/acme
  repository: api
github:
  repository: acme/ops
  token:
    env: DEPLOY_TOKEN
    default: fallback
  api_url: https://ghe.example.com/api/v3
  branch: main
manifest_path: ops/kit.yaml
manifest:
  images:
    path: /deploy
    property: image
retry:
  max_attempts: 3
  base_delay: 2s
committer:
  name: Deploy Bot
  email: deploy@example.com
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.github.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.github.branch.as_deref(), Some("main"));
        assert_eq!(config.manifest_path, "ops/kit.yaml");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay, Duration::from_secs(2));
        assert_eq!(config.committer.as_ref().unwrap().name, "Deploy Bot");

        let manifest = config.manifest.as_ref().unwrap();
        let images = manifest.images.as_ref().unwrap();
        assert_eq!(images.property.as_deref(), Some("image"));
    }

    #[test]
    fn zero_attempts_rejected() {
        let yaml = format!("{MINIMAL}retry:\n  max_attempts: 0\n");
        assert!(Config::from_yaml(&yaml).is_err());
    }

    #[test]
    fn empty_repository_rejected() {
        let yaml = r#"
docker:
  registry: registry.example.com
  repository: ""
github:
  repository: acme/kit-config
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn invalid_github_repository_rejected() {
        let yaml = MINIMAL.replace("acme/kit-config", "kit-config");
        let err = Config::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("owner/name"));
    }

    #[test]
    fn missing_docker_section_rejected() {
        assert!(Config::from_yaml("github:\n  repository: acme/ops\n").is_err());
    }
}

mod settings {
    use super::*;

    #[test]
    fn deploy_settings_carry_config() {
        let yaml = format!(
            "{MINIMAL}manifest_path: ops/kit.yaml\nretry:\n  max_attempts: 4\n  base_delay: 1s\n"
        );
        let settings = Config::from_yaml(&yaml).unwrap().deploy_settings().unwrap();
        assert_eq!(settings.registry, "registry.example.com");
        assert_eq!(settings.repository, "svc");
        assert_eq!(settings.manifest_path, "ops/kit.yaml");
        assert_eq!(settings.retry.max_attempts(), 4);
        assert_eq!(settings.retry.base_delay(), Duration::from_secs(1));
        assert!(settings.manifest.is_none());
    }

    #[test]
    fn literal_token_is_used() {
        let yaml = MINIMAL.replace(
            "repository: acme/kit-config",
            "repository: acme/kit-config\n  token: ghp_literal",
        );
        let github = Config::from_yaml(&yaml).unwrap().github_config().unwrap();
        assert_eq!(github.token.as_deref(), Some("ghp_literal"));
        assert_eq!(github.repository.owner(), "acme");
    }

    #[test]
    fn env_token_is_resolved() {
        let yaml = MINIMAL.replace(
            "repository: acme/kit-config",
            "repository: acme/kit-config\n  token:\n    env: KIT_TEST_TOKEN",
        );
        let config = Config::from_yaml(&yaml).unwrap();

        temp_env::with_var("KIT_TEST_TOKEN", Some("ghp_from_env"), || {
            let github = config.github_config().unwrap();
            assert_eq!(github.token.as_deref(), Some("ghp_from_env"));
        });
    }

    #[test]
    fn missing_env_token_is_an_error() {
        let yaml = MINIMAL.replace(
            "repository: acme/kit-config",
            "repository: acme/kit-config\n  token:\n    env: KIT_TEST_MISSING_TOKEN",
        );
        let config = Config::from_yaml(&yaml).unwrap();

        temp_env::with_var_unset("KIT_TEST_MISSING_TOKEN", || {
            let err = config.github_config().unwrap_err();
            assert!(err.to_string().contains("KIT_TEST_MISSING_TOKEN"));
        });
    }

    #[test]
    fn empty_env_token_uses_default() {
        let value = EnvValue::FromEnv {
            var: "KIT_TEST_EMPTY_TOKEN".to_string(),
            default: Some("fallback".to_string()),
        };
        temp_env::with_var("KIT_TEST_EMPTY_TOKEN", Some(""), || {
            assert_eq!(value.resolve().unwrap(), "fallback");
        });
    }
}

mod discovery {
    use super::*;

    #[test]
    fn discovers_primary_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), MINIMAL).unwrap();
        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.docker.repository, "svc");
    }

    #[test]
    fn discovers_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".kit-deployer")).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME_DIR), MINIMAL).unwrap();
        assert!(Config::discover(dir.path()).is_ok());
    }

    #[test]
    fn reports_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::discover(dir.path()).unwrap_err();
        assert!(matches!(err, kit_deployer::error::Error::ConfigNotFound(_)));
    }
}

mod init {
    use super::*;

    #[test]
    fn template_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let options = InitOptions {
            registry: Some("ghcr.io/acme"),
            repository: Some("api"),
            github_repository: Some("acme/ops"),
        };
        init_config(dir.path(), &options, false).unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.docker.registry, "ghcr.io/acme");
        assert_eq!(config.docker.repository, "api");
        assert_eq!(config.github.repository.to_string(), "acme/ops");
        assert_eq!(config.retry.base_delay, Duration::from_secs(15));
        assert!(matches!(
            config.github.token,
            Some(EnvValue::FromEnv { ref var, .. }) if var == "GITHUB_TOKEN"
        ));
    }

    #[test]
    fn refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "existing").unwrap();

        let err = init_config(dir.path(), &InitOptions::default(), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        init_config(dir.path(), &InitOptions::default(), true).unwrap();
        assert!(Config::discover(dir.path()).is_ok());
    }

    #[test]
    fn rejects_bad_github_repository() {
        let dir = tempfile::tempdir().unwrap();
        let options = InitOptions {
            github_repository: Some("nope"),
            ..Default::default()
        };
        assert!(init_config(dir.path(), &options, false).is_err());
    }
}
