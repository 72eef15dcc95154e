// ABOUTME: Configuration types and parsing for kubeship.yml.
// ABOUTME: Handles YAML parsing, destination merging, and environment overrides.

mod env_value;
mod init;

pub use env_value::{EnvValue, resolve_env_map};
pub use init::{InitOptions, init_config};

use crate::error::{Error, Result};
use crate::tools::{BuildOptions, RolloutWait, ecr_registry_host};
use crate::types::{DeploymentTarget, ResourceName};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "kubeship.yml";
pub const CONFIG_FILENAME_ALT: &str = "kubeship.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".kubeship/config.yml";

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_NAMESPACE: &str = "default";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub cluster: ClusterConfig,

    #[serde(default = "default_rollout_timeout", with = "humantime_serde")]
    pub rollout_timeout: Duration,

    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    #[serde(default)]
    pub destinations: HashMap<String, Destination>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub deployment: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            deployment: None,
            container: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Registry host; derived from the account and region when absent.
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub repository: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            host: None,
            account_id: None,
            region: default_region(),
            repository: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_context")]
    pub context: PathBuf,
    #[serde(default)]
    pub dockerfile: Option<PathBuf>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub args: HashMap<String, EnvValue>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            context: default_context(),
            dockerfile: None,
            platform: None,
            args: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterConfig {
    /// EKS cluster name, used to refresh the kubeconfig.
    #[serde(default)]
    pub name: Option<String>,
    /// kubeconfig context; the current context when absent.
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub update_kubeconfig: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Destination {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub deployment: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default, with = "humantime_serde")]
    pub rollout_timeout: Option<Duration>,
    #[serde(default)]
    pub build_args: HashMap<String, EnvValue>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_context() -> PathBuf {
    PathBuf::from(".")
}

fn default_rollout_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(2)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            registry: RegistryConfig::default(),
            build: BuildConfig::default(),
            cluster: ClusterConfig::default(),
            rollout_timeout: default_rollout_timeout(),
            poll_interval: default_poll_interval(),
            destinations: HashMap::new(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file is a valid, all-defaults configuration
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate_durations()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// First config file found in `dir`, if any.
    pub fn find(dir: &Path) -> Option<PathBuf> {
        [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ]
        .into_iter()
        .find(|path| path.is_file())
    }

    /// Load the config file in `dir`, or defaults when there is none.
    pub fn discover(dir: &Path) -> Result<Self> {
        match Self::find(dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::load(&path)
            }
            None => {
                tracing::debug!(dir = %dir.display(), "no configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn for_destination(&self, name: &str) -> Result<Config> {
        let dest = self
            .destinations
            .get(name)
            .ok_or_else(|| Error::UnknownDestination(name.to_string()))?;

        let mut merged = self.clone();

        if let Some(ref namespace) = dest.namespace {
            merged.target.namespace = namespace.clone();
        }
        if dest.deployment.is_some() {
            merged.target.deployment = dest.deployment.clone();
        }
        if dest.container.is_some() {
            merged.target.container = dest.container.clone();
        }
        if let Some(ref region) = dest.region {
            merged.registry.region = region.clone();
        }
        if dest.account_id.is_some() {
            merged.registry.account_id = dest.account_id.clone();
        }
        if dest.repository.is_some() {
            merged.registry.repository = dest.repository.clone();
        }
        if dest.cluster.is_some() {
            merged.cluster.name = dest.cluster.clone();
        }
        if dest.context.is_some() {
            merged.cluster.context = dest.context.clone();
        }
        if let Some(timeout) = dest.rollout_timeout {
            merged.rollout_timeout = timeout;
        }

        // Deep merge build args
        for (k, v) in &dest.build_args {
            merged.build.args.insert(k.clone(), v.clone());
        }

        merged.validate_durations()?;
        Ok(merged)
    }

    /// Apply overrides from the process environment.
    pub fn apply_process_env(&mut self) -> Result<()> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides read through `lookup`. Empty values are
    /// treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(region) = get("AWS_REGION").or_else(|| get("AWS_DEFAULT_REGION")) {
            self.registry.region = region;
        }
        if let Some(account) = get("AWS_ACCOUNT_ID") {
            self.registry.account_id = Some(account);
        }
        if let Some(repository) = get("ECR_REPOSITORY") {
            self.registry.repository = Some(repository);
        }
        if let Some(host) = get("ECR_REGISTRY") {
            self.registry.host = Some(host);
        }
        if let Some(cluster) = get("EKS_CLUSTER_NAME") {
            self.cluster.name = Some(cluster);
        }
        if let Some(context) = get("KUBE_CONTEXT") {
            self.cluster.context = Some(context);
        }
        if let Some(namespace) = get("KUBESHIP_NAMESPACE") {
            self.target.namespace = namespace;
        }
        if let Some(deployment) = get("KUBESHIP_DEPLOYMENT") {
            self.target.deployment = Some(deployment);
        }
        if let Some(container) = get("KUBESHIP_CONTAINER") {
            self.target.container = Some(container);
        }
        if let Some(timeout) = get("KUBESHIP_ROLLOUT_TIMEOUT") {
            self.rollout_timeout = parse_duration(&timeout).ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "KUBESHIP_ROLLOUT_TIMEOUT: {timeout:?} is not a duration"
                ))
            })?;
        }

        self.validate_durations()
    }

    /// Both rollout durations must be non-zero.
    fn validate_durations(&self) -> Result<()> {
        if self.rollout_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "rollout_timeout must be greater than zero".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "poll_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The Deployment container this config points at.
    pub fn deployment_target(&self) -> Result<DeploymentTarget> {
        let namespace = resource_name("target.namespace", &self.target.namespace)?;
        let deployment = self.target.deployment.as_deref().ok_or_else(|| {
            Error::InvalidConfig(
                "target.deployment is not set (or set KUBESHIP_DEPLOYMENT)".to_string(),
            )
        })?;
        let container = self.target.container.as_deref().ok_or_else(|| {
            Error::InvalidConfig(
                "target.container is not set (or set KUBESHIP_CONTAINER)".to_string(),
            )
        })?;

        Ok(DeploymentTarget::new(
            namespace,
            resource_name("target.deployment", deployment)?,
            resource_name("target.container", container)?,
        ))
    }

    /// Registry host: explicit, or the ECR host for the account and region.
    pub fn registry_host(&self) -> Result<String> {
        if let Some(ref host) = self.registry.host {
            return Ok(host.trim_end_matches('/').to_string());
        }
        let account = self.registry.account_id.as_deref().ok_or_else(|| {
            Error::InvalidConfig(
                "registry.account_id is not set (or set AWS_ACCOUNT_ID or ECR_REGISTRY)"
                    .to_string(),
            )
        })?;
        Ok(ecr_registry_host(account, &self.registry.region))
    }

    pub fn repository(&self) -> Result<&str> {
        self.registry.repository.as_deref().ok_or_else(|| {
            Error::InvalidConfig(
                "registry.repository is not set (or set ECR_REPOSITORY)".to_string(),
            )
        })
    }

    /// Wait bounds for a rollout, with an optional timeout from the command line.
    pub fn rollout_wait(&self, timeout: Option<Duration>) -> RolloutWait {
        RolloutWait::new(timeout.unwrap_or(self.rollout_timeout), self.poll_interval)
    }

    /// Build context resolved against `project_dir`.
    pub fn build_context(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.build.context)
    }

    /// Docker build options with build args resolved from the environment.
    pub fn build_options(&self, project_dir: &Path) -> Result<BuildOptions> {
        let mut build_args: Vec<(String, String)> =
            resolve_env_map(&self.build.args)?.into_iter().collect();
        build_args.sort();

        Ok(BuildOptions {
            dockerfile: self
                .build
                .dockerfile
                .as_ref()
                .map(|dockerfile| project_dir.join(dockerfile)),
            platform: self.build.platform.clone(),
            build_args,
        })
    }
}

fn resource_name(field: &str, value: &str) -> Result<ResourceName> {
    ResourceName::new(value).map_err(|e| Error::InvalidConfig(format!("{field}: {e}")))
}

/// Parse `90`, `90s` or `5m`. A bare number is seconds.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    humantime::parse_duration(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_yaml_uses_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.target.namespace, "default");
        assert_eq!(config.registry.region, "us-east-1");
        assert_eq!(config.rollout_timeout, Duration::from_secs(300));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.build.context, PathBuf::from("."));
    }

    #[test]
    fn parses_durations_with_units() {
        let config = Config::from_yaml("rollout_timeout: 5m\npoll_interval: 500ms\n").unwrap();
        assert_eq!(config.rollout_timeout, Duration::from_secs(300));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::from_yaml(
            "target:\n  deployment: web\n  container: app\nregistry:\n  region: eu-west-1\n",
        )
        .unwrap();
        config
            .apply_env(env(&[
                ("AWS_REGION", "us-west-2"),
                ("KUBESHIP_DEPLOYMENT", "api"),
                ("KUBESHIP_ROLLOUT_TIMEOUT", "120"),
            ]))
            .unwrap();

        assert_eq!(config.registry.region, "us-west-2");
        assert_eq!(config.target.deployment.as_deref(), Some("api"));
        assert_eq!(config.target.container.as_deref(), Some("app"));
        assert_eq!(config.rollout_timeout, Duration::from_secs(120));
    }

    #[test]
    fn aws_region_wins_over_default_region() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("AWS_DEFAULT_REGION", "eu-central-1"),
                ("AWS_REGION", "ap-south-1"),
            ]))
            .unwrap();
        assert_eq!(config.registry.region, "ap-south-1");

        let mut config = Config::default();
        config
            .apply_env(env(&[("AWS_DEFAULT_REGION", "eu-central-1")]))
            .unwrap();
        assert_eq!(config.registry.region, "eu-central-1");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[("KUBESHIP_NAMESPACE", "  ")])).unwrap();
        assert_eq!(config.target.namespace, "default");
    }

    #[test]
    fn bad_timeout_env_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env(env(&[("KUBESHIP_ROLLOUT_TIMEOUT", "soon")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn registry_host_derives_ecr_host() {
        let mut config = Config::default();
        config.registry.account_id = Some("123456789012".to_string());
        assert_eq!(
            config.registry_host().unwrap(),
            "123456789012.dkr.ecr.us-east-1.amazonaws.com"
        );

        config.registry.host = Some("registry.example.com/".to_string());
        assert_eq!(config.registry_host().unwrap(), "registry.example.com");
    }

    #[test]
    fn registry_host_requires_account() {
        let err = Config::default().registry_host().unwrap_err();
        assert!(err.to_string().contains("AWS_ACCOUNT_ID"), "{err}");
    }

    #[test]
    fn deployment_target_requires_names() {
        let err = Config::default().deployment_target().unwrap_err();
        assert!(err.to_string().contains("target.deployment"), "{err}");
    }

    #[test]
    fn deployment_target_validates_names() {
        let mut config = Config::default();
        config.target.deployment = Some("My_App".to_string());
        config.target.container = Some("app".to_string());
        let err = config.deployment_target().unwrap_err();
        assert!(err.to_string().contains("target.deployment"), "{err}");
    }

    #[test]
    fn destination_overrides_target_and_timeout() {
        let config = Config::from_yaml(
            r#"
target:
  namespace: staging
  deployment: web
  container: app
build:
  args:
    NODE_ENV: development
destinations:
  production:
    namespace: prod
    rollout_timeout: 10m
    build_args:
      NODE_ENV: production
"#,
        )
        .unwrap();

        let prod = config.for_destination("production").unwrap();
        assert_eq!(prod.target.namespace, "prod");
        assert_eq!(prod.target.deployment.as_deref(), Some("web"));
        assert_eq!(prod.rollout_timeout, Duration::from_secs(600));
        assert_eq!(
            prod.build.args.get("NODE_ENV"),
            Some(&EnvValue::Literal("production".to_string()))
        );
    }

    #[test]
    fn unknown_destination_is_an_error() {
        let err = Config::default().for_destination("nowhere").unwrap_err();
        assert!(matches!(err, Error::UnknownDestination(ref d) if d == "nowhere"));
    }

    #[test]
    fn build_options_sort_args_and_resolve_paths() {
        let config = Config::from_yaml(
            "build:\n  dockerfile: docker/Dockerfile\n  args:\n    B: two\n    A: one\n",
        )
        .unwrap();
        let options = config.build_options(Path::new("/src")).unwrap();
        assert_eq!(options.dockerfile, Some(PathBuf::from("/src/docker/Dockerfile")));
        assert_eq!(
            options.build_args,
            vec![
                ("A".to_string(), "one".to_string()),
                ("B".to_string(), "two".to_string())
            ]
        );
    }

    #[test]
    fn parse_duration_accepts_seconds_and_units() {
        assert_eq!(parse_duration("90"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("2m 30s"), Some(Duration::from_secs(150)));
        assert_eq!(parse_duration("later"), None);
    }
}
