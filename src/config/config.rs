use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::github::{GithubConfig, ScrapeConfig};
use super::logging::LoggingConfig;

/// Environment variable holding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "GITHUB_EXPORTER_CONFIG";
/// Prefix of environment variables overriding configuration values.
/// Nested keys are separated by `__`, e.g. `GITHUB_EXPORTER_GITHUB__TOKEN`.
pub const ENV_PREFIX: &str = "GITHUB_EXPORTER_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub bind_address: String,
    pub github: GithubConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    pub logging: LoggingConfig,
}

/// Path of the configuration file: `$GITHUB_EXPORTER_CONFIG` or `./config.yaml`.
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "./config.yaml".to_string())
}

/// Load config from the YAML file at `path`, with environment overrides on top.
pub fn load_config(path: &str) -> Result<ConfigV1, figment::Error> {
    from_figment(
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__")),
    )
}

/// Extract a v1 configuration from an already assembled figment.
pub fn from_figment(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), serde_json::Error> {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:9171
github:
  repositories:
    - octo/demo
logging:
  level: info
  format: console
"#;

    #[test]
    fn applies_defaults_to_minimal_config() {
        let config = from_figment(Figment::new().merge(Yaml::string(MINIMAL)))
            .expect("minimal config should load");

        assert_eq!(config.bind_address, "127.0.0.1:9171");
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.token, None);
        assert_eq!(config.github.repositories, vec!["octo/demo".to_string()]);
        assert_eq!(config.github.timeout_in_ms, 10_000);
        assert_eq!(config.scrape.channel_capacity, 256);
        assert_eq!(config.scrape.sink_timeout_in_ms, 5_000);
        assert_eq!(config.logging.service_name, "github-exporter");
    }

    #[test]
    fn rejects_unknown_version() {
        let yaml = MINIMAL.replace("1.0.0", "2.0.0");
        assert!(from_figment(Figment::new().merge(Yaml::string(&yaml))).is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.yaml", MINIMAL)?;
            jail.set_env("GITHUB_EXPORTER_GITHUB__TOKEN", "from-env");
            jail.set_env("GITHUB_EXPORTER_SCRAPE__CHANNEL_CAPACITY", "8");

            let config = load_config("config.yaml")?;
            assert_eq!(config.github.token.as_deref(), Some("from-env"));
            assert_eq!(config.scrape.channel_capacity, 8);
            Ok(())
        });
    }
}
