use serde::Deserialize;
use std::{fs, path::PathBuf};

const CONFIG_ENV: &str = "METER_LOOKUP_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "meter-lookup.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

/// What a lookup does when one house file cannot be loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFailurePolicy {
    /// Fail the whole request; later houses are never searched.
    #[default]
    Abort,
    /// Log the failure and move on to the next house.
    Skip,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HouseConfig {
    pub name: Option<String>,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub root: PathBuf,
    pub houses: Vec<HouseConfig>,
    pub on_source_error: SourceFailurePolicy,
}

impl Default for DataConfig {
    fn default() -> Self {
        let houses = (1..=4)
            .map(|n| HouseConfig {
                name: None,
                path: PathBuf::from(format!("House{n}")).join("metreData.json"),
            })
            .collect();

        Self {
            root: PathBuf::from("."),
            houses,
            on_source_error: SourceFailurePolicy::Abort,
        }
    }
}

impl DataConfig {
    /// Houses in search order as `(name, resolved path)`.
    pub fn house_paths(&self) -> Vec<(String, PathBuf)> {
        self.houses
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let name = h.name.clone().unwrap_or_else(|| format!("house{}", i + 1));
                (name, self.root.join(&h.path))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        match env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path),
            Err(_) if !std::path::Path::new(DEFAULT_CONFIG_PATH).exists() => {
                tracing::info!("no {DEFAULT_CONFIG_PATH} found, using built-in defaults");
                Ok(Self::default())
            }
            Err(_) => Self::from_file(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config {path}: {e}"))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_deployment() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.bind_addr, "0.0.0.0:3000");
        assert_eq!(cfg.data.on_source_error, SourceFailurePolicy::Abort);
        assert!(cfg.metrics.is_none());

        let houses = cfg.data.house_paths();
        assert_eq!(houses.len(), 4);
        assert_eq!(houses[0].0, "house1");
        assert_eq!(houses[0].1, PathBuf::from("./House1/metreData.json"));
        assert_eq!(houses[3].1, PathBuf::from("./House4/metreData.json"));
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.data.houses.len(), 4);
        assert_eq!(cfg.server.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn parses_custom_houses_and_policy() {
        let cfg = AppConfig::from_toml(
            r#"
            [server]
            bind_addr = "127.0.0.1:8080"

            [data]
            root = "/srv/meters"
            on_source_error = "skip"

            [[data.houses]]
            name = "north"
            path = "north.json"

            [[data.houses]]
            path = "south.json"

            [metrics]
            bind_addr = "127.0.0.1:9000"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.data.on_source_error, SourceFailurePolicy::Skip);
        assert_eq!(cfg.metrics.unwrap().bind_addr, "127.0.0.1:9000");

        let houses = cfg.data.house_paths();
        assert_eq!(
            houses,
            vec![
                ("north".to_string(), PathBuf::from("/srv/meters/north.json")),
                ("house2".to_string(), PathBuf::from("/srv/meters/south.json")),
            ]
        );
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(AppConfig::from_toml("[data]\non_source_error = \"retry\"").is_err());
    }
}
