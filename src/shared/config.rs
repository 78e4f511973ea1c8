//! Application configuration. Input/output paths and text clustering defaults.

use crate::domain::{DEFAULT_MIN_SIZE, DEFAULT_THRESHOLD};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Where the collector writes its day files.
pub const DEFAULT_MESSAGES_PATH: &str = "./data/mensagens";
pub const DEFAULT_OUTPUT_DIR: &str = "./data";

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory holding `mensagens_<date>.json`. Read from TG_SUMMARY_MESSAGES_PATH.
    #[serde(default)]
    pub messages_path: Option<String>,

    /// Directory for default-named outputs. Read from TG_SUMMARY_OUTPUT_DIR.
    #[serde(default)]
    pub output_dir: Option<String>,

    /// Minimum text length (characters) for clustering. Read from TG_SUMMARY_MIN_SIZE.
    #[serde(default)]
    pub min_size: Option<usize>,

    /// Jaccard threshold for joining a text cluster. Read from TG_SUMMARY_THRESHOLD.
    #[serde(default)]
    pub threshold: Option<f64>,

    /// Cluster media captions too. Read from TG_SUMMARY_INCLUDE_CAPTIONS.
    #[serde(default)]
    pub include_captions: Option<bool>,
}

impl AppConfig {
    /// Environment (TG_SUMMARY_*) over an optional config file. The file is `file` if given,
    /// else TG_SUMMARY_CONFIG if set. Format follows the file extension (json, toml, yaml).
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        Self::load_with_env(file, None)
    }

    /// Same as [`AppConfig::load`], reading variables from `env` instead of the process
    /// environment when given.
    pub fn load_with_env(
        file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let config_var = match &env {
            Some(vars) => vars.get("TG_SUMMARY_CONFIG").cloned(),
            None => std::env::var("TG_SUMMARY_CONFIG").ok(),
        };
        let file = file.map(Path::to_path_buf).or(config_var.map(PathBuf::from));

        let mut c = config::Config::builder();
        if let Some(path) = file {
            c = c.add_source(config::File::from(path));
        }
        c = c.add_source(
            config::Environment::with_prefix("TG_SUMMARY")
                .try_parsing(true)
                .source(env),
        );
        c.build()?.try_deserialize()
    }

    pub fn messages_path_or_default(&self) -> PathBuf {
        PathBuf::from(self.messages_path.as_deref().unwrap_or(DEFAULT_MESSAGES_PATH))
    }

    pub fn output_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR))
    }

    /// Returns min text size. Defaults to 200 if unset.
    pub fn min_size_or_default(&self) -> usize {
        self.min_size.unwrap_or(DEFAULT_MIN_SIZE)
    }

    /// Returns the similarity threshold. Defaults to 0.75 if unset.
    pub fn threshold_or_default(&self) -> f64 {
        self.threshold.unwrap_or(DEFAULT_THRESHOLD)
    }

    pub fn include_captions_or_default(&self) -> bool {
        self.include_captions.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.messages_path_or_default(), PathBuf::from("./data/mensagens"));
        assert_eq!(cfg.output_dir_or_default(), PathBuf::from("./data"));
        assert_eq!(cfg.min_size_or_default(), 200);
        assert_eq!(cfg.threshold_or_default(), 0.75);
        assert!(!cfg.include_captions_or_default());
    }

    fn vars(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        std::fs::write(
            &path,
            r#"{"messages_path": "/data/mensagens", "min_size": 50, "threshold": 0.9}"#,
        )
        .unwrap();

        let cfg = AppConfig::load_with_env(Some(&path), Some(vars(&[]))).unwrap();
        assert_eq!(cfg.messages_path_or_default(), PathBuf::from("/data/mensagens"));
        assert_eq!(cfg.min_size_or_default(), 50);
        assert_eq!(cfg.threshold_or_default(), 0.9);
        assert_eq!(cfg.output_dir, None);
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.toml");
        std::fs::write(&path, "output_dir = \"/srv/out\"\ninclude_captions = true\n").unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.output_dir_or_default(), PathBuf::from("/srv/out"));
        assert!(cfg.include_captions_or_default());
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.toml");
        std::fs::write(&path, "min_size = 50\nthreshold = 0.9\n").unwrap();

        let env = vars(&[("TG_SUMMARY_MIN_SIZE", "120")]);
        let cfg = AppConfig::load_with_env(Some(&path), Some(env)).unwrap();
        assert_eq!(cfg.min_size_or_default(), 120);
        assert_eq!(cfg.threshold_or_default(), 0.9);
    }

    #[test]
    fn test_config_file_from_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        std::fs::write(&path, r#"{"output_dir": "/srv/summaries"}"#).unwrap();

        let env = vars(&[("TG_SUMMARY_CONFIG", path.to_str().unwrap())]);
        let cfg = AppConfig::load_with_env(None, Some(env)).unwrap();
        assert_eq!(cfg.output_dir_or_default(), PathBuf::from("/srv/summaries"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let missing = Path::new("/nonexistent/summary.toml");
        assert!(AppConfig::load_with_env(Some(missing), Some(vars(&[]))).is_err());
    }
}
