//! Settings file and command-line overrides

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use kubedash_api::DEFAULT_BASE_URL;

/// Looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "kubedash.toml";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// The kubedash HTTP backend
    #[default]
    Http,
    /// Straight to the Kubernetes API via kubeconfig
    Direct,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub url: String,
    pub timeout_secs: u64,
    pub mode: BackendMode,
    /// kubeconfig context for direct mode
    pub context: Option<String>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            mode: BackendMode::Http,
            context: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Evaluation status polling interval
    pub refresh_ms: u64,
    pub sidebar_collapsed: bool,
    pub start_path: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            refresh_ms: 3000,
            sidebar_collapsed: false,
            start_path: "/".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendSettings,
    pub ui: UiSettings,
    /// Write logs here instead of stderr
    pub log_file: Option<PathBuf>,
}

/// Values given on the command line or through the environment
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub backend_url: Option<String>,
    pub direct: bool,
    pub context: Option<String>,
    pub refresh_ms: Option<u64>,
    pub start_path: Option<String>,
}

impl Settings {
    /// Read settings from `explicit`, or from `kubedash.toml` if it exists.
    /// A missing explicit file is an error; a missing default file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply command-line values on top of the file
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(url) = overrides.backend_url {
            self.backend.url = url;
        }
        if overrides.direct {
            self.backend.mode = BackendMode::Direct;
        }
        if overrides.context.is_some() {
            self.backend.context = overrides.context;
        }
        if let Some(refresh_ms) = overrides.refresh_ms {
            self.ui.refresh_ms = refresh_ms;
        }
        if let Some(path) = overrides.start_path {
            self.ui.start_path = path;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.backend.url, "http://127.0.0.1:10001");
        assert_eq!(settings.backend.mode, BackendMode::Http);
        assert_eq!(settings.ui.refresh_ms, 3000);
        assert_eq!(settings.ui.start_path, "/");
        assert!(settings.log_file.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            log_file = "/tmp/kubedash.log"

            [backend]
            mode = "direct"
            context = "kind-dev"

            [ui]
            sidebar_collapsed = true
            "#,
        )
        .unwrap();

        assert_eq!(settings.backend.mode, BackendMode::Direct);
        assert_eq!(settings.backend.context.as_deref(), Some("kind-dev"));
        assert_eq!(settings.backend.url, DEFAULT_BASE_URL);
        assert_eq!(settings.backend.timeout_secs, 10);
        assert!(settings.ui.sidebar_collapsed);
        assert_eq!(settings.ui.refresh_ms, 3000);
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/kubedash.log")));
    }

    #[test]
    fn test_invalid_file() {
        assert!(Settings::from_toml("[backend]\nmode = \"grpc\"").is_err());
        assert!(Settings::from_toml("ui = 3").is_err());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file = Settings::from_toml(
            r#"
            [backend]
            url = "http://backend.internal:8080"
            [ui]
            refresh_ms = 1000
            "#,
        )
        .unwrap();

        let settings = file.clone().with_overrides(Overrides {
            backend_url: Some("http://localhost:9000".to_string()),
            refresh_ms: Some(500),
            start_path: Some("/ElasticScaling".to_string()),
            ..Default::default()
        });
        assert_eq!(settings.backend.url, "http://localhost:9000");
        assert_eq!(settings.ui.refresh_ms, 500);
        assert_eq!(settings.ui.start_path, "/ElasticScaling");
        assert_eq!(settings.backend.mode, BackendMode::Http);

        let untouched = file.clone().with_overrides(Overrides::default());
        assert_eq!(untouched, file);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("kubedash-does-not-exist.toml");
        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to read config file"));
    }

    #[test]
    fn test_load_explicit_file() {
        let path = std::env::temp_dir().join(format!("kubedash-test-{}.toml", std::process::id()));
        std::fs::write(&path, "[ui]\nstart_path = \"/ElasticScaling\"\n").unwrap();
        let settings = Settings::load(Some(&path));
        let _ = std::fs::remove_file(&path);

        assert_eq!(settings.unwrap().ui.start_path, "/ElasticScaling");
    }
}
