//! Configuration system for genschema.
//!
//! Loads config from:
//! 1. Global: ~/.config/genschema/config.toml
//! 2. Per-project: .genschema/config.toml (overrides global)
//!
//! Command-line flags override both.
//!
//! Example config.toml:
//! ```toml
//! [render]
//! pretty = true
//! unresolved = "omit"   # or "placeholder"
//! json_tags = true
//!
//! [scan]
//! include_tests = false
//! recursive = false
//! ```

use genschema_core::UnresolvedPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Output configuration.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// Indent fragments. Default: true
    pub pretty: Option<bool>,
    /// What to emit for references to unknown types. Default: omit
    pub unresolved: Option<UnresolvedPolicy>,
    /// Honor `json:"..."` struct tags. Default: true
    pub json_tags: Option<bool>,
}

/// Source discovery configuration.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ScanConfig {
    /// Read `_test.go` files too. Default: false
    pub include_tests: Option<bool>,
    /// Descend into subdirectories. Default: false
    pub recursive: Option<bool>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GenschemaConfig {
    pub render: RenderConfig,
    pub scan: ScanConfig,
}

impl GenschemaConfig {
    /// Load configuration for a project.
    pub fn load(root: &Path) -> Self {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::load_file(&global_path) {
                config = config.merge(global);
            }
        }

        let project_path = root.join(".genschema").join("config.toml");
        if let Some(project) = Self::load_file(&project_path) {
            config = config.merge(project);
        }

        config
    }

    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("genschema").join("config.toml"))
    }

    fn load_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded config");
                Some(config)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "ignoring invalid config: {err}");
                None
            }
        }
    }

    /// Merge another config into this one; values set in `other` win.
    fn merge(self, other: Self) -> Self {
        Self {
            render: RenderConfig {
                pretty: other.render.pretty.or(self.render.pretty),
                unresolved: other.render.unresolved.or(self.render.unresolved),
                json_tags: other.render.json_tags.or(self.render.json_tags),
            },
            scan: ScanConfig {
                include_tests: other.scan.include_tests.or(self.scan.include_tests),
                recursive: other.scan.recursive.or(self.scan.recursive),
            },
        }
    }

    pub fn pretty(&self) -> bool {
        self.render.pretty.unwrap_or(true)
    }

    pub fn unresolved(&self) -> UnresolvedPolicy {
        self.render.unresolved.unwrap_or_default()
    }

    pub fn json_tags(&self) -> bool {
        self.render.json_tags.unwrap_or(true)
    }

    pub fn include_tests(&self) -> bool {
        self.scan.include_tests.unwrap_or(false)
    }

    pub fn recursive(&self) -> bool {
        self.scan.recursive.unwrap_or(false)
    }
}
