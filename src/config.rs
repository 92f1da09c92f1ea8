// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::BackendError;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Clubadmin", "clubadmin"));

/// Where the backend lives and how to authenticate against it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl BackendConfig {
    /// Bearer token sent with every request; the API key doubles as the
    /// token for anonymous access.
    pub fn bearer(&self) -> &str {
        self.token.as_deref().unwrap_or(&self.api_key)
    }

    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Read config {}", path.display()))?;
        let cfg = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(Some(cfg))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config dir")?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Write config {}", path.display()))?;
        Ok(())
    }

    /// Applies `--url`, `--api-key` and `--token` (or their environment
    /// variables) on top of `base`.
    pub fn with_overrides(base: Option<Self>, m: &clap::ArgMatches) -> Result<Self, BackendError> {
        let mut cfg = base.unwrap_or_default();
        if let Some(url) = m.get_one::<String>("url") {
            cfg.url = url.trim().to_string();
        }
        if let Some(key) = m.get_one::<String>("api_key") {
            cfg.api_key = key.trim().to_string();
        }
        if let Some(token) = m.get_one::<String>("token") {
            cfg.token = Some(token.trim().to_string()).filter(|t| !t.is_empty());
        }
        if cfg.url.is_empty() {
            return Err(BackendError::Config(
                "backend URL missing; run `clubadmin init` or pass --url".into(),
            ));
        }
        if cfg.api_key.is_empty() {
            return Err(BackendError::Config(
                "API key missing; run `clubadmin init` or pass --api-key".into(),
            ));
        }
        Ok(cfg)
    }

    pub fn resolve(m: &clap::ArgMatches) -> Result<Self> {
        let path = config_path()?;
        let base = Self::load(&path)?;
        Ok(Self::with_overrides(base, m)?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific config dir")?;
    Ok(proj.config_dir().join("config.json"))
}
