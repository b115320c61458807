// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use gcp_switcher_gcloud::{DEFAULT_BINARY, Timeouts};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "gcp-switcher";
pub const CONFIG_PATH_ENV: &str = "GCP_SWITCHER_CONFIG_PATH";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_PATH: &str = "gcp-switcher.log";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub gcloud: Gcloud,
    #[serde(default)]
    pub startup: Startup,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            gcloud: Gcloud::default(),
            startup: Startup::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Gcloud {
    pub binary: Option<String>,
    pub command_timeout: Option<String>,
    pub long_timeout: Option<String>,
    pub login_timeout: Option<String>,
    pub application_default_login: Option<bool>,
}

impl Default for Gcloud {
    fn default() -> Self {
        Self {
            binary: Some(DEFAULT_BINARY.to_owned()),
            command_timeout: Some("5s".to_owned()),
            long_timeout: Some("30s".to_owned()),
            login_timeout: Some("5m".to_owned()),
            application_default_login: Some(true),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Startup {
    pub fallback_timeout: Option<String>,
}

impl Default for Startup {
    fn default() -> Self {
        Self {
            fallback_timeout: Some("10s".to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub path: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            path: Some(DEFAULT_LOG_PATH.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and move values under [gcloud], [startup], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Migrate your config to the v1 schema",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.gcloud_binary().trim().is_empty() {
            bail!("gcloud.binary in {} must not be empty", path.display());
        }

        let durations = [
            ("gcloud.command_timeout", &self.gcloud.command_timeout),
            ("gcloud.long_timeout", &self.gcloud.long_timeout),
            ("gcloud.login_timeout", &self.gcloud.login_timeout),
            ("startup.fallback_timeout", &self.startup.fallback_timeout),
        ];
        for (key, value) in durations {
            let Some(raw) = value else {
                continue;
            };
            let parsed = parse_duration(raw).with_context(|| format!("{key} in {}", path.display()))?;
            if parsed <= Duration::ZERO {
                bail!("{key} in {} must be positive, got {raw}", path.display());
            }
        }

        if self.log.path.as_deref().is_some_and(|p| p.trim().is_empty()) {
            bail!("log.path in {} must not be empty", path.display());
        }
        Ok(())
    }

    pub fn gcloud_binary(&self) -> &str {
        self.gcloud.binary.as_deref().unwrap_or(DEFAULT_BINARY)
    }

    pub fn timeouts(&self) -> Result<Timeouts> {
        let defaults = Timeouts::default();
        Ok(Timeouts {
            command: optional_duration(&self.gcloud.command_timeout, defaults.command)?,
            long: optional_duration(&self.gcloud.long_timeout, defaults.long)?,
            login: optional_duration(&self.gcloud.login_timeout, defaults.login)?,
        })
    }

    pub fn application_default_login(&self) -> bool {
        self.gcloud.application_default_login.unwrap_or(true)
    }

    pub fn fallback_timeout(&self) -> Result<Duration> {
        optional_duration(&self.startup.fallback_timeout, Duration::from_secs(10))
    }

    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(self.log.path.as_deref().unwrap_or(DEFAULT_LOG_PATH))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# gcp-switcher config\n# Place this file at: {}\n\nversion = 1\n\n[gcloud]\n# Name on PATH or an absolute path to the gcloud executable\nbinary = \"{}\"\n# Reads and project switches\ncommand_timeout = \"5s\"\n# Account switches\nlong_timeout = \"30s\"\n# Each interactive login step\nlogin_timeout = \"5m\"\n# Also run `gcloud auth application-default login` after logging in\napplication_default_login = true\n\n[startup]\n# Leave the loading screen after this long even if some commands are still running\nfallback_timeout = \"10s\"\n\n[log]\n# Written only when started with --debug\npath = \"{}\"\n",
            path.display(),
            DEFAULT_BINARY,
            DEFAULT_LOG_PATH,
        )
    }
}

fn optional_duration(raw: &Option<String>, default: Duration) -> Result<Duration> {
    match raw {
        Some(raw) => parse_duration(raw),
        None => Ok(default),
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("timeout duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
