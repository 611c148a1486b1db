use anyhow::{Context, Result};
use cnc_quote_core::QuoteConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CliError;
use crate::output::OutputFormat;

/// Prefix for environment overrides, e.g. `CNCQUOTE_PIPELINE__SEED=7`
pub const ENV_PREFIX: &str = "CNCQUOTE_";

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub pipeline: QuoteConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub default_format: String,
    pub color_enabled: bool,
    pub progress_enabled: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: "text".to_string(),
            color_enabled: true,
            progress_enabled: true,
        }
    }
}

impl AppConfig {
    /// Apply command line overrides on top of the layered configuration
    pub fn apply_cli_overrides(&mut self, seed: Option<u64>, time_unit_micros: Option<u64>) {
        if let Some(seed) = seed {
            self.pipeline.seed = Some(seed);
        }
        if let Some(micros) = time_unit_micros {
            self.pipeline.time_unit_micros = micros;
        }
    }

    /// Output format named in the configuration, text when unrecognised
    pub fn default_format(&self) -> OutputFormat {
        OutputFormat::from_string(&self.output.default_format).unwrap_or(OutputFormat::Text)
    }
}

/// Configuration manager that handles XDG-compliant paths and layered configuration
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config_path: crate::paths::get_config_path(),
        }
    }

    /// Create a ConfigManager with a specific path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration with layered priority: ENV > File > Defaults
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if self.config_path.exists() {
            figment = figment.merge(Toml::file(&self.config_path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: AppConfig = figment.extract().context("Failed to load configuration")?;
        config
            .pipeline
            .limits
            .check()
            .context("Invalid pipeline limits")?;
        Ok(config)
    }

    /// Write the default configuration to disk
    ///
    /// Refuses to overwrite an existing file unless `force` is set.
    pub fn init(&self, force: bool) -> Result<()> {
        if self.config_path.exists() && !force {
            anyhow::bail!(
                "Configuration already exists at {}",
                self.config_path.display()
            );
        }
        self.write_value(&toml::Value::try_from(AppConfig::default())?)
    }

    /// Get a configuration value by key (dot notation)
    pub fn get(&self, key: &str) -> Result<String> {
        let value = toml::Value::try_from(self.load()?)?;

        let mut current = &value;
        for part in key.split('.') {
            match current {
                toml::Value::Table(table) => {
                    current = table
                        .get(part)
                        .ok_or_else(|| anyhow::anyhow!("Key '{key}' not found"))?;
                }
                _ => anyhow::bail!("Invalid key path: {key}"),
            }
        }

        scalar_to_string(current)
            .ok_or_else(|| anyhow::anyhow!("Value at '{key}' is not a simple type"))
    }

    /// Set a configuration value by key (dot notation)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_value(key, value)?;
        let parsed = parse_config_value(key, value)?;

        let mut config = if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            toml::from_str(&content)?
        } else {
            toml::Value::Table(toml::map::Map::new())
        };

        let parts: Vec<&str> = key.split('.').collect();
        let Some((last, parents)) = parts.split_last() else {
            anyhow::bail!("Empty key");
        };

        let mut current = &mut config;
        for part in parents {
            let toml::Value::Table(table) = current else {
                anyhow::bail!("Invalid key path: expected table at '{part}'");
            };
            current = table
                .entry(part.to_string())
                .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
        }

        match current {
            toml::Value::Table(table) => {
                table.insert(last.to_string(), parsed);
            }
            _ => anyhow::bail!("Cannot set value on non-table"),
        }

        self.write_value(&config)
    }

    /// List all configuration values
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let value = toml::Value::try_from(self.load()?)?;

        let mut items = Vec::new();
        collect_values(&value, String::new(), &mut items);
        items.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(items)
    }

    fn write_value(&self, value: &toml::Value) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.config_path, toml::to_string_pretty(value)?)
            .with_context(|| format!("Failed to write {}", self.config_path.display()))
    }
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Recursively collect all scalar key-value pairs
fn collect_values(value: &toml::Value, prefix: String, items: &mut Vec<(String, String)>) {
    if let toml::Value::Table(table) = value {
        for (key, val) in table {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            collect_values(val, path, items);
        }
    } else if let Some(text) = scalar_to_string(value) {
        items.push((prefix, text));
    }
}

fn validate_config_value(key: &str, value: &str) -> Result<()> {
    match key {
        "pipeline.limits.max_files"
        | "pipeline.limits.max_name_length"
        | "pipeline.limits.max_file_size_bytes" => {
            let n: u64 = value
                .parse()
                .with_context(|| format!("{key} must be a positive integer"))?;
            if n == 0 {
                anyhow::bail!("{key} must be greater than 0");
            }
        }
        "pipeline.time_unit_micros" | "pipeline.seed" => {
            let _: i64 = value
                .parse()
                .ok()
                .filter(|n| *n >= 0)
                .with_context(|| format!("{key} must be a non-negative integer"))?;
        }
        "pipeline.error_delimiter" => {}
        k if k.starts_with("pipeline.pricing.") => {
            let rate: f64 = value
                .parse()
                .with_context(|| format!("{key} must be a number"))?;
            if !rate.is_finite() || rate < 0.0 {
                anyhow::bail!("{key} must be a non-negative number");
            }
        }
        "output.color_enabled" | "output.progress_enabled" => {
            let _: bool = value.parse().context("Value must be 'true' or 'false'")?;
        }
        "output.default_format" => {
            if OutputFormat::from_string(value).is_none() {
                anyhow::bail!("default_format must be one of: text, json, csv");
            }
        }
        _ => return Err(CliError::unknown_config_key(key).into()),
    }
    Ok(())
}

/// Parse a value to the TOML type its key expects
fn parse_config_value(key: &str, value: &str) -> Result<toml::Value> {
    match key {
        k if k.ends_with("_files")
            || k.ends_with("_length")
            || k.ends_with("_bytes")
            || k.ends_with("_micros")
            || k.ends_with(".seed") =>
        {
            let num: i64 = value.parse().context("Expected integer value")?;
            Ok(toml::Value::Integer(num))
        }
        k if k.ends_with("_enabled") => {
            let flag: bool = value
                .parse()
                .context("Expected boolean value (true/false)")?;
            Ok(toml::Value::Boolean(flag))
        }
        k if k.starts_with("pipeline.pricing.") => {
            let num: f64 = value.parse().context("Expected numeric value")?;
            Ok(toml::Value::Float(num))
        }
        _ => Ok(toml::Value::String(value.to_string())),
    }
}
