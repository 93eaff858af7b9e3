use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use client_core::{ClientConfig, Locale};

pub const SETTINGS_FILE: &str = "bem.toml";
const DEFAULT_DATABASE_URL: &str = "sqlite://./data/bem_session.db";

#[derive(Debug, Clone)]
pub struct Settings {
    pub client: ClientConfig,
    pub database_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            database_url: DEFAULT_DATABASE_URL.into(),
        }
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Reads `path` when it exists, then applies `BEM__*` overrides from `env`.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut values = HashMap::new();
    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
        for (key, value) in file_cfg {
            let value = match value {
                toml::Value::String(text) => text,
                other => other.to_string(),
            };
            values.insert(key, value);
        }
    }

    for key in [
        "base_url",
        "client_id",
        "client_secret",
        "database_url",
        "locale",
        "search_debounce_ms",
        "navigation_delay_ms",
        "request_timeout_secs",
        "events_path",
        "login_path",
        "current_user_path",
        "save_fcm_token_path",
    ] {
        if let Some(v) = env(&format!("BEM__{}", key.to_ascii_uppercase())) {
            values.insert(key.to_string(), v);
        }
    }

    let mut settings = Settings::default();
    for (key, value) in values {
        apply(&mut settings, &key, value)?;
    }
    settings.database_url = normalize_database_url(&settings.database_url);
    settings.client.validate()?;
    Ok(settings)
}

fn apply(settings: &mut Settings, key: &str, value: String) -> anyhow::Result<()> {
    let client = &mut settings.client;
    match key {
        "base_url" => client.base_url = value,
        "client_id" => client.client_id = value,
        "client_secret" => client.client_secret = value,
        "database_url" => settings.database_url = value,
        "locale" => client.locale = value.parse::<Locale>().map_err(anyhow::Error::msg)?,
        "search_debounce_ms" => client.search_debounce = Duration::from_millis(parse_u64(key, &value)?),
        "navigation_delay_ms" => client.navigation_delay = Duration::from_millis(parse_u64(key, &value)?),
        "request_timeout_secs" => client.request_timeout = Duration::from_secs(parse_u64(key, &value)?),
        "events_path" => client.endpoints.events = value,
        "login_path" => client.endpoints.login = value,
        "current_user_path" => client.endpoints.current_user = value,
        "save_fcm_token_path" => client.endpoints.save_fcm_token = value,
        other => tracing::warn!(key = other, "ignoring unknown setting"),
    }
    Ok(())
}

fn parse_u64(key: &str, value: &str) -> anyhow::Result<u64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("setting '{key}' must be a non-negative integer, got '{value}'"))
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return DEFAULT_DATABASE_URL.to_string();
    }

    if raw_database_url.starts_with("sqlite:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
