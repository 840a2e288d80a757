//! Built-in model catalog and default settings
//!
//! The baseline entries and default preferences live in `builtin_models.toml`,
//! embedded at build time. They seed the catalog and settings on first use.

use serde::Deserialize;

use crate::core::config::data::{AppSettings, ModelConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct BuiltinModel {
    pub id: String,
    pub name: String,
    pub provider: Option<String>,
    pub base_url: Option<String>,
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct BuiltinSettings {
    preferred_model: String,
    dont_log_chats: bool,
    anonymize_ip: bool,
    disable_telemetry: bool,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct BuiltinConfig {
    settings: BuiltinSettings,
    models: Vec<BuiltinModel>,
}

impl From<BuiltinModel> for ModelConfig {
    fn from(model: BuiltinModel) -> Self {
        ModelConfig {
            id: model.id,
            name: model.name,
            provider: model.provider,
            base_url: model.base_url,
            api_key: None,
            api_key_env: model.api_key_env,
            is_default: model.is_default,
        }
    }
}

fn load_builtin_config() -> BuiltinConfig {
    const CONFIG_CONTENT: &str = include_str!("../builtin_models.toml");

    toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtin_models.toml")
}

/// Baseline catalog, in catalog order.
pub fn baseline_models() -> Vec<ModelConfig> {
    load_builtin_config()
        .models
        .into_iter()
        .map(ModelConfig::from)
        .collect()
}

pub fn default_settings() -> AppSettings {
    let settings = load_builtin_config().settings;
    AppSettings {
        preferred_model: settings.preferred_model,
        dont_log_chats: settings.dont_log_chats,
        anonymize_ip: settings.anonymize_ip,
        disable_telemetry: settings.disable_telemetry,
        temperature: settings.temperature,
    }
}

/// True when `id` names a baseline entry.
pub fn is_baseline_model(id: &str) -> bool {
    load_builtin_config().models.iter().any(|model| model.id == id)
}
