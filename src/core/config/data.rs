use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

use crate::core::builtin_models::default_settings;

/// Process-wide user preferences.
///
/// Deserialization starts from [`AppSettings::default`], so any key missing
/// from the persisted record keeps its default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub preferred_model: String,
    pub dont_log_chats: bool,
    #[serde(rename = "anonymizeIP")]
    pub anonymize_ip: bool,
    pub disable_telemetry: bool,
    /// Sampling temperature, expected in `0.0..=1.0`. Range checks happen at the CLI.
    pub temperature: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        default_settings()
    }
}

/// One entry of the model catalog. `id` doubles as the wire-level `model` field.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable consulted when no key is stored with the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_key_env", &self.api_key_env)
            .field("is_default", &self.is_default)
            .finish()
    }
}

/// Raw fields for a user-added catalog entry.
#[derive(Debug, Clone, Default)]
pub struct NewModel {
    pub id: String,
    pub name: String,
    pub provider: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub api_key_env: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A required field was empty after trimming.
    MissingField(&'static str),
    /// The id is already taken in the catalog or reserved by a baseline entry.
    DuplicateId(String),
    /// Only baseline entries may carry the default flag.
    DefaultNotAllowed(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::MissingField(field) => write!(f, "Model {field} is required"),
            CatalogError::DuplicateId(id) => {
                write!(f, "A model with the id '{id}' already exists")
            }
            CatalogError::DefaultNotAllowed(id) => {
                write!(f, "Model '{id}' cannot be marked as a default model")
            }
        }
    }
}

impl Error for CatalogError {}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl NewModel {
    /// Trims every field and builds a non-default entry. Blank optional fields become `None`.
    pub fn into_config(self) -> Result<ModelConfig, CatalogError> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(CatalogError::MissingField("id"));
        }
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::MissingField("name"));
        }

        Ok(ModelConfig {
            id,
            name,
            provider: trimmed(self.provider),
            base_url: trimmed(self.base_url),
            api_key: trimmed(self.api_key),
            api_key_env: trimmed(self.api_key_env),
            is_default: false,
        })
    }
}

impl ModelConfig {
    pub fn has_base_url(&self) -> bool {
        self.base_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// Key stored directly with the entry, ignoring blanks.
    pub fn inline_api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    /// Copy safe to print or export: the plaintext key is replaced by a marker.
    pub fn redacted(&self) -> ModelConfig {
        ModelConfig {
            api_key: self.api_key.as_ref().map(|_| "***".to_string()),
            ..self.clone()
        }
    }
}

pub fn find_model<'a>(models: &'a [ModelConfig], id: &str) -> Option<&'a ModelConfig> {
    models.iter().find(|model| model.id == id)
}
