//! Picks the catalog entry used for the next completion request.
//!
//! Selection is deterministic: the preferred model if it is still in the
//! catalog, otherwise the first default-flagged entry, otherwise the first
//! entry. A fallback writes the chosen id back as the new preference so the
//! next lookup hits directly.

use std::error::Error;
use std::fmt;
use tracing::info;

use crate::core::config::data::{find_model, AppSettings, ModelConfig};
use crate::core::config::PreferenceStore;

/// Supplies API keys for catalog entries that do not carry one inline.
pub trait CredentialSource: Send + Sync {
    fn api_key_for(&self, model: &ModelConfig) -> Option<String>;
}

/// Credential source that never has a key.
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn api_key_for(&self, _model: &ModelConfig) -> Option<String> {
        None
    }
}

/// The configuration error of the chat pipeline: no request can be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    NoModelConfigured,
    MissingConfiguration { model_id: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NoModelConfigured => {
                write!(f, "No AI model configured. Please check your settings.")
            }
            ResolveError::MissingConfiguration { model_id } => write!(
                f,
                "AI model '{model_id}' is missing required configuration (API key or base URL)."
            ),
        }
    }
}

impl Error for ResolveError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    Preferred(&'a ModelConfig),
    Fallback(&'a ModelConfig),
    Empty,
}

impl<'a> Selection<'a> {
    pub fn model(self) -> Option<&'a ModelConfig> {
        match self {
            Selection::Preferred(model) | Selection::Fallback(model) => Some(model),
            Selection::Empty => None,
        }
    }
}

/// Pure selection step; no persistence and no credential checks.
pub fn select_model<'a>(settings: &AppSettings, models: &'a [ModelConfig]) -> Selection<'a> {
    if let Some(model) = find_model(models, &settings.preferred_model) {
        return Selection::Preferred(model);
    }
    models
        .iter()
        .find(|model| model.is_default)
        .or_else(|| models.first())
        .map_or(Selection::Empty, Selection::Fallback)
}

/// A catalog entry with everything needed to send a request.
#[derive(Clone, PartialEq)]
pub struct ResolvedModel {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub api_key: String,
}

impl fmt::Debug for ResolvedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedModel")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish()
    }
}

pub fn resolve_model(
    prefs: &PreferenceStore,
    credentials: &dyn CredentialSource,
) -> Result<ResolvedModel, ResolveError> {
    let settings = prefs.get_settings();
    let models = prefs.get_models();

    let model = match select_model(&settings, &models) {
        Selection::Preferred(model) => model,
        Selection::Fallback(model) => {
            info!(
                missing = %settings.preferred_model,
                fallback = %model.id,
                "preferred model not in catalog; falling back"
            );
            prefs.update_preferred_model(&model.id);
            model
        }
        Selection::Empty => return Err(ResolveError::NoModelConfigured),
    };

    let missing = || ResolveError::MissingConfiguration {
        model_id: model.id.clone(),
    };

    let base_url = model
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(missing)?;
    let api_key = model
        .inline_api_key()
        .map(str::to_string)
        .or_else(|| credentials.api_key_for(model))
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(missing)?;

    Ok(ResolvedModel {
        id: model.id.clone(),
        name: model.name.clone(),
        base_url: base_url.to_string(),
        api_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builtin_models::baseline_models;
    use crate::core::config::data::NewModel;
    use crate::core::config::io::{read_record, SETTINGS_KEY};
    use crate::core::storage::{KeyValueStore, MemoryStore};
    use std::collections::HashMap;
    use std::sync::Arc;

    struct StaticKeys(HashMap<String, String>);

    impl CredentialSource for StaticKeys {
        fn api_key_for(&self, model: &ModelConfig) -> Option<String> {
            self.0.get(&model.id).cloned()
        }
    }

    fn model(id: &str, is_default: bool, key: Option<&str>) -> ModelConfig {
        ModelConfig {
            id: id.to_string(),
            name: id.to_uppercase(),
            provider: None,
            base_url: Some("https://api.example.com/v1".to_string()),
            api_key: key.map(str::to_string),
            api_key_env: None,
            is_default,
        }
    }

    fn store_with(models: &[ModelConfig], preferred: &str) -> (Arc<MemoryStore>, PreferenceStore) {
        let storage = Arc::new(MemoryStore::new());
        let prefs = PreferenceStore::new(storage.clone());
        prefs.save_models(models);
        prefs.update_preferred_model(preferred);
        (storage, prefs)
    }

    #[test]
    fn selection_prefers_matching_entry() {
        let models = vec![model("a", true, None), model("b", false, None)];
        let settings = AppSettings {
            preferred_model: "b".into(),
            ..AppSettings::default()
        };
        assert_eq!(
            select_model(&settings, &models),
            Selection::Preferred(&models[1])
        );
    }

    #[test]
    fn selection_falls_back_to_default_then_first() {
        let settings = AppSettings {
            preferred_model: "missing".into(),
            ..AppSettings::default()
        };

        let with_default = vec![model("a", false, None), model("b", true, None)];
        assert_eq!(
            select_model(&settings, &with_default),
            Selection::Fallback(&with_default[1])
        );

        let without_default = vec![model("a", false, None), model("b", false, None)];
        assert_eq!(
            select_model(&settings, &without_default),
            Selection::Fallback(&without_default[0])
        );

        assert_eq!(select_model(&settings, &[]), Selection::Empty);
    }

    #[test]
    fn dangling_preference_self_heals_once() {
        let models = vec![model("a", false, Some("k")), model("b", true, Some("k"))];
        let (storage, prefs) = store_with(&models, "deleted");

        let resolved = resolve_model(&prefs, &NoCredentials).expect("resolves");
        assert_eq!(resolved.id, "b");
        let stored: AppSettings = read_record(&*storage, SETTINGS_KEY)
            .unwrap()
            .unwrap();
        assert_eq!(stored.preferred_model, "b");

        // Second resolution is a direct hit, so the settings record is not rewritten.
        storage.set(SETTINGS_KEY, "sentinel").unwrap();
        let again = resolve_model(&prefs, &NoCredentials).expect("resolves");
        assert_eq!(again, resolved);
        assert_eq!(storage.get(SETTINGS_KEY).unwrap().as_deref(), Some("sentinel"));
    }

    #[test]
    fn empty_catalog_is_a_configuration_error() {
        let (_, prefs) = store_with(&[], "anything");
        assert_eq!(
            resolve_model(&prefs, &NoCredentials),
            Err(ResolveError::NoModelConfigured)
        );
    }

    #[test]
    fn missing_key_or_url_is_a_configuration_error() {
        let mut no_url = model("no-url", true, Some("k"));
        no_url.base_url = Some("  ".into());
        let (_, prefs) = store_with(&[no_url], "no-url");
        assert_eq!(
            resolve_model(&prefs, &NoCredentials),
            Err(ResolveError::MissingConfiguration {
                model_id: "no-url".into()
            })
        );

        let (_, prefs) = store_with(&[model("no-key", true, None)], "no-key");
        assert_eq!(
            resolve_model(&prefs, &NoCredentials),
            Err(ResolveError::MissingConfiguration {
                model_id: "no-key".into()
            })
        );
    }

    #[test]
    fn fallback_is_persisted_even_when_entry_is_unusable() {
        let (_, prefs) = store_with(&[model("only", false, None)], "gone");
        assert!(resolve_model(&prefs, &NoCredentials).is_err());
        assert_eq!(prefs.get_settings().preferred_model, "only");
    }

    #[test]
    fn credential_source_fills_missing_keys() {
        let (_, prefs) = store_with(&[model("a", true, None)], "a");
        let keys = StaticKeys(HashMap::from([("a".to_string(), "sk-from-source".to_string())]));
        let resolved = resolve_model(&prefs, &keys).expect("resolves");
        assert_eq!(resolved.api_key, "sk-from-source");
        assert_eq!(resolved.base_url, "https://api.example.com/v1");
    }

    #[test]
    fn inline_key_wins_over_credential_source() {
        let (_, prefs) = store_with(&[model("a", true, Some("inline"))], "a");
        let keys = StaticKeys(HashMap::from([("a".to_string(), "other".to_string())]));
        assert_eq!(resolve_model(&prefs, &keys).unwrap().api_key, "inline");
    }

    #[test]
    fn deleting_preferred_model_re_resolves_to_default() {
        let storage = Arc::new(MemoryStore::new());
        let prefs = PreferenceStore::new(storage.clone());
        let custom = NewModel {
            id: "custom".into(),
            name: "Custom".into(),
            base_url: Some("https://api.example.com/v1".into()),
            api_key: Some("sk".into()),
            ..Default::default()
        }
        .into_config()
        .unwrap();
        prefs.add_model(custom).unwrap();
        prefs.update_preferred_model("custom");

        assert!(prefs.delete_model("custom"));
        let default_model = baseline_models().into_iter().find(|m| m.is_default).unwrap();
        let keys = StaticKeys(HashMap::from([(default_model.id.clone(), "k".to_string())]));

        let resolved = resolve_model(&prefs, &keys).expect("resolves to default");
        assert_eq!(resolved.id, default_model.id);
        assert_eq!(prefs.get_settings().preferred_model, default_model.id);
    }

    #[test]
    fn debug_output_redacts_key() {
        let resolved = ResolvedModel {
            id: "a".into(),
            name: "A".into(),
            base_url: "https://x".into(),
            api_key: "sk-secret".into(),
        };
        assert!(!format!("{resolved:?}").contains("sk-secret"));
    }
}
