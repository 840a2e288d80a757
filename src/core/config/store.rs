use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::core::builtin_models::{baseline_models, is_baseline_model};
use crate::core::config::data::{find_model, AppSettings, CatalogError, ModelConfig};
use crate::core::config::io::{read_record, write_record, MODELS_KEY, SETTINGS_KEY};
use crate::core::storage::KeyValueStore;

/// A record that has not been read from storage yet, or its last known value.
#[derive(Debug, Clone, Default)]
enum Slot<T> {
    #[default]
    Uninitialized,
    Loaded(T),
}

#[derive(Debug, Default)]
struct PreferenceState {
    settings: Slot<AppSettings>,
    models: Slot<Vec<ModelConfig>>,
}

/// Owner of the settings and model catalog records.
///
/// Reads never fail: unreadable or missing records fall back to the built-in
/// defaults. Writes are best-effort and only log on failure.
pub struct PreferenceStore {
    storage: Arc<dyn KeyValueStore>,
    state: Mutex<PreferenceState>,
}

impl PreferenceStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: Mutex::new(PreferenceState::default()),
        }
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    fn state(&self) -> MutexGuard<'_, PreferenceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops cached records so the next read goes back to storage.
    pub fn invalidate(&self) {
        *self.state() = PreferenceState::default();
    }

    pub fn is_initialized(&self) -> bool {
        let state = self.state();
        matches!(state.settings, Slot::Loaded(_)) && matches!(state.models, Slot::Loaded(_))
    }

    pub fn get_settings(&self) -> AppSettings {
        let mut state = self.state();
        if let Slot::Loaded(settings) = &state.settings {
            return settings.clone();
        }

        let settings = match read_record::<AppSettings>(self.storage.as_ref(), SETTINGS_KEY) {
            Ok(Some(settings)) => settings,
            Ok(None) => AppSettings::default(),
            Err(err) => {
                warn!(error = %err, "using default settings");
                AppSettings::default()
            }
        };
        state.settings = Slot::Loaded(settings.clone());
        settings
    }

    /// Replaces the persisted settings. The in-memory copy updates even if the write fails.
    pub fn save_settings(&self, settings: &AppSettings) {
        self.state().settings = Slot::Loaded(settings.clone());
        if let Err(err) = write_record(self.storage.as_ref(), SETTINGS_KEY, settings) {
            warn!(error = %err, "failed to save settings");
        }
    }

    pub fn get_models(&self) -> Vec<ModelConfig> {
        let mut state = self.state();
        if let Slot::Loaded(models) = &state.models {
            return models.clone();
        }

        let models = match read_record::<Vec<ModelConfig>>(self.storage.as_ref(), MODELS_KEY) {
            Ok(Some(models)) => models,
            Ok(None) => baseline_models(),
            Err(err) => {
                warn!(error = %err, "using baseline model catalog");
                baseline_models()
            }
        };
        state.models = Slot::Loaded(models.clone());
        models
    }

    pub fn save_models(&self, models: &[ModelConfig]) {
        self.state().models = Slot::Loaded(models.to_vec());
        if let Err(err) = write_record(self.storage.as_ref(), MODELS_KEY, models) {
            warn!(error = %err, "failed to save model catalog");
        }
    }

    /// Appends a user entry. Ids must be unique in the catalog and may not shadow a
    /// baseline id, even one the user has since removed from the catalog. User entries
    /// never carry the default flag.
    pub fn add_model(&self, model: ModelConfig) -> Result<(), CatalogError> {
        if model.is_default {
            return Err(CatalogError::DefaultNotAllowed(model.id));
        }
        let mut models = self.get_models();
        if find_model(&models, &model.id).is_some() || is_baseline_model(&model.id) {
            return Err(CatalogError::DuplicateId(model.id));
        }
        debug!(model_id = %model.id, "adding model to catalog");
        models.push(model);
        self.save_models(&models);
        Ok(())
    }

    /// Removes a non-default entry. Returns `false`, leaving the catalog untouched,
    /// when `id` is unknown or flagged default.
    pub fn delete_model(&self, id: &str) -> bool {
        let mut models = self.get_models();
        let Some(index) = models.iter().position(|model| model.id == id) else {
            debug!(model_id = %id, "delete ignored: no such model");
            return false;
        };
        if models[index].is_default {
            debug!(model_id = %id, "delete refused: default model");
            return false;
        }
        models.remove(index);
        self.save_models(&models);
        true
    }

    pub fn update_preferred_model(&self, id: &str) {
        let mut settings = self.get_settings();
        settings.preferred_model = id.to_string();
        self.save_settings(&settings);
    }
}
