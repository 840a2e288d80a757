//! `models` subcommands: list, add, remove, use.

use std::error::Error;

use tracing::debug;

use crate::cli::context::AppContext;
use crate::core::config::data::find_model;
use crate::core::config::NewModel;
use crate::core::resolver::select_model;
use crate::utils::url::is_http_url;

pub fn list_models(ctx: &AppContext) {
    let settings = ctx.prefs().get_settings();
    let models = ctx.prefs().get_models();

    println!("🤖 Model catalog");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    for model in &models {
        let marker = if model.id == settings.preferred_model {
            "★"
        } else {
            " "
        };
        let default_tag = if model.is_default { " (default)" } else { "" };
        println!("{marker} {}{default_tag}", model.name);
        println!("    id:       {}", model.id);
        if let Some(provider) = &model.provider {
            println!("    provider: {provider}");
        }
        println!(
            "    base url: {}",
            model.base_url.as_deref().unwrap_or("(not set)")
        );
        let key = match ctx.auth().credential_origin(model) {
            Some(origin) => format!("✅ from {}", origin.label()),
            None => match &model.api_key_env {
                Some(var) => format!("❌ missing (set {var} or run 'monero-tutor auth {}')", model.id),
                None => format!("❌ missing (run 'monero-tutor auth {}')", model.id),
            },
        };
        println!("    api key:  {key}");
        println!();
    }

    println!("★ marks the preferred model. Change it with 'monero-tutor models use <id>'.");
}

pub fn add_model(ctx: &AppContext, new_model: NewModel) -> Result<(), Box<dyn Error>> {
    if let Some(url) = new_model.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
        if !is_http_url(url) {
            return Err(format!("Invalid base URL '{url}': expected http:// or https://").into());
        }
    }

    let config = new_model.into_config()?;
    let id = config.id.clone();
    let name = config.name.clone();
    ctx.prefs().add_model(config)?;
    println!("✅ Added model '{name}' ({id})");
    println!("   Select it with 'monero-tutor models use {id}'");
    Ok(())
}

pub fn remove_model(ctx: &AppContext, id: &str) -> Result<(), Box<dyn Error>> {
    let prefs = ctx.prefs();
    let models = prefs.get_models();
    let Some(entry) = find_model(&models, id) else {
        return Err(format!("No model with id '{id}'").into());
    };
    if entry.is_default {
        return Err(format!("'{id}' is the default model and cannot be removed").into());
    }

    let was_preferred = prefs.get_settings().preferred_model == id;
    if !prefs.delete_model(id) {
        return Err(format!("Could not remove model '{id}'").into());
    }
    println!("🗑️  Removed model '{id}'");

    if let Err(err) = ctx.auth().remove_token(id) {
        debug!(model_id = id, error = %err, "could not remove keyring entry");
    }

    if was_preferred {
        let remaining = prefs.get_models();
        match select_model(&prefs.get_settings(), &remaining).model() {
            Some(fallback) => {
                prefs.update_preferred_model(&fallback.id);
                println!("   Preferred model is now '{}'", fallback.id);
            }
            None => println!("   No models left; add one with 'monero-tutor models add'"),
        }
    }
    Ok(())
}

pub fn use_model(ctx: &AppContext, id: &str) -> Result<(), Box<dyn Error>> {
    let models = ctx.prefs().get_models();
    let Some(entry) = find_model(&models, id) else {
        return Err(format!(
            "No model with id '{id}'. Run 'monero-tutor models list' to see the catalog."
        )
        .into());
    };
    ctx.prefs().update_preferred_model(&entry.id);
    println!("✅ Preferred model set to '{}' ({})", entry.name, entry.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthManager;
    use crate::core::builtin_models::baseline_models;
    use crate::core::storage::MemoryStore;
    use std::sync::Arc;

    fn context() -> AppContext {
        AppContext::with_storage(
            Arc::new(MemoryStore::new()),
            AuthManager::new_with_keyring(false),
            None,
        )
    }

    fn custom(id: &str) -> NewModel {
        NewModel {
            id: id.to_string(),
            name: format!("{id} name"),
            base_url: Some("https://api.example.com/v1".to_string()),
            api_key: Some("sk-test".to_string()),
            ..NewModel::default()
        }
    }

    #[test]
    fn add_then_use_custom_model() {
        let ctx = context();
        add_model(&ctx, custom("local/llama")).expect("add");
        use_model(&ctx, "local/llama").expect("use");

        assert_eq!(ctx.prefs().get_settings().preferred_model, "local/llama");
        assert!(find_model(&ctx.prefs().get_models(), "local/llama").is_some());
    }

    #[test]
    fn add_rejects_non_http_base_url() {
        let ctx = context();
        let mut model = custom("bad-url");
        model.base_url = Some("openrouter.ai/api/v1".to_string());

        assert!(add_model(&ctx, model).is_err());
        assert!(find_model(&ctx.prefs().get_models(), "bad-url").is_none());
    }

    #[test]
    fn add_rejects_duplicate_and_blank_fields() {
        let ctx = context();
        let baseline_id = baseline_models()[0].id.clone();
        assert!(add_model(&ctx, custom(&baseline_id)).is_err());

        let mut nameless = custom("nameless");
        nameless.name = "   ".to_string();
        assert!(add_model(&ctx, nameless).is_err());
    }

    #[test]
    fn use_unknown_model_leaves_preference_alone() {
        let ctx = context();
        let before = ctx.prefs().get_settings().preferred_model;
        assert!(use_model(&ctx, "does/not-exist").is_err());
        assert_eq!(ctx.prefs().get_settings().preferred_model, before);
    }

    #[test]
    fn removing_preferred_model_falls_back_to_default() {
        let ctx = context();
        add_model(&ctx, custom("temp/model")).expect("add");
        use_model(&ctx, "temp/model").expect("use");

        remove_model(&ctx, "temp/model").expect("remove");

        let default_id = baseline_models()
            .into_iter()
            .find(|m| m.is_default)
            .map(|m| m.id)
            .expect("a default baseline model");
        assert_eq!(ctx.prefs().get_settings().preferred_model, default_id);
    }

    #[test]
    fn preference_heals_without_any_credentials() {
        let ctx = context();
        let mut keyless = custom("keyless/model");
        keyless.api_key = None;
        add_model(&ctx, keyless).expect("add");
        use_model(&ctx, "keyless/model").expect("use");

        remove_model(&ctx, "keyless/model").expect("remove");

        let settings = ctx.prefs().get_settings();
        let healed = find_model(&ctx.prefs().get_models(), &settings.preferred_model)
            .cloned()
            .expect("preference points at a catalog entry");
        assert!(healed.is_default);
    }

    #[test]
    fn removing_other_model_keeps_preference() {
        let ctx = context();
        add_model(&ctx, custom("a/model")).expect("add a");
        add_model(&ctx, custom("b/model")).expect("add b");
        use_model(&ctx, "a/model").expect("use");

        remove_model(&ctx, "b/model").expect("remove");
        assert_eq!(ctx.prefs().get_settings().preferred_model, "a/model");
    }

    #[test]
    fn default_and_unknown_models_cannot_be_removed() {
        let ctx = context();
        let default_id = baseline_models()
            .into_iter()
            .find(|m| m.is_default)
            .map(|m| m.id)
            .expect("a default baseline model");

        assert!(remove_model(&ctx, &default_id).is_err());
        assert!(remove_model(&ctx, "never/added").is_err());
        assert!(find_model(&ctx.prefs().get_models(), &default_id).is_some());
    }
}
