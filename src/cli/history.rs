//! `history` and `export`: reading the persisted records back out.

use std::error::Error;
use std::io::Write;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::cli::context::AppContext;
use crate::cli::transcript::format_message;
use crate::core::config::io::path_display;
use crate::core::config::{AppSettings, ModelConfig};
use crate::core::message::Message;

pub fn show_history(ctx: &AppContext) {
    let history = ctx.conversation().persisted_history();
    if history.is_empty() {
        println!("No saved chat history.");
        if ctx.prefs().get_settings().dont_log_chats {
            println!("Chat logging is off. Enable it with 'monero-tutor set dont-log-chats off'.");
        }
        return;
    }
    for message in &history {
        println!("{}\n", format_message(message));
    }
}

pub fn clear_history(ctx: &AppContext) {
    ctx.conversation().clear();
    println!("🧹 Chat history cleared");
}

/// Everything the app stores, with API keys masked.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub settings: AppSettings,
    pub models: Vec<ModelConfig>,
    pub chat_history: Vec<Message>,
    pub export_date: String,
}

pub fn build_export(ctx: &AppContext) -> ExportBundle {
    ExportBundle {
        settings: ctx.prefs().get_settings(),
        models: ctx
            .prefs()
            .get_models()
            .iter()
            .map(ModelConfig::redacted)
            .collect(),
        chat_history: ctx.conversation().persisted_history(),
        export_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

pub fn export(ctx: &AppContext, output: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(&build_export(ctx))?;
    let Some(path) = output else {
        println!("{json}");
        return Ok(());
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(dir)?;
    temp_file.write_all(json.as_bytes())?;
    temp_file.write_all(b"\n")?;
    temp_file.as_file_mut().sync_all()?;
    temp_file.persist(path).map_err(|err| err.error)?;

    eprintln!("✅ Exported to {}", path_display(path));
    Ok(())
}
