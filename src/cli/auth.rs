//! `auth` / `deauth`: keyring-backed API keys per model.

use std::error::Error;
use std::io::{self, IsTerminal, Write};

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::context::AppContext;
use crate::core::config::data::find_model;

fn require_model(ctx: &AppContext, model_id: &str) -> Result<(), Box<dyn Error>> {
    if find_model(&ctx.prefs().get_models(), model_id).is_none() {
        return Err(format!(
            "No model with id '{model_id}'. Run 'monero-tutor models list' to see the catalog."
        )
        .into());
    }
    if !ctx.auth().uses_keyring() {
        return Err("The keyring is disabled for --ephemeral runs".into());
    }
    Ok(())
}

pub async fn run_auth(ctx: &AppContext, model_id: &str) -> Result<(), Box<dyn Error>> {
    require_model(ctx, model_id)?;

    if io::stdin().is_terminal() {
        print!("🔑 API key for {model_id}: ");
        io::stdout().flush()?;
    }
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let key = lines.next_line().await?.unwrap_or_default();
    let key = key.trim();
    if key.is_empty() {
        return Err("No API key provided".into());
    }

    ctx.auth().store_token(model_id, key)?;
    println!("✅ Stored API key for '{model_id}' in the system keyring");
    Ok(())
}

pub fn run_deauth(ctx: &AppContext, model_id: &str) -> Result<(), Box<dyn Error>> {
    require_model(ctx, model_id)?;
    if ctx.auth().remove_token(model_id)? {
        println!("✅ Removed API key for '{model_id}' from the system keyring");
    } else {
        println!("No stored API key for '{model_id}'");
    }
    Ok(())
}
