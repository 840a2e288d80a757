//! Command-line interface parsing and dispatch.
//!
//! `chat` is the default command. Every other subcommand is a one-shot
//! operation over the persisted preferences, catalog, or chat history.

pub mod auth;
pub mod chat;
pub mod context;
pub mod history;
pub mod models;
pub mod say;
pub mod settings;
pub mod transcript;


use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::logging::init_tracing;
use context::AppContext;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "monero-tutor")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A privacy-first AI tutor for Monero (XMR)")]
#[command(
    long_about = "AI Monero Tutor answers questions about Monero through any \
OpenAI-compatible chat completion API. Conversations, settings, and the model \
catalog are stored as JSON files in the data directory.\n\n\
API keys:\n\
  Baseline models read OPENROUTER_API_KEY and OPENROUTER_API_KEY2.\n\
  Use 'monero-tutor auth <model>' to store a key in the system keyring instead.\n\n\
Environment Variables:\n\
  MONERO_TUTOR_DATA_DIR   Override the data directory\n\
  MONERO_TUTOR_LOG        Log filter (e.g. 'debug' or 'monero_tutor=trace')\n\n\
Chat commands:\n\
  /clear            Delete the saved history and start over\n\
  /model            Show which model will answer\n\
  /quit             Leave the chat"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding settings, model catalog, and chat history
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Keep everything in memory for this run; nothing is read from or written to disk
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat (default)
    Chat,
    /// Ask a single question and print the answer
    Say {
        /// The question to ask
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Inspect and edit the model catalog
    Models {
        #[command(subcommand)]
        command: ModelsCommand,
    },
    /// Change a preference
    Set {
        /// One of: temperature, dont-log-chats, anonymize-ip, disable-telemetry, preferred-model
        key: String,
        value: String,
    },
    /// Print the current preferences
    Config,
    /// Show or delete the saved conversation
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
    /// Write settings, catalog, and history as one JSON document (API keys redacted)
    Export {
        /// Destination file; prints to stdout when omitted
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Store an API key for a model in the system keyring (read from stdin)
    Auth {
        model_id: String,
    },
    /// Remove a model's API key from the system keyring
    Deauth {
        model_id: String,
    },
}

#[derive(Subcommand)]
pub enum ModelsCommand {
    /// List catalog entries and where their API keys come from
    List,
    /// Add a custom model
    Add {
        /// Identifier sent to the API as the `model` field
        #[arg(long)]
        id: String,
        /// Display name
        #[arg(long)]
        name: String,
        #[arg(long)]
        provider: Option<String>,
        /// OpenAI-compatible base URL, e.g. https://openrouter.ai/api/v1
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        /// API key stored in plain text with the catalog entry
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
        /// Environment variable to read the API key from
        #[arg(long, value_name = "VAR")]
        api_key_env: Option<String>,
    },
    /// Remove a custom model
    Remove { id: String },
    /// Make a model the preferred one
    Use { id: String },
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// Print the saved conversation
    Show,
    /// Delete the saved conversation
    Clear,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let ctx = AppContext::open(args.data_dir, args.ephemeral)?;

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => chat::run_chat(&ctx).await,
        Commands::Say { prompt } => say::run_say(&ctx, prompt).await,
        Commands::Models { command } => match command {
            ModelsCommand::List => {
                models::list_models(&ctx);
                Ok(())
            }
            ModelsCommand::Add {
                id,
                name,
                provider,
                base_url,
                api_key,
                api_key_env,
            } => models::add_model(
                &ctx,
                crate::core::config::NewModel {
                    id,
                    name,
                    provider,
                    base_url,
                    api_key,
                    api_key_env,
                },
            ),
            ModelsCommand::Remove { id } => models::remove_model(&ctx, &id),
            ModelsCommand::Use { id } => models::use_model(&ctx, &id),
        },
        Commands::Set { key, value } => match settings::set_setting(ctx.prefs(), &key, &value) {
            Ok(message) => {
                println!("✅ {message}");
                Ok(())
            }
            Err(err) => {
                err.print();
                std::process::exit(1);
            }
        },
        Commands::Config => {
            settings::print_config(&ctx);
            Ok(())
        }
        Commands::History { command } => match command {
            HistoryCommand::Show => {
                history::show_history(&ctx);
                Ok(())
            }
            HistoryCommand::Clear => {
                history::clear_history(&ctx);
                Ok(())
            }
        },
        Commands::Export { output } => history::export(&ctx, output.as_deref()),
        Commands::Auth { model_id } => auth::run_auth(&ctx, &model_id).await,
        Commands::Deauth { model_id } => auth::run_deauth(&ctx, &model_id),
    }
}
