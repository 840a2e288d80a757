//! `set` and `config`: editing and printing preferences.

use std::fmt;

use crate::cli::context::AppContext;
use crate::core::config::data::find_model;
use crate::core::config::io::path_display;
use crate::core::config::PreferenceStore;

pub const SETTING_KEYS: [&str; 5] = [
    "temperature",
    "dont-log-chats",
    "anonymize-ip",
    "disable-telemetry",
    "preferred-model",
];

/// Errors that can occur when changing a preference.
#[derive(Debug, PartialEq)]
pub enum SettingError {
    UnknownKey(String),
    InvalidBoolean(String),
    InvalidTemperature(String),
    UnknownModel(String),
}

impl SettingError {
    /// Print the error message to stderr with a hint.
    pub fn print(&self) {
        eprintln!("❌ {self}");
        match self {
            SettingError::UnknownKey(_) => {
                eprintln!("   Valid keys: {}", SETTING_KEYS.join(", "));
            }
            SettingError::InvalidBoolean(_) => {
                eprintln!("   Use 'on' or 'off' (also accepts true/false, yes/no)");
            }
            SettingError::InvalidTemperature(_) => {
                eprintln!("   Example: monero-tutor set temperature 0.7");
            }
            SettingError::UnknownModel(_) => {
                eprintln!("   Run 'monero-tutor models list' to see the catalog.");
            }
        }
    }
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(f, "Unknown config key: {key}"),
            SettingError::InvalidBoolean(value) => write!(f, "Invalid boolean value: {value}"),
            SettingError::InvalidTemperature(value) => {
                write!(f, "Temperature must be a number between 0.0 and 1.0, got '{value}'")
            }
            SettingError::UnknownModel(id) => write!(f, "No model with id '{id}'"),
        }
    }
}

impl std::error::Error for SettingError {}

pub fn parse_bool(value: &str) -> Result<bool, SettingError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(SettingError::InvalidBoolean(value.to_string())),
    }
}

pub fn parse_temperature(value: &str) -> Result<f32, SettingError> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|t| (0.0..=1.0).contains(t))
        .ok_or_else(|| SettingError::InvalidTemperature(value.to_string()))
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

/// Applies one `key value` pair and returns a confirmation line.
pub fn set_setting(prefs: &PreferenceStore, key: &str, value: &str) -> Result<String, SettingError> {
    let mut settings = prefs.get_settings();
    let confirmation = match key {
        "temperature" => {
            settings.temperature = parse_temperature(value)?;
            format!("Set temperature to {}", settings.temperature)
        }
        "dont-log-chats" => {
            settings.dont_log_chats = parse_bool(value)?;
            format!("Set dont-log-chats to {}", on_off(settings.dont_log_chats))
        }
        "anonymize-ip" => {
            settings.anonymize_ip = parse_bool(value)?;
            format!("Set anonymize-ip to {}", on_off(settings.anonymize_ip))
        }
        "disable-telemetry" => {
            settings.disable_telemetry = parse_bool(value)?;
            format!("Set disable-telemetry to {}", on_off(settings.disable_telemetry))
        }
        "preferred-model" => {
            let id = value.trim();
            if find_model(&prefs.get_models(), id).is_none() {
                return Err(SettingError::UnknownModel(id.to_string()));
            }
            settings.preferred_model = id.to_string();
            format!("Set preferred-model to {id}")
        }
        _ => return Err(SettingError::UnknownKey(key.to_string())),
    };
    prefs.save_settings(&settings);
    Ok(confirmation)
}

pub fn print_config(ctx: &AppContext) {
    let settings = ctx.prefs().get_settings();
    println!("⚙️  Preferences");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  preferred-model:   {}", settings.preferred_model);
    println!("  temperature:       {}", settings.temperature);
    println!("  dont-log-chats:    {}", on_off(settings.dont_log_chats));
    println!("  anonymize-ip:      {}", on_off(settings.anonymize_ip));
    println!("  disable-telemetry: {}", on_off(settings.disable_telemetry));
    println!();
    match ctx.data_dir() {
        Some(dir) => println!("Data directory: {}", path_display(dir)),
        None => println!("Data directory: (in memory, nothing is saved)"),
    }
}
