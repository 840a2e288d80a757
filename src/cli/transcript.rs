//! Plain-text rendering of chat messages for the terminal.

use chrono::Local;

use crate::core::message::{Message, Role};

pub fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Tutor",
    }
}

/// Header line, body, and a `Sources:` list when the message carries citations.
pub fn format_message(message: &Message) -> String {
    let time = message.timestamp().with_timezone(&Local).format("%Y-%m-%d %H:%M");
    let mut out = format!("[{time}] {}:\n{}", speaker(message.role()), message.content());

    let citations = message.citations();
    if !citations.is_empty() {
        out.push_str("\n\nSources:");
        for url in citations {
            out.push_str("\n  - ");
            out.push_str(url);
        }
    }
    out
}
