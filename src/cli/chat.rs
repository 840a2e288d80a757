//! Line-oriented interactive chat.

use std::error::Error;
use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::context::AppContext;
use crate::cli::transcript::format_message;
use crate::core::constants::APP_TITLE;
use crate::core::session::{ChatSession, Rejection};

/// Slash commands understood at the chat prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum ChatCommand<'a> {
    Quit,
    Clear,
    Model,
    Help,
    Unknown(&'a str),
    Prompt(&'a str),
}

pub fn parse_line(line: &str) -> ChatCommand<'_> {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return ChatCommand::Prompt(line);
    };
    match command.split_whitespace().next().unwrap_or_default() {
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "clear" => ChatCommand::Clear,
        "model" => ChatCommand::Model,
        "help" => ChatCommand::Help,
        _ => ChatCommand::Unknown(trimmed),
    }
}

fn print_model_line(session: &ChatSession) {
    match session.resolve() {
        Ok(model) => println!("🤖 Model: {} ({})", model.name, model.id),
        Err(err) => println!("⚠️  {err}"),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /clear   Delete the saved history and start over");
    println!("  /model   Show which model will answer");
    println!("  /quit    Leave the chat");
}

pub async fn run_chat(ctx: &AppContext) -> Result<(), Box<dyn Error>> {
    let mut session = ctx.session();

    println!("🛡️  {APP_TITLE}");
    print_model_line(&session);
    if ctx.prefs().get_settings().dont_log_chats {
        println!("🔒 Chat logging is off; this conversation will not be saved.");
    }
    println!("Type /help for commands.");
    println!();
    for message in session.messages() {
        println!("{}\n", format_message(message));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match parse_line(&line) {
            ChatCommand::Quit => break,
            ChatCommand::Clear => {
                session.conversation().clear();
                session.conversation_mut().reset();
                println!("🧹 History cleared.\n");
                for message in session.messages() {
                    println!("{}\n", format_message(message));
                }
            }
            ChatCommand::Model => print_model_line(&session),
            ChatCommand::Help => print_help(),
            ChatCommand::Unknown(command) => {
                println!("❓ Unknown command: {command}. Type /help for commands.");
            }
            ChatCommand::Prompt(text) => match session.submit(text).await {
                Ok(outcome) => println!("\n{}\n", format_message(outcome.message())),
                Err(Rejection::EmptyInput) => {}
                Err(Rejection::Busy) => println!("⏳ Still waiting for the previous answer."),
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_commands_are_recognized() {
        assert_eq!(parse_line("/quit"), ChatCommand::Quit);
        assert_eq!(parse_line("  /exit  "), ChatCommand::Quit);
        assert_eq!(parse_line("/clear"), ChatCommand::Clear);
        assert_eq!(parse_line("/model"), ChatCommand::Model);
        assert_eq!(parse_line("/help"), ChatCommand::Help);
        assert_eq!(parse_line("/wat now"), ChatCommand::Unknown("/wat now"));
    }

    #[test]
    fn everything_else_is_a_prompt() {
        assert_eq!(
            parse_line("How do subaddresses work?"),
            ChatCommand::Prompt("How do subaddresses work?")
        );
        assert_eq!(parse_line(""), ChatCommand::Prompt(""));
    }
}
