//! One-shot question without the interactive prompt.

use std::error::Error;

use crate::cli::context::AppContext;

pub async fn run_say(ctx: &AppContext, prompt: Vec<String>) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: monero-tutor say <prompt>");
        std::process::exit(1);
    }

    let mut session = ctx.session();
    let outcome = match session.submit(&prompt).await {
        Ok(outcome) => outcome,
        Err(rejection) => return Err(format!("prompt rejected: {rejection:?}").into()),
    };

    let message = outcome.message();
    if outcome.is_failure() {
        eprintln!("{}", message.content());
        std::process::exit(1);
    }

    println!("{}", message.content());
    let citations = message.citations();
    if !citations.is_empty() {
        println!();
        println!("Sources:");
        for url in citations {
            println!("  - {url}");
        }
    }
    Ok(())
}
