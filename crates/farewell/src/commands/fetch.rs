use std::path::Path;

use colored::Colorize;

use crate::config::Config;
use crate::loader::{self, Loader, Message};

/// Run the loader once without a window and print what the card would show.
pub fn run(messages: Option<&Path>) -> anyhow::Result<()> {
    let config = Config::load_or_default();
    let source = loader::source::resolve(messages, &config)?;
    let label = source.describe();

    let state = Loader::spawn(source).wait();
    if let Some(e) = state.error() {
        anyhow::bail!("Failed to load messages from {label}: {e}");
    }
    let messages = state.messages();
    if messages.is_empty() {
        println!("{}", format!("No displayable messages in {label}.").yellow());
    } else {
        print_messages(messages);
    }
    Ok(())
}

fn print_messages(messages: &[Message]) {
    let total = messages.len();
    for (i, message) in messages.iter().enumerate() {
        println!("{}", format!("[{} / {total}]", i + 1).dimmed());
        println!("{}", message.message);
        println!("  {}", format!("\u{2014} {}", message.author).cyan());
        println!();
    }
}
