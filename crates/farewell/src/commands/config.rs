use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::{self, Config};

pub fn run(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
        ConfigCommands::Path => {
            println!("{}", Config::path()?.display());
            Ok(())
        }
    }
}

fn show() -> anyhow::Result<()> {
    let config = Config::load_or_default();
    let source = config.source();

    println!("{}", "Source".bold());
    match source.resolve_url() {
        Some(url) => println!("  url:          {url}"),
        None => println!(
            "  url:          {} (set source.url or {})",
            "not set".yellow(),
            config::URL_ENV
        ),
    }
    match source.resolve_anon_key() {
        Some(key) => println!("  anon_key:     {}", redact(&key)),
        None => println!(
            "  anon_key:     {} (set source.anon_key or {})",
            "not set".yellow(),
            config::ANON_KEY_ENV
        ),
    }
    println!("  table:        {}", source.table());
    println!("  timeout_secs: {}", source.timeout_secs());

    println!();
    println!("{}", "Card".bold());
    println!("  kicker:       {}", config.kicker());
    println!("  heading:      {}", config.heading());

    println!();
    println!("{}", "Defaults".bold());
    println!("  theme:         {}", config.theme_name());
    println!("  transition:    {}", config.transition_name());
    println!("  open_delay_ms: {}", config.open_delay().as_millis());

    println!();
    println!("{}", format!("Config file: {}", Config::path()?.display()).dimmed());
    Ok(())
}

fn set(key: &str, value: &str) -> anyhow::Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!("{} {key} = {value}", "Saved".green());
    println!("{}", format!("  in {}", path.display()).dimmed());
    Ok(())
}

/// Show only the first and last four characters of a secret.
fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}\u{2026}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_long_key() {
        assert_eq!(redact("abcdefghijklmnop"), "abcd\u{2026}mnop");
    }

    #[test]
    fn test_redact_short_key_fully() {
        assert_eq!(redact("short"), "*****");
        assert_eq!(redact(""), "");
    }
}
