//! Command Line
//!
//! `--cron` selects the fixed unattended session settings; otherwise the
//! operator is asked for them.

use clap::Args;
use dialoguer::{Confirm, Input, Select};
use news_scraper::{BrowserProfile, SessionConfig, SessionKind, WindowSize};

use crate::error::Result;

/// Flags shared by every binary
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct RunArgs {
    /// Non-interactive mode for scheduled runs (hosted session, any country)
    #[arg(long)]
    pub cron: bool,
}

/// Which session questions to ask
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompts {
    /// Session type, country, node id and window size
    Basic,

    /// Basic, plus custom proxy and persistent profile
    Extended,
}

/// Session settings for this run
pub fn session_config(args: RunArgs, prompts: Prompts) -> Result<SessionConfig> {
    if args.cron {
        tracing::info!("⏰ Running in cron mode");
        return Ok(SessionConfig::cron());
    }
    ask_session(prompts)
}

/// `None` for "any" (any case) or blank input
pub fn country_choice(input: &str) -> Option<String> {
    let input = input.trim();
    (!input.is_empty() && !input.eq_ignore_ascii_case("any")).then(|| input.to_string())
}

/// `None` for blank input
pub fn optional(input: &str) -> Option<String> {
    let input = input.trim();
    (!input.is_empty()).then(|| input.to_string())
}

fn ask_session(prompts: Prompts) -> Result<SessionConfig> {
    println!("\n--- Configure Browser Session ---\n");

    let kinds: Vec<&str> = SessionKind::ALL.iter().map(|kind| kind.as_str()).collect();
    let choice = Select::new()
        .with_prompt("Session type")
        .items(&kinds)
        .default(0)
        .interact()?;
    let kind = SessionKind::ALL.get(choice).copied().unwrap_or_default();

    let country: String = Input::new()
        .with_prompt("Country (e.g. US, Any)")
        .default("Any".to_string())
        .interact_text()?;

    let node_id: String = Input::new()
        .with_prompt("Specific node id (optional)")
        .allow_empty(true)
        .interact_text()?;

    let window_size: WindowSize = Input::new()
        .with_prompt("Window size")
        .default(WindowSize::default())
        .interact_text()?;

    let mut config = SessionConfig {
        kind,
        country: country_choice(&country),
        node_id: optional(&node_id),
        window_size,
        proxy_url: None,
        profile: None,
    };

    if prompts == Prompts::Extended {
        if Confirm::new().with_prompt("Use custom proxy?").default(false).interact()? {
            let proxy: String = Input::new()
                .with_prompt("Proxy URL")
                .validate_with(|input: &String| {
                    if input.trim().is_empty() { Err("Proxy URL is required") } else { Ok(()) }
                })
                .interact_text()?;
            config.proxy_url = optional(&proxy);
        }

        if Confirm::new().with_prompt("Use a specific profile?").default(false).interact()? {
            let name: String = Input::new()
                .with_prompt("Profile name")
                .validate_with(|input: &String| {
                    if input.trim().is_empty() { Err("Profile name is required") } else { Ok(()) }
                })
                .interact_text()?;
            config.profile = optional(&name).map(|name| BrowserProfile { name, persist: true });
        }
    }

    tracing::debug!(?config, "Session configured");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_country_choice() {
        assert_eq!(country_choice("Any"), None);
        assert_eq!(country_choice("any "), None);
        assert_eq!(country_choice(""), None);
        assert_eq!(country_choice("US"), Some("US".into()));
    }

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        run: RunArgs,
    }

    #[test]
    fn test_cron_flag() {
        let args = TestCli::parse_from(["fear-greed", "--cron"]).run;
        assert!(args.cron);
        let config = session_config(args, Prompts::Extended).unwrap();
        assert_eq!(config, SessionConfig::cron());
        assert!(!TestCli::parse_from(["fear-greed"]).run.cron);
    }

    #[test]
    fn test_optional_input() {
        assert_eq!(optional("  "), None);
        assert_eq!(optional(" node-7 "), Some("node-7".into()));
    }
}
