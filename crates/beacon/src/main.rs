//! `beacon` - CLI for the emergency alert dispatcher
//!
//! This binary provides the command-line interface for triggering alerts,
//! managing contacts and inspecting configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use beacon::channel::{IntentTextChannel, UriOpener};
use beacon::cli::{
    AlertCommand, Cli, Command, ConfigCommand, ContactsCommand, StatusCommand, ThemeCommand,
};
use beacon::contact::{ContactBook, ContactDraft};
use beacon::dispatch::{ChannelOutcome, DispatchReport, Dispatcher};
use beacon::haptics::LogHaptics;
use beacon::location::{Coordinates, FixedLocation, LocationProvider};
use beacon::session::{AlertSession, SessionPhase};
use beacon::theme::{ThemeContext, ThemeMode, ThemeStore};
use beacon::{init_logging, Config};

// Platform-specific imports using conditional compilation
#[cfg(target_os = "linux")]
use beacon_linux as platform;

#[cfg(target_os = "macos")]
use beacon_mac as platform;

/// [`UriOpener`] backed by the platform's default URI handler.
#[derive(Debug, Clone, Copy, Default)]
struct SystemUriOpener;

#[async_trait::async_trait]
impl UriOpener for SystemUriOpener {
    async fn can_open(&self, uri: &str) -> bool {
        let uri = uri.to_string();
        tokio::task::spawn_blocking(move || platform::can_launch_uri(&uri))
            .await
            .unwrap_or(false)
    }

    async fn open(&self, uri: &str) -> beacon::Result<()> {
        let uri = uri.to_string();
        tokio::task::spawn_blocking(move || platform::launch_uri(&uri))
            .await
            .map_err(|e| beacon::Error::internal(format!("opener task failed: {e}")))?
            .map_err(|e| beacon::Error::channel("uri-opener", e.to_string()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Alert(alert_cmd) => handle_alert(&config, alert_cmd).await,
        Command::Contacts(contacts_cmd) => handle_contacts(&config, &contacts_cmd),
        Command::Theme(theme_cmd) => handle_theme(&theme_cmd),
        Command::Status(status_cmd) => handle_status(&config, &status_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_alert(
    config: &Config,
    cmd: AlertCommand,
) -> anyhow::Result<()> {
    let AlertCommand::Trigger { lat, lon, yes } = cmd;

    let book = ContactBook::from_config(&config.contacts);
    if book.is_empty() {
        println!("No emergency contacts configured; nothing to do.");
        println!("Add contacts under [[contacts.seed]] in your config file.");
        return Ok(());
    }

    if !yes && !confirm(book.len())? {
        println!("Aborted.");
        return Ok(());
    }

    // A CLI lat/lon pair beats the configured fixed position.
    let coords = match (lat, lon) {
        (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
        _ => config.fixed_location(),
    };
    let location: Arc<dyn LocationProvider> = match coords {
        Some(c) => Arc::new(FixedLocation::new(c)),
        None => Arc::new(FixedLocation::unavailable()),
    };

    let opener = Arc::new(SystemUriOpener);
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(IntentTextChannel::new(SystemUriOpener)),
        opener,
        Arc::new(LogHaptics),
        &config.dispatch,
    ));

    let mut session = AlertSession::new(&config.alert, dispatcher, location, Arc::new(LogHaptics));
    session.trigger(book.contacts().to_vec())?;

    println!(
        "Emergency alert armed for {} contact(s). Press Ctrl-C to cancel.",
        book.len()
    );

    let mut last_shown = u32::MAX;
    loop {
        match session.phase() {
            SessionPhase::CountingDown => {}
            SessionPhase::Dispatching | SessionPhase::Idle => break,
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                session.cancel();
                println!("\nAlert cancelled.");
                return Ok(());
            }
            () = tokio::time::sleep(Duration::from_millis(100)) => {
                if let Some(left) = session.remaining() {
                    if left != last_shown {
                        println!("Dispatching in {left}...");
                        last_shown = left;
                    }
                }
            }
        }
    }

    println!("Dispatching...");
    match session.wait().await {
        Some(report) => print_report(&report),
        None => println!("Alert cancelled."),
    }
    Ok(())
}

fn confirm(contact_count: usize) -> anyhow::Result<bool> {
    print!("This will alert {contact_count} contact(s) after a countdown. Continue? [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn print_report(report: &DispatchReport) {
    println!();
    println!(
        "Dispatch complete: {}/{} contact(s) reached.",
        report.reached(),
        report.total()
    );
    for outcome in &report.outcomes {
        let text = describe_outcome(&outcome.text);
        let chat = describe_outcome(&outcome.chat);
        println!("  {}: text {text}, chat link {chat}", outcome.name);
    }
}

fn describe_outcome(outcome: &ChannelOutcome) -> String {
    match outcome {
        ChannelOutcome::Sent => "sent".to_string(),
        ChannelOutcome::VoiceFallback => "fell back to voice call".to_string(),
        ChannelOutcome::Skipped => "skipped".to_string(),
        ChannelOutcome::Failed(reason) => format!("failed ({reason})"),
    }
}

fn handle_contacts(
    config: &Config,
    cmd: &ContactsCommand,
) -> anyhow::Result<()> {
    match cmd {
        ContactsCommand::List { json } => {
            let book = ContactBook::from_config(&config.contacts);
            if *json {
                let entries: Vec<_> = book
                    .contacts()
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "id": c.id,
                            "name": c.name,
                            "phone": c.phone,
                            "normalized_phone": c.normalized_phone(),
                            "relationship": c.relationship,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if book.is_empty() {
                println!("No emergency contacts configured.");
            } else {
                println!("Emergency contacts");
                println!("------------------");
                for contact in book.contacts() {
                    println!(
                        "  [{}] {} <{}> ({})",
                        contact.id, contact.name, contact.phone, contact.relationship
                    );
                }
            }
        }
        ContactsCommand::Add {
            name,
            phone,
            relationship,
        } => {
            let mut book = ContactBook::from_config(&config.contacts);
            let contact = book.add(ContactDraft {
                name: name.clone(),
                phone: phone.clone(),
                relationship: relationship.clone(),
            })?;
            println!(
                "Contact validated: {} <{}> ({})",
                contact.name,
                contact.normalized_phone(),
                contact.relationship
            );
            println!();
            println!("Add this to {}:", Config::default_config_path().display());
            println!();
            println!("[[contacts.seed]]");
            println!("name = {:?}", contact.name);
            println!("phone = {:?}", contact.phone);
            println!("relationship = {:?}", contact.relationship);
        }
    }
    Ok(())
}

fn handle_theme(cmd: &ThemeCommand) -> anyhow::Result<()> {
    let store = ThemeStore::at_default_path();
    match cmd {
        ThemeCommand::Show => {
            let mode = store.load()?.unwrap_or_default();
            println!("{mode}");
        }
        ThemeCommand::Set { mode } => {
            let mut context = ThemeContext::init(store, ThemeMode::default())?;
            context.set((*mode).into())?;
            println!("Theme set to {}.", context.mode());
        }
        ThemeCommand::Toggle => {
            let mut context = ThemeContext::init(store, ThemeMode::default())?;
            let mode = context.toggle()?;
            println!("Theme set to {mode}.");
        }
    }
    Ok(())
}

fn handle_status(config: &Config, cmd: &StatusCommand) -> anyhow::Result<()> {
    let book = ContactBook::from_config(&config.contacts);
    let theme = ThemeStore::at_default_path().load()?.unwrap_or_default();
    if cmd.json {
        let status = serde_json::json!({
            "platform": platform::platform_name(),
            "contacts": book.len(),
            "countdown_ticks": config.alert.countdown_ticks,
            "fixed_location": config.fixed_location().map(|c| c.to_string()),
            "theme": theme.to_string(),
            "config_path": Config::default_config_path(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("beacon status");
        println!("-------------");
        println!("Platform:        {}", platform::platform_name());
        println!("Contacts:        {}", book.len());
        println!("Countdown:       {} tick(s)", config.alert.countdown_ticks);
        match config.fixed_location() {
            Some(coords) => println!("Fixed location:  {coords}"),
            None => println!("Fixed location:  (none; pass --lat/--lon when triggering)"),
        }
        println!("Theme:           {theme}");
        println!("Config:          {}", Config::default_config_path().display());
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Alert]");
                println!("  Countdown ticks:     {}", config.alert.countdown_ticks);
                println!("  Tick interval (ms):  {}", config.alert.tick_interval_ms);
                println!();
                println!("[Dispatch]");
                println!(
                    "  Channel delay (ms):  {}",
                    config.dispatch.inter_channel_delay_ms
                );
                println!(
                    "  Chat links:          {}",
                    config.dispatch.chat_links_enabled
                );
                println!();
                println!("[Contacts]");
                println!("  Seeded contacts:     {}", config.contacts.seed.len());
                println!();
                println!("[Location]");
                match config.fixed_location() {
                    Some(coords) => println!("  Fixed position:      {coords}"),
                    None => println!("  Fixed position:      (none)"),
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
