use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, InquireError, Select, Text};
use tracing::{debug, warn};
use wakaweather_core::{
    ChatSession, Config, ConfidenceLoader, ConfidencePhase, HttpBackend, SendOutcome, Theme,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wakaweather", version, about = "WakaWeather confidence dashboard and chat")]
pub struct Cli {
    /// Backend base URL, overriding the config file.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set backend URL, location and display preferences interactively.
    Configure,

    /// Show how much the forecast sources agree for a location.
    Confidence {
        /// City name sent to the backend.
        #[arg(long)]
        city: Option<String>,

        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Talk to the weather assistant.
    Chat,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.resolve_config(Config::load())?;

        match self.command {
            Command::Configure => configure(config),
            Command::Confidence { .. } => confidence(&config).await,
            Command::Chat => chat(&config).await,
        }
    }

    /// Applies flag overrides to the loaded file, then validates.
    ///
    /// `configure` accepts whatever is on disk (or defaults if it can't be read)
    /// since it is how a broken file gets repaired; saving validates.
    fn resolve_config(&self, loaded: anyhow::Result<Config>) -> anyhow::Result<Config> {
        let mut config = match (&self.command, loaded) {
            (Command::Configure, Err(err)) => {
                warn!("ignoring unreadable config ({err:#}), starting from defaults");
                Config::default()
            }
            (_, loaded) => loaded?,
        };

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Command::Confidence { city, lat, lon } = &self.command {
            if let Some(city) = city {
                config.location.city = city.clone();
            }
            if let Some(lat) = *lat {
                config.location.lat = lat;
            }
            if let Some(lon) = *lon {
                config.location.lon = lon;
            }
        }

        if !matches!(self.command, Command::Configure) {
            config.validate()?;
        }
        Ok(config)
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    config.base_url = Text::new("Backend base URL:")
        .with_default(&config.base_url)
        .prompt()?;
    config.location.city = Text::new("City:")
        .with_default(&config.location.city)
        .prompt()?;
    config.location.lat = CustomType::<f64>::new("Latitude:")
        .with_default(config.location.lat)
        .with_error_message("Please type a number")
        .prompt()?;
    config.location.lon = CustomType::<f64>::new("Longitude:")
        .with_default(config.location.lon)
        .with_error_message("Please type a number")
        .prompt()?;

    let themes = Theme::all().to_vec();
    let cursor = themes
        .iter()
        .position(|t| *t == config.preferences.theme)
        .unwrap_or(0);
    config.preferences.theme = Select::new("Theme:", themes)
        .with_starting_cursor(cursor)
        .prompt()?;
    config.preferences.language = Text::new("Language:")
        .with_default(&config.preferences.language)
        .prompt()?;

    config.save()?;
    println!("Saved {}", Config::config_file_path()?.display());
    Ok(())
}

async fn confidence(config: &Config) -> anyhow::Result<()> {
    let backend = HttpBackend::from_config(config)?;
    let loader = ConfidenceLoader::new(backend, config.confidence_query());

    loop {
        println!("Loading forecast confidence for {}...", loader.query().city);
        let outcome = loader.load().await;
        debug!(?outcome, "confidence load finished");

        let state = loader.snapshot();
        match state.phase() {
            ConfidencePhase::Ready(payload) => {
                let palette = render::Palette::for_stdout(config.preferences.theme);
                println!("{}", render::dashboard(payload, palette));
                return Ok(());
            }
            ConfidencePhase::Failed(message) => {
                println!("{}", render::error_panel(message));
                let again = Confirm::new("Try again?").with_default(true).prompt()?;
                if !again {
                    bail!("Forecast confidence unavailable");
                }
            }
            ConfidencePhase::Idle | ConfidencePhase::Loading => {
                bail!("Forecast confidence unavailable")
            }
        }
    }
}

/// One line of chat input.
#[derive(Debug, PartialEq)]
enum ChatInput {
    Message(String),
    Retry,
    Resend(usize),
    Clear,
    History,
    Help,
    Quit,
}

impl ChatInput {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let Some(command) = line.strip_prefix('/') else {
            return Ok(ChatInput::Message(line.to_string()));
        };

        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("retry"), None) => Ok(ChatInput::Retry),
            (Some("resend"), Some(n)) => n
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(ChatInput::Resend)
                .ok_or_else(|| format!("'{n}' is not a message number")),
            (Some("clear"), None) => Ok(ChatInput::Clear),
            (Some("history"), None) => Ok(ChatInput::History),
            (Some("help"), None) => Ok(ChatInput::Help),
            (Some("quit" | "exit"), None) => Ok(ChatInput::Quit),
            _ => Err(format!("Unknown command '/{command}'. Type /help.")),
        }
    }
}

const CHAT_HELP: &str = "Commands: /retry, /resend <n>, /clear, /history, /help, /quit";

async fn chat(config: &Config) -> anyhow::Result<()> {
    let session = ChatSession::new(HttpBackend::from_config(config)?);
    println!("Ask the WakaWeather assistant anything. {CHAT_HELP}");

    loop {
        let line = match Text::new("You:").prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read chat input"),
        };

        let input = match ChatInput::parse(&line) {
            Ok(input) => input,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        let before = session.snapshot().messages.len();
        let outcome = match input {
            ChatInput::Message(text) => session.send(&text).await,
            ChatInput::Retry => match session.retry_last_user_message().await {
                Some(outcome) => outcome,
                None => {
                    println!("Nothing to retry yet.");
                    continue;
                }
            },
            ChatInput::Resend(n) => {
                let id = session
                    .snapshot()
                    .messages
                    .iter()
                    .filter(|m| m.is_user)
                    .nth(n - 1)
                    .map(|m| m.id);
                match id {
                    Some(id) => session.resend(id).await.unwrap_or(SendOutcome::Ignored),
                    None => {
                        println!("There is no message #{n}.");
                        continue;
                    }
                }
            }
            ChatInput::Clear => {
                if Confirm::new("Clear the whole conversation?")
                    .with_default(false)
                    .prompt()?
                {
                    session.clear();
                    println!("Conversation cleared.");
                }
                continue;
            }
            ChatInput::History => {
                for line in render::transcript(&session.snapshot().messages, 0) {
                    println!("{line}");
                }
                continue;
            }
            ChatInput::Help => {
                println!("{CHAT_HELP}");
                continue;
            }
            ChatInput::Quit => break,
        };

        let state = session.snapshot();
        for line in render::transcript(&state.messages, before) {
            println!("{line}");
        }
        if outcome == SendOutcome::Failed {
            if let Some(error) = &state.error_message {
                println!("{}", render::error_banner(error));
            }
        }
    }

    Ok(())
}
