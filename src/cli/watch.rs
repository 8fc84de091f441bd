//! Interactive conversion session.
//!
//! Reads commands line by line (stdin for the binary) while rates are polled in the
//! background. All state lives in a [`Session`] owned by the event loop, so edits
//! and poll replies are applied one at a time.

use super::{rates, ui};
use crate::core::amount::CurrencyFormat;
use crate::core::config::AppConfig;
use crate::core::{
    ConversionBinder, EditOutcome, FetchState, Field, PollReply, RateFetcher, RateMode,
    RateProvider,
};
use anyhow::{Result, anyhow, bail};
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

const HELP: &str = "\
Commands:
  usd [amount]     set the USD amount (no amount clears it)
  ves [amount]     set the VES amount (no amount clears it)
  mode <official|market|average>
  refresh          fetch rates now
  show             redraw the converter
  help             show this help
  quit             exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Edit(Field, String),
    Mode(RateMode),
    Refresh,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        match word.to_lowercase().as_str() {
            "usd" | "$" => Ok(Command::Edit(Field::Source, rest.to_string())),
            "ves" | "bs" => Ok(Command::Edit(Field::Target, rest.to_string())),
            "mode" if rest.is_empty() => bail!("Usage: mode <official|market|average>"),
            "mode" => Ok(Command::Mode(rest.parse()?)),
            "official" | "market" | "average" | "bcv" | "paralelo" | "promedio" => {
                Ok(Command::Mode(word.parse()?))
            }
            "refresh" | "r" => Ok(Command::Refresh),
            "show" | "" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(anyhow!("Unknown command: {}. Type 'help' for commands", word)),
        }
    }
}

/// What the event loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Render,
    Print(String),
    Refresh,
    Quit,
}

pub struct Session {
    binder: ConversionBinder,
    fetcher: RateFetcher,
    format: CurrencyFormat,
    source_url: String,
}

impl Session {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            binder: ConversionBinder::new(config.mode),
            fetcher: RateFetcher::new(),
            format: config.display.clone(),
            source_url: config.source_url().to_string(),
        }
    }

    pub fn binder(&self) -> &ConversionBinder {
        &self.binder
    }

    pub fn fetcher(&self) -> &RateFetcher {
        &self.fetcher
    }

    /// Applies a poll reply. Returns `true` when the view changed.
    pub fn apply_reply(&mut self, reply: PollReply) -> bool {
        let before = self.fetcher.state().clone();
        if let Some(snapshot) = self.fetcher.complete(reply.ticket, reply.result) {
            let snapshot = snapshot.clone();
            self.binder.apply_snapshot(snapshot);
            return true;
        }
        *self.fetcher.state() != before
    }

    pub fn handle(&mut self, command: Command) -> Step {
        match command {
            Command::Edit(field, text) => match self.binder.edit(field, &text) {
                EditOutcome::Rejected => {
                    debug!(?field, text, "Ignoring invalid amount");
                    Step::Print(ui::style_text(
                        &format!("Invalid amount: {text}"),
                        ui::StyleType::Subtle,
                    ))
                }
                EditOutcome::Cleared | EditOutcome::Updated { .. } => Step::Render,
            },
            Command::Mode(mode) => {
                if self.binder.set_mode(mode) {
                    Step::Render
                } else {
                    Step::Print(format!("Already using the {mode} rate"))
                }
            }
            Command::Refresh => Step::Refresh,
            Command::Show => Step::Render,
            Command::Help => Step::Print(HELP.to_string()),
            Command::Quit => Step::Quit,
        }
    }

    pub fn render(&self) -> String {
        let mut output = format!(
            "{}\n\n",
            ui::style_text("Dollar Calculator", ui::StyleType::Title)
        );

        match self.fetcher.state() {
            FetchState::Pending => {
                output.push_str(&ui::style_text(
                    "Loading dollar rates...",
                    ui::StyleType::Subtle,
                ));
                output.push_str("\n\n");
            }
            FetchState::Error(message) => {
                output.push_str(&ui::style_text(
                    &format!("Failed to load dollar rates: {message}"),
                    ui::StyleType::Error,
                ));
                output.push_str("\n\n");
            }
            FetchState::Success(_) => {}
        }

        output.push_str(&format!(
            "{} {}\n\n",
            ui::style_text("Rate:", ui::StyleType::Label),
            ui::mode_selector(self.binder.mode())
        ));

        for field in [Field::Source, Field::Target] {
            let value = self.binder.value(field);
            output.push_str(&format!(
                "{:>4} {}\n",
                ui::style_text(ui::field_label(field), ui::StyleType::Label),
                if value.is_empty() {
                    ui::style_text("0", ui::StyleType::Subtle)
                } else {
                    value.to_string()
                }
            ));
        }

        if let Some(snapshot) = self.binder.snapshot() {
            output.push('\n');
            output.push_str(
                &rates::rates_table(snapshot, self.binder.mode(), &self.format).to_string(),
            );
            output.push_str("\n\n");
            output.push_str(&rates::footer(snapshot, &self.source_url));
        }

        output
    }
}

pub async fn run(config: &AppConfig, provider: Arc<dyn RateProvider>) -> Result<()> {
    run_with_input(config, provider, BufReader::new(tokio::io::stdin()))
        .await
        .map(|_| ())
}

/// Drives a session from `input` until `quit` or end of input and returns it.
pub async fn run_with_input<R>(
    config: &AppConfig,
    provider: Arc<dyn RateProvider>,
    input: R,
) -> Result<Session>
where
    R: AsyncBufRead + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = Session::new(config);
    let poller = session.fetcher().poller(provider, tx);
    let schedule = poller.spawn_schedule(config.poll_interval());

    println!("{}", session.render());
    println!("{}", ui::style_text("Type 'help' for commands.", ui::StyleType::Subtle));

    let mut lines = input.lines();
    loop {
        tokio::select! {
            Some(reply) = rx.recv() => {
                if session.apply_reply(reply) {
                    ui::print_separator();
                    println!("{}", session.render());
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                let step = match line.parse::<Command>() {
                    Ok(command) => session.handle(command),
                    Err(e) => Step::Print(ui::style_text(&e.to_string(), ui::StyleType::Error)),
                };
                match step {
                    Step::Render => {
                        ui::print_separator();
                        println!("{}", session.render());
                    }
                    Step::Print(text) => println!("{text}"),
                    Step::Refresh => {
                        info!("Manual refresh requested");
                        poller.fetch_now();
                    }
                    Step::Quit => break,
                }
            }
        }
    }

    schedule.abort();
    Ok(session)
}
