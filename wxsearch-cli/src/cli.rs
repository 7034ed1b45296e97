use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{CustomType, InquireError, Select, Text};
use tokio::sync::watch;
use wxsearch_core::{Config, LookupStatus, SearchOrchestrator, SearchState, search::MIN_QUERY_CHARS};

use crate::{logging::LogLevel, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wxsearch", version, about = "Look up current weather and a 7-day forecast for any city")]
pub struct Cli {
    /// Log verbosity; `RUST_LOG` takes precedence when set.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather and the forecast for a city.
    Show {
        /// City name, e.g. "Paris" or "New York".
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,

        /// Only show details for forecast day N (1 = tomorrow).
        #[arg(long)]
        day: Option<usize>,
    },

    /// List location suggestions for a partial name.
    Suggest {
        /// At least two characters of a place name.
        partial: String,
    },

    /// Interactive search with suggestions.
    Search,

    /// Edit settings interactively.
    Configure,

    /// Print where the config file lives.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Show { city, day } => {
                let config = Config::load()?;
                let mut orch = SearchOrchestrator::from_config(&config)?;

                orch.input(city.join(" "));
                let progress = orch.subscribe();
                with_progress(progress, orch.submit()).await;
                print_outcome(&orch, self.json, day)
            }
            Command::Suggest { partial } => {
                let config = Config::load()?;
                let mut orch = SearchOrchestrator::from_config(&config)?;

                orch.input(partial);
                if !orch.next_suggestions().await {
                    bail!("Type at least {MIN_QUERY_CHARS} characters to get suggestions");
                }

                let state = orch.state();
                let suggestions = state.suggestions();
                if self.json {
                    println!("{}", serde_json::to_string_pretty(suggestions)?);
                } else if suggestions.is_empty() {
                    println!("No matching locations.");
                } else {
                    print!("{}", render::SuggestionList(suggestions));
                }
                Ok(())
            }
            Command::Search => {
                let config = Config::load()?;
                interactive_search(&config, self.json).await
            }
            Command::Configure => configure(),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

fn print_outcome(orch: &SearchOrchestrator, json: bool, day: Option<usize>) -> anyhow::Result<()> {
    let state = orch.state();
    let report = match state.lookup() {
        LookupStatus::Ready(report) => report,
        LookupStatus::Failed(msg) => bail!("{msg}"),
        LookupStatus::Idle | LookupStatus::Loading => bail!("search did not finish"),
    };

    if let Some(n) = day {
        let entry = n
            .checked_sub(1)
            .and_then(|i| report.daily.get(i))
            .with_context(|| format!("forecast day must be between 1 and {}", report.daily.len()))?;

        if json {
            println!("{}", serde_json::to_string_pretty(entry)?);
        } else {
            print!("{}", render::DayDetail(entry));
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", render::ReportView { report, hour: render::local_hour(report) });
        if !report.daily.is_empty() {
            println!();
            println!("{}", render::forecast_table(&report.daily));
        }
    }

    Ok(())
}

/// Drives `search` and prints a progress line whenever the state enters `Loading`.
async fn with_progress<T>(
    mut progress: watch::Receiver<SearchState>,
    search: impl Future<Output = T>,
) -> T {
    tokio::pin!(search);

    loop {
        tokio::select! {
            out = &mut search => return out,
            changed = progress.changed() => {
                if changed.is_err() {
                    return search.await;
                }
                if progress.borrow_and_update().is_loading() {
                    eprintln!("Searching…");
                }
            }
        }
    }
}

fn is_cancel(err: &InquireError) -> bool {
    matches!(err, InquireError::OperationCanceled | InquireError::OperationInterrupted)
}

async fn interactive_search(config: &Config, json: bool) -> anyhow::Result<()> {
    let mut orch = SearchOrchestrator::from_config(config)?;

    loop {
        let text = match Text::new("City:").with_help_message("leave empty to quit").prompt() {
            Ok(text) => text,
            Err(err) if is_cancel(&err) => break,
            Err(err) => return Err(err.into()),
        };
        if text.trim().is_empty() {
            break;
        }

        orch.input(text.trim());
        orch.next_suggestions().await;

        let suggestions = orch.state().suggestions().to_vec();
        let progress = orch.subscribe();
        if suggestions.is_empty() {
            with_progress(progress, orch.submit()).await;
        } else {
            let mut options: Vec<String> = suggestions.iter().map(ToString::to_string).collect();
            options.push(format!("Search for \"{}\"", text.trim()));

            let choice = match Select::new("Pick a location:", options).raw_prompt() {
                Ok(choice) => choice,
                Err(err) if is_cancel(&err) => continue,
                Err(err) => return Err(err.into()),
            };

            if choice.index < suggestions.len() {
                with_progress(progress, orch.pick(choice.index)).await;
            } else {
                with_progress(progress, orch.submit()).await;
            }
        }

        if let Err(err) = print_outcome(&orch, json, None) {
            eprintln!("{err}");
        }
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    cfg.geocoding_url =
        Text::new("Geocoding API base URL:").with_default(&cfg.geocoding_url).prompt()?;
    cfg.forecast_url = Text::new("Forecast API base URL:").with_default(&cfg.forecast_url).prompt()?;
    cfg.language = Text::new("Place name language:").with_default(&cfg.language).prompt()?;
    cfg.timeout_secs = CustomType::<u64>::new("HTTP timeout (seconds):")
        .with_default(cfg.timeout_secs)
        .with_error_message("Please enter a whole number")
        .prompt()?;
    cfg.debounce_ms = CustomType::<u64>::new("Suggestion delay (ms):")
        .with_default(cfg.debounce_ms)
        .with_error_message("Please enter a whole number")
        .prompt()?;
    cfg.suggestion_limit = CustomType::<usize>::new("Maximum suggestions:")
        .with_default(cfg.suggestion_limit)
        .with_error_message("Please enter a whole number")
        .prompt()?;

    cfg.validate()?;
    cfg.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
