use anyhow::Context;
use citycast_core::{Config, RenderedView, Session, SubmitResult, Units, provider_from_config};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use tracing::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "Current weather for a city")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default units.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "New York".
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,

        /// Unit system: metric, imperial or standard.
        #[arg(long, value_parser = parse_units)]
        units: Option<Units>,

        /// Print the rendered view as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Prompt for cities until Esc or Ctrl-C.
    Search {
        /// Unit system: metric, imperial or standard.
        #[arg(long, value_parser = parse_units)]
        units: Option<Units>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, units, json } => show(&city.join(" "), units, json).await,
            Command::Search { units } => search(units).await,
        }
    }
}

fn parse_units(value: &str) -> Result<Units, String> {
    Units::try_from(value).map_err(|e| e.to_string())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let choices = Units::all().to_vec();
    let cursor = choices.iter().position(|u| *u == config.units).unwrap_or(0);
    let units = Select::new("Default units:", choices)
        .with_starting_cursor(cursor)
        .prompt()
        .context("Failed to read units")?;

    config.set_api_key(api_key);
    config.units = units;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(city: &str, units: Option<Units>, json: bool) -> anyhow::Result<()> {
    let (mut session, units) = open_session(units)?;

    match session.submit(city).await {
        SubmitResult::Ignored => anyhow::bail!("City name must not be blank"),
        SubmitResult::Failed(err) => {
            return Err(anyhow::Error::new(err).context(format!("Weather lookup for '{city}' failed")));
        }
        SubmitResult::Found | SubmitResult::NotFound => {}
    }

    print_view(&session.view().render(units), json)
}

async fn search(units: Option<Units>) -> anyhow::Result<()> {
    let (mut session, units) = open_session(units)?;

    loop {
        let input = match Text::new("City:")
            .with_placeholder("e.g New York...")
            .with_help_message("Enter to search, Esc to quit")
            .prompt()
        {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city"),
        };

        match session.submit(&input).await {
            SubmitResult::Ignored => continue,
            SubmitResult::Failed(err) => {
                eprintln!("Could not fetch weather: {err}");
                continue;
            }
            SubmitResult::Found | SubmitResult::NotFound => {}
        }

        print_view(&session.view().render(units), false)?;
        println!();
    }

    Ok(())
}

/// Units from the command line win over the configured default.
fn open_session(units: Option<Units>) -> anyhow::Result<(Session, Units)> {
    let config = Config::load()?;
    let units = units.unwrap_or(config.units);
    debug!(%units, base_url = config.base_url(), "opening lookup session");

    let session = Session::new(provider_from_config(&config, units)?);
    Ok((session, units))
}

fn print_view(view: &RenderedView, json: bool) -> anyhow::Result<()> {
    if json {
        let out = serde_json::to_string_pretty(view).context("Failed to serialize view")?;
        println!("{out}");
    } else {
        println!("{view}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_joins_multi_word_city() {
        let cli = Cli::try_parse_from(["citycast", "show", "New", "York", "--units", "imperial"])
            .expect("valid args");

        match cli.command {
            Command::Show { city, units, json } => {
                assert_eq!(city.join(" "), "New York");
                assert_eq!(units, Some(Units::Imperial));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_units_are_rejected() {
        let err = Cli::try_parse_from(["citycast", "show", "Paris", "--units", "furlongs"])
            .unwrap_err();
        assert!(err.to_string().contains("Unknown units"));
    }

    #[test]
    fn verbose_flag_counts() {
        let cli = Cli::try_parse_from(["citycast", "-vv", "search"]).expect("valid args");
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Search { units: None }));
    }
}
