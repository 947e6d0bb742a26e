use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Parser;
use icsboard::config::Config;
use icsboard::{Agenda, CalendarDocument, Diagnostics, ExpansionWindow, build_agenda};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "icsboard")]
#[command(about = "List upcoming events from an iCalendar file", long_about = None)]
struct Cli {
    /// Calendar file to read, `-` for stdin. Falls back to `source` in the config.
    file: Option<PathBuf>,

    /// Maximum number of events to show
    #[arg(short, long)]
    limit: Option<usize>,

    /// Days to look ahead
    #[arg(short, long)]
    days: Option<u32>,

    /// Reference time (RFC 3339), defaults to the current time
    #[arg(long)]
    now: Option<DateTime<Utc>>,

    /// Print the agenda as JSON
    #[arg(long)]
    json: bool,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read calendar from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read calendar at {}", path.display()))
}

fn print_text(agenda: &Agenda) {
    if agenda.occurrences.is_empty() {
        println!("No upcoming events");
        return;
    }
    for occ in &agenda.occurrences {
        let when = if occ.is_all_day() {
            format!("{}  all day", occ.start().format("%Y-%m-%d"))
        } else {
            format!(
                "{}  {}-{}",
                occ.start().format("%Y-%m-%d"),
                occ.start().format("%H:%M"),
                occ.end().format("%H:%M")
            )
        };
        match occ.location() {
            Some(loc) => println!("{}  {} @ {}", when, occ.summary(), loc),
            None => println!("{}  {}", when, occ.summary()),
        }
    }
    println!(
        "-- {} of {} shown, {}",
        agenda.occurrences.len(),
        agenda.total,
        agenda.density.css_class()
    );
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let Some(source) = cli.file.clone().or(config.source.clone()) else {
        bail!("No calendar given. Pass a file or set `source` in the config.");
    };
    let raw = read_source(&source)?;

    let mut diagnostics = Diagnostics::new();
    let document = CalendarDocument::from_ics(&raw, &mut diagnostics)?;

    let now = cli.now.unwrap_or_else(Utc::now);
    let window = ExpansionWindow::days_from(now, cli.days.unwrap_or(config.window_days))?;
    let limit = cli.limit.unwrap_or(config.event_limit);

    let mut agenda = build_agenda(&document, &window, now, limit);
    diagnostics.extend(std::mem::take(&mut agenda.diagnostics));
    agenda.diagnostics = diagnostics.into_vec();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&agenda)?);
    } else {
        print_text(&agenda);
    }
    Ok(())
}
