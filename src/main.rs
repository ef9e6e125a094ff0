// src/main.rs

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::stdout;
use tokio::sync::mpsc;
use tracing::{error, info};

mod app;
mod config;
mod core;
mod logging;
mod ui;

use app::{App, AppState};
use config::ScanConfig;
use core::models::ScanResult;
use core::scanner::run_full_scan;
use core::transport::Capabilities;

/// External attack-surface risk scanner.
#[derive(Debug, Parser)]
#[command(name = "riskprism", version, about)]
struct Cli {
    /// Domain to scan. Without it the interactive terminal UI starts.
    domain: Option<String>,

    /// Path to a TOML configuration file.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Pretty-print the JSON report (headless mode only).
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    logging::initialize_logging()?;

    let config = ScanConfig::load(cli.config.as_deref())?;
    let caps = Capabilities::live(&config)?;

    match cli.domain {
        Some(domain) => run_headless(&domain, &caps, &config, cli.pretty).await,
        None => run_tui(caps, config).await,
    }
}

/// Scans once and prints the report as JSON on stdout.
async fn run_headless(domain: &str, caps: &Capabilities, config: &ScanConfig, pretty: bool) -> Result<()> {
    let result = run_full_scan(domain, caps, config).await;
    let json = if pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .wrap_err("Failed to serialize the scan result")?;
    println!("{}", json);
    Ok(())
}

async fn run_tui(caps: Capabilities, config: ScanConfig) -> Result<()> {
    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let outcome = event_loop(&mut terminal, caps, config).await;

    // --- Restore Terminal ---
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    outcome
}

async fn event_loop<B: Backend>(terminal: &mut Terminal<B>, caps: Capabilities, config: ScanConfig) -> Result<()> {
    let mut app = App::new();
    let (tx, mut rx) = mpsc::channel(1);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            handle_events(&mut app, &tx, &caps, &config)?;
        }

        if let Ok(result) = rx.try_recv() {
            app.finish_scan(result);
        }
        app.on_tick();
    }
    Ok(())
}

fn handle_events(
    app: &mut App,
    tx: &mpsc::Sender<ScanResult>,
    caps: &Capabilities,
    config: &ScanConfig,
) -> Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            match app.state {
                AppState::Idle => handle_idle_input(app, key.code, tx, caps, config),
                AppState::Finished => handle_finished_input(app, key.code),
                AppState::Scanning => {
                    if key.code == KeyCode::Char('q') {
                        app.quit();
                    }
                }
            }
        }
    }
    Ok(())
}

fn handle_idle_input(
    app: &mut App,
    key_code: KeyCode,
    tx: &mpsc::Sender<ScanResult>,
    caps: &Capabilities,
    config: &ScanConfig,
) {
    match key_code {
        KeyCode::Esc => app.quit(),
        KeyCode::Char(c) => app.input.push(c),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Enter => {
            let target = app.input.trim().to_string();
            if target.is_empty() {
                return;
            }
            app.state = AppState::Scanning;
            info!(target = %target, "Scan requested from the terminal UI.");

            let tx = tx.clone();
            let caps = caps.clone();
            let config = config.clone();
            tokio::spawn(async move {
                let result = run_full_scan(&target, &caps, &config).await;
                if tx.send(result).await.is_err() {
                    error!("UI closed before the scan result arrived.");
                }
            });
        }
        _ => {}
    }
}

fn handle_finished_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Up => app.select_previous(),
        KeyCode::Down => app.select_next(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headless_invocation() {
        let cli = Cli::try_parse_from(["riskprism", "example.com", "--pretty", "--config", "/tmp/rp.toml"]).unwrap();
        assert_eq!(cli.domain.as_deref(), Some("example.com"));
        assert!(cli.pretty);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/rp.toml")));
    }

    #[test]
    fn no_domain_means_interactive() {
        let cli = Cli::try_parse_from(["riskprism"]).unwrap();
        assert!(cli.domain.is_none());
        assert!(!cli.pretty);
    }
}
