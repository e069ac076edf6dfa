//! Companion TUI Entry Point
//!
//! Launches the terminal chat client for the mental-health companion.
//!
//! Usage:
//!   companion-tui [OPTIONS]
//!
//! Options:
//!   --api-url <URL>          Companion API base URL (default: http://127.0.0.1:8000/api)
//!   --config <PATH>          Config file (default: ~/.config/companion/companion.toml)
//!   --timeout <SECS>         Request timeout
//!   --identity-file <PATH>   Where the stable user id is kept
//!   --no-resources           Don't fetch resource suggestions

use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use companion_core::{default_config_path, load_config_from_path, CompanionConfigFile, ConfigOverrides};
use companion_tui::conductor_client::ConductorClient;
use companion_tui::App;

#[derive(Parser, Debug)]
#[command(name = "companion-tui", about = "Talk to the companion from your terminal")]
struct Args {
    /// Companion API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Config file
    #[arg(long, env = "COMPANION_CONFIG")]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Where the stable user id is kept
    #[arg(long)]
    identity_file: Option<PathBuf>,

    /// Don't fetch resource suggestions
    #[arg(long)]
    no_resources: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(url) = &self.api_url {
            overrides = overrides.with_api_base_url(url.clone());
        }
        if let Some(secs) = self.timeout {
            overrides = overrides.with_request_timeout_secs(secs);
        }
        if let Some(path) = &self.identity_file {
            overrides = overrides.with_identity_path(path.clone());
        }
        if self.no_resources {
            overrides = overrides.with_fetch_resources(false);
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Log to a file; stdout belongs to the terminal UI
    let log_path = std::env::temp_dir().join("companion-tui.log");
    let log_writer: Box<dyn io::Write + Send> =
        match OpenOptions::new().create(true).append(true).open(&log_path) {
            Ok(file) => Box::new(file),
            Err(_) => Box::new(io::sink()),
        };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_writer)),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config = load_config_from_path(args.config.clone().or_else(default_config_path))?;
    let overrides = args.overrides();
    if !overrides.is_empty() {
        overrides.apply(&mut config);
        config.validate()?;
    }
    tracing::info!(api = %config.api_base_url, source = ?config.source(), "Configuration loaded");

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: companion-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  - Running in a non-interactive environment (CI, container)");
        eprintln!("  - SSH without -t flag");
        eprintln!("  - Piped stdin/stdout");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = run_app(&mut terminal, &config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Propagate any errors
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &CompanionConfigFile,
) -> anyhow::Result<()> {
    let size = crossterm::terminal::size()?;
    let client = ConductorClient::from_config(config);
    let mut app = App::new(client, config, size);
    app.run(terminal).await?;

    // Show goodbye message after TUI closes
    if let Some(goodbye) = app.goodbye() {
        println!("\n\x1b[36mCompanion:\x1b[0m {goodbye}\n");
    }

    Ok(())
}
