//! `TopicChat`: terminal client for topic-threaded chat.
//!
//! Shows a message list with a composer below it. Sends go to an in-process
//! loopback service and are echoed into the list. Configuration via CLI
//! flags, environment variables, or config file
//! (`~/.config/topicchat/config.toml`).
//!
//! ```bash
//! # Demo conversation
//! cargo run --bin topicchat
//!
//! # Load message records exported as JSON
//! cargo run --bin topicchat -- --messages messages.json --email me@example.com
//! ```

use std::io;
use std::path::Path;

use clap::Parser;
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, KeyEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_appender::non_blocking::WorkerGuard;

use topicchat::app::{self, App};
use topicchat::config::{CliArgs, ClientConfig};
use topicchat::sender::loopback::LoopbackSender;
use topicchat::ui;
use topicchat_proto::message::Message;

fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::from_cli(&cli)
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(email = %config.email, "topicchat starting");

    let messages = match &config.messages_path {
        Some(path) => load_messages(path)?,
        None => app::demo_messages(&config.viewer()),
    };

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app.
    let result = run_app(&mut terminal, messages, &config);

    // Restore terminal.
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    tracing::info!("topicchat exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("topicchat.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Read message records from a JSON file.
fn load_messages(path: &Path) -> io::Result<Vec<Message>> {
    let contents = std::fs::read_to_string(path)?;
    let messages = Message::list_from_json(&contents).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{}: {e}", path.display()),
        )
    })?;
    tracing::info!(count = messages.len(), path = %path.display(), "loaded messages");
    Ok(messages)
}

/// Main application loop.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    messages: Vec<Message>,
    config: &ClientConfig,
) -> io::Result<()> {
    let mut app = App::new(LoopbackSender::default(), config.viewer())
        .with_timestamp_format(config.timestamp_format.as_str())
        .with_messages(messages);

    loop {
        // Step 1: Draw the UI frame, remembering where each message landed.
        let mut hits = Vec::new();
        terminal.draw(|frame| hits = ui::draw(frame, &app))?;
        app.hits = hits;

        // Step 2: Poll for terminal input events.
        if event::poll(config.poll_timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key_event(key),
                Event::Mouse(mouse) => app.handle_mouse_event(mouse),
                Event::Paste(text) => app.handle_paste(&text),
                _ => {}
            }
        }

        // Step 3: Echo whatever the loopback service accepted.
        for request in app.sender.take_sent() {
            app.echo_sent(request, chrono::Utc::now().timestamp());
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
