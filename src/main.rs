use std::{
    io::{self, Stdout},
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tracing::info;

use todo_remote::{
    app::{App, Command},
    cli::{default_log_path, init_tracing, Cli},
    config::RemoteConfig,
    database::{self, SqliteStore},
    remote::RestStore,
    store::SharedStore,
    ui,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_path = cli.log_file.clone().or_else(default_log_path);
    let _log_guard = init_tracing(cli.verbose, log_path.as_deref())?;

    let store = open_store(&cli)?;
    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, App::new(store));
    restore_terminal(&mut terminal)?;
    result
}

fn open_store(cli: &Cli) -> anyhow::Result<SharedStore> {
    if cli.local {
        let path = match &cli.db {
            Some(path) => path.clone(),
            None => database::default_path().context("could not determine home directory")?,
        };
        let store = SqliteStore::open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        return Ok(Arc::new(store));
    }

    let config = RemoteConfig::from_env()
        .context("hosted store is not configured")?
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    info!(url = %config.url, "using hosted task store");
    Ok(Arc::new(RestStore::connect(&config)?))
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(terminal.show_cursor()?)
}

// Keys typed while a store call blocked the loop hit disabled controls.
fn discard_input() -> anyhow::Result<()> {
    while event::poll(Duration::ZERO)? {
        event::read()?;
    }
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, mut app: App) -> anyhow::Result<()> {
    let mut pending = Some(Command::Refresh);
    loop {
        if let Some(command) = pending.take() {
            app.begin(&command);
            terminal.draw(|frame| ui::draw(frame, &mut app))?;
            pending = app.perform(command);
            discard_input()?;
            continue;
        }

        if app.should_quit {
            break;
        }

        app.toaster.prune(Instant::now());
        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    pending = app.handle_key(key);
                }
            }
        }
    }
    Ok(())
}
