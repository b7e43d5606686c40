use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "todo",
    version,
    about = "Terminal task list backed by a hosted todos table",
    after_help = concat!(
        "The hosted store is read from the SUPABASE_URL and SUPABASE_ANON_KEY ",
        "environment variables unless --local is given."
    )
)]
pub struct Cli {
    /// Keep tasks in a local SQLite file instead of the hosted store
    #[arg(long)]
    pub local: bool,

    /// SQLite file used with --local [default: ~/.todo/todos.sqlite]
    #[arg(long, requires = "local")]
    pub db: Option<PathBuf>,

    /// Request timeout for the hosted store
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Where to write logs [default: <data dir>/todo-remote/todo-remote.log]
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("todo-remote").join("todo-remote.log"))
}

/// Logs go to a file: the terminal belongs to the UI. Returns the guard that
/// flushes the writer on drop, or `None` when there is nowhere to log.
pub fn init_tracing(verbose: u8, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let Some(path) = log_file else {
        return Ok(None);
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("log file path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        &dir, file_name,
    ));
    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_hosted_store() {
        let cli = Cli::try_parse_from(["todo"]).unwrap();
        assert!(!cli.local);
        assert_eq!(cli.timeout_secs, 30);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn db_requires_local() {
        assert!(Cli::try_parse_from(["todo", "--db", "/tmp/t.sqlite"]).is_err());

        let cli = Cli::try_parse_from(["todo", "--local", "--db", "/tmp/t.sqlite", "-vv"]).unwrap();
        assert!(cli.local);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/t.sqlite")));
        assert_eq!(cli.verbose, 2);
    }
}
