use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use jotdb_core::api::JotDb;
use jotdb_core::config::DatabaseOptions;
use jotdb_core::types::{DEFAULT_DATABASE_PATH, DEFAULT_PRIMARY_KEY};

mod commands;
mod display;
mod error;
mod executor;

use commands::Command;
use display::OutputMode;
use error::ConsoleError;

/// JotDB Console: scriptable CLI for JotDB tables.
#[derive(Parser, Debug)]
#[command(name = "jotdb", version)]
struct Cli {
    /// Directory holding the table files.
    #[arg(short, long, env = "JOTDB_PATH", default_value = DEFAULT_DATABASE_PATH, global = true)]
    path: PathBuf,

    /// Primary-key name used when creating tables.
    #[arg(long, env = "JOTDB_PRIMARY_KEY", default_value = DEFAULT_PRIMARY_KEY, global = true)]
    primary_key: String,

    /// Table to operate on.
    #[arg(short, long, env = "JOTDB_TABLE", global = true)]
    table: Option<String>,

    /// Output results as machine-parseable JSON.
    #[arg(short, long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn options(&self) -> DatabaseOptions {
        DatabaseOptions {
            table: self.table.clone(),
            path: self.path.clone(),
            primary_key: self.primary_key.clone(),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    process::exit(run(cli));
}

/// Execute the parsed command line.
///
/// Returns exit code: 0 = success, 1 = error (reported on stderr).
fn run(cli: Cli) -> i32 {
    let mode = OutputMode::from_flag(cli.json);
    match run_command(cli, mode) {
        Ok(()) => 0,
        Err(e) => {
            display::render_error(&e, mode);
            1
        }
    }
}

fn run_command(cli: Cli, mode: OutputMode) -> Result<(), ConsoleError> {
    let db = JotDb::open(cli.options())?;
    let result = executor::execute(&db, cli.command)?;
    display::render(&result, mode, &mut io::stdout().lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn path_arg(dir: &tempfile::TempDir) -> String {
        dir.path().join("database").to_string_lossy().into_owned()
    }

    // ---- Cli parsing tests ----

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["bin", "describe"]).unwrap();
        assert_eq!(cli.command, Command::Describe);
        assert!(!cli.json);
        let options = cli.options();
        assert_eq!(options.primary_key, "id");
        assert_eq!(options.path, PathBuf::from("database"));
    }

    #[test]
    fn test_cli_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["bin", "first", "-t", "houses", "--json"]).unwrap();
        assert_eq!(cli.table.as_deref(), Some("houses"));
        assert!(cli.json);
    }

    #[test]
    fn test_cli_select_flags() {
        let cli = Cli::try_parse_from([
            "bin",
            "select",
            "--where",
            "id >= 2",
            "--order-by",
            "house desc",
            "--limit",
            "2",
            "--offset",
            "1",
            "--reverse",
        ])
        .unwrap();
        assert_eq!(cli.command, Command::Select {
            fields: None,
            condition: Some("id >= 2".into()),
            order_by: Some("house desc".into()),
            limit: Some(2),
            offset: Some(1),
            reverse: true,
        });
    }

    #[test]
    fn test_cli_offset_requires_limit() {
        assert!(Cli::try_parse_from(["bin", "select", "--offset", "1"]).is_err());
    }

    #[test]
    fn test_cli_insert_requires_assignments() {
        assert!(Cli::try_parse_from(["bin", "insert"]).is_err());
        let cli = Cli::try_parse_from(["bin", "insert", "house=Stark", "words=Winter"]).unwrap();
        assert_eq!(cli.command, Command::Insert {
            assignments: vec!["house=Stark".into(), "words=Winter".into()],
        });
    }

    #[test]
    fn test_cli_missing_subcommand() {
        assert!(Cli::try_parse_from(["bin"]).is_err());
    }

    // ---- run() exit codes ----

    #[test]
    fn test_run_success_and_failure_codes() {
        let dir = tempdir().unwrap();
        let path = path_arg(&dir);
        let base = ["bin", "--path", path.as_str(), "--table", "houses"];

        let create = Cli::try_parse_from(base.iter().copied().chain(["create", "--fields", "house"]))
            .unwrap();
        assert_eq!(run(create), 0);

        let again = Cli::try_parse_from(base.iter().copied().chain(["create"])).unwrap();
        assert_eq!(run(again), 1);

        let insert =
            Cli::try_parse_from(base.iter().copied().chain(["insert", "house=Stark"])).unwrap();
        assert_eq!(run(insert), 0);

        let bad = Cli::try_parse_from(base.iter().copied().chain(["insert", "age=3"])).unwrap();
        assert_eq!(run(bad), 1);
    }

    #[test]
    fn test_run_without_table_fails() {
        let dir = tempdir().unwrap();
        let path = path_arg(&dir);
        let mut cli = Cli::try_parse_from(["bin", "--path", path.as_str(), "next-id"]).unwrap();
        // JOTDB_TABLE from the environment would otherwise select a table.
        cli.table = None;
        assert_eq!(run(cli), 1);
    }
}
