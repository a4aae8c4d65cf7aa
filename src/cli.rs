use crate::config::Config;
use crate::interpreter::{Registry, Script};
use crate::proc::{json_to_val, spawn, val_to_json, ProcError, Val};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rhythm-proc")]
#[command(about = "Run scripted procedures on the effect engine", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a script and print its result as JSON
    Run {
        /// Path to the script (JSON AST)
        script: PathBuf,

        /// Arguments as JSON; an array binds one element per parameter
        #[arg(long)]
        args: Option<String>,

        /// Cancel the procedure after this many milliseconds
        #[arg(long)]
        cancel_after: Option<u64>,
    },

    /// Parse and validate a script without running it
    Check {
        /// Path to the script (JSON AST)
        script: PathBuf,
    },
}

/// Run the CLI by parsing process arguments
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli).await
}

/// Run the CLI with provided arguments
pub async fn run_cli_from_args(args: Vec<String>) -> Result<()> {
    let cli = Cli::try_parse_from(args)?;
    run_cli_with_args(cli).await
}

async fn run_cli_with_args(cli: Cli) -> Result<()> {
    let cancel_override = match &cli.command {
        Commands::Run { cancel_after, .. } => *cancel_after,
        Commands::Check { .. } => None,
    };

    // Load configuration before anything is logged so the filter applies
    let config = Config::builder()
        .config_path(cli.config.map(PathBuf::from))
        .cancel_after_ms(cancel_override)
        .build()
        .context("Failed to load configuration")?;
    init_tracing(&config);

    match cli.command {
        Commands::Run { script, args, .. } => {
            let loaded = load_checked(&script)?;
            let args = parse_args(args.as_deref())?;
            let cancel_after = config.cancel_after_ms.map(Duration::from_millis);

            let value = execute_script(&loaded, args, cancel_after)
                .await
                .map_err(|e| anyhow!("Procedure failed: {}", e))?;
            println!("{}", render(&value)?);
        }

        Commands::Check { script } => {
            load_checked(&script)?;
            println!("{}: ok", script.display());
        }
    }

    Ok(())
}

/// Install the stderr subscriber; `RUST_LOG` wins over the configured filter
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.effective_log_filter()));

    // A subscriber may already be installed by an embedding host
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_checked(path: &Path) -> Result<Script> {
    let script = Script::load(path)
        .with_context(|| format!("Failed to load script {}", path.display()))?;
    script
        .validate()
        .with_context(|| format!("Script {} failed validation", path.display()))?;
    Ok(script)
}

/// Parse `--args`: an array is spread over the parameters, anything else is
/// the single argument
pub fn parse_args(raw: Option<&str>) -> Result<Vec<Val>> {
    let Some(raw) = raw else {
        return Ok(vec![]);
    };

    let json: JsonValue = serde_json::from_str(raw).context("--args is not valid JSON")?;
    Ok(match json {
        JsonValue::Array(items) => items.iter().map(json_to_val).collect(),
        other => vec![json_to_val(&other)],
    })
}

/// Run a script with the stdlib registry, optionally cancelling it
pub async fn execute_script(
    script: &Script,
    args: Vec<Val>,
    cancel_after: Option<Duration>,
) -> Result<Val, ProcError> {
    let registry = Registry::with_stdlib();
    let handle = spawn(script.instantiate(&registry, args));

    if let Some(after) = cancel_after {
        let handle = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if !handle.is_done() {
                info!(proc_id = %handle.id(), "cancel timer fired");
                handle.cancel();
            }
        });
    }

    handle.join().await
}

fn render(value: &Val) -> Result<String> {
    match val_to_json(value) {
        Ok(json) => serde_json::to_string_pretty(&json).context("Failed to render result"),
        // Functions and futures have no JSON form
        Err(_) => Ok(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args_spreads_arrays() {
        assert_eq!(
            parse_args(Some(r#"[1, "a"]"#)).unwrap(),
            vec![Val::Num(1.0), Val::from("a")]
        );
        assert_eq!(parse_args(Some("true")).unwrap(), vec![Val::Bool(true)]);
        assert!(parse_args(None).unwrap().is_empty());
        assert!(parse_args(Some("{nope")).is_err());
    }

    #[tokio::test]
    async fn test_execute_script_returns_value() {
        let script = Script::from_json(
            r#"{"params": ["x"], "body": {"t": "Block", "body": [
                {"t": "Return", "value": {"t": "Call", "callee": {"t": "Ident", "name": "add"}, "args": [
                    {"t": "Ident", "name": "x"}, {"t": "LitNum", "v": 1}
                ]}}
            ]}}"#,
        )
        .unwrap();

        let value = execute_script(&script, vec![Val::Num(41.0)], None)
            .await
            .unwrap();

        assert_eq!(value, Val::Num(42.0));
        assert_eq!(render(&value).unwrap(), "42.0");
    }

    #[tokio::test]
    async fn test_execute_script_cancel_timer_unwinds() {
        let script = Script::from_json(
            r#"{"params": [], "body": {"t": "Try",
                "body": {"t": "Expr", "expr": {"t": "Call", "callee": {"t": "Ident", "name": "never"}, "args": []}},
                "finally_s": {"t": "Return", "value": {"t": "LitStr", "v": "cancelled"}}
            }}"#,
        )
        .unwrap();

        let value = tokio::time::timeout(
            Duration::from_secs(5),
            execute_script(&script, vec![], Some(Duration::from_millis(10))),
        )
        .await
        .unwrap();

        assert_eq!(value, Ok(Val::from("cancelled")));
    }

    #[test]
    fn test_check_command_parses() {
        let cli = Cli::try_parse_from(["rhythm-proc", "check", "job.json"]).unwrap();

        assert!(matches!(cli.command, Commands::Check { script } if script == Path::new("job.json")));
    }
}
