mod logging;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use dolly_core::{Error as CoreError, Fields, RecordingStorage, Value};
use dolly_factory::{DefinitionError, DefinitionFile, Factory};
use logging::init_logging;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("definition error: {0}")]
    Definition(#[from] DefinitionError),
    #[error("factory error: {0}")]
    Core(#[from] CoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "dolly", version, about = "Blueprint-driven test record factory")]
struct Cli {
    /// Append JSON log events to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    /// Emit console logs as JSON.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create records from a blueprint and print the issued statements.
    Render(RenderArgs),
    /// List the blueprints declared in a definitions file.
    List(ListArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// TOML file declaring the blueprints.
    #[arg(long, value_name = "FILE")]
    definitions: PathBuf,
    /// Blueprint to create.
    #[arg(long)]
    blueprint: String,
    /// Number of records to create.
    #[arg(long, default_value_t = 1)]
    count: usize,
    /// Field override, repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_override)]
    overrides: Vec<(String, Value)>,
    /// Print only the statements, not the records.
    #[arg(long, default_value_t = false)]
    statements_only: bool,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// TOML file declaring the blueprints.
    #[arg(long, value_name = "FILE")]
    definitions: PathBuf,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref(), cli.json_logs)?;

    let run_id = Uuid::new_v4().to_string();
    let started_at = chrono::Utc::now();
    tracing::info!(event = "run_started", run_id = %run_id, started_at = %started_at.to_rfc3339());

    let result = match cli.command {
        Command::Render(args) => run_render(args),
        Command::List(args) => run_list(args),
    };

    match &result {
        Ok(()) => tracing::info!(event = "run_finished", run_id = %run_id),
        Err(err) => tracing::error!(event = "run_failed", run_id = %run_id, error = %err),
    }
    result
}

fn run_render(args: RenderArgs) -> Result<(), CliError> {
    let RenderArgs {
        definitions,
        blueprint,
        count,
        overrides,
        statements_only,
    } = args;

    let mut factory = load_factory(&definitions)?;
    let overrides: Fields = overrides.into_iter().collect();

    tracing::info!(event = "render_started", blueprint = %blueprint, count);
    let records = factory.create_list(&blueprint, count, overrides)?;

    let statements = factory
        .storage()
        .map(|storage| storage.statements().to_vec())
        .unwrap_or_default();
    tracing::info!(
        event = "render_finished",
        blueprint = %blueprint,
        records = records.len(),
        statements = statements.len()
    );

    for statement in &statements {
        println!("{statement};");
    }
    if !statements_only {
        println!("{}", serde_json::to_string_pretty(&records)?);
    }
    Ok(())
}

fn run_list(args: ListArgs) -> Result<(), CliError> {
    let factory = load_factory(&args.definitions)?;
    for name in factory.names() {
        let blueprint = factory.blueprint(name)?;
        println!("{name}\t{}", blueprint.table());
    }
    Ok(())
}

fn load_factory(path: &Path) -> Result<Factory<RecordingStorage>, CliError> {
    let file = DefinitionFile::load(path)?;
    let mut factory = Factory::with_storage(RecordingStorage::new());
    file.apply(&mut factory)?;
    tracing::info!(
        event = "definitions_loaded",
        path = %path.display(),
        blueprints = file.blueprints.len()
    );
    Ok(factory)
}

/// Parse `key=value`; the value is typed as integer, float, boolean, `null`
/// or text, in that order.
fn parse_override(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in `{raw}`"));
    }
    Ok((key.to_string(), parse_value(value)))
}

fn parse_value(raw: &str) -> Value {
    if let Ok(value) = raw.parse::<i64>() {
        return Value::Int(value);
    }
    if let Ok(value) = raw.parse::<f64>() {
        if value.is_finite() {
            return Value::Float(value);
        }
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => Value::Text(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_are_typed() {
        assert_eq!(parse_override("level=3"), Ok(("level".to_string(), Value::Int(3))));
        assert_eq!(parse_override("ratio=0.5"), Ok(("ratio".to_string(), Value::Float(0.5))));
        assert_eq!(parse_override("active=true"), Ok(("active".to_string(), Value::Bool(true))));
        assert_eq!(parse_override("id=null"), Ok(("id".to_string(), Value::Null)));
        assert_eq!(parse_override("mode=inf"), Ok(("mode".to_string(), Value::from("inf"))));
        assert_eq!(
            parse_override("email=a=b@example.com"),
            Ok(("email".to_string(), Value::from("a=b@example.com")))
        );
    }

    #[test]
    fn overrides_require_a_key() {
        assert!(parse_override("level").is_err());
        assert!(parse_override("=3").is_err());
    }

    #[test]
    fn cli_parses_render_arguments() {
        let cli = Cli::try_parse_from([
            "dolly",
            "render",
            "--definitions",
            "blueprints.toml",
            "--blueprint",
            "player",
            "--count",
            "2",
            "--set",
            "username=Neo",
        ])
        .expect("parse");

        match cli.command {
            Command::Render(args) => {
                assert_eq!(args.blueprint, "player");
                assert_eq!(args.count, 2);
                assert_eq!(args.overrides, vec![("username".to_string(), Value::from("Neo"))]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
