use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::logging::{init_logging_with_config, LogConfig};
use crate::model::{parse_api, print_issues, validate_api, Api};
use crate::router::{ParameterCodec, RouteMode, RouteTable};

/// Command-line interface for routebind
#[derive(Parser, Debug)]
#[command(name = "routebind", version)]
#[command(about = "Inspect API models and their route tables", long_about = None)]
pub struct Cli {
    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true, env = "ROUTEBIND_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Placeholder codec used by `match` and `stringify`
    #[arg(long, global = true, default_value = "identity")]
    pub codec: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and validate a model, printing every issue
    Check {
        /// Model file (YAML, TOML or JSON)
        #[arg(short, long)]
        model: PathBuf,
    },
    /// Export the route table document
    Routes {
        #[arg(short, long)]
        model: PathBuf,

        /// Directions the exported table supports
        #[arg(long, default_value_t = RouteMode::Bidirectional)]
        mode: RouteMode,

        #[arg(long, value_enum, default_value_t = DocumentFormat::Json)]
        format: DocumentFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Match a concrete path
    Match {
        #[arg(short, long)]
        model: PathBuf,

        path: String,
    },
    /// Produce the concrete path of a route id
    Stringify {
        #[arg(short, long)]
        model: PathBuf,

        route_id: String,

        /// Placeholder values as `name=value`
        #[arg(value_parser = parse_assignment)]
        values: Vec<(String, String)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

fn parse_assignment(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got '{raw}'")),
    }
}

/// Parse arguments, initialise logging and run the command against stdout.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging_with_config(&LogConfig::from_env().with_level(cli.log_level.clone()))?;
    let stdout = std::io::stdout();
    execute(&cli, &mut stdout.lock())
}

/// Run `cli.command`, writing command output to `out`.
pub fn execute(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let codec = ParameterCodec::by_name(&cli.codec)
        .with_context(|| format!("unknown codec '{}'", cli.codec))?;
    match &cli.command {
        Commands::Check { model } => {
            let api = read_model(model)?;
            let issues = validate_api(&api);
            if !issues.is_empty() {
                print_issues(&issues);
                bail!("{} issue(s) found in '{}'", issues.len(), model.display());
            }
            writeln!(
                out,
                "{}: {} path(s), {} operation(s), {} scheme(s)",
                model.display(),
                api.paths.len(),
                api.operations().count(),
                api.authentication.len()
            )?;
        }
        Commands::Routes {
            model,
            mode,
            format,
            output,
        } => {
            let api = crate::model::load_api(model)?;
            let table = RouteTable::from_api(&api, RouteMode::Bidirectional, codec)?;
            let document = table.to_document(*mode)?;
            let rendered = match format {
                DocumentFormat::Json => document.to_json_pretty()?,
                DocumentFormat::Yaml => document.to_yaml()?,
            };
            match output {
                Some(path) => std::fs::write(path, &rendered)
                    .with_context(|| format!("failed to write '{}'", path.display()))?,
                None => writeln!(out, "{}", rendered.trim_end())?,
            }
        }
        Commands::Match { model, path } => {
            let api = crate::model::load_api(model)?;
            let table = RouteTable::from_api(&api, RouteMode::Reverse, codec)?;
            let matched = table.match_path(path)?;
            let methods: Vec<String> = api
                .path(&matched.route_id)
                .map(|p| p.operations.iter().map(|op| op.method.to_string()).collect())
                .unwrap_or_default();
            let report = json!({
                "routeId": matched.route_id.as_ref(),
                "methods": methods,
                "params": matched.params_map(),
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        Commands::Stringify {
            model,
            route_id,
            values,
        } => {
            let api = crate::model::load_api(model)?;
            let table = RouteTable::from_api(&api, RouteMode::Forward, codec)?;
            let values: BTreeMap<String, String> = values.iter().cloned().collect();
            writeln!(out, "{}", table.stringify(route_id, &values)?)?;
        }
    }
    Ok(())
}

/// Parse without validating so `check` can report every issue itself.
fn read_model(path: &Path) -> Result<Api> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read API model '{}'", path.display()))?;
    parse_api(path, &content).with_context(|| format!("failed to parse API model '{}'", path.display()))
}
