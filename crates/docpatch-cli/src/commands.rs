use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use tracing::debug;

use docpatch_diff::{diff_nodes, DiffConfig, Patch, Value, PUSH, SET, UNSET};
use docpatch_types::Introspect;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Diff(args) => cmd_diff(args, cli.format),
        Command::Config(args) => cmd_config(args, cli.format),
    }
}

fn cmd_diff(args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = build_config(&args.options)?;
    debug!(?config, old = %args.old.display(), new = %args.new.display(), "diffing documents");

    let old = load_document(&args.old)?;
    let new = load_document(&args.new)?;
    let patch = diff_documents(old.as_ref(), new.as_ref(), &config)?;
    print!("{}", render(&patch, format)?);
    Ok(())
}

fn cmd_config(args: ConfigArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = build_config(&args.options)?;
    let out = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&config)? + "\n",
        OutputFormat::Text | OutputFormat::Bson => toml::to_string_pretty(&config)?,
    };
    print!("{out}");
    Ok(())
}

/// Load the config file, if any, then apply flag overrides.
pub fn build_config(options: &ConfigOptions) -> anyhow::Result<DiffConfig> {
    let mut config: DiffConfig = match &options.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => DiffConfig::default(),
    };
    if let Some(strategy) = options.strategy {
        config = config.array_strategy(strategy.into());
    }
    if let Some(zero) = options.zero {
        config = config.zero_value_handling(zero.into());
    }
    if !options.ignore.is_empty() {
        config = config.ignore_fields(options.ignore.iter().cloned());
    }
    if options.detect_sharing {
        config = config.detect_pointer_sharing(true);
    }
    Ok(config)
}

/// Read a JSON document. A document that is just `null` is absent.
pub fn load_document(path: &Path) -> anyhow::Result<Option<serde_json::Value>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok((!value.is_null()).then_some(value))
}

pub fn diff_documents(
    old: Option<&serde_json::Value>,
    new: Option<&serde_json::Value>,
    config: &DiffConfig,
) -> anyhow::Result<Patch> {
    let old = old.map(Introspect::introspect);
    let new = new.map(Introspect::introspect);
    diff_nodes(old.as_ref(), new.as_ref(), config).context("diff failed")
}

pub fn render(patch: &Patch, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&patch.info())? + "\n"),
        OutputFormat::Bson => {
            let mut out = hex::encode(patch.to_bson()?);
            out.push('\n');
            for filter in patch.array_filters_bson()? {
                out.push_str(&hex::encode(filter));
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Text => Ok(render_text(patch)),
    }
}

fn render_text(patch: &Patch) -> String {
    if patch.is_empty() {
        return "No changes.\n".to_string();
    }
    let mut out = String::new();
    for (operator, fields) in patch.operations() {
        let label = match operator.as_str() {
            SET => operator.green(),
            UNSET => operator.red(),
            PUSH => operator.cyan(),
            _ => operator.yellow(),
        };
        for (path, value) in fields {
            if operator == UNSET {
                let _ = writeln!(out, "{label} {}", path.bold());
            } else {
                let _ = writeln!(out, "{label} {} = {value}", path.bold());
            }
        }
    }
    for filter in patch.array_filters() {
        let _ = writeln!(out, "  {} {}", "where".dimmed(), Value::Document(filter.clone()));
    }
    let _ = writeln!(
        out,
        "{} operations, {} array filters",
        patch.len().to_string().bold(),
        patch.array_filters().len()
    );
    out
}
