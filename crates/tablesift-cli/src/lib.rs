//! Command-line driver for the tablesift engine.
//!
//! Records come from a JSON array, columns from a YAML schema (see
//! [`config`]). Each invocation rebuilds the engine from the persisted
//! state, applies one command, and prints JSON.

pub mod cli;
pub mod config;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value as Json;
use tablesift::{
    ActiveFilter, Column, DatePreset, Dir, FileStore, FilterKind, FilterValue, FixedClock,
    NumberFormat, SortConfig, TableEngine,
};

use crate::cli::{Cli, Command, FilterArgs, SortDir};
use crate::config::SchemaConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    active_filters: Vec<ActiveFilter>,
    sort_config: Option<SortConfig>,
    total: usize,
    visible: usize,
}

/// Runs one command and returns what should be printed.
pub fn run(cli: Cli) -> Result<String> {
    let schema = SchemaConfig::load(&cli.schema)?.build()?;
    let data = load_records(&cli)?;

    let mut builder = TableEngine::builder(schema);
    if !cli.no_persist {
        builder = builder.persist(Arc::new(FileStore::new(&cli.state_dir)), cli.scope.clone());
    }
    if let Some(now) = &cli.now {
        let clock = FixedClock::parse(now).with_context(|| format!("invalid --now '{}'", now))?;
        builder = builder.clock(clock);
    }
    let mut engine = builder.build();
    tracing::debug!(records = data.len(), scope = %cli.scope, "engine ready");

    match cli.command {
        Command::List { limit } => {
            let rows = engine.filtered_data(&data);
            let limit = limit.unwrap_or(rows.len());
            let rows: Vec<&Json> = rows.into_iter().take(limit).collect();
            Ok(serde_json::to_string_pretty(&rows)?)
        }
        Command::Status => status(&engine, &data),
        Command::Filter(args) => {
            let column = engine.schema().column(&args.column)?;
            let filter = filter_from_args(column, &args)?;
            engine.set_filter(&args.column, Some(filter))?;
            status(&engine, &data)
        }
        Command::Clear { column: Some(column) } => {
            engine.clear_filter(&column)?;
            status(&engine, &data)
        }
        Command::Clear { column: None } => {
            engine.clear_all_filters();
            status(&engine, &data)
        }
        Command::Sort { column, dir } => {
            match dir {
                None => engine.toggle_sort(&column)?,
                Some(SortDir::Asc) => engine.set_sort(&column, Some(Dir::Asc))?,
                Some(SortDir::Desc) => engine.set_sort(&column, Some(Dir::Desc))?,
                Some(SortDir::None) => engine.set_sort(&column, None)?,
            }
            status(&engine, &data)
        }
        Command::Facets { column } => {
            let kind = engine.schema().column(&column)?.kind();
            let counts: BTreeMap<String, usize> = if kind == FilterKind::DatePreset {
                engine
                    .date_preset_counts(&column, &data)?
                    .into_iter()
                    .map(|(preset, count)| (preset.to_string(), count))
                    .collect()
            } else {
                engine.enum_counts(&column, &data)?
            };
            Ok(serde_json::to_string_pretty(&counts)?)
        }
    }
}

fn load_records(cli: &Cli) -> Result<Vec<Json>> {
    let raw = std::fs::read_to_string(&cli.data)
        .with_context(|| format!("reading records {}", cli.data.display()))?;
    let records: Vec<Json> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array", cli.data.display()))?;
    Ok(records)
}

fn status(engine: &TableEngine<Json>, data: &[Json]) -> Result<String> {
    let view = engine.view(data);
    let status = Status {
        visible: view.visible(),
        total: view.total,
        active_filters: view.active_filters,
        sort_config: view.sort,
    };
    Ok(serde_json::to_string_pretty(&status)?)
}

/// Builds the filter value the column's kind calls for.
///
/// Flags belonging to another kind are an error, so a typo cannot silently
/// install nothing.
fn filter_from_args(column: &Column<Json>, args: &FilterArgs) -> Result<FilterValue> {
    let given: Vec<&str> = [
        ("--text", args.text.is_some()),
        ("--select", !args.select.is_empty()),
        ("--min", args.min.is_some()),
        ("--max", args.max.is_some()),
        ("--preset", !args.preset.is_empty()),
        ("--has", args.has),
        ("--lacks", args.lacks),
    ]
    .into_iter()
    .filter_map(|(flag, present)| present.then_some(flag))
    .collect();

    let allowed: &[&str] = match column.kind() {
        FilterKind::Text => &["--text"],
        FilterKind::Enum => &["--select"],
        FilterKind::Range => &["--min", "--max"],
        FilterKind::DatePreset => &["--preset"],
        FilterKind::Boolean => &["--has", "--lacks"],
    };
    if let Some(flag) = given.iter().find(|flag| !allowed.contains(flag)) {
        bail!(
            "{} does not apply to {} column '{}' (use {})",
            flag,
            column.kind(),
            column.id(),
            allowed.join(" / ")
        );
    }

    Ok(match column.kind() {
        FilterKind::Text => FilterValue::text(args.text.clone().unwrap_or_default()),
        FilterKind::Enum => FilterValue::one_of(args.select.iter().cloned()),
        FilterKind::Range => {
            let format = column.number_format();
            FilterValue::range(
                args.min.map(|v| stored_bound(v, format)),
                args.max.map(|v| stored_bound(v, format)),
            )
        }
        FilterKind::DatePreset => FilterValue::presets(
            args.preset
                .iter()
                .map(|p| p.parse::<DatePreset>())
                .collect::<tablesift::Result<Vec<_>>>()?,
        ),
        FilterKind::Boolean if args.lacks => FilterValue::lacks(),
        FilterKind::Boolean => FilterValue::has(),
    })
}

/// Currency columns hold whole cents; bounds are given in dollars.
fn stored_bound(value: f64, format: NumberFormat) -> f64 {
    match format {
        NumberFormat::Currency => (value * 100.0).round(),
        NumberFormat::Plain => value,
    }
}
