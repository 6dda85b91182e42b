//! Command-line interface definition and command dispatch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use colmap_core::record::descriptors;
use colmap_core::resolve::resolve_field;
use colmap_core::{
    apply_changes, build_literal_set, build_named_set_by_column, build_named_set_by_field,
    build_positional_set, compute_changed_columns, enumerate_columns, extract_parameter_values,
    extract_value, resolve_column, DynamicRecord, EnumerationMode, Record, RecordSchema, SqlValue,
};

use crate::json;
use crate::schema;

/// Builds SQL SET clauses, column lists and parameters from JSON records.
#[derive(Debug, Parser)]
#[command(name = "colmap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Record schema file (JSON).
    #[arg(short, long, env = "COLMAP_SCHEMA")]
    pub schema: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build a SET clause for the given fields.
    Set {
        /// Record file (JSON object keyed by field name).
        #[arg(short, long)]
        record: PathBuf,

        /// Fields to assign, in order.
        #[arg(short, long, value_delimiter = ',', required = true)]
        fields: Vec<String>,

        /// How values appear in the clause.
        #[arg(long, value_enum, default_value_t = SetStyle::Positional)]
        style: SetStyle,
    },

    /// Build a named-parameter SET clause for the given columns.
    SetByColumn {
        /// Record file.
        #[arg(short, long)]
        record: PathBuf,

        /// Columns to assign; unknown columns are dropped.
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
    },

    /// List the record's columns.
    Columns {
        /// Record file.
        #[arg(short, long)]
        record: PathBuf,

        /// Fields to leave out.
        #[arg(long, value_delimiter = ',')]
        skip: Vec<String>,

        /// How each column is rendered.
        #[arg(long, value_enum, default_value_t = ColumnMode::Plain)]
        mode: ColumnMode,
    },

    /// Print the parameter values for the given fields as JSON.
    Params {
        /// Record file.
        #[arg(short, long)]
        record: PathBuf,

        /// Fields to read, in order.
        #[arg(short, long, value_delimiter = ',', required = true)]
        fields: Vec<String>,

        /// Extra trailing parameter (JSON scalar), may be repeated.
        #[arg(long)]
        extra: Vec<String>,
    },

    /// Print the columns that differ between two records.
    Diff {
        /// Record before the change.
        #[arg(long)]
        original: PathBuf,

        /// Record after the change.
        #[arg(long)]
        updated: PathBuf,

        /// Fields to leave out.
        #[arg(long, value_delimiter = ',')]
        skip: Vec<String>,
    },

    /// Patch a record and print the UPDATE statement for what changed.
    Update {
        /// Record as currently stored.
        #[arg(short, long)]
        record: PathBuf,

        /// Patch file (JSON object of field name to new value).
        #[arg(short, long)]
        patch: PathBuf,

        /// Table name.
        #[arg(short, long)]
        table: String,

        /// Key field used in the WHERE clause.
        #[arg(short, long)]
        key: String,
    },
}

/// Value style of a SET clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SetStyle {
    /// ``SET `col`='value'``
    Literal,
    /// `SET col=?`
    Positional,
    /// `SET col=:col`
    Named,
}

/// Rendering of listed columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColumnMode {
    /// `col`
    Plain,
    /// `` `col` ``
    Quoted,
    /// `:col`
    Named,
}

impl From<ColumnMode> for EnumerationMode {
    fn from(mode: ColumnMode) -> Self {
        match mode {
            ColumnMode::Plain => Self::Plain,
            ColumnMode::Quoted => Self::Quoted,
            ColumnMode::Named => Self::NamedParameter,
        }
    }
}

/// Runs the parsed command and returns what should be printed.
pub fn run(cli: &Cli) -> Result<String> {
    let schema = schema::load(&cli.schema)?;
    debug!(
        shape = schema.name(),
        fields = schema.fields().len(),
        "Loaded schema"
    );

    match &cli.command {
        Commands::Set {
            record,
            fields,
            style,
        } => {
            let record = load_record(&schema, record)?;
            let sql = match style {
                SetStyle::Literal => build_literal_set(&record, fields)?,
                SetStyle::Positional => build_positional_set(&record, fields)?,
                SetStyle::Named => build_named_set_by_field(&record, fields)?,
            };
            debug!(sql = %sql, ?style, "Built SET clause");
            Ok(sql)
        }

        Commands::SetByColumn { record, columns } => {
            let record = load_record(&schema, record)?;
            let (sql, used) = build_named_set_by_column(&record, columns)?;
            if used.len() < columns.len() {
                info!(
                    requested = columns.len(),
                    used = used.len(),
                    "Some columns matched no field and were dropped"
                );
            }
            Ok(json!({ "sql": sql, "columns": used }).to_string())
        }

        Commands::Columns { record, skip, mode } => {
            let record = load_record(&schema, record)?;
            Ok(enumerate_columns(&record, skip, (*mode).into()))
        }

        Commands::Params {
            record,
            fields,
            extra,
        } => {
            let record = load_record(&schema, record)?;
            let extra = extra
                .iter()
                .map(|raw| parse_extra(raw))
                .collect::<Result<Vec<_>>>()?;
            let params = extract_parameter_values(&record, fields, extra)?;
            Ok(Value::Array(params.iter().map(json::value_to_json).collect()).to_string())
        }

        Commands::Diff {
            original,
            updated,
            skip,
        } => {
            let original = load_record(&schema, original)?;
            let updated = load_record(&schema, updated)?;
            let changed = compute_changed_columns(&original, &updated, skip)?;
            info!(changed = changed.len(), "Compared records");
            Ok(json!(changed).to_string())
        }

        Commands::Update {
            record,
            patch,
            table,
            key,
        } => {
            let original = load_record(&schema, record)?;
            let patch = read_json(patch)?;
            let changes = json::changes_from_json(&schema, &patch)?;
            let patched: Vec<String> = changes.iter().map(|(name, _)| name.clone()).collect();

            let mut updated = original.clone();
            apply_changes(&mut updated, changes)?;
            let update = build_update(&original, &updated, &patched, table, key)?;
            Ok(update.to_string())
        }
    }
}

/// Diffs `original` against `updated` and renders a named-parameter UPDATE
/// keyed on the `key` field.
///
/// The diff never reports a field that was absent in `original`, so patched
/// fields filled from absent are added to the dirty set here.
fn build_update(
    original: &DynamicRecord,
    updated: &DynamicRecord,
    patched: &[String],
    table: &str,
    key: &str,
) -> Result<Value> {
    let (_, key_column) = resolve_field(original, key)?;
    let key_value = extract_value(original, key)?;

    let mut dirty = compute_changed_columns(original, updated, &[key])?;
    for name in patched.iter().filter(|name| *name != key) {
        let (index, column) = resolve_field(updated, name)?;
        let filled = original.value(index).is_none() && updated.value(index).is_some();
        if filled && !dirty.iter().any(|c| *c == column.name) {
            debug!(field = %name, "Patched field was absent in the original");
            dirty.push(column.name.into_owned());
        }
    }
    if dirty.is_empty() {
        info!(table, "No changes detected");
        return Ok(json!({ "sql": Value::Null, "params": {} }));
    }

    let (set, used) = build_named_set_by_column(updated, &dirty)?;
    let sql = format!("UPDATE {table} {set} WHERE {0}=:{0}", key_column.name);
    debug!(sql = %sql, "Built UPDATE statement");

    let mut params = named_values(updated, &used);
    params.insert(key_column.name.into_owned(), json::value_to_json(&key_value));

    Ok(json!({ "sql": sql, "params": params }))
}

/// Collects the values of the fields mapped to `columns`, keyed by column.
/// Absent values bind as `null`.
fn named_values<R: Record + ?Sized>(record: &R, columns: &[String]) -> Map<String, Value> {
    let mut values = Map::new();
    for (index, descriptor) in descriptors(record) {
        let Some(column) = resolve_column(&descriptor) else {
            continue;
        };
        if columns.iter().any(|c| *c == column.name) {
            let value = record
                .value(index)
                .map_or(Value::Null, |v| json::value_to_json(&v));
            values.insert(column.name.into_owned(), value);
        }
    }
    values
}

fn parse_extra(raw: &str) -> Result<SqlValue> {
    // Bare words are taken as text
    let value: Value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
    json::untyped_value(&value)
        .with_context(|| format!("extra parameter must be a JSON scalar: {raw}"))
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("malformed JSON in {}", path.display()))
}

fn load_record(schema: &Arc<RecordSchema>, path: &Path) -> Result<DynamicRecord> {
    let value = read_json(path)?;
    let record = json::record_from_json(schema, &value)
        .with_context(|| format!("invalid record in {}", path.display()))?;
    debug!(path = %path.display(), "Loaded record");
    Ok(record)
}
