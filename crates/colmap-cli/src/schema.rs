//! Record schema files.
//!
//! A schema file describes one record shape as JSON:
//!
//! ```json
//! {
//!   "name": "User",
//!   "fields": [
//!     { "name": "id", "type": "integer" },
//!     { "name": "email", "type": "string", "column": "mail", "optional": true },
//!     { "name": "active", "type": "bool", "kind": "boolean" },
//!     { "name": "session", "type": "string", "ignore": true }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use colmap_core::{FieldSpec, RecordSchema, ValueKind};

/// Top-level schema document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    /// Shape name.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldEntry>,
}

/// One field of a schema document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldEntry {
    /// Declared field name.
    pub name: String,
    /// Column annotation.
    #[serde(default)]
    pub column: Option<String>,
    /// Column kind annotation.
    #[serde(default)]
    pub kind: Option<String>,
    /// Value kind (`string`, `integer`, `float`, `bool`, `date`, `other`).
    #[serde(rename = "type")]
    pub value_type: String,
    /// Whether the field may be absent.
    #[serde(default)]
    pub optional: bool,
    /// Whether the field is excluded from mapping.
    #[serde(default)]
    pub ignore: bool,
}

impl SchemaFile {
    /// Converts the document into a registered schema.
    pub fn into_schema(self) -> Result<RecordSchema> {
        let mut seen = HashSet::new();
        let mut schema = RecordSchema::new(self.name);

        for entry in self.fields {
            if !seen.insert(entry.name.clone()) {
                bail!("duplicate field '{}'", entry.name);
            }
            let value_kind: ValueKind = entry
                .value_type
                .parse()
                .with_context(|| format!("invalid type for field '{}'", entry.name))?;

            let mut spec = FieldSpec::new(entry.name, value_kind);
            if let Some(column) = entry.column {
                spec = spec.column(column);
            }
            if let Some(kind) = entry.kind {
                spec = spec.kind(kind);
            }
            if entry.optional {
                spec = spec.optional();
            }
            if entry.ignore {
                spec = spec.ignored();
            }
            schema = schema.field(spec);
        }

        Ok(schema)
    }
}

/// Parses a schema document.
pub fn parse(text: &str) -> Result<Arc<RecordSchema>> {
    let file: SchemaFile = serde_json::from_str(text).context("malformed schema document")?;
    Ok(Arc::new(file.into_schema()?))
}

/// Reads and parses the schema file at `path`.
pub fn load(path: &Path) -> Result<Arc<RecordSchema>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema file {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid schema file {}", path.display()))
}
