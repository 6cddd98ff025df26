//! Service manifest (`manifest.toml`) loading.
//!
//! The manifest is deliberately schemaless: each entry under `[services]` is an
//! arbitrary table that is copied into supervisor configuration without
//! interpretation.
use std::{fs, io, path::Path};

use serde::Deserialize;
use toml::{Table, Value};
use tracing::debug;

use crate::error::{Result, SupmanError};

/// Top-level key holding the service definitions.
pub const SERVICES_KEY: &str = "services";

/// Parsed manifest. Service and setting keys keep the order in which they appear
/// in the file; unrecognised top-level keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    /// Service name to its settings table.
    #[serde(default)]
    services: Option<Table>,
}

impl Manifest {
    /// Parses manifest text without checking for `services`.
    pub fn parse(input: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    /// Service definitions, or `MissingKey` when the manifest declares none.
    pub fn services(&self) -> Result<&Table> {
        self.services.as_ref().ok_or_else(|| SupmanError::MissingKey {
            key: SERVICES_KEY.to_string(),
        })
    }
}

/// Reads and parses the manifest at `path`.
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    if path.is_dir() {
        return Err(SupmanError::ManifestRead {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path is a directory"),
        });
    }

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            SupmanError::ManifestNotFound {
                path: path.to_path_buf(),
            }
        } else {
            SupmanError::ManifestRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let manifest = Manifest::parse(&content).map_err(|source| SupmanError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded manifest {}", path.display());
    Ok(manifest)
}

/// Renders a manifest value as supervisor option text.
///
/// Strings are copied as-is, arrays are comma joined, and nested tables become
/// `KEY="value"` pairs, which is how supervisor spells `environment`.
///
/// The config format itself is lossy for some strings: whitespace at either end of
/// each line and trailing empty lines are dropped when the file is read back, and a
/// continuation line starting with `#` or `;` reads as a comment.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Integer(number) => number.to_string(),
        Value::Float(_) => value.to_string(),
        Value::Boolean(flag) => flag.to_string(),
        Value::Datetime(datetime) => datetime.to_string(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(","),
        Value::Table(table) => table
            .iter()
            .map(|(key, value)| format!("{key}=\"{}\"", render_value(value)))
            .collect::<Vec<_>>()
            .join(","),
    }
}
