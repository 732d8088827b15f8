//! Output rendering
//!
//! Tables for listings, Tera templates for describe output, and JSON/YAML
//! dumps of the same rows.

pub mod table;
pub mod template;
pub mod units;

pub use table::*;
pub use template::*;
pub use units::*;

use crate::error::{Error, Result};
use serde::Serialize;
use std::io::Write;

/// Output format of listing commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "" | "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(Error::Configuration(format!(
                "unknown output format {other}, expected one of table, json, yaml"
            ))),
        }
    }
}

/// Write `items` as a JSON array or a YAML sequence
pub fn print_serialized<W, T>(out: &mut W, format: OutputFormat, items: &[T]) -> Result<()>
where
    W: Write + ?Sized,
    T: Serialize,
{
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, items)?;
            writeln!(out)?;
        }
        OutputFormat::Yaml => serde_yaml::to_writer(&mut *out, items)?,
        OutputFormat::Table => {
            return Err(Error::Configuration(
                "table output needs column headers".into(),
            ))
        }
    }
    Ok(())
}

/// Message shown when a listing has no rows
pub fn empty_table_message(resource: &str, namespace: &str, cas_type: &str) -> String {
    match (namespace.is_empty(), cas_type.is_empty()) {
        (true, true) => format!("No {} found", resource),
        (false, true) => format!("No {} found in {} namespace", resource, namespace),
        (true, false) => format!("No {} {} found", cas_type, resource),
        (false, false) => format!(
            "No {} {} found in {} namespace",
            cas_type, resource, namespace
        ),
    }
}
