//! YAML and JSON rendering of manifests and wire objects.

use crate::error::{Error, Result};
use crate::manifest::{API_VERSION, Document, Manifest, Resource};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Structured output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// YAML.
    Yaml,
    /// JSON with 4-space indentation.
    Json,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(Error::Render(format!(
                "invalid output format {other:?} (supported: yaml, json)"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => f.write_str("yaml"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Render as YAML.
pub fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| Error::Render(e.to_string()))
}

/// Render as JSON indented with four spaces.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| Error::Render(e.to_string()))?;
    String::from_utf8(out).map_err(|e| Error::Render(e.to_string()))
}

/// Render in the given format.
pub fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => to_yaml(value),
        OutputFormat::Json => to_json(value),
    }
}

/// A `kind: List` envelope around manifest documents.
#[derive(Debug, Serialize)]
pub struct ManifestList<'a, T> {
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    kind: &'static str,
    items: Vec<Document<'a, T>>,
}

impl<'a, T: Resource> ManifestList<'a, T> {
    /// Wrap resources, each with its own envelope.
    pub fn new(items: &'a [T]) -> Self {
        Self {
            api_version: API_VERSION,
            kind: "List",
            items: items.iter().map(Document::new).collect(),
        }
    }
}

/// Render what `apply`/`create` would send, without sending it.
///
/// With no format the manifest itself is shown as YAML; with a format the
/// parent wire payload is shown instead.
pub fn preview(manifest: &Manifest, format: Option<OutputFormat>) -> Result<String> {
    match format {
        None => manifest.to_yaml(),
        Some(format) => render(&Value::Object(manifest.to_wire()?), format),
    }
}
