//! `haproxyctl get`: read-only views of the live configuration.
//!
//! Tables show raw API objects. YAML and JSON show manifests for the kinds
//! `apply` understands, so the output can be edited and applied back.

use crate::Context;
use crate::cli::{GetCommand, GetFormat};
use crate::output::{self, EMPTY};
use anyhow::{Context as AnyhowContext, Result};
use dataplane::{ResourceClient, WireObject, paths};
use declarative::render::render;
use declarative::{
    Defaults, Document, Error, Global, ManifestList, OutputFormat, Resource, Server, Userlist, live,
};
use serde::Serialize;
use serde_json::Value;

const GLOBAL_HINT: &str =
    "configuration/globals no rules defined; use 'haproxyctl get raw' for global settings";
const DEFAULTS_HINT: &str = "configuration/defaults no rules defined";

/// Columns of the stats table; the counters come from each entry's `stats`.
const STATS_COLUMNS: [&str; 9] = [
    "name",
    "type",
    "backend_name",
    "status",
    "scur",
    "smax",
    "stot",
    "bin",
    "bout",
];

pub fn run(ctx: &Context, cmd: GetCommand) -> Result<()> {
    let client = ctx.client()?;
    println!("{}", show(&client, &cmd)?.trim_end());
    Ok(())
}

/// Produce the output of a `get` command.
pub fn show(client: &dyn ResourceClient, cmd: &GetCommand) -> Result<String> {
    match cmd {
        GetCommand::Backends { name, format } => backends(client, name.as_deref(), format.output),
        GetCommand::Frontends { name, format } => {
            frontends(client, name.as_deref(), format.output)
        }
        GetCommand::Servers {
            backend,
            name,
            format,
        } => servers(client, backend, name.as_deref(), format.output),
        GetCommand::Binds { frontend, format } => {
            let rows = client
                .fetch_list(&paths::binds(frontend))
                .map_err(|e| Error::from_api("get", "frontend", frontend, e.into()))?;
            rows_output(rows, format.output, true)
        }
        GetCommand::Userlists { name, format } => {
            userlists(client, name.as_deref(), format.output)
        }
        GetCommand::Certificates { name, format } => match name {
            Some(name) => {
                let row = client
                    .fetch_one(&paths::ssl_certificate(name))
                    .map_err(|e| Error::from_api("get", "certificate", name, e.into()))?;
                row_output(row, format.output)
            }
            None => rows_output(client.fetch_list(paths::SSL_CERTIFICATES)?, format.output, true),
        },
        GetCommand::Acls { frontend, format } => {
            let rows = client
                .fetch_list(&paths::acls(frontend))
                .map_err(|e| Error::from_api("get", "frontend", frontend, e.into()))?;
            // Rule order is significant.
            rows_output(rows, format.output, false)
        }
        GetCommand::Global { format } => global(client, format.output),
        GetCommand::Defaults { format } => defaults(client, format.output),
        GetCommand::Stats {
            kind,
            name,
            parent,
            format,
        } => stats(
            client,
            kind.as_deref(),
            name.as_deref(),
            parent.as_deref(),
            format.output,
        ),
        GetCommand::Reloads { id, format } => match id {
            Some(id) => {
                let row = client
                    .fetch_one(&paths::reload(id))
                    .map_err(|e| Error::from_api("get", "reload", id, e.into()))?;
                row_output(row, format.output)
            }
            None => rows_output(client.fetch_list(paths::RELOADS)?, format.output, true),
        },
        GetCommand::Transactions { id, status, format } => {
            transactions(client, id.as_deref(), status.as_deref(), format.output)
        }
        GetCommand::Version => Ok(client.fetch_version()?.to_string()),
        GetCommand::Raw => {
            let body = client.fetch_raw(paths::RAW, &[])?;
            Ok(String::from_utf8_lossy(&body).into_owned())
        }
    }
}

/// `None` selects the table.
fn structured(format: GetFormat) -> Option<OutputFormat> {
    match format {
        GetFormat::Table => None,
        GetFormat::Yaml => Some(OutputFormat::Yaml),
        GetFormat::Json => Some(OutputFormat::Json),
    }
}

fn encode<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(render(value, format)?)
}

fn row_output(row: WireObject, format: GetFormat) -> Result<String> {
    match structured(format) {
        None => Ok(output::table(&[row])),
        Some(format) => encode(&Value::Object(row), format),
    }
}

fn rows_output(mut rows: Vec<WireObject>, format: GetFormat, sort: bool) -> Result<String> {
    if sort {
        output::sort_rows(&mut rows);
    }
    match structured(format) {
        None => Ok(output::table(&rows)),
        Some(format) => encode(&rows, format),
    }
}

fn names(rows: &[WireObject]) -> Vec<String> {
    let mut names: Vec<String> = rows
        .iter()
        .filter_map(|row| row.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect();
    names.sort();
    names
}

fn backends(client: &dyn ResourceClient, name: Option<&str>, format: GetFormat) -> Result<String> {
    match (name, structured(format)) {
        (Some(name), None) => {
            let row = client
                .fetch_one(&paths::backend(name))
                .map_err(|e| Error::from_api("get", "backend", name, e.into()))?;
            Ok(output::table(&[row]))
        }
        (Some(name), Some(format)) => {
            encode(&Document::new(&live::backend(client, name)?), format)
        }
        (None, None) => rows_output(client.fetch_list(paths::BACKENDS)?, format, true),
        (None, Some(format)) => {
            let rows = client.fetch_list(paths::BACKENDS)?;
            let items = names(&rows)
                .iter()
                .map(|name| live::backend(client, name))
                .collect::<declarative::Result<Vec<_>>>()?;
            encode(&ManifestList::new(&items), format)
        }
    }
}

fn frontends(client: &dyn ResourceClient, name: Option<&str>, format: GetFormat) -> Result<String> {
    match (name, structured(format)) {
        (Some(name), None) => {
            let row = client
                .fetch_one(&paths::frontend(name))
                .map_err(|e| Error::from_api("get", "frontend", name, e.into()))?;
            Ok(output::table(&[row]))
        }
        (Some(name), Some(format)) => {
            encode(&Document::new(&live::frontend(client, name)?), format)
        }
        (None, None) => rows_output(client.fetch_list(paths::FRONTENDS)?, format, true),
        (None, Some(format)) => {
            let rows = client.fetch_list(paths::FRONTENDS)?;
            let items = names(&rows)
                .iter()
                .map(|name| live::frontend(client, name))
                .collect::<declarative::Result<Vec<_>>>()?;
            encode(&ManifestList::new(&items), format)
        }
    }
}

fn servers(
    client: &dyn ResourceClient,
    backend: &str,
    name: Option<&str>,
    format: GetFormat,
) -> Result<String> {
    if let Some(name) = name {
        let row = client
            .fetch_one(&paths::server(backend, name))
            .map_err(|e| Error::from_api("get", "server", name, e.into()))?;
        return match structured(format) {
            None => Ok(output::table(&[row])),
            Some(format) => encode(&Document::new(&Server::from_wire_in(backend, &row)), format),
        };
    }

    match structured(format) {
        None => {
            let rows = client
                .fetch_list(&paths::servers(backend))
                .map_err(|e| Error::from_api("get", "backend", backend, e.into()))?;
            rows_output(rows, format, true)
        }
        Some(format) => {
            let mut items = live::servers(client, backend)?;
            items.sort_by(|a, b| a.name.cmp(&b.name));
            encode(&ManifestList::new(&items), format)
        }
    }
}

fn userlists(client: &dyn ResourceClient, name: Option<&str>, format: GetFormat) -> Result<String> {
    match (name, structured(format)) {
        (Some(name), None) => {
            let row = client
                .fetch_one(&paths::userlist(name))
                .map_err(|e| Error::from_api("get", "userlist", name, e.into()))?;
            Ok(output::table(&[row]))
        }
        (Some(name), Some(format)) => {
            encode(&Document::new(&live::userlist(client, name)?), format)
        }
        (None, None) => rows_output(client.fetch_list(paths::USERLISTS)?, format, true),
        (None, Some(format)) => {
            let mut items: Vec<Userlist> = client
                .fetch_list(paths::USERLISTS)?
                .iter()
                .map(Userlist::from_wire)
                .collect();
            items.sort_by(|a, b| a.name.cmp(&b.name));
            encode(&ManifestList::new(&items), format)
        }
    }
}

/// A manifest view as a single table row.
fn view_row<T: Serialize>(view: &T) -> Result<WireObject> {
    match serde_json::to_value(view).context("Could not convert view to a table row")? {
        Value::Object(row) => Ok(row),
        _ => Ok(WireObject::new()),
    }
}

fn global(client: &dyn ResourceClient, format: GetFormat) -> Result<String> {
    let view = Global::from_wire(&live::global_wire(client)?.unwrap_or_default());
    match structured(format) {
        None => {
            let row = view_row(&view)?;
            if row.is_empty() {
                return Ok(GLOBAL_HINT.to_string());
            }
            Ok(output::table(&[row]))
        }
        Some(format) => encode(&Document::new(&view), format),
    }
}

fn defaults(client: &dyn ResourceClient, format: GetFormat) -> Result<String> {
    let sections = live::defaults_wire(client)?;
    if sections.is_empty() {
        return Ok(DEFAULTS_HINT.to_string());
    }
    let mut items: Vec<Defaults> = sections.iter().map(Defaults::from_wire).collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));

    match structured(format) {
        None => {
            let rows = items.iter().map(view_row).collect::<Result<Vec<_>>>()?;
            Ok(output::table(&rows))
        }
        Some(format) if items.len() == 1 => encode(&Document::new(&items[0]), format),
        Some(format) => encode(&ManifestList::new(&items), format),
    }
}

fn stats(
    client: &dyn ResourceClient,
    kind: Option<&str>,
    name: Option<&str>,
    parent: Option<&str>,
    format: GetFormat,
) -> Result<String> {
    let query: Vec<(&str, &str)> = [("type", kind), ("name", name), ("parent", parent)]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
        .collect();
    let body = client.fetch_raw(paths::STATS, &query)?;
    let payload: Value =
        serde_json::from_slice(&body).context("Could not parse native stats response")?;

    match structured(format) {
        None => {
            let rows = stats_rows(&payload);
            if rows.is_empty() {
                return Ok(EMPTY.to_string());
            }
            Ok(output::table_with(&rows, &STATS_COLUMNS))
        }
        Some(format) => encode(&payload, format),
    }
}

/// Flatten native stats into one row per object.
///
/// The API answers with one block per runtime socket, each holding a `stats`
/// array whose entries carry the counters in a nested `stats` object.
fn stats_rows(payload: &Value) -> Vec<WireObject> {
    let blocks: Vec<&Value> = match payload {
        Value::Array(blocks) => blocks.iter().collect(),
        other => vec![other],
    };

    blocks
        .into_iter()
        .filter_map(|block| block.get("stats").and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_object)
        .map(|entry| {
            let counters = entry.get("stats").and_then(Value::as_object);
            STATS_COLUMNS
                .iter()
                .filter_map(|column| {
                    let value = entry
                        .get(*column)
                        .filter(|v| !v.is_object())
                        .or_else(|| counters.and_then(|c| c.get(*column)))?;
                    Some(((*column).to_string(), value.clone()))
                })
                .collect()
        })
        .collect()
}

fn transactions(
    client: &dyn ResourceClient,
    id: Option<&str>,
    status: Option<&str>,
    format: GetFormat,
) -> Result<String> {
    if let Some(id) = id {
        let row = client
            .fetch_one(&paths::transaction(id))
            .map_err(|e| Error::from_api("get", "transaction", id, e.into()))?;
        return row_output(row, format);
    }

    let query: Vec<(&str, &str)> = status.map(|s| ("status", s)).into_iter().collect();
    let body = client.fetch_raw(paths::TRANSACTIONS, &query)?;
    let rows: Vec<WireObject> =
        serde_json::from_slice(&body).context("Could not parse transactions response")?;
    rows_output(rows, format, true)
}
