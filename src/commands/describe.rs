//! `haproxyctl describe`: a readable summary of one backend or frontend.

use crate::Context;
use crate::cli::DescribeCommand;
use crate::output;
use crate::ui;
use anyhow::Result;
use dataplane::{ResourceClient, WireObject, paths};
use declarative::Error;
use serde_json::Value;

/// Fields shown for one part of a resource. `nested` reads them from a
/// sub-object instead of the top level.
struct Layout {
    title: &'static str,
    nested: Option<&'static str>,
    fields: &'static [&'static str],
}

const BACKEND_BASICS: &[&str] = &["name", "mode", "balance"];
const BACKEND_SECTIONS: &[Layout] = &[
    Layout {
        title: "Timeouts",
        nested: None,
        fields: &["timeout_client", "timeout_queue", "timeout_server"],
    },
    Layout {
        title: "Advanced",
        nested: None,
        fields: &["tcpka", "redispatch"],
    },
    Layout {
        title: "Default Server",
        nested: Some("default_server"),
        fields: &["alpn", "check", "check_alpn", "maxconn", "weight"],
    },
];
const SERVER_COLUMNS: &[&str] = &["name", "address", "port", "weight"];

const FRONTEND_BASICS: &[&str] = &["name", "mode", "default_backend"];
const FRONTEND_SECTIONS: &[Layout] = &[
    Layout {
        title: "Timeouts",
        nested: None,
        fields: &["timeout_client", "timeout_http_request", "timeout_http_keep_alive"],
    },
    Layout {
        title: "Logging",
        nested: None,
        fields: &["log"],
    },
    Layout {
        title: "Options",
        nested: None,
        fields: &["forwardfor"],
    },
];
const BIND_COLUMNS: &[&str] = &["name", "address", "port", "ssl"];

/// What `describe` prints.
#[derive(Debug)]
pub struct Description {
    pub kind: &'static str,
    pub name: String,
    pub basics: Vec<(String, String)>,
    pub sections: Vec<(&'static str, Vec<(String, String)>)>,
    pub children_title: &'static str,
    pub children: String,
}

pub fn run(ctx: &Context, cmd: DescribeCommand) -> Result<()> {
    let client = ctx.client()?;
    let description = match cmd {
        DescribeCommand::Backend { name } => backend(&client, &name)?,
        DescribeCommand::Frontend { name } => frontend(&client, &name)?,
    };
    print(&description);
    Ok(())
}

fn print(description: &Description) {
    println!("{}: {}", description.kind, description.name);
    for (label, value) in &description.basics {
        ui::kv(label, value);
    }
    for (title, fields) in &description.sections {
        ui::section(title);
        for (label, value) in fields {
            ui::kv(label, value);
        }
    }
    if !description.children.is_empty() {
        ui::section(description.children_title);
        println!("{}", description.children);
    }
}

pub fn backend(client: &dyn ResourceClient, name: &str) -> Result<Description> {
    let live = client
        .fetch_one(&paths::backend(name))
        .map_err(|e| Error::from_api("get", "backend", name, e.into()))?;
    let mut servers = client
        .fetch_list(&paths::servers(name))
        .map_err(|e| Error::request("fetch", "servers of backend", name, e))?;
    output::sort_rows(&mut servers);

    Ok(describe(
        "Backend",
        name,
        &live,
        BACKEND_BASICS,
        BACKEND_SECTIONS,
        ("Servers", &servers, SERVER_COLUMNS),
    ))
}

pub fn frontend(client: &dyn ResourceClient, name: &str) -> Result<Description> {
    let live = client
        .fetch_one(&paths::frontend(name))
        .map_err(|e| Error::from_api("get", "frontend", name, e.into()))?;
    let mut binds = client
        .fetch_list(&paths::binds(name))
        .map_err(|e| Error::request("fetch", "binds of frontend", name, e))?;
    output::sort_rows(&mut binds);

    Ok(describe(
        "Frontend",
        name,
        &live,
        FRONTEND_BASICS,
        FRONTEND_SECTIONS,
        ("Binds", &binds, BIND_COLUMNS),
    ))
}

fn describe(
    kind: &'static str,
    name: &str,
    live: &WireObject,
    basics: &[&str],
    layouts: &[Layout],
    (children_title, children, columns): (&'static str, &[WireObject], &[&str]),
) -> Description {
    let sections = layouts
        .iter()
        .filter_map(|layout| {
            let source = match layout.nested {
                Some(key) => live.get(key).and_then(Value::as_object)?,
                None => live,
            };
            let fields = fields(source, layout.fields);
            (!fields.is_empty()).then_some((layout.title, fields))
        })
        .collect();

    Description {
        kind,
        name: name.to_string(),
        basics: fields(live, basics),
        sections,
        children_title,
        children: if children.is_empty() {
            String::new()
        } else {
            output::table_with(children, columns)
        },
    }
}

/// Present, non-empty fields with readable labels.
fn fields(source: &WireObject, keys: &[&str]) -> Vec<(String, String)> {
    keys.iter()
        .filter_map(|key| {
            let value = source.get(*key)?;
            let text = output::cell(Some(value));
            (text != "-" && !text.is_empty()).then(|| (label(key), text))
        })
        .collect()
}

/// `timeout_http_request` reads as `Timeout Http Request`.
fn label(field: &str) -> String {
    field
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join(" ")
}
