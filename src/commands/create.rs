//! `haproxyctl create`: from a manifest or from flags.

use super::{apply_options, read_manifest};
use crate::Context;
use crate::cli::{
    CreateArgs, CreateBackendArgs, CreateCertificateArgs, CreateCommand, CreateFrontendArgs,
    CreateServerArgs,
};
use crate::ui::ConsoleReporter;
use anyhow::{Result, bail};
use declarative::{
    ApplyOptions, Backend, Bind, CertificateRequest, DRY_RUN_NOTICE, Frontend, Manifest, Reporter,
    Server, Timeout, check_creatable, create, parse, report_preview, upload_certificate,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A malformed `key=value` flag.
#[derive(Debug, thiserror::Error)]
pub enum FlagError {
    #[error("invalid --{flag} entry {entry:?}: expected key=value")]
    Pair { flag: &'static str, entry: String },

    #[error("unknown key {key:?} in --{flag} (expected one of: {expected})")]
    UnknownKey {
        flag: &'static str,
        key: String,
        expected: &'static str,
    },

    #[error("invalid {key} {value:?} in --{flag}: expected {expected}")]
    Value {
        flag: &'static str,
        key: String,
        value: String,
        expected: &'static str,
    },
}

pub fn run(ctx: &Context, args: CreateArgs) -> Result<()> {
    let (manifest, options) = match (args.file, args.command) {
        (Some(file), _) => (parse(&read_manifest(&file)?)?, ApplyOptions::default()),
        (None, Some(CreateCommand::Certificate(cert))) => return certificate(ctx, &cert),
        (None, Some(CreateCommand::Backend(flags))) => {
            let options = apply_options(flags.preview);
            (Manifest::Backend(backend_from_flags(&flags)?), options)
        }
        (None, Some(CreateCommand::Frontend(flags))) => {
            let options = apply_options(flags.preview);
            (Manifest::Frontend(frontend_from_flags(&flags)?), options)
        }
        (None, Some(CreateCommand::Server(flags))) => {
            let options = apply_options(flags.preview);
            (Manifest::Server(server_from_flags(&flags)), options)
        }
        (None, None) => bail!("either -f FILE or a resource type is required"),
    };

    check_creatable(&manifest)?;
    let mut reporter = ConsoleReporter;
    if options.is_preview() {
        report_preview(&mut reporter, &manifest, options)?;
        return Ok(());
    }

    let client = ctx.client()?;
    create(&client, &mut reporter, &manifest, options)?;
    Ok(())
}

fn certificate(ctx: &Context, args: &CreateCertificateArgs) -> Result<()> {
    let request = CertificateRequest::from_flags(
        &args.name,
        args.pem.as_deref(),
        args.cert.as_deref(),
        args.key.as_deref(),
        args.ca_file.as_deref(),
    )?;
    let options = apply_options(args.preview);
    let mut reporter = ConsoleReporter;

    if options.is_preview() {
        reporter.message(&request.preview(options.output)?);
        if options.dry_run {
            reporter.message(DRY_RUN_NOTICE);
        }
        return Ok(());
    }

    let client = ctx.client()?;
    upload_certificate(&client, &mut reporter, &request, options)?;
    Ok(())
}

// ============================================================================
// Flag parsing
// ============================================================================

/// Split `a=1,b=2` into ordered pairs.
pub fn parse_pairs(flag: &'static str, input: &str) -> Result<Vec<(String, String)>, FlagError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.trim().to_string()))
            }
            _ => Err(FlagError::Pair {
                flag,
                entry: entry.to_string(),
            }),
        })
        .collect()
}

fn string_map(flag: &'static str, input: Option<&str>) -> Result<BTreeMap<String, String>, FlagError> {
    Ok(parse_pairs(flag, input.unwrap_or_default())?
        .into_iter()
        .collect())
}

/// Like [`string_map`], but integer values become JSON numbers.
fn typed_map(flag: &'static str, input: Option<&str>) -> Result<Map<String, Value>, FlagError> {
    Ok(parse_pairs(flag, input.unwrap_or_default())?
        .into_iter()
        .map(|(key, value)| {
            let typed = value
                .parse::<i64>()
                .map_or_else(|_| Value::String(value), Value::from);
            (key, typed)
        })
        .collect())
}

fn parse_flag_bool(flag: &'static str, key: &str, value: &str) -> Result<bool, FlagError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "enabled" | "yes" | "1" => Ok(true),
        "false" | "disabled" | "no" | "0" => Ok(false),
        _ => Err(FlagError::Value {
            flag,
            key: key.to_string(),
            value: value.to_string(),
            expected: "true or false",
        }),
    }
}

fn parse_flag_number<T: std::str::FromStr>(
    flag: &'static str,
    key: &str,
    value: &str,
) -> Result<T, FlagError> {
    value.parse().map_err(|_| FlagError::Value {
        flag,
        key: key.to_string(),
        value: value.to_string(),
        expected: "a number",
    })
}

/// Parse `name=s1,address=10.0.0.1,port=80,weight=100,ssl=true`.
pub fn parse_server(input: &str) -> Result<Server, FlagError> {
    const FLAG: &str = "server";
    let mut server = Server::default();
    for (key, value) in parse_pairs(FLAG, input)? {
        match key.as_str() {
            "name" => server.name = value,
            "address" => server.address = value,
            "port" => server.port = parse_flag_number(FLAG, &key, &value)?,
            "weight" => server.weight = parse_flag_number(FLAG, &key, &value)?,
            "ssl" => server.ssl = parse_flag_bool(FLAG, &key, &value)?,
            _ => {
                return Err(FlagError::UnknownKey {
                    flag: FLAG,
                    key,
                    expected: "name, address, port, weight, ssl",
                });
            }
        }
    }
    Ok(server)
}

/// Parse `address=*,port=443,ssl=true`.
pub fn parse_bind(input: &str) -> Result<Bind, FlagError> {
    const FLAG: &str = "bind";
    let mut bind = Bind::default();
    for (key, value) in parse_pairs(FLAG, input)? {
        match key.as_str() {
            "address" => bind.address = value,
            "port" => bind.port = parse_flag_number(FLAG, &key, &value)?,
            "ssl" => bind.ssl = parse_flag_bool(FLAG, &key, &value)?,
            _ => {
                return Err(FlagError::UnknownKey {
                    flag: FLAG,
                    key,
                    expected: "address, port, ssl",
                });
            }
        }
    }
    Ok(bind)
}

fn timeout(raw: Option<&String>) -> Timeout {
    raw.map(Timeout::new).unwrap_or_default()
}

pub fn backend_from_flags(args: &CreateBackendArgs) -> Result<Backend, FlagError> {
    let mut backend = Backend::new(&args.name);
    backend.mode.clone_from(&args.mode);
    backend.balance = string_map("balance", Some(&args.balance))?;
    backend.default_server = typed_map("default-server", args.default_server.as_deref())?;
    backend.forwardfor = string_map("forwardfor", args.forwardfor.as_deref())?;
    backend.timeout_client = timeout(args.timeout_client.as_ref());
    backend.timeout_queue = timeout(args.timeout_queue.as_ref());
    backend.timeout_server = timeout(args.timeout_server.as_ref());
    backend.redispatch = args.redispatch;
    backend.servers = args
        .servers
        .iter()
        .map(|s| parse_server(s))
        .collect::<Result<_, _>>()?;
    Ok(backend)
}

pub fn frontend_from_flags(args: &CreateFrontendArgs) -> Result<Frontend, FlagError> {
    let mut frontend = Frontend::new(&args.name);
    frontend.mode.clone_from(&args.mode);
    frontend.default_backend = args.default_backend.clone().unwrap_or_default();
    frontend.forwardfor = string_map("forwardfor", args.forwardfor.as_deref())?;
    frontend.timeout_client = timeout(args.timeout_client.as_ref());
    frontend.timeout_http_request = timeout(args.timeout_http_request.as_ref());
    frontend.timeout_http_keep_alive = timeout(args.timeout_http_keep_alive.as_ref());
    frontend.binds = args
        .binds
        .iter()
        .map(|b| parse_bind(b))
        .collect::<Result<_, _>>()?;
    Ok(frontend)
}

pub fn server_from_flags(args: &CreateServerArgs) -> Server {
    let mut server = Server::new(&args.name, &args.address, args.port);
    server.weight = args.weight;
    server.ssl = args.ssl;
    server.backend.clone_from(&args.backend);
    server
}
