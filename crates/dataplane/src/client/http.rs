//! Blocking HTTP client for the Data Plane API.
//!
//! This module provides the [`HttpClient`] implementation of
//! [`ResourceClient`] on top of `ureq`.
//!
//! # Authentication
//!
//! Every request carries an HTTP basic `Authorization` header built from the
//! stored username and password. Non-2xx responses are surfaced as
//! [`Error::Api`] with the response body kept verbatim.

use crate::client::ResourceClient;
use crate::error::{Error, HTTP_ERROR_THRESHOLD, Result};
use crate::paths;
use crate::types::{ConnectionConfig, Method, WireObject};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use ureq::Body;
use ureq::http::Response;

/// Boundary used for certificate uploads.
const MULTIPART_BOUNDARY: &str = "haproxyctl-upload-boundary";

/// Blocking Data Plane API client.
///
/// # Example
///
/// ```no_run
/// use dataplane::client::ResourceClient;
/// use dataplane::client::http::HttpClient;
/// use dataplane::ConnectionConfig;
///
/// let client = HttpClient::new(&ConnectionConfig::new("http://lb:5555", "admin", "secret"));
/// let version = client.fetch_version().unwrap();
/// println!("configuration version {version}");
/// ```
pub struct HttpClient {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// Normalised API base URL.
    base_url: String,
    /// Precomputed `Authorization` header value.
    auth_header: String,
}

impl HttpClient {
    /// Create a client from connection settings.
    #[must_use]
    pub fn new(config: &ConnectionConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        let credentials = format!("{}:{}", config.username, config.password);

        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            base_url: config.normalized_base_url(),
            auth_header: format!("Basic {}", STANDARD.encode(credentials)),
        }
    }

    /// Get the normalised base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for an endpoint path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        let url = self.url(path);
        log::debug!("GET {url}");

        let mut request = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json");
        for (key, value) in query {
            request = request.query(*key, *value);
        }

        read_body(request.call()?)
    }
}

impl ResourceClient for HttpClient {
    fn fetch_one(&self, path: &str) -> Result<WireObject> {
        let body = self.get(path, &[])?;
        match serde_json::from_slice(&body)? {
            Value::Object(object) => Ok(object),
            other => Err(Error::InvalidResponse(format!(
                "expected a JSON object from {path}, got {}",
                json_kind(&other)
            ))),
        }
    }

    fn fetch_list(&self, path: &str) -> Result<Vec<WireObject>> {
        let body = self.get(path, &[])?;
        match serde_json::from_slice(&body)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(object) => Ok(object),
                    other => Err(Error::InvalidResponse(format!(
                        "expected JSON objects in {path}, got {}",
                        json_kind(&other)
                    ))),
                })
                .collect(),
            Value::Null => Ok(Vec::new()),
            other => Err(Error::InvalidResponse(format!(
                "expected a JSON array from {path}, got {}",
                json_kind(&other)
            ))),
        }
    }

    fn fetch_version(&self) -> Result<u64> {
        let body = self.get(paths::VERSION, &[])?;
        parse_version(&String::from_utf8_lossy(&body))
    }

    fn write(
        &self,
        method: Method,
        path: &str,
        version: Option<u64>,
        body: Option<&Value>,
    ) -> Result<Vec<u8>> {
        let url = self.url(path);
        log::debug!("{method} {url} version={version:?}");

        let version = version.map(|v| v.to_string());
        let payload = body.map(serde_json::to_vec).transpose()?;

        let response = match method {
            Method::Delete => {
                let mut request = self
                    .agent
                    .delete(&url)
                    .header("Authorization", &self.auth_header);
                if let Some(version) = &version {
                    request = request.query("version", version);
                }
                request.call()?
            }
            Method::Post | Method::Put => {
                let mut request = match method {
                    Method::Post => self.agent.post(&url),
                    _ => self.agent.put(&url),
                }
                .header("Authorization", &self.auth_header)
                .header("Content-Type", "application/json");
                if let Some(version) = &version {
                    request = request.query("version", version);
                }
                match payload {
                    Some(bytes) => request.send(&bytes[..])?,
                    None => request.send_empty()?,
                }
            }
        };

        read_body(response)
    }

    fn fetch_raw(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        self.get(path, query)
    }

    fn upload(&self, path: &str, file_name: &str, contents: &[u8]) -> Result<Vec<u8>> {
        let url = self.url(path);
        log::debug!("POST {url} (multipart {file_name})");

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .send(&multipart_body(file_name, contents)[..])?;

        read_body(response)
    }
}

/// Read a response body, turning non-2xx statuses into [`Error::Api`].
fn read_body(mut response: Response<Body>) -> Result<Vec<u8>> {
    let status = response.status().as_u16();
    let body = response.body_mut().read_to_vec()?;

    if status >= HTTP_ERROR_THRESHOLD {
        return Err(Error::api(status, String::from_utf8_lossy(&body)));
    }
    Ok(body)
}

/// Parse the plain-text body of the version endpoint.
fn parse_version(body: &str) -> Result<u64> {
    let trimmed = body.trim();
    trimmed
        .parse()
        .map_err(|_| Error::InvalidVersion(trimmed.to_string()))
}

/// Encode a single-file `multipart/form-data` body under the `file` field.
fn multipart_body(file_name: &str, contents: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(contents.len() + 256);
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
