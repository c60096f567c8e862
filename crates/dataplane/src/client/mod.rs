//! Client trait and implementations for the Data Plane API.
//!
//! This module provides the [`ResourceClient`] trait that every higher layer
//! talks to. The production implementation is [`http::HttpClient`].
//!
//! # Testing
//!
//! Use [`MockClient`] for testing without network access. It keeps an
//! in-memory resource tree, bumps a configuration version on every write,
//! rejects stale versions with HTTP 409 and records every call:
//!
//! ```
//! use dataplane::client::{Call, MockClient, ResourceClient};
//! use dataplane::{Method, paths};
//! use serde_json::json;
//!
//! let mock = MockClient::new();
//! let version = mock.fetch_version().unwrap();
//! mock.write(Method::Post, paths::BACKENDS, Some(version), Some(&json!({"name": "web"})))
//!     .unwrap();
//!
//! assert_eq!(mock.fetch_one(&paths::backend("web")).unwrap()["name"], "web");
//! assert_eq!(mock.writes().len(), 1);
//! assert!(matches!(mock.calls()[0], Call::FetchVersion));
//! ```

pub mod http;

use crate::error::{Error, Result};
use crate::paths;
use crate::types::{Method, WireObject};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Access to the Data Plane API resource tree.
///
/// Errors carry enough structure ([`Error::is_not_found`],
/// [`Error::is_conflict`]) for callers to branch on missing resources while
/// treating everything else as fatal.
pub trait ResourceClient: Send + Sync {
    /// Fetch a single JSON object.
    fn fetch_one(&self, path: &str) -> Result<WireObject>;

    /// Fetch a JSON array of objects.
    fn fetch_list(&self, path: &str) -> Result<Vec<WireObject>>;

    /// Fetch the current configuration version.
    fn fetch_version(&self) -> Result<u64>;

    /// Issue a mutating call.
    ///
    /// `version` is attached as the `version` query parameter when present.
    /// Configuration endpoints require it; storage endpoints do not.
    fn write(
        &self,
        method: Method,
        path: &str,
        version: Option<u64>,
        body: Option<&Value>,
    ) -> Result<Vec<u8>>;

    /// Fetch a response body without decoding it.
    fn fetch_raw(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>>;

    /// Upload a file as `multipart/form-data` under the `file` field.
    fn upload(&self, path: &str, file_name: &str, contents: &[u8]) -> Result<Vec<u8>>;
}

// =============================================================================
// Mock client
// =============================================================================

/// A call observed by [`MockClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// `fetch_one(path)`.
    FetchOne(String),
    /// `fetch_list(path)`.
    FetchList(String),
    /// `fetch_version()`.
    FetchVersion,
    /// `write(method, path, version, body)`.
    Write {
        /// HTTP method.
        method: Method,
        /// Endpoint path.
        path: String,
        /// Version token sent with the call.
        version: Option<u64>,
        /// Request body.
        body: Option<Value>,
    },
    /// `fetch_raw(path, ..)`.
    FetchRaw(String),
    /// `upload(path, file_name, ..)`.
    Upload {
        /// Endpoint path.
        path: String,
        /// File name of the multipart part.
        file_name: String,
    },
}

impl Call {
    /// Whether this call mutates remote state.
    #[must_use]
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. } | Self::Upload { .. })
    }
}

#[derive(Debug, Default)]
struct MockState {
    /// Objects keyed by their full path.
    objects: BTreeMap<String, WireObject>,
    /// Raw bodies served by `fetch_raw`.
    raw: HashMap<String, Vec<u8>>,
    /// Status codes to fail with, keyed by path.
    failures: HashMap<String, u16>,
    version: u64,
    generated_names: u64,
    calls: Vec<Call>,
}

impl MockState {
    fn injected_failure(&self, path: &str) -> Result<()> {
        match self.failures.get(path) {
            Some(status) => Err(Error::api(*status, "injected failure")),
            None => Ok(()),
        }
    }

    fn children_of(&self, collection: &str) -> Vec<WireObject> {
        let prefix = format!("{collection}/");
        self.objects
            .iter()
            .filter(|(path, _)| {
                path.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
            })
            .map(|(_, obj)| obj.clone())
            .collect()
    }

    /// Nested collections need their owning object to exist.
    fn owner_exists(&self, collection: &str) -> bool {
        match paths::split_last(collection) {
            Some((owner, _)) if owner.matches('/').count() > 3 => self.objects.contains_key(owner),
            _ => true,
        }
    }

    fn apply_write(&mut self, method: Method, path: &str, body: Option<&Value>) -> Result<()> {
        let object = body.and_then(Value::as_object).cloned().unwrap_or_default();

        match method {
            Method::Post => {
                if !self.owner_exists(path) {
                    return Err(Error::api(404, format!("parent of {path} not found")));
                }
                let mut object = object;
                let name = match object.get("name").and_then(Value::as_str) {
                    Some(name) if !name.is_empty() => name.to_string(),
                    _ => {
                        self.generated_names += 1;
                        let name = format!("generated_{}", self.generated_names);
                        object.insert("name".to_string(), Value::String(name.clone()));
                        name
                    }
                };
                let target = format!("{path}/{name}");
                if self.objects.contains_key(&target) {
                    return Err(Error::api(409, format!("{name} already exists")));
                }
                self.objects.insert(target, object);
            }
            Method::Put => {
                let singleton = path == paths::GLOBAL;
                if !singleton && !self.objects.contains_key(path) {
                    return Err(Error::api(404, format!("{path} not found")));
                }
                self.objects.insert(path.to_string(), object);
            }
            Method::Delete => {
                if self.objects.remove(path).is_none() {
                    return Err(Error::api(404, format!("{path} not found")));
                }
                let nested = format!("{path}/");
                self.objects.retain(|key, _| !key.starts_with(&nested));
            }
        }

        self.version += 1;
        Ok(())
    }
}

/// In-memory client for tests.
///
/// Clones share state, so a test can hand a clone to the code under test and
/// inspect the recorded calls afterwards.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    state: Arc<Mutex<MockState>>,
}

impl MockClient {
    /// Create an empty mock at configuration version 1.
    #[must_use]
    pub fn new() -> Self {
        let mock = Self::default();
        mock.lock().version = 1;
        mock
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed an object at `path`. Non-object values are ignored.
    pub fn insert(&self, path: impl Into<String>, object: Value) {
        if let Value::Object(map) = object {
            self.lock().objects.insert(path.into(), map);
        }
    }

    /// Seed a raw body for `fetch_raw`.
    pub fn insert_raw(&self, path: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.lock().raw.insert(path.into(), body.into());
    }

    /// Make every call addressing `path` fail with `status`.
    pub fn fail(&self, path: impl Into<String>, status: u16) {
        self.lock().failures.insert(path.into(), status);
    }

    /// Make version fetches fail with `status`.
    pub fn fail_version(&self, status: u16) {
        self.fail(paths::VERSION, status);
    }

    /// Current configuration version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// Stored object at `path`, if any.
    #[must_use]
    pub fn object(&self, path: &str) -> Option<WireObject> {
        self.lock().objects.get(path).cloned()
    }

    /// Every call observed so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Only the mutating calls, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    /// Number of version fetches observed.
    #[must_use]
    pub fn version_fetches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::FetchVersion))
            .count()
    }

    /// Forget recorded calls, keeping state.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

impl ResourceClient for MockClient {
    fn fetch_one(&self, path: &str) -> Result<WireObject> {
        let mut state = self.lock();
        state.calls.push(Call::FetchOne(path.to_string()));
        state.injected_failure(path)?;
        state
            .objects
            .get(path)
            .cloned()
            .ok_or_else(|| Error::api(404, format!("{path} not found")))
    }

    fn fetch_list(&self, path: &str) -> Result<Vec<WireObject>> {
        let mut state = self.lock();
        state.calls.push(Call::FetchList(path.to_string()));
        state.injected_failure(path)?;
        if !state.owner_exists(path) {
            return Err(Error::api(404, format!("parent of {path} not found")));
        }
        Ok(state.children_of(path))
    }

    fn fetch_version(&self) -> Result<u64> {
        let mut state = self.lock();
        state.calls.push(Call::FetchVersion);
        state.injected_failure(paths::VERSION)?;
        Ok(state.version)
    }

    fn write(
        &self,
        method: Method,
        path: &str,
        version: Option<u64>,
        body: Option<&Value>,
    ) -> Result<Vec<u8>> {
        let mut state = self.lock();
        state.calls.push(Call::Write {
            method,
            path: path.to_string(),
            version,
            body: body.cloned(),
        });
        state.injected_failure(path)?;

        if let Some(version) = version
            && version != state.version
        {
            return Err(Error::api(
                409,
                format!("version mismatch: have {}, got {version}", state.version),
            ));
        }

        state.apply_write(method, path, body)?;
        Ok(body.map(Value::to_string).unwrap_or_default().into_bytes())
    }

    fn fetch_raw(&self, path: &str, _query: &[(&str, &str)]) -> Result<Vec<u8>> {
        let mut state = self.lock();
        state.calls.push(Call::FetchRaw(path.to_string()));
        state.injected_failure(path)?;

        if path == paths::VERSION {
            return Ok(state.version.to_string().into_bytes());
        }
        if let Some(raw) = state.raw.get(path) {
            return Ok(raw.clone());
        }
        if let Some(object) = state.objects.get(path) {
            return Ok(Value::Object(object.clone()).to_string().into_bytes());
        }
        let list: Vec<Value> = state.children_of(path).into_iter().map(Value::Object).collect();
        Ok(Value::Array(list).to_string().into_bytes())
    }

    fn upload(&self, path: &str, file_name: &str, contents: &[u8]) -> Result<Vec<u8>> {
        let mut state = self.lock();
        state.calls.push(Call::Upload {
            path: path.to_string(),
            file_name: file_name.to_string(),
        });
        state.injected_failure(path)?;

        let stored = file_name.trim_end_matches(".pem");
        state.raw.insert(format!("{path}/{stored}"), contents.to_vec());
        let mut object = WireObject::new();
        object.insert("storage_name".to_string(), Value::String(file_name.to_string()));
        state.objects.insert(format!("{path}/{stored}"), object);
        Ok(Vec::new())
    }
}
