//! Version-stamped writes.

use crate::error::{Error, Result};
use dataplane::{Method, ResourceClient};
use serde_json::Value;

/// Issues configuration writes with a freshly fetched version token.
///
/// The version is never cached: each write fetches it again, so two writes
/// in a row cost two version fetches.
#[derive(Clone, Copy)]
pub struct VersionGate<'a> {
    client: &'a dyn ResourceClient,
}

impl<'a> VersionGate<'a> {
    /// Wrap a client.
    pub fn new(client: &'a dyn ResourceClient) -> Self {
        Self { client }
    }

    /// Fetch the current version, then issue the write with it.
    ///
    /// A version fetch failure aborts before the write is attempted.
    pub fn write(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Vec<u8>> {
        let version = self.client.fetch_version().map_err(Error::Version)?;
        log::debug!("{} {path} at version {version}", method.as_str());
        Ok(self.client.write(method, path, Some(version), body)?)
    }

    /// Write without a version token (storage endpoints).
    pub fn write_unversioned(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Vec<u8>> {
        Ok(self.client.write(method, path, None, body)?)
    }
}
