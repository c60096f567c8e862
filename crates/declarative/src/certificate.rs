//! TLS certificate uploads to the SSL storage endpoint.

use crate::error::{Error, Result};
use crate::reconcile::{ApplyOptions, DRY_RUN_NOTICE, Outcome};
use crate::render::{OutputFormat, render};
use crate::report::{Action, Reporter, StatusLine};
use dataplane::{ResourceClient, paths};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Path value that reads from standard input.
pub const STDIN: &str = "-";

/// Where the certificate material comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateSource {
    /// A ready-made PEM bundle.
    Pem(String),
    /// Separate certificate, key and optional CA chain files.
    Parts {
        /// Certificate file.
        cert: String,
        /// Private key file.
        key: String,
        /// CA chain file.
        ca: Option<String>,
    },
}

/// A certificate to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRequest {
    /// Storage name without the `.pem` suffix.
    pub name: String,
    /// Material to bundle.
    pub source: CertificateSource,
}

#[derive(Serialize)]
struct Summary<'a> {
    name: &'a str,
    source: String,
}

impl CertificateRequest {
    /// Build a request from command-line flags.
    ///
    /// `--pem` excludes `--cert`/`--key`; without it both of those are
    /// required.
    pub fn from_flags(
        name: &str,
        pem: Option<&str>,
        cert: Option<&str>,
        key: Option<&str>,
        ca: Option<&str>,
    ) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::validation("certificate", "certificate name is required"));
        }
        let source = match (pem, cert, key) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(Error::validation(
                    "certificate",
                    "use either --pem or --cert/--key, not both",
                ));
            }
            (Some(pem), None, None) => CertificateSource::Pem(pem.to_string()),
            (None, Some(cert), Some(key)) => CertificateSource::Parts {
                cert: cert.to_string(),
                key: key.to_string(),
                ca: ca.map(str::to_string),
            },
            _ => {
                return Err(Error::validation(
                    "certificate",
                    "either --pem or both --cert and --key are required",
                ));
            }
        };
        Ok(Self {
            name: name.to_string(),
            source,
        })
    }

    /// Human-readable description of the source files.
    #[must_use]
    pub fn source_label(&self) -> String {
        match &self.source {
            CertificateSource::Pem(path) => format!("pem:{path}"),
            CertificateSource::Parts { cert, key, ca } => {
                let mut label = format!("cert:{cert},key:{key}");
                if let Some(ca) = ca {
                    label.push_str(&format!(",ca-file:{ca}"));
                }
                label
            }
        }
    }

    /// File name used for the upload.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.pem", self.name)
    }

    /// Read the files and assemble the PEM bundle.
    pub fn load(&self) -> Result<Vec<u8>> {
        match &self.source {
            CertificateSource::Pem(path) => read_input(path),
            CertificateSource::Parts { cert, key, ca } => {
                let key = read_input(key)?;
                let cert = read_input(cert)?;
                let ca = ca.as_deref().map(read_input).transpose()?;
                Ok(bundle_pem(&key, &cert, ca.as_deref()))
            }
        }
    }

    /// Preview text: the name and source, never the key material.
    pub fn preview(&self, format: Option<OutputFormat>) -> Result<String> {
        let summary = Summary {
            name: &self.name,
            source: self.source_label(),
        };
        render(&summary, format.unwrap_or(OutputFormat::Yaml))
    }
}

/// Join key, certificate and optional chain into one PEM bundle.
///
/// A newline is inserted between parts only where one is missing.
#[must_use]
pub fn bundle_pem(key: &[u8], cert: &[u8], ca: Option<&[u8]>) -> Vec<u8> {
    let mut bundle = Vec::with_capacity(key.len() + cert.len() + ca.map_or(0, <[u8]>::len) + 2);
    for part in [Some(key), Some(cert), ca].into_iter().flatten() {
        if !bundle.is_empty() && !bundle.ends_with(b"\n") {
            bundle.push(b'\n');
        }
        bundle.extend_from_slice(part);
    }
    bundle
}

fn read_input(path: &str) -> Result<Vec<u8>> {
    if path == STDIN {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| Error::io("<stdin>", e))?;
        return Ok(buf);
    }
    std::fs::read(Path::new(path)).map_err(|e| Error::io(path, e))
}

/// Upload a certificate, or preview it when the options ask for that.
pub fn upload_certificate(
    client: &dyn ResourceClient,
    reporter: &mut dyn Reporter,
    request: &CertificateRequest,
    options: ApplyOptions,
) -> Result<Outcome> {
    if options.is_preview() {
        reporter.message(&request.preview(options.output)?);
        if options.dry_run {
            reporter.message(DRY_RUN_NOTICE);
        }
        return Ok(Outcome::Previewed);
    }

    let contents = request.load()?;
    log::debug!(
        "uploading certificate {} ({} bytes)",
        request.name,
        contents.len()
    );
    client
        .upload(paths::SSL_CERTIFICATES, &request.file_name(), &contents)
        .map_err(|e| Error::from_api("create", "certificate", &request.name, e.into()))?;

    reporter.status(&StatusLine::new(
        "certificate",
        request.name.as_str(),
        Action::Created,
    ));
    Ok(Outcome::Applied(Action::Created))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RecordingReporter;
    use dataplane::{Call, MockClient};
    use std::fs;

    #[test]
    fn test_bundle_adds_missing_newlines() {
        let bundle = bundle_pem(b"KEY", b"CERT\n", Some(b"CA"));
        assert_eq!(bundle, b"KEY\nCERT\nCA");
    }

    #[test]
    fn test_bundle_without_chain() {
        assert_eq!(bundle_pem(b"KEY\n", b"CERT\n", None), b"KEY\nCERT\n");
    }

    #[test]
    fn test_flags_pem_excludes_parts() {
        let err = CertificateRequest::from_flags("site", Some("a.pem"), Some("c"), None, None)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_flags_require_cert_and_key() {
        assert!(CertificateRequest::from_flags("site", None, Some("c"), None, None).is_err());
        assert!(CertificateRequest::from_flags("site", None, None, None, None).is_err());
    }

    #[test]
    fn test_source_label() {
        let request =
            CertificateRequest::from_flags("site", None, Some("c.crt"), Some("k.key"), Some("ca.crt"))
                .unwrap();
        assert_eq!(request.source_label(), "cert:c.crt,key:k.key,ca-file:ca.crt");

        let pem = CertificateRequest::from_flags("site", Some("-"), None, None, None).unwrap();
        assert_eq!(pem.source_label(), "pem:-");
    }

    #[test]
    fn test_preview_hides_material() {
        let request =
            CertificateRequest::from_flags("site", Some("/secret/site.pem"), None, None, None)
                .unwrap();
        let text = request.preview(Some(OutputFormat::Json)).unwrap();
        assert_eq!(
            text,
            "{\n    \"name\": \"site\",\n    \"source\": \"pem:/secret/site.pem\"\n}"
        );
    }

    #[test]
    fn test_upload_from_parts() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("site.crt");
        let key = dir.path().join("site.key");
        fs::write(&cert, "CERT").unwrap();
        fs::write(&key, "KEY").unwrap();

        let request = CertificateRequest::from_flags(
            "site",
            None,
            cert.to_str(),
            key.to_str(),
            None,
        )
        .unwrap();
        let mock = MockClient::new();
        let mut reporter = RecordingReporter::default();
        let outcome =
            upload_certificate(&mock, &mut reporter, &request, ApplyOptions::default()).unwrap();

        assert_eq!(outcome, Outcome::Applied(Action::Created));
        assert_eq!(reporter.rendered(), vec!["certificate/site created"]);
        assert_eq!(
            mock.calls(),
            vec![Call::Upload {
                path: paths::SSL_CERTIFICATES.to_string(),
                file_name: "site.pem".to_string(),
            }]
        );
        assert_eq!(mock.version_fetches(), 0);
    }

    #[test]
    fn test_upload_missing_file() {
        let request =
            CertificateRequest::from_flags("site", Some("/nonexistent/site.pem"), None, None, None)
                .unwrap();
        let mock = MockClient::new();
        let mut reporter = RecordingReporter::default();
        let err = upload_certificate(&mock, &mut reporter, &request, ApplyOptions::default())
            .unwrap_err();

        assert!(matches!(err, Error::Io { .. }));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_dry_run_reads_nothing() {
        let request =
            CertificateRequest::from_flags("site", Some("/nonexistent/site.pem"), None, None, None)
                .unwrap();
        let mock = MockClient::new();
        let mut reporter = RecordingReporter::default();
        let options = ApplyOptions {
            output: None,
            dry_run: true,
        };
        let outcome = upload_certificate(&mock, &mut reporter, &request, options).unwrap();

        assert_eq!(outcome, Outcome::Previewed);
        assert_eq!(reporter.messages[0], "name: site\nsource: pem:/nonexistent/site.pem\n");
        assert_eq!(reporter.messages[1], DRY_RUN_NOTICE);
    }
}
