//! Endpoint paths, relative to the normalised API base URL.
//!
//! Resource names are percent-encoded as single path segments.

use urlencoding::encode;

/// Prefix for every configuration endpoint.
pub const CONFIGURATION: &str = "/services/haproxy/configuration";

/// Configuration version endpoint (plain-text integer body).
pub const VERSION: &str = "/services/haproxy/configuration/version";

/// Raw configuration file endpoint.
pub const RAW: &str = "/services/haproxy/configuration/raw";

/// The `global` section.
pub const GLOBAL: &str = "/services/haproxy/configuration/global";

/// Collection of `defaults` sections.
pub const DEFAULTS: &str = "/services/haproxy/configuration/defaults";

/// Collection of backends.
pub const BACKENDS: &str = "/services/haproxy/configuration/backends";

/// Collection of frontends.
pub const FRONTENDS: &str = "/services/haproxy/configuration/frontends";

/// Collection of userlists.
pub const USERLISTS: &str = "/services/haproxy/configuration/userlists";

/// SSL certificate storage (not versioned).
pub const SSL_CERTIFICATES: &str = "/services/haproxy/storage/ssl_certificates";

/// Native runtime statistics.
pub const STATS: &str = "/services/haproxy/stats/native";

/// Reload history.
pub const RELOADS: &str = "/services/haproxy/reloads";

/// Configuration transactions.
pub const TRANSACTIONS: &str = "/services/haproxy/transactions";

/// A single backend.
pub fn backend(name: &str) -> String {
    format!("{BACKENDS}/{}", encode(name))
}

/// Servers of a backend.
pub fn servers(backend_name: &str) -> String {
    format!("{}/servers", backend(backend_name))
}

/// A single server of a backend.
pub fn server(backend_name: &str, name: &str) -> String {
    format!("{}/{}", servers(backend_name), encode(name))
}

/// A single frontend.
pub fn frontend(name: &str) -> String {
    format!("{FRONTENDS}/{}", encode(name))
}

/// Binds of a frontend.
pub fn binds(frontend_name: &str) -> String {
    format!("{}/binds", frontend(frontend_name))
}

/// A single bind of a frontend, addressed by its wire name.
pub fn bind(frontend_name: &str, bind_name: &str) -> String {
    format!("{}/{}", binds(frontend_name), encode(bind_name))
}

/// ACLs of a frontend.
pub fn acls(frontend_name: &str) -> String {
    format!("{}/acls", frontend(frontend_name))
}

/// A single `defaults` section.
pub fn defaults(name: &str) -> String {
    format!("{DEFAULTS}/{}", encode(name))
}

/// A single userlist.
pub fn userlist(name: &str) -> String {
    format!("{USERLISTS}/{}", encode(name))
}

/// A single stored certificate.
pub fn ssl_certificate(name: &str) -> String {
    format!("{SSL_CERTIFICATES}/{}", encode(name))
}

/// A single reload.
pub fn reload(id: &str) -> String {
    format!("{RELOADS}/{}", encode(id))
}

/// A single transaction.
pub fn transaction(id: &str) -> String {
    format!("{TRANSACTIONS}/{}", encode(id))
}

/// Split a child path into its collection and last segment.
///
/// Returns `None` for paths without a parent segment.
pub fn split_last(path: &str) -> Option<(&str, &str)> {
    path.rsplit_once('/')
        .filter(|(parent, last)| !parent.is_empty() && !last.is_empty())
}
