use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "haproxyctl")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Manage HAProxy through the Data Plane API", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Credentials file (default: ~/.config/haproxyctl/config.json)
    #[arg(long, env = "HAPROXYCTL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Interactively configure Data Plane API credentials
    Login,

    /// Create or update resources from a manifest
    Apply(ApplyArgs),

    /// Create resources from a manifest or from flags
    Create(CreateArgs),

    /// Delete resources
    Delete(DeleteArgs),

    /// Display resources
    #[command(subcommand)]
    Get(GetCommand),

    /// Show a detailed summary of a resource
    #[command(subcommand)]
    Describe(DescribeCommand),

    /// Edit a resource in $EDITOR
    #[command(subcommand)]
    Edit(EditCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Shared flags
// ============================================================================

/// Format for `apply`/`create` previews.
#[derive(Clone, Copy, ValueEnum)]
pub enum PreviewFormat {
    Yaml,
    Json,
}

/// Format for `get` output.
#[derive(Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum GetFormat {
    #[default]
    Table,
    Yaml,
    Json,
}

#[derive(Args, Clone, Copy)]
pub struct PreviewArgs {
    /// Print the request payload instead of sending it
    #[arg(short, long, value_enum)]
    pub output: Option<PreviewFormat>,

    /// Show what would be sent without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

// ============================================================================
// Apply
// ============================================================================

#[derive(Args)]
pub struct ApplyArgs {
    /// Manifest file ("-" for stdin)
    #[arg(short, long)]
    pub file: String,

    #[command(flatten)]
    pub preview: PreviewArgs,
}

// ============================================================================
// Create
// ============================================================================

#[derive(Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct CreateArgs {
    /// Manifest file ("-" for stdin)
    #[arg(short, long)]
    pub file: Option<String>,

    #[command(subcommand)]
    pub command: Option<CreateCommand>,
}

#[derive(Subcommand)]
pub enum CreateCommand {
    /// Create a backend
    #[command(alias = "backends")]
    Backend(CreateBackendArgs),

    /// Create a frontend
    #[command(alias = "frontends")]
    Frontend(CreateFrontendArgs),

    /// Create a server in a backend
    #[command(alias = "servers")]
    Server(CreateServerArgs),

    /// Upload a TLS certificate
    #[command(alias = "certificates")]
    Certificate(CreateCertificateArgs),
}

#[derive(Args)]
pub struct CreateBackendArgs {
    /// Backend name
    pub name: String,

    /// Backend mode
    #[arg(long, default_value = "http")]
    pub mode: String,

    /// Balance settings (key=value, comma-separated)
    #[arg(long, default_value = "algorithm=roundrobin")]
    pub balance: String,

    /// Default server settings (key=value, comma-separated)
    #[arg(long)]
    pub default_server: Option<String>,

    /// X-Forwarded-For settings (key=value, comma-separated)
    #[arg(long)]
    pub forwardfor: Option<String>,

    /// Client timeout (e.g. 30s)
    #[arg(long)]
    pub timeout_client: Option<String>,

    /// Queue timeout (e.g. 30s)
    #[arg(long)]
    pub timeout_queue: Option<String>,

    /// Server timeout (e.g. 30s)
    #[arg(long)]
    pub timeout_server: Option<String>,

    /// Enable redispatch
    #[arg(long)]
    pub redispatch: bool,

    /// Server definition (name=s1,address=10.0.0.1,port=80,weight=100); repeatable
    #[arg(long = "server")]
    pub servers: Vec<String>,

    #[command(flatten)]
    pub preview: PreviewArgs,
}

#[derive(Args)]
pub struct CreateFrontendArgs {
    /// Frontend name
    pub name: String,

    /// Frontend mode
    #[arg(long, default_value = "http")]
    pub mode: String,

    /// Backend used when no rule matches
    #[arg(long)]
    pub default_backend: Option<String>,

    /// X-Forwarded-For settings (key=value, comma-separated)
    #[arg(long)]
    pub forwardfor: Option<String>,

    /// Client timeout (e.g. 30s)
    #[arg(long)]
    pub timeout_client: Option<String>,

    /// HTTP request timeout (e.g. 10s)
    #[arg(long)]
    pub timeout_http_request: Option<String>,

    /// HTTP keep-alive timeout (e.g. 5s)
    #[arg(long)]
    pub timeout_http_keep_alive: Option<String>,

    /// Bind definition (address=*,port=80,ssl=true); repeatable
    #[arg(long = "bind")]
    pub binds: Vec<String>,

    #[command(flatten)]
    pub preview: PreviewArgs,
}

#[derive(Args)]
pub struct CreateServerArgs {
    /// Owning backend
    pub backend: String,

    /// Server name
    pub name: String,

    /// Host name or IP address
    #[arg(long)]
    pub address: String,

    /// TCP port
    #[arg(long)]
    pub port: u16,

    /// Load-balancing weight
    #[arg(long, default_value_t = 100)]
    pub weight: u32,

    /// Talk TLS to the server
    #[arg(long)]
    pub ssl: bool,

    #[command(flatten)]
    pub preview: PreviewArgs,
}

#[derive(Args)]
pub struct CreateCertificateArgs {
    /// Storage name (without .pem)
    pub name: String,

    /// Ready-made PEM bundle ("-" for stdin)
    #[arg(long, conflicts_with_all = ["cert", "key"])]
    pub pem: Option<String>,

    /// Certificate file
    #[arg(long)]
    pub cert: Option<String>,

    /// Private key file
    #[arg(long)]
    pub key: Option<String>,

    /// CA chain file
    #[arg(long)]
    pub ca_file: Option<String>,

    #[command(flatten)]
    pub preview: PreviewArgs,
}

// ============================================================================
// Delete
// ============================================================================

#[derive(Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct DeleteArgs {
    /// Manifest file ("-" for stdin)
    #[arg(short, long)]
    pub file: Option<String>,

    #[command(subcommand)]
    pub command: Option<DeleteCommand>,
}

#[derive(Subcommand)]
pub enum DeleteCommand {
    /// Delete a backend and its servers
    #[command(alias = "backends")]
    Backend { name: String },

    /// Delete a frontend and its binds
    #[command(alias = "frontends")]
    Frontend { name: String },

    /// Delete a server from a backend
    #[command(alias = "servers")]
    Server { backend: String, name: String },

    /// Delete a userlist
    #[command(alias = "userlists")]
    Userlist { name: String },

    /// Delete a stored certificate
    #[command(alias = "certificates")]
    Certificate { name: String },
}

// ============================================================================
// Get
// ============================================================================

#[derive(Args, Clone, Copy)]
pub struct GetFormatArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub output: GetFormat,
}

#[derive(Subcommand)]
pub enum GetCommand {
    /// List backends or show one
    #[command(alias = "backend")]
    Backends {
        name: Option<String>,
        #[command(flatten)]
        format: GetFormatArgs,
    },

    /// List frontends or show one
    #[command(alias = "frontend")]
    Frontends {
        name: Option<String>,
        #[command(flatten)]
        format: GetFormatArgs,
    },

    /// List servers of a backend or show one
    #[command(alias = "server")]
    Servers {
        backend: String,
        name: Option<String>,
        #[command(flatten)]
        format: GetFormatArgs,
    },

    /// List binds of a frontend
    #[command(alias = "bind")]
    Binds {
        frontend: String,
        #[command(flatten)]
        format: GetFormatArgs,
    },

    /// List userlists or show one
    #[command(alias = "userlist")]
    Userlists {
        name: Option<String>,
        #[command(flatten)]
        format: GetFormatArgs,
    },

    /// List stored certificates or show one
    #[command(alias = "certificate")]
    Certificates {
        name: Option<String>,
        #[command(flatten)]
        format: GetFormatArgs,
    },

    /// List ACLs of a frontend
    #[command(alias = "acl")]
    Acls {
        frontend: String,
        #[command(flatten)]
        format: GetFormatArgs,
    },

    /// Show the global section
    #[command(alias = "globals")]
    Global {
        #[command(flatten)]
        format: GetFormatArgs,
    },

    /// Show the defaults section
    Defaults {
        #[command(flatten)]
        format: GetFormatArgs,
    },

    /// Show native runtime statistics
    Stats {
        /// Object type: frontend, backend or server
        #[arg(long = "type")]
        kind: Option<String>,
        /// Object name
        #[arg(long)]
        name: Option<String>,
        /// Parent name (the backend, for servers)
        #[arg(long)]
        parent: Option<String>,
        #[command(flatten)]
        format: GetFormatArgs,
    },

    /// List reloads or show one
    #[command(alias = "reload")]
    Reloads {
        id: Option<String>,
        #[command(flatten)]
        format: GetFormatArgs,
    },

    /// List configuration transactions or show one
    #[command(alias = "transaction")]
    Transactions {
        id: Option<String>,
        /// Only transactions in this state (e.g. in_progress)
        #[arg(long)]
        status: Option<String>,
        #[command(flatten)]
        format: GetFormatArgs,
    },

    /// Show the current configuration version
    Version,

    /// Print the raw HAProxy configuration
    Raw,
}

// ============================================================================
// Describe / Edit
// ============================================================================

#[derive(Subcommand)]
pub enum DescribeCommand {
    /// Describe a backend and its servers
    #[command(alias = "backends")]
    Backend { name: String },

    /// Describe a frontend and its binds
    #[command(alias = "frontends")]
    Frontend { name: String },
}

#[derive(Subcommand)]
pub enum EditCommand {
    /// Edit a backend and its servers
    #[command(alias = "backends")]
    Backend { name: String },

    /// Edit a frontend and its binds
    #[command(alias = "frontends")]
    Frontend { name: String },

    /// Edit the global section
    #[command(alias = "globals")]
    Global,

    /// Edit the defaults section
    Defaults,
}
