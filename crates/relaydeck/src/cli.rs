//! Clap derive structures for the `relaydeck` CLI.
//!
//! Defines the command tree, global flags, and shared value types.

use clap::{Args, Parser, Subcommand, ValueEnum};
use relaydeck_core::{HealthStatus, ProxyStatus};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// relaydeck -- administer streaming proxy servers from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "relaydeck",
    version,
    about = "Administer streaming proxy servers from the command line",
    long_about = "Lists, edits and health-checks the streaming proxies behind a\n\
        dashboard API, and follows live updates over its push channel.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "RELAYDECK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Dashboard API base URL (overrides profile)
    #[arg(long, env = "RELAYDECK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Session token (overrides profile and keyring)
    #[arg(long, env = "RELAYDECK_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format [default: `defaults.output` from the config, else table]
    #[arg(long, short = 'o', env = "RELAYDECK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "RELAYDECK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "RELAYDECK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    /// The output format in effect: `--output`, else the config default
    /// filled in at startup, else a table.
    pub fn output(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// CLI spelling of [`ProxyStatus`].
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Active,
    Inactive,
    Maintenance,
}

impl From<StatusArg> for ProxyStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Active => Self::Active,
            StatusArg::Inactive => Self::Inactive,
            StatusArg::Maintenance => Self::Maintenance,
        }
    }
}

/// CLI spelling of [`HealthStatus`].
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HealthArg {
    Healthy,
    Warning,
    Error,
}

impl From<HealthArg> for HealthStatus {
    fn from(arg: HealthArg) -> Self {
        match arg {
            HealthArg::Healthy => Self::Healthy,
            HealthArg::Warning => Self::Warning,
            HealthArg::Error => Self::Error,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, edit and probe streaming proxies
    #[command(alias = "proxy", alias = "px")]
    Proxies(ProxiesArgs),

    /// Follow live proxy updates from the push channel
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROXIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProxiesArgs {
    #[command(subcommand)]
    pub command: ProxiesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProxiesCommand {
    /// List proxies
    #[command(alias = "ls")]
    List(ProxyListArgs),

    /// Show one proxy
    Get {
        /// Proxy ID
        id: String,
    },

    /// Create a proxy
    Create {
        /// Display name
        #[arg(long)]
        name: String,

        /// Server location
        #[arg(long)]
        location: String,

        /// Maximum concurrent streams
        #[arg(long)]
        max_streams: u32,

        /// Free-form description
        #[arg(long)]
        description: Option<String>,

        /// Owning church branch ID
        #[arg(long)]
        branch: Option<String>,

        /// Initial status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Patch fields of a proxy
    Update {
        /// Proxy ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        #[arg(long, value_enum)]
        health: Option<HealthArg>,

        #[arg(long)]
        max_streams: Option<u32>,

        #[arg(long)]
        branch: Option<String>,
    },

    /// Delete a proxy
    #[command(alias = "rm")]
    Delete {
        /// Proxy ID
        id: String,
    },

    /// Set the same status on several proxies at once
    BulkStatus {
        /// Target status
        #[arg(value_enum)]
        status: StatusArg,

        /// Proxy IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Ask the server to probe a proxy
    HealthCheck {
        /// Proxy ID
        id: String,
    },

    /// Counts by status and health, plus stream capacity
    Summary,
}

#[derive(Debug, Args)]
pub struct ProxyListArgs {
    /// Only proxies with this status
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    /// Only proxies with this health
    #[arg(long, value_enum)]
    pub health: Option<HealthArg>,

    /// Only proxies of this church branch
    #[arg(long)]
    pub branch: Option<String>,

    /// Case-insensitive match on name, location or description
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Only proxies that can accept another stream
    #[arg(long)]
    pub available: bool,

    /// Apply the filter on the server instead of locally
    #[arg(long)]
    pub server_side: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Push channel URL (overrides profile)
    #[arg(long, env = "RELAYDECK_PUSH_URL")]
    pub push_url: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (tokens masked)
    Show,

    /// Store a session token in the system keyring
    SetToken,

    /// List configured profiles
    Profiles,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
