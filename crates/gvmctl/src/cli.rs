//! Clap derive structures for the `gvmctl` CLI.
//!
//! Defines the command tree, global flags, and shared argument types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// gvmctl -- drive OpenVAS / Greenbone scans over the gvmd socket
#[derive(Debug, Parser)]
#[command(
    name = "gvmctl",
    version,
    about = "Manage Greenbone vulnerability scans from the command line",
    long_about = "Talks the Greenbone Management Protocol (GMP) to gvmd over its\n\
        local Unix socket: targets, tasks, scan configs, reports and results.",
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
    /// Profile to use
    #[arg(long, short = 'p', env = "GVMCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Path of the gvmd Unix socket (overrides profile)
    #[arg(long, short = 'S', env = "GVMCTL_SOCKET", global = true)]
    pub socket: Option<PathBuf>,

    /// GMP username (overrides profile)
    #[arg(long, short = 'u', env = "GVMCTL_USERNAME", global = true)]
    pub username: Option<String>,

    /// GMP password
    #[arg(long, env = "GVMCTL_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GVMCTL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv; -vvv also logs GMP payloads)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Read timeout that ends a response, e.g. "3s" or "500ms"
    #[arg(
        long,
        env = "GVMCTL_TIMEOUT",
        value_parser = humantime::parse_duration,
        global = true
    )]
    pub timeout: Option<Duration>,

    /// Receive buffer size in bytes
    #[arg(long, env = "GVMCTL_BUFSIZE", global = true)]
    pub bufsize: Option<usize>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the GMP protocol version (no login needed)
    Version,

    /// Manage scan targets
    #[command(alias = "target", alias = "t")]
    Targets(TargetsArgs),

    /// Manage and control scan tasks
    #[command(alias = "task")]
    Tasks(TasksArgs),

    /// List and create scan configs
    #[command(alias = "cfg")]
    Configs(ConfigsArgs),

    /// List and download reports
    #[command(alias = "report", alias = "r")]
    Reports(ReportsArgs),

    /// Query scan results
    Results(ResultsArgs),

    /// Send a raw GMP command and print the response
    Raw {
        /// GMP command XML, e.g. "<get_tasks/>"
        xml: String,

        /// Send without the authentication preamble
        #[arg(long)]
        no_auth: bool,
    },

    /// Scan hosts end to end: target, task, start, wait, fetch the report
    Scan(ScanArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// GMP filter expression, e.g. "name~web rows=100"
    #[arg(long, short = 'f')]
    pub filter: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TARGETS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TargetsArgs {
    #[command(subcommand)]
    pub command: TargetsCommand,
}

#[derive(Debug, Subcommand)]
pub enum TargetsCommand {
    /// List targets
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one target
    Get {
        /// Target id
        id: String,
    },

    /// Create a target
    Create {
        /// Target name
        #[arg(long)]
        name: String,

        /// Comma-separated hosts, ranges or CIDR blocks
        #[arg(long)]
        hosts: String,

        /// Free-form comment
        #[arg(long)]
        comment: Option<String>,
    },

    /// Delete a target
    #[command(alias = "rm")]
    Delete {
        /// Target id
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TASKS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TasksArgs {
    #[command(subcommand)]
    pub command: TasksCommand,
}

#[derive(Debug, Subcommand)]
pub enum TasksCommand {
    /// List tasks
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one task
    Get {
        /// Task id
        id: String,
    },

    /// Create a task from a target and a scan config
    Create {
        /// Task name
        #[arg(long)]
        name: String,

        /// Target id
        #[arg(long)]
        target: String,

        /// Scan config id
        #[arg(long)]
        config: String,

        /// Free-form comment
        #[arg(long)]
        comment: Option<String>,

        /// Scanner id
        #[arg(long)]
        scanner: Option<String>,

        /// Schedule id
        #[arg(long)]
        schedule: Option<String>,

        /// Alert id
        #[arg(long)]
        alert: Option<String>,
    },

    /// Delete a task
    #[command(alias = "rm")]
    Delete {
        /// Task id
        id: String,
    },

    /// Start a task
    Start {
        /// Task id
        id: String,
    },

    /// Stop a running task
    Stop {
        /// Task id
        id: String,
    },

    /// Pause a running task
    Pause {
        /// Task id
        id: String,
    },

    /// Resume a stopped or paused task, or start it
    Resume {
        /// Task id
        id: String,
    },

    /// Show a task's progress in percent
    Progress {
        /// Task id
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigsArgs {
    #[command(subcommand)]
    pub command: ConfigsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigsCommand {
    /// List scan configs
    #[command(alias = "ls")]
    List(ListArgs),

    /// Copy an existing config under a new name
    Copy {
        /// Source config id
        id: String,

        /// Name of the copy
        name: String,
    },

    /// Create a config from an OpenVAS rc file
    Create {
        /// Config name
        name: String,

        /// Path of the rc file
        rcfile: PathBuf,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REPORTS & RESULTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ReportsArgs {
    #[command(subcommand)]
    pub command: ReportsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReportsCommand {
    /// List reports
    #[command(alias = "ls")]
    List(ListArgs),

    /// Download a report
    Get {
        /// Report id
        id: String,

        /// Report format name (HTML, NBE and PDF are base64-decoded)
        #[arg(long, short = 'F', default_value = "XML")]
        format: String,

        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct ResultsArgs {
    #[command(subcommand)]
    pub command: ResultsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResultsCommand {
    /// Print the raw `<get_results>` response
    Raw {
        #[command(flatten)]
        list: ListArgs,

        /// Only results of this task
        #[arg(long)]
        task: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SCAN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Comma-separated hosts, ranges or CIDR blocks
    #[arg(long)]
    pub hosts: String,

    /// Name used for the target and the task (defaults to the hosts)
    #[arg(long)]
    pub name: Option<String>,

    /// Scan config to use, by name
    #[arg(long, default_value = "Full and fast")]
    pub config_name: String,

    /// Report format
    #[arg(long, short = 'F', default_value = "HTML")]
    pub format: String,

    /// How often to poll the task
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    pub interval: Duration,

    /// Give up after this long (default: wait forever)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub max_wait: Option<Duration>,

    /// Write the report here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
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

    /// Display current configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a value on the active profile
    Set {
        /// Key: socket, username, password_env, bufsize, timeout, debug
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
