//! Clap derive structures for the `housing` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// housing -- room selection for the honors housing program
#[derive(Debug, Parser)]
#[command(
    name = "housing",
    version,
    about = "Reserve honors housing rooms from the command line",
    long_about = "Browse floors and room occupancy, reserve or release a room, and\n\
        manage the registration form's admin lists.\n\n\
        Signs in silently with your RIT Google account when possible; pass\n\
        --sign-in (or run `housing login`) to choose an account interactively.",
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
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "HOUSING_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, env = "HOUSING_API_ROOT", global = true)]
    pub api_root: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HOUSING_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

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

    /// Accept invalid TLS certificates (local development servers)
    #[arg(long, short = 'k', env = "HOUSING_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "HOUSING_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Fall back to interactive sign-in when silent sign-in fails
    #[arg(long, global = true)]
    pub sign_in: bool,
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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show floors and room occupancy
    #[command(alias = "f")]
    Floors(FloorsArgs),

    /// Show your current reservation
    Current,

    /// Reserve a room
    Reserve {
        /// Room number (e.g. 401)
        room: String,
    },

    /// Release your current reservation
    Release,

    /// Registration administration
    Admin(AdminArgs),

    /// Show the signed-in account
    Whoami,

    /// Sign in interactively with the full account chooser
    Login,

    /// Inspect and edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Floors ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FloorsArgs {
    /// Floor to show (defaults to the first floor)
    #[arg(long, short = 'f')]
    pub floor: Option<String>,
}

// ── Admin ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Show the student, room, admin and editor lists
    Lists,

    /// Show whether the registration form is open
    Status,

    /// Open the registration form
    Open,

    /// Close the registration form
    Close,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration for the active profile
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (api_root, auth_url, userinfo_url, client_id, scopes,
        /// hosted_domain, sample_url, ca_cert, insecure, timeout)
        key: String,

        /// Value to set (comma-separated for scopes)
        value: String,
    },

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Print the config file location
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
