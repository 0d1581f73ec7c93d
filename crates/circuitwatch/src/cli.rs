//! Clap derive structures for the `circuitwatch` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// circuitwatch -- circuit discovery and path drift detection for SDN controllers
#[derive(Debug, Parser)]
#[command(
    name = "circuitwatch",
    version,
    about = "Discover SDN circuits and watch their paths for drift",
    long_about = "Finds point-to-point circuits in an OpenFlow network by scanning\n\
        installed flows, traces each one through the control plane, and\n\
        re-traces them later to report circuits whose path has changed.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "CIRCUITWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format [default: table, or `defaults.output` from config]
    #[arg(long, short = 'o', env = "CIRCUITWATCH_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto, or `defaults.color` from config]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

impl GlobalOpts {
    pub fn output_format(&self) -> OutputFormat {
        self.output.unwrap_or(OutputFormat::Table)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discover circuits in a topology snapshot
    #[command(alias = "d")]
    Discover(DiscoverArgs),

    /// Discover circuits, then re-trace them and report drift
    Check(CheckArgs),

    /// Re-trace discovered circuits periodically until interrupted
    Watch(WatchArgs),

    /// Poll the configured important circuits through the trace service
    #[command(alias = "imp")]
    Important(ImportantArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Discovery ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Topology snapshot (JSON)
    #[arg(long, short = 't')]
    pub topology: PathBuf,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Topology snapshot used for discovery
    #[arg(long, short = 't')]
    pub topology: PathBuf,

    /// Snapshot to re-trace against (defaults to --topology)
    #[arg(long, short = 'a')]
    pub against: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Topology snapshot, re-read before every pass
    #[arg(long, short = 't')]
    pub topology: PathBuf,

    /// Seconds between revalidation passes
    #[arg(long, short = 'i', default_value = "60")]
    pub interval: u64,

    /// Stop after this many passes
    #[arg(long, short = 'n')]
    pub count: Option<u32>,
}

// ── Important circuits ───────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ImportantArgs {
    /// Trace service URL (overrides config)
    #[arg(long, env = "CIRCUITWATCH_TRACE_URL")]
    pub url: Option<String>,

    /// Seconds between progress polls (overrides config)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Give up on a trace after this many polls
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Give up on a trace after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
