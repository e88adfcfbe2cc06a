//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use copapatch_core::Platform;

/// copapatch -- container image vulnerability patching.
///
/// Use `copapatch <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "copapatch", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file [default: copapatch.toml].
    ///
    /// An explicit path must exist; only the default path may be absent.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the patcher version.
    Version,

    /// Patch an image (legacy entry: --scan or --report selects report-based patching).
    Patch(PatchArgs),

    /// Patch every platform the image provides.
    PatchComprehensive(TargetArgs),

    /// Patch only the listed platforms.
    PatchPlatforms(PlatformsArgs),

    /// Scan the image and patch the reported vulnerabilities.
    PatchVulnerabilities(VulnerabilitiesArgs),

    /// Show the platform topology of an image.
    Inspect(InspectArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- shared ----

/// Image and output naming options shared by every patch command.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Image reference to patch (e.g. alpine:3.17).
    pub image: String,

    /// Output tag for the patched image.
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Push the patched image to the registry.
    #[arg(long)]
    pub push: bool,
}

// ---- patch ----

/// Legacy generic patch entry.
#[derive(Args, Debug)]
pub struct PatchArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Scan the image before patching.
    #[arg(long)]
    pub scan: bool,

    /// Platform to patch (repeatable, e.g. linux/arm64).
    #[arg(long = "platform")]
    pub platforms: Vec<Platform>,

    /// Existing vulnerability report (skips the scan).
    #[arg(long)]
    pub report: Option<PathBuf>,
}

// ---- patch-platforms ----

#[derive(Args, Debug)]
pub struct PlatformsArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Platform to patch (repeatable, at least one).
    #[arg(long = "platform", required = true)]
    pub platforms: Vec<Platform>,
}

// ---- patch-vulnerabilities ----

#[derive(Args, Debug)]
pub struct VulnerabilitiesArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Platform to scan (repeatable).
    #[arg(long = "platform")]
    pub platforms: Vec<Platform>,

    /// Existing vulnerability report (skips the scan).
    #[arg(long)]
    pub report: Option<PathBuf>,
}

// ---- inspect ----

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Image reference to inspect.
    pub image: String,
}

// ---- config ----

/// Manage copapatch configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, scanner, patcher, registry, engine).
        #[arg(long)]
        section: Option<String>,
    },
}
