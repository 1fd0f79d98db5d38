//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// brandcast: schedule and publish brand content across social platforms
#[derive(Parser, Debug)]
#[command(name = "brandcast")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish content to a platform right now
    Publish(PublishArgs),

    /// Manage scheduled posts
    Schedule(ScheduleArgs),

    /// Dispatch due scheduled posts
    Run(RunArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Target platform (linkedin, instagram, facebook, tiktok)
    #[arg(long)]
    pub platform: String,

    /// Caption text
    #[arg(long)]
    pub caption: String,

    /// Media URL, repeatable; suffix decides image vs video
    #[arg(long = "media-url")]
    pub media_urls: Vec<String>,

    /// Link to include with the post
    #[arg(long)]
    pub link: Option<String>,

    /// Validate and route without publishing
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    pub command: ScheduleCommands,
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommands {
    /// Queue a post for future publishing
    Add {
        /// Target platform (linkedin, instagram, facebook, tiktok)
        #[arg(long)]
        platform: String,

        /// Caption text
        #[arg(long)]
        caption: String,

        /// Media URL, repeatable
        #[arg(long = "media-url")]
        media_urls: Vec<String>,

        /// Link to include with the post
        #[arg(long)]
        link: Option<String>,

        /// When to publish (RFC 3339, e.g. 2026-09-01T09:00:00Z)
        #[arg(long)]
        at: String,
    },

    /// List scheduled posts
    List {
        /// Only show pending posts
        #[arg(long)]
        pending: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run in dry-run mode (no actual publishing)
    #[arg(long)]
    pub dry_run: bool,

    /// Process one dispatch cycle and exit
    #[arg(long)]
    pub once: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Check specific component (config, brand, linkedin, upload_post, store)
    #[arg(long)]
    pub check: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
