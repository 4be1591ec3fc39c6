//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// instapost: publish or schedule Instagram posts through third-party posting APIs
#[derive(Parser, Debug)]
#[command(name = "instapost")]
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
    /// Post through Ayrshare
    Ayrshare(AyrshareArgs),

    /// Post through a Buffer Instagram profile
    Buffer(BufferArgs),

    /// Post through the Instagram Graph API
    Graph(GraphArgs),

    /// Post through Late.io
    Late(LateArgs),

    /// Send post data to a Zapier webhook
    Zapier(ZapierArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

/// Output options shared by every posting command
#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Print a human-readable report instead of JSON
    #[arg(long)]
    pub report: bool,

    /// Give up after this many seconds (overrides general.timeout_secs)
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Args, Debug)]
pub struct AyrshareArgs {
    /// Caption text
    #[arg(long)]
    pub text: String,

    /// Public image URL
    #[arg(long)]
    pub image_url: Option<String>,

    /// Schedule date (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub schedule_date: Option<String>,

    /// Schedule time (HH:MM, 24-hour, UTC)
    #[arg(long)]
    pub schedule_time: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct BufferArgs {
    /// Buffer profile id of the Instagram account
    #[arg(long)]
    pub profile_id: String,

    /// Caption text
    #[arg(long)]
    pub text: String,

    /// Public image URL
    #[arg(long)]
    pub media: Option<String>,

    /// Unix timestamp to publish at
    #[arg(long)]
    pub scheduled_at: Option<i64>,

    /// Add to the top of the queue
    #[arg(long)]
    pub top: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Post type (text, image)
    #[arg(long, default_value = "image")]
    pub post_type: String,

    /// Caption text
    #[arg(long)]
    pub caption: String,

    /// Public image URL
    #[arg(long)]
    pub image_url: Option<String>,

    /// ISO-8601 instant to publish at
    #[arg(long)]
    pub schedule_time: Option<String>,

    /// Access token (defaults to the configured environment variable)
    #[arg(long)]
    pub access_token: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct LateArgs {
    /// Caption text
    #[arg(long)]
    pub content: String,

    /// Public media URL (repeatable, up to 10)
    #[arg(long = "media-url")]
    pub media_urls: Vec<String>,

    /// ISO-8601 instant to publish at
    #[arg(long)]
    pub schedule_time: Option<String>,

    /// Post type (feed, story, reel)
    #[arg(long, default_value = "feed")]
    pub post_type: String,

    /// Hashtag to append (repeatable)
    #[arg(long = "hashtag")]
    pub hashtags: Vec<String>,

    /// Username to mention (repeatable)
    #[arg(long = "mention")]
    pub mentions: Vec<String>,

    /// Late account id (defaults to the configured environment variable)
    #[arg(long)]
    pub account_id: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct ZapierArgs {
    /// Caption text
    #[arg(long)]
    pub content: String,

    /// Public media URL (repeatable)
    #[arg(long = "media-url")]
    pub media_urls: Vec<String>,

    /// Preferred posting time, e.g. "1:10 PM"
    #[arg(long)]
    pub time: String,

    /// Timezone label, e.g. EST
    #[arg(long)]
    pub timezone: String,

    /// Hashtag to append (repeatable)
    #[arg(long = "hashtag")]
    pub hashtags: Vec<String>,

    /// Brand name
    #[arg(long)]
    pub brand_name: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
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

    /// Print the effective configuration as TOML
    Show,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
