use clap::{Args, Parser, Subcommand, ValueEnum};
use leadly_engine::DEFAULT_BASE_URL;

#[derive(Parser)]
#[command(name = "leadly")]
#[command(about = "Find potential leads on Reddit")]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct GlobalOptions {
    /// Backend origin plus version prefix
    #[arg(long, env = "LEADLY_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub api_url: String,

    /// API key sent as bearer token (overrides the stored key)
    #[arg(long, env = "LEADLY_API_KEY", global = true)]
    pub api_key: Option<String>,

    /// Delay between job status checks, in milliseconds
    #[arg(long, default_value_t = 2000, global = true)]
    pub poll_interval_ms: u64,

    /// Consecutive failed status checks before polling stops
    #[arg(long, default_value_t = 1, global = true)]
    pub max_poll_failures: u32,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 30, global = true)]
    pub request_timeout_secs: u64,

    /// Which answer wins when lead refreshes overlap
    #[arg(long, value_enum, default_value_t = RefreshPolicyArg::Latest, global = true)]
    pub refresh_policy: RefreshPolicyArg,

    /// Where diagnostic logs go
    #[arg(long, value_enum, default_value_t = LogTarget::File, global = true)]
    pub log_to: LogTarget,

    /// Log debug details
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RefreshPolicyArg {
    /// Apply only the answer to the newest refresh
    Latest,
    /// Apply whichever answer arrives last
    LastResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a lead search and follow it until it finishes
    Search {
        /// Comma-separated subreddits
        #[arg(short, long)]
        subreddits: Option<String>,

        /// Description of the services you offer
        #[arg(short, long)]
        query: Option<String>,

        /// Comma-separated keywords
        #[arg(short, long)]
        keywords: Option<String>,

        /// Maximum posts fetched per subreddit
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show the leads found so far
    Leads,

    /// Manage the subreddits the backend scans
    Subreddits {
        #[command(subcommand)]
        command: SubredditCommands,
    },

    /// Check that the backend is reachable
    Health,

    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },
}

#[derive(Subcommand)]
pub enum SubredditCommands {
    /// List configured subreddits
    List,

    /// Add a subreddit to the configuration
    Add {
        /// Subreddit name, without the r/ prefix
        name: String,
    },
}

#[derive(Subcommand)]
pub enum KeyCommands {
    /// Store an API key
    Set {
        /// The key to store
        key: String,
    },

    /// Show which key is in use
    Show,

    /// Forget the stored key
    Clear,
}
