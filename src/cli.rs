use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use declarative::{Intent, Params};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cakectl")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative management of StatusCake uptime and SSL checks", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// StatusCake username (falls back to STATUSCAKE_USERNAME, then the config file)
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// StatusCake API key (falls back to STATUSCAKE_API_KEY, then the config file)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// API base URL
    #[arg(long, env = "STATUSCAKE_API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Converge one uptime test
    Uptime(UptimeArgs),

    /// Converge one SSL test
    Ssl(SslArgs),

    /// Converge every check declared in a TOML file
    Apply(ApplyArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Desired state of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum State {
    Present,
    Absent,
    List,
}

impl From<State> for Intent {
    fn from(state: State) -> Self {
        match state {
            State::Present => Intent::Present,
            State::Absent => Intent::Absent,
            State::List => Intent::List,
        }
    }
}

/// Flags shared by the single-check commands
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Desired state
    #[arg(value_enum, default_value_t = State::Present)]
    pub state: State,

    /// Show what would change without changing anything
    #[arg(short = 'n', long, visible_alias = "check")]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct UptimeArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Test name (identity)
    #[arg(long)]
    pub name: Option<String>,

    /// Website URL, IP or FQDN
    #[arg(long)]
    pub url: Option<String>,

    /// Seconds between checks
    #[arg(long)]
    pub check_rate: Option<i64>,

    /// Test type (HTTP, TCP, PING, ...)
    #[arg(long)]
    pub test_type: Option<String>,

    /// Comma separated tags
    #[arg(long)]
    pub tags: Option<String>,

    /// Contact group id
    #[arg(long)]
    pub contact_group: Option<String>,

    #[arg(long, value_name = "BOOL")]
    pub paused: Option<bool>,

    /// Comma separated node location codes
    #[arg(long)]
    pub node_locations: Option<String>,

    /// Confirmation servers before alerting
    #[arg(long)]
    pub confirmation: Option<i64>,

    /// Timeout in seconds
    #[arg(long)]
    pub timeout: Option<i64>,

    /// Comma separated status codes that trigger an alert
    #[arg(long)]
    pub status_codes: Option<String>,

    /// Host header
    #[arg(long)]
    pub host: Option<String>,

    /// Custom headers as JSON (single quotes accepted)
    #[arg(long)]
    pub custom_header: Option<String>,

    #[arg(long, value_name = "BOOL")]
    pub follow_redirect: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    pub enable_ssl_alert: Option<bool>,

    /// String the response must contain
    #[arg(long)]
    pub find_string: Option<String>,

    /// Port (required for TCP tests)
    #[arg(long)]
    pub port: Option<i64>,

    /// Alert when find_string is present instead of absent
    #[arg(long, value_name = "BOOL")]
    pub do_not_find: Option<bool>,

    /// Raw POST body as JSON (single quotes accepted)
    #[arg(long)]
    pub post_raw: Option<String>,

    #[arg(long)]
    pub basic_user: Option<String>,

    #[arg(long)]
    pub basic_pass: Option<String>,
}

impl UptimeArgs {
    /// Caller parameters keyed by canonical field name; unset flags are left out.
    pub fn params(&self) -> Params {
        let mut params = Params::new();
        put(&mut params, "name", self.name.clone());
        put(&mut params, "url", self.url.clone());
        put(&mut params, "check_rate", self.check_rate);
        put(&mut params, "test_type", self.test_type.clone());
        put(&mut params, "tags", self.tags.clone());
        put(&mut params, "contact_group", self.contact_group.clone());
        put(&mut params, "paused", self.paused);
        put(&mut params, "node_locations", self.node_locations.clone());
        put(&mut params, "confirmation", self.confirmation);
        put(&mut params, "timeout", self.timeout);
        put(&mut params, "status_codes", self.status_codes.clone());
        put(&mut params, "host", self.host.clone());
        put(&mut params, "custom_header", self.custom_header.clone());
        put(&mut params, "follow_redirect", self.follow_redirect);
        put(&mut params, "enable_ssl_alert", self.enable_ssl_alert);
        put(&mut params, "find_string", self.find_string.clone());
        put(&mut params, "port", self.port);
        put(&mut params, "do_not_find", self.do_not_find);
        put(&mut params, "post_raw", self.post_raw.clone());
        put(&mut params, "basic_user", self.basic_user.clone());
        put(&mut params, "basic_pass", self.basic_pass.clone());
        params
    }
}

#[derive(Args, Debug)]
pub struct SslArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// URL to check, starting with https:// (identity)
    #[arg(long)]
    pub domain: Option<String>,

    /// Seconds between checks
    #[arg(long)]
    pub check_rate: Option<i64>,

    /// Contact group id
    #[arg(long)]
    pub contact_group: Option<i64>,

    /// Comma separated days before expiry to alert at
    #[arg(long)]
    pub alert_at: Option<String>,

    #[arg(long, value_name = "BOOL")]
    pub alert_expiry: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    pub alert_reminder: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    pub alert_broken: Option<bool>,

    #[arg(long, value_name = "BOOL")]
    pub alert_mixed: Option<bool>,
}

impl SslArgs {
    pub fn params(&self) -> Params {
        let mut params = Params::new();
        put(&mut params, "domain", self.domain.clone());
        put(&mut params, "check_rate", self.check_rate);
        put(&mut params, "contact_group", self.contact_group);
        put(&mut params, "alert_at", self.alert_at.clone());
        put(&mut params, "alert_expiry", self.alert_expiry);
        put(&mut params, "alert_reminder", self.alert_reminder);
        put(&mut params, "alert_broken", self.alert_broken);
        put(&mut params, "alert_mixed", self.alert_mixed);
        params
    }
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Declaration file with [[uptime]] and [[ssl]] tables
    pub file: PathBuf,

    /// Show what would change without changing anything
    #[arg(short = 'n', long, visible_alias = "check")]
    pub dry_run: bool,
}

fn put<T: Into<Value>>(params: &mut Params, key: &str, value: Option<T>) {
    if let Some(value) = value {
        params.insert(key.to_string(), value.into());
    }
}
