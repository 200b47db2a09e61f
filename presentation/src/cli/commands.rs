//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use leadforge_domain::keys;
use std::path::PathBuf;

/// CLI arguments for leadforge
#[derive(Parser, Debug)]
#[command(name = "leadforge")]
#[command(author, version, about = "Resumable bulk lead creation with layered configuration")]
#[command(long_about = r#"
leadforge creates leads against an external platform, one ordinal at a time.

Configuration is merged from four layers (highest precedence first):
1. Run parameters     userConfigurations.properties (+ command-line overrides)
2. City               cities/<name>.properties
3. Customer type      customerConfig_<TYPE>.json
4. Standard           standardConfig_<TYPE>.json

Each lead gets up to three attempts. When one ordinal fails every attempt
the run stops, and the next run resumes at that same ordinal.

Settings files are loaded from (in priority order):
1. --settings <path>   Explicit settings file
2. ./leadforge.toml    Project-level settings
3. ~/.config/leadforge/settings.toml   Global settings

Example:
  leadforge run --count 5
  leadforge show --customer-type HL --city BLR
  leadforge check
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to settings file
    #[arg(long, value_name = "PATH", global = true)]
    pub settings: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create leads, resuming after the last successful ordinal
    Run {
        #[command(flatten)]
        overrides: RunOverrides,

        /// Suppress progress indicators
        #[arg(short, long, conflicts_with = "plain")]
        quiet: bool,

        /// Plain line-by-line progress instead of a progress bar
        #[arg(long)]
        plain: bool,
    },

    /// Print the effective configuration without creating anything
    Show {
        #[command(flatten)]
        overrides: RunOverrides,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify that every configured layer artifact exists
    Check,
}

/// Operator overrides applied on top of the run-parameter layer.
///
/// They are never written back.
#[derive(Args, Debug, Clone, Default)]
pub struct RunOverrides {
    /// Number of leads to create
    #[arg(short = 'n', long, value_name = "N")]
    pub count: Option<u32>,

    /// Two-digit mobile number prefix (60-99)
    #[arg(long, value_name = "NN")]
    pub prefix: Option<String>,

    /// Customer type (DC, HL, HFN, LUXE)
    #[arg(long, value_name = "TYPE")]
    pub customer_type: Option<String>,

    /// City code (e.g. BLR)
    #[arg(long, value_name = "CODE")]
    pub city: Option<String>,

    /// Environment (preProd, prod)
    #[arg(short, long, value_name = "ENV")]
    pub environment: Option<String>,

    /// Base customer name for generated leads
    #[arg(long, value_name = "NAME")]
    pub customer_name: Option<String>,
}

impl RunOverrides {
    /// Overrides as run-parameter key/value pairs
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        [
            (keys::LEAD_COUNT, self.count.map(|n| n.to_string())),
            (keys::MOBILE_PREFIX, self.prefix.clone()),
            (keys::CUSTOMER_TYPE, self.customer_type.clone()),
            (keys::CITY, self.city.clone()),
            (keys::ENVIRONMENT, self.environment.clone()),
            (keys::CUSTOMER_NAME, self.customer_name.clone()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }
}
