//! CLI command definitions

use clap::{Parser, Subcommand};
use schatphone_domain::ContactKind;
use std::path::PathBuf;

fn parse_kind(s: &str) -> Result<ContactKind, String> {
    ContactKind::parse(s).ok_or_else(|| format!("unknown kind '{s}' (persona, service, official)"))
}

/// CLI arguments for schatphone
#[derive(Parser, Debug)]
#[command(name = "schatphone")]
#[command(author, version, about = "Chat with AI personas from the terminal")]
#[command(long_about = r#"
schatphone keeps a contact list of AI personas, one conversation per contact,
and sends each turn to an OpenAI-compatible or Gemini endpoint. The provider
is picked from the configured API URL.

Configuration files are loaded from (in priority order):
1. SCHATPHONE_* env     e.g. SCHATPHONE_API__KEY
2. --config <path>      Explicit config file
3. ./schatphone.toml    Project-level config
4. ~/.config/schatphone/config.toml   Global config

Example:
  schatphone contacts
  schatphone send eva "Anything on the calendar today?"
  schatphone retry 2 msg_1700000000000_k3j9xa
"#)]
pub struct Cli {
    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Directory for persisted chat state (overrides [storage] data_dir)
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List contacts, pinned first, then most recent
    Contacts,

    /// Show a conversation
    History {
        /// Contact id or name
        contact: String,
    },

    /// Send a message and wait for the reply
    Send {
        /// Contact id or name
        contact: String,
        /// Message text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Resend a failed message
    Retry {
        /// Contact id or name
        contact: String,
        /// Id of the failed message (shown by `history`)
        message_id: String,
    },

    /// Add a contact
    AddContact {
        #[arg(long)]
        name: String,
        /// Short description shown in the list
        #[arg(long, default_value = "")]
        role: String,
        /// Persona prompt sent as the system instruction
        #[arg(long, default_value = "")]
        bio: String,
        /// persona, service or official
        #[arg(long, default_value = "persona", value_parser = parse_kind)]
        kind: ContactKind,
        /// Notification template for service accounts
        #[arg(long, default_value = "")]
        service_template: String,
    },

    /// Set or clear (no text) a conversation draft
    Draft {
        /// Contact id or name
        contact: String,
        text: Vec<String>,
    },

    /// Mark a conversation as read
    Read {
        /// Contact id or name
        contact: String,
    },

    /// Pin a conversation to the top of the list
    Pin {
        /// Contact id or name
        contact: String,
        /// Unpin instead
        #[arg(long)]
        off: bool,
    },

    /// List models available to the configured API key
    Models,

    /// Inspect or create configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the merged configuration (API key masked)
    Show,
    /// Write a starter global config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show configuration file locations
    Sources,
}
