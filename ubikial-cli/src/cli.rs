//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ubikial_app::AppConfig;
use ubikial_core::types::{Platform, Style, Tone, Voice};

/// Ubikial - persona storage with GitHub sync
///
/// Personas are kept in local storage and, when a GitHub token is configured
/// and the session is online, mirrored into one private repository each.
#[derive(Parser, Debug)]
#[command(name = "ubikial")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, env = "UBIKIAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// User whose session is opened
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Never contact the repository host
    #[arg(long, global = true)]
    pub offline: bool,

    /// Local storage directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply flags on top of the file/environment configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(user) = &self.user {
            config.user = Some(user.clone());
        }
        if self.offline {
            config.offline = true;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Persona management
    Persona {
        #[command(subcommand)]
        command: PersonaCommand,
    },

    /// Reconcile local and remote personas
    Sync,

    /// Show the active configuration and storage backend
    Status,

    /// Store a platform access token in the credential vault
    Link(LinkArgs),

    /// Remove a platform access token from the credential vault
    Unlink {
        /// Platform to unlink
        platform: Platform,
    },

    /// List linked platform accounts
    Accounts,
}

#[derive(Subcommand, Debug)]
pub enum PersonaCommand {
    /// List personas
    List,

    /// Show one persona
    Show {
        /// Persona id
        id: String,
    },

    /// Create a persona
    Create {
        /// Display name
        #[arg(long)]
        name: String,

        #[command(flatten)]
        fields: PersonaFields,
    },

    /// Update fields of a persona
    Update {
        /// Persona id
        id: String,

        /// New display name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: PersonaFields,
    },

    /// Delete a persona (and its remote repository)
    Delete {
        /// Persona id
        id: String,
    },

    /// Copy a persona under a new id
    Duplicate {
        /// Persona id
        id: String,
    },
}

/// Optional persona fields shared by `create` and `update`.
#[derive(Args, Debug, Default)]
pub struct PersonaFields {
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub tone: Option<Tone>,

    #[arg(long)]
    pub style: Option<Style>,

    #[arg(long)]
    pub voice: Option<Voice>,

    /// Enable a platform with default settings (repeatable)
    #[arg(long = "platform", value_name = "PLATFORM", conflicts_with = "settings_file")]
    pub platforms: Vec<Platform>,

    /// JSON file with the full list of platform settings
    #[arg(long, value_name = "FILE")]
    pub settings_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Platform of the account
    pub platform: Platform,

    /// Account handle on the platform
    pub handle: String,

    /// Access token
    #[arg(long, env = "UBIKIAL_PLATFORM_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Refresh token
    #[arg(long, hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// Token lifetime in seconds
    #[arg(long, value_name = "SECONDS")]
    pub expires_in: Option<i64>,
}
