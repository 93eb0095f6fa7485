use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use coffer_core::VERSION;

/// Coffer - Zip a folder into a timestamped backup and lock it with a password
#[derive(Parser)]
#[command(name = "coffer")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "COFFER_CONFIG", value_name = "PATH")]
    pub config: Option<String>,

    /// Directory where backups are written
    #[arg(short = 'd', long, global = true, env = "COFFER_BACKUP_DIR", value_name = "DIR")]
    pub backup_dir: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_input: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Zip a directory into the backup folder
    Backup(BackupArgs),

    /// Encrypt a file in place (FILE becomes FILE.encrypted)
    Encrypt(EncryptArgs),

    /// Decrypt an encrypted backup next to itself
    Decrypt(DecryptArgs),

    /// Show what a zip archive contains
    Inspect(InspectArgs),

    /// Interactive menu
    Menu,

    /// Manage the config file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `backup` command
#[derive(Args)]
pub struct BackupArgs {
    /// Directory to back up
    #[arg(value_name = "DIR")]
    pub source: String,

    /// Encrypt the archive after creating it
    #[arg(short, long)]
    pub encrypt: bool,
}

/// Arguments for the `encrypt` command
#[derive(Args)]
pub struct EncryptArgs {
    /// File to encrypt
    #[arg(value_name = "FILE")]
    pub path: String,
}

/// Arguments for the `decrypt` command
#[derive(Args)]
pub struct DecryptArgs {
    /// Encrypted file
    #[arg(value_name = "FILE")]
    pub path: String,

    /// Also extract the recovered archive into this directory
    #[arg(long, value_name = "DIR")]
    pub extract_to: Option<String>,
}

/// Arguments for the `inspect` command
#[derive(Args)]
pub struct InspectArgs {
    /// Zip archive to inspect
    #[arg(value_name = "ZIP")]
    pub path: String,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}
