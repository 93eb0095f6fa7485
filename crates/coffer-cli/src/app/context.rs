//! Application context for the Coffer CLI.
//!
//! Bundles CLI arguments with the lazily-loaded config file.

use std::path::PathBuf;

use once_cell::unsync::OnceCell;
use tracing::debug;

use coffer_core::{BackupConfig, SecureFileCodec};

use crate::cli::Cli;
use crate::config::{expand_home, read_config, CofferConfig};
use crate::errors::CliError;
use crate::ui::UiContext;

use super::resolver::{missing_config_message, resolve_config_path};

pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<CofferConfig>,
    ui: UiContext,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
            ui: UiContext::from_env(cli.json, cli.no_color),
        }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn ui(&self) -> &UiContext {
        &self.ui
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Whether prompts may be shown.
    pub fn interactive(&self) -> bool {
        !self.cli.no_input && self.ui.is_interactive()
    }

    /// Get the config, loading it on first use.
    ///
    /// A missing file at the default location means defaults; a missing file
    /// named with `--config` is an error.
    pub fn config(&self) -> anyhow::Result<&CofferConfig> {
        self.config.get_or_try_init(|| {
            let (path, explicit) = resolve_config_path(self.cli)?;
            if path.exists() {
                debug!(path = %path.display(), "loading config");
                read_config(&path)
            } else if explicit {
                Err(CliError::not_found(
                    missing_config_message(&path),
                    "Hint: Check the --config path or COFFER_CONFIG.",
                )
                .into())
            } else {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(CofferConfig::default())
            }
        })
    }

    /// Backup directory after applying `--backup-dir`.
    pub fn backup_dir(&self) -> anyhow::Result<PathBuf> {
        match self.cli.backup_dir.as_deref() {
            Some(dir) if !dir.trim().is_empty() => expand_home(dir.trim()),
            _ => self.config()?.backup_dir(),
        }
    }

    pub fn backup_config(&self) -> anyhow::Result<BackupConfig> {
        Ok(BackupConfig::new(self.backup_dir()?))
    }

    pub fn codec(&self) -> anyhow::Result<SecureFileCodec> {
        Ok(SecureFileCodec::new(self.config()?.kdf()?))
    }

    pub fn min_password_length(&self) -> anyhow::Result<usize> {
        Ok(self.config()?.security.min_password_length)
    }
}
