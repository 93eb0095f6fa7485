use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use coffer_core::crypto::{Kdf, KdfParams, DEFAULT_MIN_PASSWORD_LENGTH};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CofferConfig {
    #[serde(default)]
    pub backup: BackupSection,
    #[serde(default)]
    pub crypto: CryptoSection,
    #[serde(default)]
    pub security: SecuritySection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BackupSection {
    /// Backup directory; `~/Desktop/backup` when unset
    pub dir: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoSection {
    pub kdf: KdfName,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for CryptoSection {
    fn default() -> Self {
        let params = KdfParams::default();
        Self {
            kdf: KdfName::Argon2id,
            memory_kib: params.memory_kib,
            iterations: params.iterations,
            parallelism: params.parallelism,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    pub min_password_length: usize,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KdfName {
    Argon2id,
    Sha256,
}

impl CofferConfig {
    /// Key derivation scheme for new encrypted backups.
    pub fn kdf(&self) -> anyhow::Result<Kdf> {
        match self.crypto.kdf {
            KdfName::Sha256 => Ok(Kdf::Sha256),
            KdfName::Argon2id => {
                let params = KdfParams {
                    memory_kib: self.crypto.memory_kib,
                    iterations: self.crypto.iterations,
                    parallelism: self.crypto.parallelism,
                };
                params
                    .validate()
                    .map_err(|e| anyhow::anyhow!("Invalid [crypto] settings: {}", e))?;
                Ok(Kdf::Argon2id(params))
            }
        }
    }

    /// Configured backup directory, or the default under the home directory.
    pub fn backup_dir(&self) -> anyhow::Result<PathBuf> {
        match self.backup.dir.as_deref() {
            Some(dir) if !dir.trim().is_empty() => Ok(expand_home(dir)?),
            _ => default_backup_dir(),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_backup_dir() -> anyhow::Result<PathBuf> {
    Ok(home_dir()?.join("Desktop").join("backup"))
}

pub fn read_config(path: &Path) -> anyhow::Result<CofferConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &CofferConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("coffer"));
        }
    }
    Ok(home_dir()?.join(".config").join("coffer"))
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> anyhow::Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => Ok(home_dir()?.join(rest)),
        None if path == "~" => home_dir(),
        None => Ok(PathBuf::from(path)),
    }
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
