//! Path resolution for config files and user-supplied paths.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, expand_home};

/// Resolve the config file path, returning whether it was chosen explicitly.
///
/// `--config` (or `COFFER_CONFIG`, via clap) wins over the XDG default.
pub fn resolve_config_path(cli: &Cli) -> anyhow::Result<(PathBuf, bool)> {
    if let Some(value) = cli.config.as_deref() {
        if !value.trim().is_empty() {
            return Ok((expand_home(value.trim())?, true));
        }
    }
    Ok((default_config_path()?, false))
}

/// Turn a path typed by the user into a filesystem path.
///
/// Surrounding whitespace and one pair of matching quotes are removed, which
/// is what a terminal produces when a file is dragged onto it.
pub fn resolve_user_path(raw: &str) -> anyhow::Result<PathBuf> {
    let cleaned = clean_path_input(raw);
    if cleaned.is_empty() {
        return Err(anyhow::anyhow!("No path given"));
    }
    expand_home(cleaned)
}

pub fn clean_path_input(raw: &str) -> &str {
    let trimmed = raw.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.trim();
        }
    }
    trimmed
}

/// Error message when a config file given with `--config` is missing.
pub fn missing_config_message(config_path: &Path) -> String {
    format!(
        "No config file at {}\n\nRun:\n  coffer --config {} config init",
        config_path.display(),
        config_path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_path_input_trims_and_unquotes() {
        assert_eq!(clean_path_input("  /home/a/docs \n"), "/home/a/docs");
        assert_eq!(clean_path_input("'/home/a/my docs'"), "/home/a/my docs");
        assert_eq!(clean_path_input("\"/home/a/my docs\" "), "/home/a/my docs");
    }

    #[test]
    fn test_clean_path_input_keeps_unbalanced_quotes() {
        assert_eq!(clean_path_input("\"/home/a/docs'"), "\"/home/a/docs'");
        assert_eq!(clean_path_input("it's"), "it's");
    }

    #[test]
    fn test_resolve_user_path_rejects_blank() {
        assert!(resolve_user_path("   ").is_err());
        assert!(resolve_user_path("''").is_err());
    }

    #[test]
    fn test_resolve_user_path_plain() {
        assert_eq!(
            resolve_user_path(" '/srv/data' ").unwrap(),
            PathBuf::from("/srv/data")
        );
    }
}
