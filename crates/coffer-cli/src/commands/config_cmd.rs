use serde_json::json;

use coffer_core::crypto::Kdf;

use crate::app::{resolve_config_path, AppContext};
use crate::cli::ConfigSubcommand;
use crate::config::{write_config, CofferConfig};
use crate::errors::CliError;
use crate::ui::{kv, print, receipt, Badge};

use super::print_json;

pub fn handle_config(ctx: &AppContext, command: &ConfigSubcommand) -> anyhow::Result<()> {
    match command {
        ConfigSubcommand::Init { force } => handle_init(ctx, *force),
        ConfigSubcommand::Show => handle_show(ctx),
    }
}

fn handle_init(ctx: &AppContext, force: bool) -> anyhow::Result<()> {
    let (path, _) = resolve_config_path(ctx.cli())?;
    if path.exists() && !force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {}. Pass --force to overwrite it.",
            path.display()
        ))
        .into());
    }
    write_config(&path, &CofferConfig::default())?;

    let ui = ctx.ui();
    if ui.mode.is_json() {
        return print_json(&json!({ "path": path }));
    }
    if !ctx.quiet() {
        let items = [("Path", path.display().to_string())];
        print(ui, &receipt(ui, Badge::Ok, "Config written", &items));
    }
    Ok(())
}

fn handle_show(ctx: &AppContext) -> anyhow::Result<()> {
    let (path, _) = resolve_config_path(ctx.cli())?;
    let config = ctx.config()?;
    let backup_dir = ctx.backup_dir()?;
    let kdf = config.kdf()?;
    let kdf_params = match kdf {
        Kdf::Argon2id(params) => Some(params),
        Kdf::Sha256 => None,
    };

    let ui = ctx.ui();
    if ui.mode.is_json() {
        return print_json(&json!({
            "config_path": path,
            "config_file_exists": path.exists(),
            "backup_dir": backup_dir,
            "kdf": kdf.name(),
            "kdf_params": kdf_params,
            "min_password_length": config.security.min_password_length,
        }));
    }

    print(ui, &kv(ui, "Config file", &path.display().to_string()));
    print(ui, &kv(ui, "Backup dir", &backup_dir.display().to_string()));
    print(ui, &kv(ui, "KDF", kdf.name()));
    if let Some(params) = kdf_params {
        print(ui, &kv(ui, "Memory KiB", &params.memory_kib.to_string()));
        print(ui, &kv(ui, "Iterations", &params.iterations.to_string()));
        print(ui, &kv(ui, "Parallelism", &params.parallelism.to_string()));
    }
    print(
        ui,
        &kv(
            ui,
            "Min password length",
            &config.security.min_password_length.to_string(),
        ),
    );
    Ok(())
}
