use std::path::Path;

use secrecy::ExposeSecret;

use coffer_core::backup::{encrypted_backup, simple_backup};

use crate::app::{read_new_password, resolve_user_path, AppContext};
use crate::cli::BackupArgs;
use crate::constants::PASSWORD_REMINDER;
use crate::errors::CliError;
use crate::ui::{format_megabytes, hint, print, receipt, Badge, Spinner};

use super::print_json;

pub fn handle_backup(ctx: &AppContext, args: &BackupArgs) -> anyhow::Result<()> {
    let source = resolve_user_path(&args.source)?;
    if args.encrypt {
        run_encrypted_backup(ctx, &source)
    } else {
        run_simple_backup(ctx, &source)
    }
}

fn ensure_source_exists(source: &Path) -> anyhow::Result<()> {
    if !source.exists() {
        return Err(CliError::not_found(
            format!("Directory not found: {}", source.display()),
            "Hint: Pass the folder to back up, e.g. `coffer backup ~/Documents`.",
        )
        .into());
    }
    Ok(())
}

pub fn run_simple_backup(ctx: &AppContext, source: &Path) -> anyhow::Result<()> {
    ensure_source_exists(source)?;
    let config = ctx.backup_config()?;

    let spinner = Spinner::new(ctx.ui(), "Archiving");
    let report = simple_backup(&config, source, |name| spinner.update(name))?;
    spinner.finish();

    let ui = ctx.ui();
    if ui.mode.is_json() {
        return print_json(&report);
    }
    if ctx.quiet() {
        return Ok(());
    }
    let mut items = vec![
        ("Archive", report.path.display().to_string()),
        ("Files", report.files.to_string()),
        ("Size", format_megabytes(report.bytes)),
    ];
    if report.skipped > 0 {
        items.push(("Skipped", report.skipped.to_string()));
    }
    print(ui, &receipt(ui, Badge::Ok, "Backup created", &items));
    Ok(())
}

pub fn run_encrypted_backup(ctx: &AppContext, source: &Path) -> anyhow::Result<()> {
    ensure_source_exists(source)?;
    let config = ctx.backup_config()?;
    let codec = ctx.codec()?;
    let password = read_new_password(ctx.interactive(), ctx.min_password_length()?)?;

    let spinner = Spinner::new(ctx.ui(), "Archiving");
    let backup = encrypted_backup(
        &config,
        &codec,
        source,
        password.expose_secret(),
        |name| spinner.update(name),
    )?;
    spinner.finish();

    let ui = ctx.ui();
    if ui.mode.is_json() {
        return print_json(&backup);
    }
    if ctx.quiet() {
        return Ok(());
    }
    let items = [
        ("Encrypted file", backup.encrypted.path.display().to_string()),
        ("Files", backup.archive.files.to_string()),
        ("Archive size", format_megabytes(backup.archive.bytes)),
        ("Encrypted size", format_megabytes(backup.encrypted.envelope_len)),
        ("Key derivation", codec.kdf().name().to_string()),
    ];
    print(ui, &receipt(ui, Badge::Ok, "Encrypted backup created", &items));
    print(ui, &hint(ui, PASSWORD_REMINDER));
    Ok(())
}
