use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use serde::Serialize;

use coffer_core::archive::{extract_archive, inspect_archive};
use coffer_core::backup::{restore_backup, ArchiveCheck};
use coffer_core::RestoreReport;

use crate::app::{read_new_password, read_password, resolve_user_path, AppContext};
use crate::cli::{DecryptArgs, EncryptArgs, InspectArgs};
use crate::constants::PASSWORD_REMINDER;
use crate::errors::CliError;
use crate::ui::{format_megabytes, hint, print, print_warning, receipt, Badge, Spinner};

use super::print_json;

#[derive(Serialize)]
struct DecryptOutput<'a> {
    #[serde(flatten)]
    report: &'a RestoreReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    extracted: Option<Extracted>,
}

#[derive(Serialize)]
struct Extracted {
    destination: PathBuf,
    files: usize,
}

fn existing_file(raw: &str, what: &str) -> anyhow::Result<PathBuf> {
    let path = resolve_user_path(raw)?;
    if !path.exists() {
        return Err(CliError::not_found(
            format!("{} not found: {}", what, path.display()),
            "Hint: Check the path. Paths may be quoted or dragged onto the terminal.",
        )
        .into());
    }
    if path.is_dir() {
        return Err(CliError::invalid_input(format!(
            "{} is a directory: {}",
            what,
            path.display()
        ))
        .into());
    }
    Ok(path)
}

pub fn handle_encrypt(ctx: &AppContext, args: &EncryptArgs) -> anyhow::Result<()> {
    let path = existing_file(&args.path, "File")?;
    let codec = ctx.codec()?;
    let password = read_new_password(ctx.interactive(), ctx.min_password_length()?)?;

    let spinner = Spinner::new(ctx.ui(), "Encrypting");
    let encrypted = codec.encrypt_file(&path, password.expose_secret())?;
    spinner.finish();

    let ui = ctx.ui();
    if ui.mode.is_json() {
        return print_json(&encrypted);
    }
    if ctx.quiet() {
        return Ok(());
    }
    let items = [
        ("Encrypted file", encrypted.path.display().to_string()),
        ("Size", format_megabytes(encrypted.envelope_len)),
    ];
    print(ui, &receipt(ui, Badge::Ok, "File encrypted", &items));
    print(ui, &hint(ui, PASSWORD_REMINDER));
    Ok(())
}

pub fn handle_decrypt(ctx: &AppContext, args: &DecryptArgs) -> anyhow::Result<()> {
    let path = existing_file(&args.path, "Backup file")?;
    let extract_to = args
        .extract_to
        .as_deref()
        .map(resolve_user_path)
        .transpose()?;
    run_decrypt(ctx, &path, extract_to.as_deref())
}

pub fn run_decrypt(ctx: &AppContext, path: &Path, extract_to: Option<&Path>) -> anyhow::Result<()> {
    let codec = ctx.codec()?;
    let password = read_password(ctx.interactive())?;

    let spinner = Spinner::new(ctx.ui(), "Decrypting");
    let report = restore_backup(&codec, path, password.expose_secret())?;
    spinner.finish();

    let extracted = match extract_to {
        Some(destination) => Some(extract_recovered(&report, destination)?),
        None => None,
    };

    let ui = ctx.ui();
    if ui.mode.is_json() {
        return print_json(&DecryptOutput {
            report: &report,
            extracted,
        });
    }

    let decrypted = &report.decrypted;
    if !decrypted.length_verified {
        print_warning(
            ui,
            &format!(
                "Written size {} bytes differs from decrypted size {} bytes",
                decrypted.written_len, decrypted.plaintext_len
            ),
        );
    }
    if ctx.quiet() {
        return Ok(());
    }

    let mut items = vec![
        ("Decrypted file", decrypted.path.display().to_string()),
        ("Size", format_megabytes(decrypted.plaintext_len)),
    ];
    let mut kind = if decrypted.length_verified {
        Badge::Ok
    } else {
        Badge::Warn
    };
    match &report.archive {
        ArchiveCheck::Valid { entries, .. } => {
            items.push(("Archive", format!("valid zip, {} entries", entries)));
        }
        ArchiveCheck::Corrupted { reason } => {
            kind = Badge::Warn;
            items.push(("Archive", format!("possibly corrupted ({})", reason)));
        }
        ArchiveCheck::NotAnArchive => {}
    }
    if let Some(extracted) = &extracted {
        items.push(("Extracted to", extracted.destination.display().to_string()));
        items.push(("Extracted files", extracted.files.to_string()));
    }
    let title = if kind == Badge::Ok {
        "Backup decrypted"
    } else {
        "Backup decrypted with warnings"
    };
    print(ui, &receipt(ui, kind, title, &items));
    Ok(())
}

fn extract_recovered(report: &RestoreReport, destination: &Path) -> anyhow::Result<Extracted> {
    match &report.archive {
        ArchiveCheck::Valid { .. } => {
            let files = extract_archive(&report.decrypted.path, destination)?;
            Ok(Extracted {
                destination: destination.to_path_buf(),
                files,
            })
        }
        ArchiveCheck::Corrupted { .. } | ArchiveCheck::NotAnArchive => Err(
            CliError::invalid_input(format!(
                "Decrypted {} but it is not a readable zip archive; nothing extracted",
                report.decrypted.path.display()
            ))
            .into(),
        ),
    }
}

pub fn handle_inspect(ctx: &AppContext, args: &InspectArgs) -> anyhow::Result<()> {
    let path = existing_file(&args.path, "Archive")?;
    let summary = inspect_archive(&path)?;

    let ui = ctx.ui();
    if ui.mode.is_json() {
        return print_json(&summary);
    }
    if ctx.quiet() {
        return Ok(());
    }
    let items = [
        ("Archive", summary.path.display().to_string()),
        ("Entries", summary.entries.to_string()),
        ("Files", summary.files.to_string()),
    ];
    print(ui, &receipt(ui, Badge::Info, "Archive readable", &items));
    Ok(())
}
