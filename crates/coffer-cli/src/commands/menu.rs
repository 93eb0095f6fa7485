//! Interactive menu for running backups without remembering subcommands.

use dialoguer::Input;

use coffer_core::VERSION;

use crate::app::{resolve_user_path, AppContext};
use crate::errors::{describe_error, CliError};
use crate::ui::{print_error, title};

use super::backup::{run_encrypted_backup, run_simple_backup};
use super::crypt::run_decrypt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    SimpleBackup,
    EncryptedBackup,
    Decrypt,
    Quit,
}

fn parse_choice(input: &str) -> Option<MenuChoice> {
    match input.trim() {
        "1" => Some(MenuChoice::SimpleBackup),
        "2" => Some(MenuChoice::EncryptedBackup),
        "3" => Some(MenuChoice::Decrypt),
        "0" => Some(MenuChoice::Quit),
        _ => None,
    }
}

pub fn handle_menu(ctx: &AppContext) -> anyhow::Result<()> {
    if !ctx.interactive() {
        return Err(CliError::invalid_input(
            "The menu needs an interactive terminal. Use `coffer backup`, `coffer decrypt` or `coffer --help`.",
        )
        .into());
    }
    // Surface config problems before the first prompt.
    ctx.config()?;

    loop {
        print_menu(ctx);
        let choice = prompt_choice()?;
        let result = match choice {
            MenuChoice::Quit => return Ok(()),
            MenuChoice::SimpleBackup => {
                prompt_path("Folder to back up").and_then(|path| run_simple_backup(ctx, &path))
            }
            MenuChoice::EncryptedBackup => prompt_path("Folder to back up")
                .and_then(|path| run_encrypted_backup(ctx, &path)),
            MenuChoice::Decrypt => {
                prompt_path("Encrypted backup file").and_then(|path| run_decrypt(ctx, &path, None))
            }
        };

        if let Err(err) = result {
            let (message, hint) = describe_error(&err);
            print_error(ctx.ui(), &message, hint.as_deref());
        }
        pause()?;
    }
}

fn print_menu(ctx: &AppContext) {
    println!();
    println!("{}", title(ctx.ui(), &format!("backup menu (v{})", VERSION)));
    println!("  1) Simple backup");
    println!("  2) Encrypted backup");
    println!("  3) Decrypt backup");
    println!("  0) Quit");
}

fn prompt_choice() -> anyhow::Result<MenuChoice> {
    let input: String = Input::new()
        .with_prompt("Choose an option")
        .validate_with(|input: &String| -> Result<(), &'static str> {
            match parse_choice(input) {
                Some(_) => Ok(()),
                None => Err("Enter 1, 2, 3 or 0"),
            }
        })
        .interact_text()?;
    parse_choice(&input).ok_or_else(|| anyhow::anyhow!("Invalid option: {}", input))
}

fn prompt_path(prompt: &str) -> anyhow::Result<std::path::PathBuf> {
    let input: String = Input::new().with_prompt(prompt).interact_text()?;
    resolve_user_path(&input)
}

fn pause() -> anyhow::Result<()> {
    let _: String = Input::new()
        .with_prompt("Press Enter to continue")
        .allow_empty(true)
        .interact_text()?;
    Ok(())
}
