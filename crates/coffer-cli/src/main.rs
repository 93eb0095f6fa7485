//! Coffer CLI - directory backups as zip archives, optionally password-encrypted
//!
//! This is the command-line interface for Coffer. It provides a user-friendly
//! interface to the core library functionality.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod logging;
mod ui;

use clap::Parser;
use coffer_core::VERSION;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{backup, config_cmd, crypt, menu, misc};
use crate::errors::{describe_error, exit_code_for};
use crate::ui::print_error;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        let (message, hint) = describe_error(&e);
        print_error(ctx.ui(), &message, hint.as_deref());
        std::process::exit(exit_code_for(&e));
    }
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Backup(args)) => {
            backup::handle_backup(ctx, args)?;
        }
        Some(Commands::Encrypt(args)) => {
            crypt::handle_encrypt(ctx, args)?;
        }
        Some(Commands::Decrypt(args)) => {
            crypt::handle_decrypt(ctx, args)?;
        }
        Some(Commands::Inspect(args)) => {
            crypt::handle_inspect(ctx, args)?;
        }
        Some(Commands::Menu) => {
            menu::handle_menu(ctx)?;
        }
        Some(Commands::Config(args)) => {
            config_cmd::handle_config(ctx, &args.command)?;
        }
        Some(Commands::Completions(args)) => {
            misc::handle_completions(args)?;
        }
        None if ctx.interactive() => {
            menu::handle_menu(ctx)?;
        }
        None => {
            println!("Coffer v{}", VERSION);
            println!("\nQuickstart:");
            println!("  coffer backup ~/Documents");
            println!("  coffer backup ~/Documents --encrypt");
            println!("  coffer decrypt ~/Desktop/backup/Documents_backup_<stamp>.zip.encrypted");
            println!("  coffer config init");
            println!("\nRun `coffer --help` for full usage.");
        }
    }

    Ok(())
}
