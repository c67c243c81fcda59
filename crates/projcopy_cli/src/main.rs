mod cli;
mod dest;
mod prompt;
mod summary;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use clap::Parser;
use projcopy_io_fs::{
    EnumTransferMode, TUP_EXPECTED_ENTRIES_DEFAULT, copy_tree, create_archive,
    derive_project_name, find_missing_entries, rewrite_manifest_name,
    rewrite_manifest_name_in_archive, scan_tree_stats,
};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::Args;
use crate::dest::{EnumDestinationState, derive_destination_path, prepare_destination};
use crate::prompt::Prompter;
use crate::summary::{
    derive_action_word, derive_proceed_prompt, format_banner, format_checklist,
    format_next_steps, format_progress, format_ready, format_summary, format_transfer_header,
    print_lines,
};

/// Action named in the interrupt message; set once the mode is known.
static C_ACTION_ACTIVE: Mutex<&str> = Mutex::new("Operation");

fn set_active_action(c_action: &'static str) {
    if let Ok(mut guard) = C_ACTION_ACTIVE.lock() {
        *guard = c_action;
    }
}

/// Ctrl-C ends the process from a side thread; the main flow stays synchronous.
fn spawn_interrupt_listener() {
    std::thread::spawn(|| {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "interrupt listener unavailable");
                return;
            }
        };
        if runtime.block_on(tokio::signal::ctrl_c()).is_ok() {
            let c_action = C_ACTION_ACTIVE.lock().map(|guard| *guard).unwrap_or("Operation");
            println!("\n\n{c_action} interrupted by user.");
            std::process::exit(1);
        }
    });
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let args = Args::parse();
    spawn_interrupt_listener();

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    let path_dir_src = match &args.source {
        Some(v) => v.clone(),
        None => std::env::current_dir().context("Error reading current directory")?,
    };
    if !path_dir_src.join(&args.manifest).is_file() {
        println!(
            "Error: This doesn't appear to be a Node.js/React project (no {} found)",
            args.manifest
        );
        return Ok(ExitCode::FAILURE);
    }
    let path_dir_src = fs::canonicalize(&path_dir_src)
        .with_context(|| format!("Error resolving source: {}", path_dir_src.display()))?;

    print_lines(&format_banner(&path_dir_src, &scan_tree_stats(&path_dir_src)));

    let prompter = Prompter::new(args.yes);
    let enum_mode = match args.mode {
        Some(v) => v.into(),
        None => prompter.select_mode()?,
    };
    let c_action = derive_action_word(enum_mode);
    set_active_action(c_action);

    let Some(path_dst) = resolve_destination(args, &path_dir_src, enum_mode, &prompter)? else {
        println!("{c_action} cancelled.");
        return Ok(ExitCode::SUCCESS);
    };

    print_lines(&format_ready(enum_mode, &path_dir_src, &path_dst));
    if !prompter.confirm(derive_proceed_prompt(enum_mode))? {
        println!("{c_action} cancelled.");
        return Ok(ExitCode::SUCCESS);
    }

    let spec_tx_options = args.to_transfer_options();
    print_lines(&format_transfer_header(enum_mode, &path_dir_src, &path_dst));
    let on_progress = |cnt_copied: u64| println!("{}", format_progress(enum_mode, cnt_copied));
    let report = match enum_mode {
        EnumTransferMode::Directory => {
            copy_tree(&path_dir_src, &path_dst, &spec_tx_options, on_progress)
        }
        EnumTransferMode::Archive => {
            create_archive(&path_dir_src, &path_dst, &spec_tx_options, on_progress)
        }
    }
    .with_context(|| format!("Error during {}", c_action.to_lowercase()))?;
    tracing::info!("{report}");

    print_lines(&format_summary(enum_mode, &report, &path_dst, args.max_errors));
    update_manifest(&path_dst, enum_mode, &args.manifest);
    print_lines(&format_next_steps(enum_mode, &path_dst));

    match find_missing_entries(&path_dst, enum_mode, &TUP_EXPECTED_ENTRIES_DEFAULT) {
        Ok(l_missing) => print_lines(&format_checklist(enum_mode, &l_missing)),
        Err(e) => println!("\nWarning: Could not verify destination contents: {e}"),
    }
    Ok(ExitCode::SUCCESS)
}

/// Take the destination from `--output`, else prompt until a usable one is given.
///
/// `Ok(None)` means the user declined for a destination given on the command
/// line; there is nothing to ask again.
fn resolve_destination(
    args: &Args,
    path_dir_src: &Path,
    enum_mode: EnumTransferMode,
    prompter: &Prompter,
) -> Result<Option<PathBuf>> {
    let mut path_from_flag = args.output.clone();
    loop {
        let b_from_flag = path_from_flag.is_some();
        let raw_path = match path_from_flag.take() {
            Some(v) => v,
            None => prompter.input_destination(enum_mode)?,
        };
        let path_dst = derive_destination_path(raw_path, enum_mode);
        match prepare_destination(path_dir_src, &path_dst, enum_mode, prompter)? {
            EnumDestinationState::Ready => return Ok(Some(path_dst)),
            EnumDestinationState::Declined if b_from_flag => return Ok(None),
            EnumDestinationState::Failed(msg) if b_from_flag => bail!(msg),
            EnumDestinationState::Failed(msg) => println!("{msg}"),
            EnumDestinationState::Declined => {}
        }
    }
}

/// Rename the copied project in its manifest; failures only warn.
fn update_manifest(path_dst: &Path, enum_mode: EnumTransferMode, c_manifest_file_name: &str) {
    let Some(name_new) = derive_project_name(path_dst, enum_mode) else {
        return;
    };
    let (res_rename, c_where) = match enum_mode {
        EnumTransferMode::Directory => (
            rewrite_manifest_name(path_dst, &name_new, c_manifest_file_name),
            "",
        ),
        EnumTransferMode::Archive => (
            rewrite_manifest_name_in_archive(path_dst, &name_new, c_manifest_file_name),
            " in ZIP",
        ),
    };
    match res_rename {
        Ok(Some(spec_rename)) => println!(
            "Updated {c_manifest_file_name} name{c_where}: '{}' -> '{}'",
            spec_rename.name_old, spec_rename.name_new
        ),
        Ok(None) => {}
        Err(e) => println!("Warning: Could not update {c_manifest_file_name}{c_where}: {e}"),
    }
}
