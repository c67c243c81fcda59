//! Human-facing console text around one transfer run.
//!
//! Builders return lines so the wording is testable; `print_lines` writes them.

use std::path::Path;

use projcopy_io_fs::{EnumTransferMode, ReportTransfer, SpecTreeStats};

const N_RULE_WIDTH: usize = 60;

fn rule_heavy() -> String {
    "=".repeat(N_RULE_WIDTH)
}

pub fn print_lines(l_lines: &[String]) {
    for line in l_lines {
        println!("{line}");
    }
}

/// Capitalized action name used in cancel/interrupt/error messages.
pub fn derive_action_word(enum_mode: EnumTransferMode) -> &'static str {
    match enum_mode {
        EnumTransferMode::Directory => "Copy",
        EnumTransferMode::Archive => "ZIP creation",
    }
}

pub fn format_banner(path_dir_src: &Path, spec_stats: &SpecTreeStats) -> Vec<String> {
    vec![
        String::new(),
        rule_heavy(),
        "PROJECT COPY".to_string(),
        rule_heavy(),
        format!("Source: {}", path_dir_src.display()),
        format!("Total files: {}", spec_stats.cnt_files),
        format!("Total directories: {}", spec_stats.cnt_dirs),
        format!("Total size: {:.1} MB", spec_stats.size_mib()),
        rule_heavy(),
    ]
}

pub fn format_ready(
    enum_mode: EnumTransferMode,
    path_dir_src: &Path,
    path_dst: &Path,
) -> Vec<String> {
    let c_title = match enum_mode {
        EnumTransferMode::Directory => "Ready to copy project:",
        EnumTransferMode::Archive => "Ready to create ZIP file:",
    };
    vec![
        String::new(),
        c_title.to_string(),
        format!("From: {}", path_dir_src.display()),
        format!("To:   {}", path_dst.display()),
    ]
}

pub fn derive_proceed_prompt(enum_mode: EnumTransferMode) -> &'static str {
    match enum_mode {
        EnumTransferMode::Directory => "Proceed with copy?",
        EnumTransferMode::Archive => "Proceed with ZIP creation?",
    }
}

pub fn format_transfer_header(
    enum_mode: EnumTransferMode,
    path_dir_src: &Path,
    path_dst: &Path,
) -> Vec<String> {
    let (c_from, c_to) = match enum_mode {
        EnumTransferMode::Directory => ("Copying from: ", "Copying to:   "),
        EnumTransferMode::Archive => ("Creating ZIP file from: ", "ZIP file path:          "),
    };
    vec![
        String::new(),
        format!("{c_from}{}", path_dir_src.display()),
        format!("{c_to}{}", path_dst.display()),
        "-".repeat(N_RULE_WIDTH),
    ]
}

pub fn format_progress(enum_mode: EnumTransferMode, cnt_copied: u64) -> String {
    match enum_mode {
        EnumTransferMode::Directory => format!("Copied {cnt_copied} files..."),
        EnumTransferMode::Archive => format!("Added {cnt_copied} files to ZIP..."),
    }
}

/// Completion block: counts, destination and the first `n_errors_max` errors.
pub fn format_summary(
    enum_mode: EnumTransferMode,
    report: &ReportTransfer,
    path_dst: &Path,
    n_errors_max: usize,
) -> Vec<String> {
    let (c_title, c_label) = match enum_mode {
        EnumTransferMode::Directory => ("COPY COMPLETED", "Files copied"),
        EnumTransferMode::Archive => ("ZIP CREATION COMPLETED", "Files added to ZIP"),
    };
    let mut l_lines = vec![
        String::new(),
        rule_heavy(),
        c_title.to_string(),
        rule_heavy(),
        format!("{c_label}: {}", report.cnt_copied),
        format!("Files skipped: {}", report.cnt_skipped),
        format!("Destination: {}", path_dst.display()),
    ];

    let n_errors = report.error_count();
    if n_errors > 0 {
        l_lines.push(String::new());
        l_lines.push(format!("Warnings/Errors ({n_errors}):"));
        l_lines.extend(
            report
                .errors
                .iter()
                .take(n_errors_max)
                .map(|spec_error| format!("  - {spec_error}")),
        );
        if n_errors > n_errors_max {
            l_lines.push(format!("  ... and {} more errors", n_errors - n_errors_max));
        }
    }
    let n_warnings = report.warning_count();
    if n_warnings > 0 {
        l_lines.push(String::new());
        l_lines.push(format!("Notices ({n_warnings}):"));
        l_lines.extend(
            report
                .warnings
                .iter()
                .take(n_errors_max)
                .map(|warning| format!("  - {warning}")),
        );
        if n_warnings > n_errors_max {
            l_lines.push(format!("  ... and {} more notices", n_warnings - n_errors_max));
        }
    }
    l_lines
}

pub fn format_next_steps(enum_mode: EnumTransferMode, path_dst: &Path) -> Vec<String> {
    let mut l_lines = vec![String::new(), rule_heavy(), "NEXT STEPS:".to_string(), rule_heavy()];
    match enum_mode {
        EnumTransferMode::Directory => {
            l_lines.push(format!("1. cd \"{}\"", path_dst.display()));
            l_lines.push("2. npm install".to_string());
            l_lines.push("3. npm run start".to_string());
        }
        EnumTransferMode::Archive => {
            l_lines.push(format!("1. Extract the ZIP file: {}", path_dst.display()));
            l_lines.push("2. cd to extracted directory".to_string());
            l_lines.push("3. npm install".to_string());
            l_lines.push("4. npm run start".to_string());
        }
    }
    l_lines.push(rule_heavy());
    l_lines
}

pub fn format_checklist(enum_mode: EnumTransferMode, l_missing: &[String]) -> Vec<String> {
    let c_verb = match enum_mode {
        EnumTransferMode::Directory => "copied",
        EnumTransferMode::Archive => "added to ZIP",
    };
    if l_missing.is_empty() {
        return vec![
            String::new(),
            format!("✓ All important files {c_verb} successfully (including .claude environment)"),
        ];
    }
    let mut l_lines = vec![
        String::new(),
        format!("Warning: Some important files/directories were not {c_verb}:"),
    ];
    l_lines.extend(l_missing.iter().map(|c_entry| format!("  - {c_entry}")));
    l_lines
}
