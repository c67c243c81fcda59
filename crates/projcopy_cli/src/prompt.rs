//! Interactive fallbacks for values missing from the command line.

use std::path::PathBuf;

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use projcopy_io_fs::EnumTransferMode;

pub struct Prompter {
    if_assume_yes: bool,
    theme: ColorfulTheme,
}

impl Prompter {
    pub fn new(if_assume_yes: bool) -> Self {
        Self {
            if_assume_yes,
            theme: ColorfulTheme::default(),
        }
    }

    pub fn select_mode(&self) -> Result<EnumTransferMode> {
        let l_items = ["Copy to directory (default)", "Create ZIP file"];
        let n_choice = Select::with_theme(&self.theme)
            .with_prompt("Choose output mode")
            .items(&l_items[..])
            .default(0)
            .interact()?;
        Ok(match n_choice {
            1 => EnumTransferMode::Archive,
            _ => EnumTransferMode::Directory,
        })
    }

    pub fn input_destination(&self, enum_mode: EnumTransferMode) -> Result<PathBuf> {
        let c_prompt = match enum_mode {
            EnumTransferMode::Directory => {
                "Enter destination path (e.g. /projects/my-new-project)"
            }
            EnumTransferMode::Archive => "Enter ZIP file path (e.g. /backups/my-project.zip)",
        };
        let raw_input: String = Input::with_theme(&self.theme)
            .with_prompt(c_prompt)
            .validate_with(|input: &String| -> Result<(), &str> {
                if input.trim().is_empty() {
                    Err("Please enter a valid path.")
                } else {
                    Ok(())
                }
            })
            .interact_text()?;
        Ok(PathBuf::from(raw_input.trim()))
    }

    /// Yes/no question; `--yes` answers it without a terminal.
    pub fn confirm(&self, c_prompt: &str) -> Result<bool> {
        if self.if_assume_yes {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(c_prompt)
            .default(false)
            .interact()?)
    }
}
