//! Colored CLI display utilities for the configuration commands.

use std::fmt;
use std::io::{self, Write};
use std::path::Path;

use owo_colors::OwoColorize;

use crate::config::MonitorConfig;

/// What a configured path currently points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    /// A regular file that will be monitored.
    File,
    /// Exists but is not a regular file.
    NotAFile,
    Missing,
}

impl PathStatus {
    #[must_use]
    pub fn of(path: &Path) -> Self {
        if path.is_file() {
            Self::File
        } else if path.exists() {
            Self::NotAFile
        } else {
            Self::Missing
        }
    }
}

impl fmt::Display for PathStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::File => "ok",
            Self::NotAFile => "not a file",
            Self::Missing => "missing",
        };
        f.write_str(label)
    }
}

/// Print the monitored files of a configuration.
pub fn print_file_list(config_path: &Path, config: &MonitorConfig) {
    println!(
        "{} {}",
        "[CONFIG]".blue().bold(),
        config_path.display().to_string().dimmed()
    );
    if config.files.is_empty() {
        println!("{} no files configured", "[FILES]".yellow().bold());
    }
    for path in &config.files {
        match PathStatus::of(path) {
            PathStatus::File => println!("{} {}", "[WATCH]".green().bold(), path.display()),
            status => println!(
                "{} {} - {}",
                "[SKIP]".yellow().bold(),
                path.display(),
                status.to_string().dimmed()
            ),
        }
    }
    let snapshots = if config.snapshots.enabled {
        format!("enabled ({:?})", config.snapshots.strategy)
    } else {
        "disabled".to_string()
    };
    println!("{} {}", "[SNAPSHOTS]".cyan().bold(), snapshots.dimmed());
    let _ = io::stdout().flush();
}

/// Print a successful validation.
pub fn print_valid(config_path: &Path, config: &MonitorConfig) {
    println!(
        "{} {} ({} files)",
        "[VALID]".green().bold(),
        config_path.display(),
        config.files.len()
    );
    let _ = io::stdout().flush();
}

/// Print a failed validation or command.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), message.red());
    let _ = io::stderr().flush();
}

/// Print a configuration change.
pub fn print_updated(action: &str, path: &Path) {
    println!("{} {}", format!("[{action}]").green().bold(), path.display());
    let _ = io::stdout().flush();
}
