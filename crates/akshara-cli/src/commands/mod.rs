pub mod completions;
pub mod doctor;
pub mod init;
pub mod logs;
pub mod man_pages;
pub mod pull;
pub mod recreate;
pub mod roman;
pub mod scripts;
pub mod status;
pub mod stop;
pub mod translit;

use akshara_core::{CancelReason, CoreError, ManagerBuilder};
use akshara_schema::SettingsError;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_VALIDATION_ERROR: u8 = 2;
pub const EXIT_BACKEND_ERROR: u8 = 3;
pub const EXIT_CANCELED: u8 = 130;

#[derive(Debug)]
pub enum CliError {
    Core(CoreError),
    Other(String),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Core(CoreError::Canceled(CancelReason::Canceled)) => EXIT_CANCELED,
            Self::Core(e) => match e.stage() {
                "validation" => EXIT_VALIDATION_ERROR,
                "transport" | "backend" | "lifecycle" | "canceled" => EXIT_BACKEND_ERROR,
                _ => EXIT_FAILURE,
            },
            Self::Other(_) => EXIT_FAILURE,
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            Self::Core(e) => e.stage(),
            Self::Other(_) => "cli",
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core(e) => write!(f, "{e}"),
            Self::Other(msg) => f.write_str(msg),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Core(err.into())
    }
}

impl From<String> for CliError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✗ {msg}"));
}

/// A byte progress bar for image pulls, wired into the manager's progress callback.
pub fn with_pull_progress(builder: ManagerBuilder) -> (ManagerBuilder, ProgressBar) {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {msg:30!} [{bar:30.cyan/blue}] {bytes}/{total_bytes}",
        )
        .expect("valid template")
        .progress_chars("=> "),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    let bar = pb.clone();
    let builder = builder.progress(move |current, total, status| {
        if total > 0 {
            bar.set_length(total);
        }
        bar.set_position(current);
        bar.set_message(status.to_owned());
    });
    (builder, pb)
}

pub fn colorize_state(state: &str) -> String {
    use console::Style;
    match state {
        "ready" | "running" => Style::new().green().apply_to(state).to_string(),
        "initializing" | "restarting" | "starting" => {
            Style::new().yellow().apply_to(state).to_string()
        }
        "created" => Style::new().cyan().apply_to(state).to_string(),
        "exited" | "dead" => Style::new().red().apply_to(state).to_string(),
        "closed" | "paused" => Style::new().dim().apply_to(state).to_string(),
        other => other.to_owned(),
    }
}
