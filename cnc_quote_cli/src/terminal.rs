//! Terminal detection

use is_terminal::IsTerminal;
use std::env;
use std::io::{stderr, stdout};

/// Variables set by common CI providers
const CI_VARS: &[&str] = &[
    "CI",
    "CONTINUOUS_INTEGRATION",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "BUILDKITE",
    "JENKINS_URL",
    "TF_BUILD",
];

/// Check if stdout is an interactive terminal outside CI
pub fn is_interactive() -> bool {
    stdout().is_terminal() && !is_ci_environment()
}

/// Check if stderr is a terminal (progress bars draw there)
pub fn stderr_is_terminal() -> bool {
    stderr().is_terminal()
}

fn is_ci_environment() -> bool {
    CI_VARS.iter().any(|var| env::var_os(var).is_some())
}

fn term_is_dumb() -> bool {
    matches!(env::var("TERM").as_deref(), Ok("dumb") | Ok("") | Err(_)) && !cfg!(windows)
}

/// Whether colored output should be emitted
///
/// Honors `NO_COLOR` and disables color when stdout is piped.
pub fn colors_supported() -> bool {
    env::var_os("NO_COLOR").is_none() && is_interactive() && !term_is_dumb()
}

/// Progress bars are drawn only when both streams are terminals
pub fn should_show_progress_by_default() -> bool {
    is_interactive() && stderr_is_terminal() && !term_is_dumb()
}
