//! Process environment detection used by logging/config setup.

use std::env;

/// Checks if the application is running in a CI (Continuous Integration) environment.
pub fn is_ci() -> bool {
    env::var("CI").is_ok()
        || env::var("CONTINUOUS_INTEGRATION").is_ok()
        || env::var("GITHUB_ACTIONS").is_ok()
        || env::var("GITLAB_CI").is_ok()
}

/// Checks if the application is running in a development build.
pub fn is_dev() -> bool {
    cfg!(debug_assertions)
}
