//! Root detection, re-execution under `sudo`, and dropping back to the
//! invoking user for per-user tools.
use sudo::RunningAs;

use crate::error::PrivilegeError;

/// Environment variable prefixes carried across the `sudo` re-exec.
const PRESERVED_ENV: &[&str] = &["RUST_LOG", "NO_COLOR", "MINT_SETUP_"];

/// Whether the process already has root privileges.
#[must_use]
pub fn is_root() -> bool {
    matches!(sudo::check(), RunningAs::Root | RunningAs::Suid)
}

/// Re-execute the current argument vector under `sudo` unless already root.
///
/// On success this call does not return for non-root callers: the process
/// image is replaced by the elevated one.
///
/// # Errors
///
/// Returns [`PrivilegeError::Elevate`] if `sudo` cannot be executed.
pub fn elevate() -> Result<(), PrivilegeError> {
    if is_root() {
        return Ok(());
    }
    sudo::with_env(PRESERVED_ENV)
        .map(|_| ())
        .map_err(|e| PrivilegeError::Elevate(e.to_string()))
}

/// The unprivileged user who invoked `sudo`, if any.
#[must_use]
pub fn invoking_user() -> Option<String> {
    user_from_env(std::env::var("SUDO_USER").ok())
}

fn user_from_env(value: Option<String>) -> Option<String> {
    value.filter(|u| !u.is_empty() && u != "root")
}

/// Build the command line that runs `program args..` as `user`.
///
/// Without a user the command is returned unchanged.
#[must_use]
pub fn as_user<'a>(
    user: Option<&'a str>,
    program: &'a str,
    args: &[&'a str],
) -> (&'a str, Vec<&'a str>) {
    match user {
        Some(user) => {
            let mut full = vec!["-u", user, program];
            full.extend_from_slice(args);
            ("sudo", full)
        }
        None => (program, args.to_vec()),
    }
}
