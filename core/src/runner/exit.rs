use std::process::ExitStatus;

/// Collapses an [`ExitStatus`] into the single code stored on
/// [`super::CommandOutcome`]. Signal deaths map to the shell convention of
/// `128 + signal`; a status carrying neither code nor signal maps to 1.
pub fn normalize_exit(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        match (status.code(), status.signal()) {
            (Some(code), _) => code,
            (None, Some(sig)) => 128 + sig,
            (None, None) => 1,
        }
    }
    #[cfg(not(unix))]
    {
        status.code().unwrap_or(1)
    }
}
