use toolbelt_core::api::Method;
use tracing::debug;

/// Picks the first system package manager whose binary is on PATH, falling
/// back to the script method (`sh` is always available).
pub fn detect_method() -> Method {
    let detected = [Method::Apt, Method::Dnf, Method::Pacman, Method::Brew]
        .into_iter()
        .find(|m| which::which(m.probe_binary()).is_ok())
        .unwrap_or(Method::Script);
    debug!(method = %detected, "auto-detected method");
    detected
}
