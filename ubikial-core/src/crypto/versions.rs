//! Vault envelope version management
//!
//! Each envelope version implies its key derivation parameters; the stored
//! envelope only carries the version number.
//!
//! - Version 1: PBKDF2-HMAC-SHA256, 600,000 iterations (OWASP 2023 recommendation)

/// Version 1: PBKDF2-HMAC-SHA256, 600,000 iterations
const VERSION_1_ITERATIONS: u32 = 600_000;

/// Envelope version written by this build.
pub const CURRENT_VAULT_VERSION: u32 = 1;

/// Iteration count of [`CURRENT_VAULT_VERSION`], resolved at compile time.
///
/// # Panics
/// Fails the build (const evaluation) if `CURRENT_VAULT_VERSION` has no
/// iteration count.
#[allow(clippy::panic)]
pub const fn get_current_iterations() -> u32 {
    match get_pbkdf2_iterations(CURRENT_VAULT_VERSION) {
        Some(iterations) => iterations,
        None => panic!("Invalid CURRENT_VAULT_VERSION"),
    }
}

/// PBKDF2 iteration count for an envelope version, `None` if unsupported.
pub const fn get_pbkdf2_iterations(version: u32) -> Option<u32> {
    match version {
        1 => Some(VERSION_1_ITERATIONS),
        _ => None,
    }
}
