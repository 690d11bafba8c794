//! Utility modules.

/// Log sanitization utilities to prevent token and payload exposure.
pub mod log_sanitizer;
