//! Type definition module

mod credential;
mod persona;
mod platform;
mod sync;

pub use credential::{LinkAccountRequest, LinkedAccount, LinkedAccountSummary};
pub use persona::{
    CreatePersonaRequest, Persona, PlatformSetting, Style, Tone, UpdatePersonaRequest, Voice,
};
pub use platform::Platform;
pub use sync::SyncReport;
