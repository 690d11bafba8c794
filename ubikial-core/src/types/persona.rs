//! Persona related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ubikial_github::RepositoryRef;

use super::Platform;

/// Declares a unit enum stored as a fixed string, with `Display`/`FromStr`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stored identifier.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| format!(
                        "unknown {} '{s}', expected one of: {}",
                        stringify!($name).to_ascii_lowercase(),
                        Self::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
                    ))
            }
        }
    };
}

string_enum! {
    /// Overall tone of generated content.
    pub enum Tone {
        Professional => "professional",
        Casual => "casual",
        Friendly => "friendly",
        Authoritative => "authoritative",
        Humorous => "humorous",
        Inspirational => "inspirational",
    }
}

string_enum! {
    /// Writing style.
    pub enum Style {
        Concise => "concise",
        Detailed => "detailed",
        Storytelling => "storytelling",
        Educational => "educational",
        Conversational => "conversational",
    }
}

string_enum! {
    /// Narrative voice.
    pub enum Voice {
        FirstPerson => "first-person",
        ThirdPerson => "third-person",
        Brand => "brand",
    }
}

/// Per-platform settings of a persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSetting {
    pub platform: Platform,
    pub enabled: bool,
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// Post length cap; the platform limit applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
}

impl PlatformSetting {
    /// Enabled setting with no hashtags or overrides.
    #[must_use]
    pub fn enabled(platform: Platform) -> Self {
        Self {
            platform,
            enabled: true,
            hashtags: Vec::new(),
            max_length: None,
            custom_instructions: None,
        }
    }

    /// Length limit in effect for this platform.
    #[must_use]
    pub fn effective_max_length(&self) -> u32 {
        self.max_length
            .unwrap_or_else(|| self.platform.max_post_length())
    }
}

/// A named writing-style profile.
///
/// Serialized as camelCase JSON; the same document is stored locally and as
/// the metadata file of the persona's repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    /// Immutable id (UUID v4)
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub tone: Tone,
    pub style: Style,
    pub voice: Voice,
    #[serde(default)]
    pub platform_settings: Vec<PlatformSetting>,
    #[serde(with = "crate::utils::datetime")]
    pub created_at: DateTime<Utc>,
    /// Bumped on every mutation; drives reconciliation.
    #[serde(with = "crate::utils::datetime")]
    pub updated_at: DateTime<Utc>,
    /// `owner/name` of the backing repository, once mirrored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_repo: Option<String>,
}

impl Persona {
    /// Parsed remote repository reference, if set and well-formed.
    #[must_use]
    pub fn repository(&self) -> Option<RepositoryRef> {
        self.github_repo.as_deref().and_then(|r| r.parse().ok())
    }

    /// Settings for one platform.
    #[must_use]
    pub fn platform(&self, platform: Platform) -> Option<&PlatformSetting> {
        self.platform_settings
            .iter()
            .find(|s| s.platform == platform)
    }

    /// Platforms with enabled settings, in order.
    pub fn enabled_platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        self.platform_settings
            .iter()
            .filter(|s| s.enabled)
            .map(|s| s.platform)
    }
}

/// Create persona request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonaRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub tone: Tone,
    pub style: Style,
    pub voice: Voice,
    #[serde(default)]
    pub platform_settings: Vec<PlatformSetting>,
}

/// Update persona request; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonaRequest {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub tone: Option<Tone>,
    pub style: Option<Style>,
    pub voice: Option<Voice>,
    pub platform_settings: Option<Vec<PlatformSetting>>,
}

impl UpdatePersonaRequest {
    /// Whether the request changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.tone.is_none()
            && self.style.is_none()
            && self.voice.is_none()
            && self.platform_settings.is_none()
    }
}
