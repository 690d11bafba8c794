//! Social platform identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Social platforms content can be adapted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    LinkedIn,
    Facebook,
    Instagram,
    Mastodon,
    Bluesky,
    Threads,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Self; 7] = [
        Self::Twitter,
        Self::LinkedIn,
        Self::Facebook,
        Self::Instagram,
        Self::Mastodon,
        Self::Bluesky,
        Self::Threads,
    ];

    /// Identifier used in storage and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::LinkedIn => "linkedin",
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::Mastodon => "mastodon",
            Self::Bluesky => "bluesky",
            Self::Threads => "threads",
        }
    }

    /// Post length limit enforced by the platform, in characters.
    #[must_use]
    pub const fn max_post_length(self) -> u32 {
        match self {
            Self::Twitter => 280,
            Self::LinkedIn => 3000,
            Self::Facebook => 63_206,
            Self::Instagram => 2200,
            Self::Mastodon | Self::Threads => 500,
            Self::Bluesky => 300,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "x" => Ok(Self::Twitter),
            other => Self::ALL
                .into_iter()
                .find(|p| p.as_str() == other)
                .ok_or_else(|| format!("unknown platform '{s}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_lowercase_ids() {
        assert_eq!(serde_json::to_string(&Platform::LinkedIn).unwrap(), r#""linkedin""#);
        let p: Platform = serde_json::from_str(r#""bluesky""#).unwrap();
        assert_eq!(p, Platform::Bluesky);
    }

    #[test]
    fn parse_accepts_aliases_and_case() {
        assert_eq!("Twitter".parse::<Platform>().unwrap(), Platform::Twitter);
        assert_eq!("x".parse::<Platform>().unwrap(), Platform::Twitter);
        assert!("myspace".parse::<Platform>().is_err());
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for p in Platform::ALL {
            assert_eq!(p.to_string().parse::<Platform>().unwrap(), p);
        }
    }
}
