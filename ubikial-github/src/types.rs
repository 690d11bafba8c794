//! Host-neutral repository types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The account a host credential belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    /// Login handle (repository owner for user repositories).
    pub login: String,
    /// Numeric account id.
    pub id: u64,
    /// Display name, if set.
    pub name: Option<String>,
}

/// Owner/name pair addressing a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = String;

    /// Parses `owner/name`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(format!("expected 'owner/name', got '{s}'")),
        }
    }
}

/// A repository as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub name: String,
    /// `owner/name`.
    pub full_name: String,
    pub owner: String,
    pub private: bool,
    pub description: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RemoteRepository {
    /// Address of this repository.
    #[must_use]
    pub fn repo_ref(&self) -> RepositoryRef {
        RepositoryRef::new(self.owner.clone(), self.name.clone())
    }
}

/// Parameters for creating a repository owned by the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDraft {
    pub name: String,
    pub description: Option<String>,
    pub private: bool,
}

/// A file read from a repository, content already decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub path: String,
    /// Blob sha; required by the host to overwrite the file.
    pub sha: String,
    pub content: String,
}

/// A file write (create or overwrite) on the default branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    pub path: String,
    pub content: String,
    /// Commit message.
    pub message: String,
    /// Current blob sha when overwriting an existing file.
    pub sha: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_repository_ref() {
        let r: RepositoryRef = "octocat/ubikial-persona-1".parse().unwrap();
        assert_eq!(r.owner, "octocat");
        assert_eq!(r.name, "ubikial-persona-1");
        assert_eq!(r.to_string(), "octocat/ubikial-persona-1");
    }

    #[test]
    fn parse_repository_ref_rejects_malformed() {
        assert!("octocat".parse::<RepositoryRef>().is_err());
        assert!("/repo".parse::<RepositoryRef>().is_err());
        assert!("octocat/".parse::<RepositoryRef>().is_err());
        assert!("a/b/c".parse::<RepositoryRef>().is_err());
    }
}
