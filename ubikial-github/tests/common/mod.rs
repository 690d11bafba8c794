//! Shared helpers for live host tests.

#![allow(dead_code)]

use std::env;

use ubikial_github::{GitHubClient, GitHubConfig, RepositoryDraft};

/// Skip the test when any of the listed environment variables is missing.
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("skipping: environment variable {} not set", $var);
                return;
            }
        )+
    };
}

/// Build a client from `UBIKIAL_TEST_GITHUB_TOKEN` (and optional `UBIKIAL_TEST_GITHUB_API`).
pub fn github_client() -> Option<GitHubClient> {
    let token = env::var("UBIKIAL_TEST_GITHUB_TOKEN").ok()?;
    let mut config = GitHubConfig::default();
    if let Ok(api) = env::var("UBIKIAL_TEST_GITHUB_API") {
        config.api_base = api;
    }
    GitHubClient::new(token, config).ok()
}

/// Unique, clearly disposable repository name.
pub fn test_repository_draft() -> RepositoryDraft {
    let uuid = uuid::Uuid::new_v4();
    RepositoryDraft {
        name: format!("ubikial-test-{}", &uuid.to_string()[..8]),
        description: Some("Temporary repository created by ubikial-github tests".to_string()),
        private: true,
    }
}
