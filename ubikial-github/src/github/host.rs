//! GitHub `RepositoryHost` implementation

use async_trait::async_trait;
use reqwest::Method;

use crate::error::{RemoteError, Result};
use crate::traits::RepositoryHost;
use crate::types::{FileWrite, RemoteFile, RemoteRepository, RemoteUser, RepositoryDraft, RepositoryRef};

use super::http::encode_path;
use super::types::{
    GhContent, GhCreateRepository, GhPutContent, GhPutResponse, GhRepository, GhUser,
    decode_content, encode_content,
};
use super::{GitHubClient, HOST_NAME, MAX_PAGE_SIZE};

impl GitHubClient {
    fn contents_path(repo: &RepositoryRef, path: &str) -> String {
        format!(
            "/repos/{}/{}/contents/{}",
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.name),
            encode_path(path)
        )
    }

    fn repo_path(repo: &RepositoryRef) -> String {
        format!(
            "/repos/{}/{}",
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.name)
        )
    }
}

#[async_trait]
impl RepositoryHost for GitHubClient {
    fn id(&self) -> &'static str {
        HOST_NAME
    }

    async fn authenticate(&self) -> Result<RemoteUser> {
        let user: GhUser = self.get_json("/user", "user").await?;
        log::debug!("[{HOST_NAME}] Authenticated as {}", user.login);
        Ok(user.into())
    }

    async fn list_repositories(&self, prefix: &str) -> Result<Vec<RemoteRepository>> {
        let mut repositories = Vec::new();
        let mut page = 1u32;

        loop {
            let path = format!(
                "/user/repos?affiliation=owner&sort=full_name&per_page={MAX_PAGE_SIZE}&page={page}"
            );
            let batch: Vec<GhRepository> = self.get_json(&path, "user/repos").await?;
            let batch_len = batch.len();

            repositories.extend(
                batch
                    .into_iter()
                    .filter(|r| r.name.starts_with(prefix))
                    .map(RemoteRepository::from),
            );

            if batch_len < MAX_PAGE_SIZE as usize {
                break;
            }
            page += 1;
        }

        log::debug!(
            "[{HOST_NAME}] {} repositories match prefix '{prefix}'",
            repositories.len()
        );
        Ok(repositories)
    }

    async fn create_repository(&self, draft: &RepositoryDraft) -> Result<RemoteRepository> {
        let body = GhCreateRepository {
            name: &draft.name,
            description: draft.description.as_deref(),
            private: draft.private,
            auto_init: true,
        };
        let repo: GhRepository = self
            .send_json(Method::POST, "/user/repos", &body, &draft.name)
            .await?;
        log::info!("[{HOST_NAME}] Created repository {}", repo.full_name);
        Ok(repo.into())
    }

    async fn delete_repository(&self, repo: &RepositoryRef) -> Result<()> {
        self.send_empty(Method::DELETE, &Self::repo_path(repo), &repo.to_string())
            .await?;
        log::info!("[{HOST_NAME}] Deleted repository {repo}");
        Ok(())
    }

    async fn get_file(&self, repo: &RepositoryRef, path: &str) -> Result<Option<RemoteFile>> {
        let resource = format!("{repo}:{path}");
        let Some(content) = self
            .get_json_optional::<GhContent>(&Self::contents_path(repo, path), &resource)
            .await?
        else {
            return Ok(None);
        };

        if content.kind != "file" {
            return Err(RemoteError::ParseError {
                host: HOST_NAME.to_string(),
                detail: format!("'{resource}' is a {}, not a file", content.kind),
            });
        }
        if let Some(encoding) = content.encoding.as_deref() {
            if encoding != "base64" {
                return Err(RemoteError::ParseError {
                    host: HOST_NAME.to_string(),
                    detail: format!("Unsupported content encoding '{encoding}' for '{resource}'"),
                });
            }
        }

        let text = decode_content(content.content.as_deref().unwrap_or_default()).map_err(
            |detail| RemoteError::ParseError {
                host: HOST_NAME.to_string(),
                detail,
            },
        )?;

        Ok(Some(RemoteFile {
            path: content.path,
            sha: content.sha,
            content: text,
        }))
    }

    async fn put_file(&self, repo: &RepositoryRef, write: &FileWrite) -> Result<RemoteFile> {
        let body = GhPutContent {
            message: &write.message,
            content: encode_content(&write.content),
            sha: write.sha.as_deref(),
        };
        let resource = format!("{repo}:{}", write.path);
        let response: GhPutResponse = self
            .send_json(
                Method::PUT,
                &Self::contents_path(repo, &write.path),
                &body,
                &resource,
            )
            .await?;

        Ok(RemoteFile {
            path: response.content.path,
            sha: response.content.sha,
            content: write.content.clone(),
        })
    }
}
