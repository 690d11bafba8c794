//! GitHub HTTP request methods

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;

use super::error::map_status;
use super::{API_VERSION, GitHubClient, HOST_NAME};

impl GitHubClient {
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.api_base);
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn execute(&self, method: Method, path: &str, body: Option<String>) -> Result<(u16, String)> {
        let mut builder = self.request(method.clone(), path);
        if let Some(body) = body {
            builder = builder
                .header("Content-Type", "application/json")
                .body(body);
        }
        HttpUtils::execute_request(builder, HOST_NAME, method.as_str(), path).await
    }

    /// `GET` a JSON resource; any non-2xx status is an error.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str, resource: &str) -> Result<T> {
        let (status, text) = self.execute(Method::GET, path, None).await?;
        if !(200..300).contains(&status) {
            return Err(map_status(status, &text, resource));
        }
        HttpUtils::parse_json(&text, HOST_NAME)
    }

    /// `GET` a JSON resource, mapping 404 to `None`.
    pub(crate) async fn get_json_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        resource: &str,
    ) -> Result<Option<T>> {
        let (status, text) = self.execute(Method::GET, path, None).await?;
        if status == 404 {
            return Ok(None);
        }
        if !(200..300).contains(&status) {
            return Err(map_status(status, &text, resource));
        }
        HttpUtils::parse_json(&text, HOST_NAME).map(Some)
    }

    /// Send a JSON body and parse a JSON response.
    pub(crate) async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        resource: &str,
    ) -> Result<T> {
        let payload = HttpUtils::to_json(body, HOST_NAME)?;
        let (status, text) = self.execute(method, path, Some(payload)).await?;
        if !(200..300).contains(&status) {
            return Err(map_status(status, &text, resource));
        }
        HttpUtils::parse_json(&text, HOST_NAME)
    }

    /// Send a bodiless request expecting an empty success (e.g. `204 No Content`).
    pub(crate) async fn send_empty(&self, method: Method, path: &str, resource: &str) -> Result<()> {
        let (status, text) = self.execute(method, path, None).await?;
        if !(200..300).contains(&status) {
            return Err(map_status(status, &text, resource));
        }
        Ok(())
    }
}

/// Percent-encode each segment of a repository file path.
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::encode(s).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_path_segments() {
        assert_eq!(encode_path("persona.json"), "persona.json");
        assert_eq!(encode_path("/notes/my file.md"), "notes/my%20file.md");
    }
}
