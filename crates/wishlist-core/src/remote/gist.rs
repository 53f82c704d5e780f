//! GitHub Gist client
//!
//! The remote document lives as one file inside a gist:
//!
//! - `GET  {api_url}/gists/{id}` returns `{"files": {"<name>": {"content": "..."}}}`
//! - `PATCH {api_url}/gists/{id}` with `{"files": {"<name>": {"content": "..."}}}`

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{Document, RemoteDocumentStore, RemoteError};
use crate::config::RemoteConfig;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("wishlist/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct GistResponse {
    #[serde(default)]
    files: HashMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    #[serde(default)]
    content: Option<String>,
}

/// Remote document stored as a file in a GitHub gist
pub struct GistClient {
    http: reqwest::Client,
    gist_url: String,
    token: String,
    filename: String,
}

impl GistClient {
    /// Build a client from remote settings
    ///
    /// Every request is bounded by `config.timeout`.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(RemoteError::Client)?;

        Ok(Self {
            http,
            gist_url: format!(
                "{}/gists/{}",
                config.api_url.trim_end_matches('/'),
                config.gist_id
            ),
            token: config.token.clone(),
            filename: config.filename.clone(),
        })
    }

    fn auth_header(&self) -> String {
        format!("token {}", self.token)
    }
}

#[async_trait]
impl RemoteDocumentStore for GistClient {
    async fn fetch(&self) -> Result<Option<Document>, RemoteError> {
        debug!("Fetching gist {}", self.gist_url);
        let response = self
            .http
            .get(&self.gist_url)
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await
            .map_err(RemoteError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(RemoteError::Unreachable)?;
        let gist: GistResponse =
            serde_json::from_str(&body).map_err(|e| RemoteError::Malformed(e.to_string()))?;

        let content = gist
            .files
            .get(&self.filename)
            .and_then(|file| file.content.as_deref())
            .filter(|content| !content.trim().is_empty());

        match content {
            Some(content) => Document::parse(content).map(Some),
            None => {
                debug!("Gist has no content for '{}'", self.filename);
                Ok(None)
            }
        }
    }

    async fn replace(&self, document: &Document) -> Result<(), RemoteError> {
        let payload = json!({
            "files": {
                self.filename.as_str(): {
                    "content": document.to_pretty_string()?
                }
            }
        });

        debug!("Patching gist {}", self.gist_url);
        let response = self
            .http
            .patch(&self.gist_url)
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, GITHUB_ACCEPT)
            .json(&payload)
            .send()
            .await
            .map_err(RemoteError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.gist_url, self.filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gift;
    use serde_json::Value;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FILENAME: &str = "wishlist-data.json";

    fn client_for(server: &MockServer) -> GistClient {
        let config = RemoteConfig {
            api_url: server.uri(),
            gist_id: "abc123".to_string(),
            token: "secret".to_string(),
            filename: FILENAME.to_string(),
            timeout: Duration::from_secs(2),
        };
        GistClient::new(&config).unwrap()
    }

    fn gist_body(content: &str) -> Value {
        json!({
            "id": "abc123",
            "files": {
                FILENAME: { "filename": FILENAME, "content": content }
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_sends_credentials_and_parses_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gists/abc123"))
            .and(header("authorization", "token secret"))
            .and(header("accept", GITHUB_ACCEPT))
            .respond_with(ResponseTemplate::new(200).set_body_json(gist_body(
                r#"{"gifts":[{"id":"1","name":"Book","priority":"medium","is_reserved":false}],"users":["x"]}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let doc = client_for(&server).fetch().await.unwrap().unwrap();
        let gifts = doc.gifts().unwrap();
        assert_eq!(gifts, vec![Gift::with_id("1", "Book")]);
        assert_eq!(doc.field("users"), Some(&json!(["x"])));
    }

    #[tokio::test]
    async fn test_fetch_missing_file_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gists/abc123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "abc123", "files": {}})),
            )
            .mount(&server)
            .await;

        assert!(client_for(&server).fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_empty_content_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gist_body("")))
            .mount(&server)
            .await;

        assert!(client_for(&server).fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch().await.unwrap_err();
        assert!(matches!(err, RemoteError::Rejected { status: 500 }));
    }

    #[tokio::test]
    async fn test_fetch_malformed_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gist_body("{oops")))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch().await.unwrap_err();
        assert!(matches!(err, RemoteError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_fetch_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch().await.unwrap_err();
        assert!(matches!(err, RemoteError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(gist_body("{}"))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).fetch().await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_replace_sends_pretty_printed_document() {
        let server = MockServer::start().await;
        let document = Document::seed()
            .with_gifts(&[Gift::with_id("1", "Book")])
            .unwrap();
        let expected = json!({
            "files": {
                FILENAME: { "content": document.to_pretty_string().unwrap() }
            }
        });

        Mock::given(method("PATCH"))
            .and(path("/gists/abc123"))
            .and(header("authorization", "token secret"))
            .and(body_json(expected))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).replace(&document).await.unwrap();
    }

    #[tokio::test]
    async fn test_replace_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .replace(&Document::seed())
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Rejected { status: 403 }));
    }

    #[test]
    fn test_describe_includes_gist_and_file() {
        let config = RemoteConfig {
            api_url: "https://api.github.com/".to_string(),
            gist_id: "g1".to_string(),
            token: "t".to_string(),
            filename: FILENAME.to_string(),
            timeout: Duration::from_secs(1),
        };
        let client = GistClient::new(&config).unwrap();
        assert_eq!(
            client.describe(),
            "https://api.github.com/gists/g1 (wishlist-data.json)"
        );
    }
}
