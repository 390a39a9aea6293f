//! GitHub REST API secret store.
//!
//! Talks to the Actions secrets endpoints of a repository:
//!
//! - `GET    /repos/{owner}/{repo}/actions/secrets/public-key`
//! - `PUT    /repos/{owner}/{repo}/actions/secrets/{name}`
//! - `GET    /repos/{owner}/{repo}/actions/secrets/{name}`
//! - `DELETE /repos/{owner}/{repo}/actions/secrets/{name}`
//!
//! Works against github.com and GitHub Enterprise Server (`/api/v3` base
//! URLs). Without a token, requests are sent anonymously.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use super::{target, Operation, SecretMetadata, SecretStore};
use crate::core::cipher::{EncryptedSecret, RepositoryPublicKey};
use crate::core::config::Settings;
use crate::core::constants::{API_ACCEPT, API_VERSION};
use crate::error::{ConfigError, RemoteError, Result};

/// Error body returned by the REST API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// GitHub Actions secret store.
pub struct GitHubStore {
    http: Client,
    base_url: Url,
    token: Option<zeroize::Zeroizing<String>>,
}

impl std::fmt::Debug for GitHubStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubStore")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl GitHubStore {
    /// Build a store from validated settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidApiUrl` if the HTTP client cannot be built.
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(API_ACCEPT));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let http = Client::builder()
            .user_agent(concat!("gh-secrets/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::InvalidApiUrl {
                url: settings.api_url.to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        debug!(
            api_url = %settings.api_url,
            authenticated = settings.token.is_some(),
            "created GitHub store"
        );

        Ok(Self {
            http,
            base_url: settings.api_url.clone(),
            token: settings.token.clone(),
        })
    }

    /// Join path segments onto the base URL, percent-encoding each.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Settings only accept http(s) URLs, which can always be a base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn secrets_endpoint(&self, owner: &str, repo: &str, name: &str) -> Url {
        self.endpoint(&["repos", owner, repo, "actions", "secrets", name])
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    /// Send a request, mapping transport errors and non-2xx statuses.
    async fn send(
        &self,
        operation: Operation,
        target: &str,
        request: RequestBuilder,
    ) -> Result<Response> {
        let response = request.send().await.map_err(|source| RemoteError::Transport {
            operation,
            target: target.to_string(),
            source,
        })?;

        let status = response.status();
        debug!(%operation, resource = target, status = status.as_u16(), "remote call finished");

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound {
                operation,
                target: target.to_string(),
            }
            .into());
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });

        Err(RemoteError::Status {
            operation,
            target: target.to_string(),
            status: status.as_u16(),
            message,
        }
        .into())
    }

    async fn json<T: DeserializeOwned>(
        operation: Operation,
        target: &str,
        response: Response,
    ) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            RemoteError::InvalidResponse {
                operation,
                target: target.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl SecretStore for GitHubStore {
    async fn get_public_key(&self, owner: &str, repo: &str) -> Result<RepositoryPublicKey> {
        let operation = Operation::GetPublicKey;
        let target = target(owner, repo, None);
        let url = self.endpoint(&["repos", owner, repo, "actions", "secrets", "public-key"]);

        let response = self
            .send(operation, &target, self.request(Method::GET, url))
            .await?;
        Self::json(operation, &target, response).await
    }

    async fn upsert_secret(
        &self,
        owner: &str,
        repo: &str,
        secret: &EncryptedSecret,
    ) -> Result<()> {
        let operation = Operation::UpsertSecret;
        let target = target(owner, repo, Some(&secret.name));
        let url = self.secrets_endpoint(owner, repo, &secret.name);

        let response = self
            .send(
                operation,
                &target,
                self.request(Method::PUT, url).json(secret),
            )
            .await?;

        let created = response.status() == StatusCode::CREATED;
        info!(resource = %target, created, "secret submitted");
        Ok(())
    }

    async fn get_secret_metadata(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<SecretMetadata> {
        let operation = Operation::GetSecretMetadata;
        let target = target(owner, repo, Some(name));
        let url = self.secrets_endpoint(owner, repo, name);

        let response = self
            .send(operation, &target, self.request(Method::GET, url))
            .await?;
        Self::json(operation, &target, response).await
    }

    async fn delete_secret(&self, owner: &str, repo: &str, name: &str) -> Result<()> {
        let operation = Operation::DeleteSecret;
        let target = target(owner, repo, Some(name));
        let url = self.secrets_endpoint(owner, repo, name);

        self.send(operation, &target, self.request(Method::DELETE, url))
            .await?;
        info!(resource = %target, "secret deleted");
        Ok(())
    }
}
