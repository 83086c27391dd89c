// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Microsoft Graph API.
//!
//! [`GraphClient`] builds versioned URLs, attaches a bearer token from the
//! configured [`CredentialProvider`], follows `@odata.nextLink` paging and
//! turns error responses into [`ApiError`]s.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nuketune_config::NukeTuneConfig;
use nuketune_core::{
    ApiError, ApiVersion, Category, CredentialProvider, NukeError, ObjectApi, ObjectPage,
    UserInfo,
};
use nuketune_resilience::{retry_if, BackoffPolicy, RateLimiter};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::parse_graph_error;
use crate::types::{self, ListResponse, MeResponse, OrganizationList};

/// Graph client for listing and deleting managed objects.
///
/// List calls optionally go through a [`RateLimiter`] and are retried with
/// exponential backoff on throttling and server faults. Deletes are sent
/// once; the caller decides what to do with a failure.
#[derive(Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    credentials: Arc<dyn CredentialProvider>,
    base_url: String,
    limiter: Option<Arc<RateLimiter>>,
    backoff: BackoffPolicy,
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.base_url)
            .field("rate_limited", &self.limiter.is_some())
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl GraphClient {
    /// Creates a client for the Graph host at `base_url` (no version suffix).
    pub fn new(
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Result<Self, NukeError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("nuketune/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NukeError::transport("failed to build HTTP client", e))?;

        Ok(Self {
            http,
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limiter: None,
            backoff: BackoffPolicy::new(1, Duration::ZERO),
        })
    }

    /// Builds a client from configuration, resolving credentials from `[auth]`.
    pub fn from_config(config: &NukeTuneConfig) -> Result<Self, NukeError> {
        let credentials = crate::auth::resolve_credentials(&config.auth)?;
        Self::from_config_with(config, credentials)
    }

    /// Like [`GraphClient::from_config`] with an explicit credential provider.
    pub fn from_config_with(
        config: &NukeTuneConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, NukeError> {
        let mut client = Self::new(config.graph.endpoint(), credentials, config.graph.timeout())?
            .with_backoff(BackoffPolicy::new(
                config.retry.max_retries,
                config.retry.initial_delay(),
            ));
        if config.rate_limit.enabled {
            client = client.with_rate_limiter(RateLimiter::new(
                config.rate_limit.requests_per_second,
            ));
        }
        Ok(client)
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Some(Arc::new(limiter));
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `<base>/<version>/<path>` with exactly one slash between the parts.
    pub fn api_url(&self, version: ApiVersion, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            version,
            path.trim_start_matches('/')
        )
    }

    /// Fetches the signed-in user and their organization.
    pub async fn current_user(&self) -> Result<UserInfo, NukeError> {
        let me: MeResponse = self
            .get_with_retry(&self.api_url(ApiVersion::V1, "/me"), &[])
            .await?;
        let orgs: OrganizationList = self
            .get_with_retry(&self.api_url(ApiVersion::V1, "/organization"), &[])
            .await?;
        Ok(types::user_info(me, orgs))
    }

    /// GET with the optional rate limiter and retry on retryable failures.
    async fn get_with_retry<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, NukeError> {
        retry_if(
            &self.backoff,
            || async move {
                match &self.limiter {
                    Some(limiter) => limiter.enqueue(|| self.get_json(url, query)).await,
                    None => self.get_json(url, query).await,
                }
            },
            is_retryable,
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, NukeError> {
        let target = if query.is_empty() {
            Url::parse(url)
        } else {
            Url::parse_with_params(url, query)
        }
        .map_err(|e| NukeError::Internal(format!("invalid Graph URL {url}: {e}")))?;
        let request = self.http.get(target);
        let body = self.send(Method::GET, url, request).await?;
        serde_json::from_str(&body)
            .map_err(|e| NukeError::transport(format!("failed to parse response from {url}"), e))
    }

    /// Sends a prepared request with a fresh bearer token; returns the body of
    /// a successful response.
    async fn send(
        &self,
        method: Method,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<String, NukeError> {
        let token = self.credentials.access_token().await?;
        let response = request
            .bearer_auth(token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NukeError::transport(format!("{method} {url} timed out"), e)
                } else {
                    NukeError::transport(format!("{method} {url} failed"), e)
                }
            })?;

        let status = response.status();
        debug!(%method, url, status = %status, "graph response");

        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| NukeError::transport("failed to read response body", e))?;

        if status.is_success() {
            return Ok(body);
        }

        let error = parse_graph_error(status, &headers, &body);
        warn!(%method, url, error = %error, "graph request failed");
        Err(NukeError::Api(error))
    }
}

fn is_retryable(err: &NukeError) -> bool {
    matches!(err, NukeError::Api(api) if api.is_retryable())
}

#[async_trait]
impl ObjectApi for GraphClient {
    async fn list_page(
        &self,
        category: &Category,
        next_link: Option<&str>,
    ) -> Result<ObjectPage, NukeError> {
        // Continuation links are absolute and already carry the filter.
        let response: ListResponse = match next_link {
            Some(link) => self.get_with_retry(link, &[]).await?,
            None => {
                let url = self.api_url(category.api_version, &category.list_endpoint);
                match category.filter.as_deref() {
                    Some(filter) => self.get_with_retry(&url, &[("$filter", filter)]).await?,
                    None => self.get_with_retry(&url, &[]).await?,
                }
            }
        };
        Ok(response.into())
    }

    async fn delete_object(&self, category: &Category, object_id: &str) -> Result<(), NukeError> {
        if object_id.is_empty() {
            return Err(ApiError::new(400, "BadRequest", "object id is empty").into());
        }
        let url = self.api_url(category.api_version, &category.object_path(object_id));
        let request = self.http.delete(&url);
        self.send(Method::DELETE, &url, request).await.map(|_| ())
    }
}
