//! reqwest-backed Bitrise API client.

use super::model::{Artifact, ArtifactInfo, Build, Envelope};
use super::{CiApi, ClientError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.bitrise.io/v0.1";

/// Connection settings for [`BitriseClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub token: String,
    pub timeout: Duration,
    /// Page size requested from the build listing.
    pub build_limit: u32,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.into(),
            timeout: Duration::from_secs(30),
            build_limit: 50,
        }
    }
}

/// Session object carrying credentials; built once and shared by reference.
pub struct BitriseClient {
    client: Client,
    api_base: String,
    build_limit: u32,
}

impl BitriseClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut auth =
            HeaderValue::from_str(config.token.trim()).map_err(|_| ClientError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let api_base = config.api_base.trim_end_matches('/').to_string();
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|source| ClientError::Http {
                url: api_base.clone(),
                source,
            })?;

        Ok(Self {
            client,
            api_base,
            build_limit: config.build_limit,
        })
    }

    pub fn builds_url(&self, app_slug: &str) -> String {
        format!("{}/apps/{}/builds", self.api_base, app_slug)
    }

    pub fn artifacts_url(&self, app_slug: &str, build_slug: &str) -> String {
        format!("{}/{}/artifacts", self.builds_url(app_slug), build_slug)
    }

    pub fn artifact_info_url(&self, app_slug: &str, build_slug: &str, artifact_slug: &str) -> String {
        format!(
            "{}/{}",
            self.artifacts_url(app_slug, build_slug),
            artifact_slug
        )
    }

    /// GET `url` and unwrap the `data` envelope; `None` when `data` is null or absent.
    async fn get_data<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, ClientError> {
        debug!(%url, "GET");
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.bytes().await.map_err(|source| ClientError::Http {
            url: url.to_string(),
            source,
        })?;
        let envelope: Envelope<T> =
            serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
                url: url.to_string(),
                source,
            })?;
        Ok(envelope.data)
    }
}

#[async_trait::async_trait]
impl CiApi for BitriseClient {
    async fn list_builds(&self, app_slug: &str) -> Result<Vec<Build>, ClientError> {
        let query = [("limit", self.build_limit.to_string())];
        let builds: Option<Vec<Build>> = self.get_data(&self.builds_url(app_slug), &query).await?;
        Ok(builds.unwrap_or_default())
    }

    async fn list_artifacts(
        &self,
        app_slug: &str,
        build_slug: &str,
    ) -> Result<Vec<Artifact>, ClientError> {
        let artifacts: Option<Vec<Artifact>> = self
            .get_data(&self.artifacts_url(app_slug, build_slug), &[])
            .await?;
        Ok(artifacts.unwrap_or_default())
    }

    async fn artifact_info(
        &self,
        app_slug: &str,
        build_slug: &str,
        artifact_slug: &str,
    ) -> Result<ArtifactInfo, ClientError> {
        let url = self.artifact_info_url(app_slug, build_slug, artifact_slug);
        self.get_data(&url, &[])
            .await?
            .ok_or(ClientError::NoData { url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> BitriseClient {
        let mut cfg = ClientConfig::new("secret-token");
        cfg.api_base = base.to_string();
        BitriseClient::new(cfg).unwrap()
    }

    #[test]
    fn test_endpoint_urls_nest_under_app() {
        let c = client("https://api.bitrise.io/v0.1/");
        assert_eq!(c.builds_url("app1"), "https://api.bitrise.io/v0.1/apps/app1/builds");
        assert_eq!(
            c.artifacts_url("app1", "b9"),
            "https://api.bitrise.io/v0.1/apps/app1/builds/b9/artifacts"
        );
        assert_eq!(
            c.artifact_info_url("app1", "b9", "a3"),
            "https://api.bitrise.io/v0.1/apps/app1/builds/b9/artifacts/a3"
        );
    }

    #[test]
    fn test_token_with_newline_is_rejected() {
        let cfg = ClientConfig::new("bad\ntoken");
        assert!(matches!(
            BitriseClient::new(cfg),
            Err(ClientError::InvalidToken)
        ));
    }
}
