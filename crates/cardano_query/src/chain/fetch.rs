//! HTTP transport shared by the indexer adapters.
//!
//! One request per call. No retries and no response cache: a failed request is
//! reported to the caller, who decides whether to ask again.

use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("cardano-query/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct FetchConfig {
    /// Whole-request timeout. `None` keeps a hung upstream call pending forever.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request: {0}")]
    Network(#[from] reqwest::Error),
    #[error("upstream error: status {status} body {body}")]
    Upstream { status: u16, body: String },
    #[error("decode: {0}")]
    Decode(String),
    #[error("graphql: {0}")]
    GraphQl(String),
}

/// Thin wrapper over a shared `reqwest::Client` that decodes JSON bodies and
/// turns non-2xx responses into [`FetchError::Upstream`].
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// GET `url` with extra `headers` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let mut req = self.client.get(url);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        self.send(url, req).await
    }

    /// POST a JSON body to `url` and decode the JSON response.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, FetchError> {
        let req = self.client.post(url).json(body);
        self.send(url, req).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<T, FetchError> {
        debug!(%url, "request");
        let res = req.send().await?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "upstream error");
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        debug!(%url, status = status.as_u16(), bytes = body.len(), "response");
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(format!("{url}: {e}")))
    }
}
