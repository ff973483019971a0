//! Network boundary for the fetch controller

use std::marker::PhantomData;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;

use super::error::FetchError;
use crate::config::FetchConfig;

/// User agent for outgoing requests
const USER_AGENT: &str = concat!("potd/", env!("CARGO_PKG_VERSION"));

/// Something that can turn a URL into a payload.
///
/// The returned future must own everything it needs; the controller spawns it
/// on the runtime and may abort it at any point.
pub trait Fetcher<P>: Send + Sync {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<P, FetchError>>;
}

/// Plain HTTP GET returning a JSON body
pub struct HttpFetcher<P> {
    client: reqwest::Client,
    _payload: PhantomData<fn() -> P>,
}

impl<P> Clone for HttpFetcher<P> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _payload: PhantomData,
        }
    }
}

impl<P> HttpFetcher<P> {
    /// Create a fetcher using the timeout from `config`
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            _payload: PhantomData,
        })
    }
}

impl<P> Fetcher<P> for HttpFetcher<P>
where
    P: DeserializeOwned + Send + 'static,
{
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<P, FetchError>> {
        let client = self.client.clone();
        let url = url.to_string();

        async move {
            let start = std::time::Instant::now();
            let response = client.get(&url).send().await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    url,
                    body,
                });
            }

            let bytes = response.bytes().await?;
            let payload = serde_json::from_slice(&bytes)?;
            tracing::debug!(
                "Fetched {} ({} bytes) in {:.2}s",
                url,
                bytes.len(),
                start.elapsed().as_secs_f32()
            );
            Ok(payload)
        }
        .boxed()
    }
}
