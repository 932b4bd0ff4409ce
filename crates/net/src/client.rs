//! HTTP client with connection pooling and retry logic

use lwdump_config::Config;
use lwdump_errors::{Error, NetworkError};
use lwdump_types::protocol::{UNITY_VERSION, UNITY_VERSION_HEADER, USER_AGENT};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    /// Extra attempts for GET requests
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub user_agent: String,
    pub unity_version: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300), // 5 minutes for large bundles
            connect_timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 16,
            retry_count: 0,
            retry_delay: Duration::from_secs(1),
            user_agent: USER_AGENT.to_string(),
            unity_version: UNITY_VERSION.to_string(),
        }
    }
}

impl From<&Config> for NetConfig {
    fn from(config: &Config) -> Self {
        Self {
            timeout: config.timeout(),
            connect_timeout: config.connect_timeout(),
            retry_count: config.network.retries,
            retry_delay: config.retry_delay(),
            user_agent: config.protocol.user_agent.clone(),
            unity_version: config.protocol.unity_version.clone(),
            pool_max_idle_per_host: config.download.max_concurrent,
            ..Self::default()
        }
    }
}

/// HTTP client wrapper that always presents itself as the game player
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the configured header values are not valid HTTP
    /// header text or the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let unity_version = HeaderValue::from_str(&config.unity_version)
            .map_err(|e| NetworkError::ConnectionRefused(format!("invalid unity version: {e}")))?;
        let header_name = HeaderName::from_bytes(UNITY_VERSION_HEADER.as_bytes())
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;
        headers.insert(header_name, unity_version);

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    /// Execute a GET request, retrying transient failures `retry_count` times
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retry attempts, including
    /// network timeouts, connection failures, or server errors.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        self.retry_request(|| self.client.get(url).send()).await
    }

    /// POST a JSON document once
    ///
    /// API exchanges mutate session state on the server and are never retried.
    ///
    /// # Errors
    ///
    /// Returns a `NetworkError` if the request cannot be sent or times out.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<Response, Error> {
        self.client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(convert_error)
    }

    /// Execute a request with retries
    async fn retry_request<F, Fut>(&self, mut f: F) -> Result<Response, Error>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<Response, reqwest::Error>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.retry_count {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_delay * attempt).await;
            }

            match f().await {
                Ok(response) => {
                    if response.status() == StatusCode::TOO_MANY_REQUESTS {
                        if let Some(retry_after) = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                        {
                            return Err(NetworkError::RateLimited {
                                seconds: retry_after,
                            }
                            .into());
                        }
                    }

                    return Ok(response);
                }
                Err(e) => {
                    let retry = Self::should_retry(&e);
                    last_error = Some(e);
                    if !retry {
                        break;
                    }
                }
            }
        }

        Err(last_error.map_or_else(
            || NetworkError::DownloadFailed("Unknown error".to_string()).into(),
            convert_error,
        ))
    }

    /// Determine if an error should be retried
    fn should_retry(error: &reqwest::Error) -> bool {
        error.is_timeout()
            || error.is_connect()
            || error.status().is_none_or(|s| s.is_server_error())
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }
}

fn convert_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        NetworkError::Timeout {
            url: e
                .url()
                .map(std::string::ToString::to_string)
                .unwrap_or_default(),
        }
        .into()
    } else if e.is_connect() {
        NetworkError::ConnectionRefused(e.to_string()).into()
    } else {
        NetworkError::DownloadFailed(e.to_string()).into()
    }
}
