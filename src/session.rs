use crate::config::Config;
use async_trait::async_trait;
use failure::Fail;
use log::warn;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::future::Future;
use std::time::Duration;
use tokio::time::delay_for;

/// A network failure observed by a session, already classified for retry
/// purposes. Timeouts, connection resets and DNS failures are transient;
/// everything else (including HTTP error statuses) is not.
#[derive(Debug, Fail)]
pub enum FetchError {
    #[fail(display = "transient network error: {}", _0)]
    Transient(String),
    #[fail(display = "request failed: {}", _0)]
    Other(String),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transient(_) => true,
            FetchError::Other(_) => false,
        }
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() || e.is_connect() {
        FetchError::Transient(e.to_string())
    } else {
        FetchError::Other(e.to_string())
    }
}

/// One isolated HTTP conversation with the upstream site. The cookie state
/// behind a session is never shared with any other session.
#[async_trait]
pub trait Session: Send + Sync {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String, FetchError>;
}

pub trait SessionProvider: Send + Sync {
    fn new_session(&self) -> Box<dyn Session>;
}

pub struct HttpSession {
    client: reqwest::Client,
}

#[async_trait]
impl Session for HttpSession {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(classify)?;
        Ok(response.bytes().await.map_err(classify)?.to_vec())
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(classify)?;
        response.text().await.map_err(classify)
    }

    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String, FetchError> {
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(classify)?;
        response.text().await.map_err(classify)
    }
}

pub struct HttpSessionProvider {
    user_agent: String,
    accept: String,
    timeout: Duration,
}

impl HttpSessionProvider {
    pub fn new(config: &Config) -> Self {
        HttpSessionProvider {
            user_agent: config.user_agent.clone(),
            accept: config.accept.clone(),
            timeout: config.timeout,
        }
    }
}

impl SessionProvider for HttpSessionProvider {
    fn new_session(&self) -> Box<dyn Session> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent).expect("invalid user agent header"),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_str(&self.accept).expect("invalid accept header"),
        );
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .expect("unable to build HTTP client");
        Box::new(HttpSession { client })
    }
}

/// Runs `f`, retrying transient failures up to `retries` times with a fixed
/// delay between attempts. Non-transient failures return immediately.
pub async fn with_retry<T, F, Fut>(
    what: &str,
    mut retries: u32,
    delay: Duration,
    mut f: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    loop {
        match f().await {
            Err(FetchError::Transient(e)) if retries > 0 => {
                warn!(
                    "{} failed ({}), retrying... ({} attempts left)",
                    what, e, retries
                );
                retries -= 1;
                delay_for(delay).await;
            }
            other => return other,
        }
    }
}
