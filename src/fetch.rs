use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const USER_AGENT: &str = concat!("tcstatus/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// `None` unless a non-empty username was supplied.
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        let username = username.filter(|u| !u.is_empty())?;
        Some(Self {
            username,
            password: password.unwrap_or_default(),
        })
    }
}

/// Source of raw status documents.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<String>;
}

pub struct HttpFetcher {
    client: Client,
    credentials: Option<Credentials>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, credentials: Option<Credentials>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            credentials,
        })
    }
}

#[async_trait]
impl StatusSource for HttpFetcher {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<String> {
        log::debug!("Fetching {}", endpoint.url);

        let mut request = self.client.get(endpoint.url.clone());
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        let res = request.send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: endpoint.url.to_string(),
                status,
            });
        }

        let body = res.text().await?;
        log::debug!("{}: {} bytes", endpoint.host, body.len());
        Ok(body)
    }
}
