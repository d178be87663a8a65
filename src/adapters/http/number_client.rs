use crate::domain::IsbnNumbers;
use crate::ports::number_provider::{NumberProvider, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// User-Agent header value for number service requests.
const USER_AGENT_VALUE: &str = "bookstore-catalog";

/// Response body of the number service.
///
/// Only the ISBN fields are consumed; the other numbers are decoded so the
/// full payload is visible in debug logs.
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct BookNumberResponse {
    #[serde(rename = "isbn_10")]
    isbn10: Option<String>,
    #[serde(rename = "isbn_13")]
    isbn13: Option<String>,
    #[serde(default)]
    asin: Option<String>,
    #[serde(rename = "ean_8", default)]
    ean8: Option<String>,
    #[serde(rename = "ean_13", default)]
    ean13: Option<String>,
}

/// HTTP implementation of NumberProvider
///
/// Issues a single GET to the number service. The client-level timeout bounds
/// the transport; the registration workflow applies its own bound on top.
pub struct HttpNumberClient {
    client: Client,
    endpoint: String,
}

impl HttpNumberClient {
    /// Create a client for the given endpoint URL
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT_VALUE)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl NumberProvider for HttpNumberClient {
    async fn generate_isbn_numbers(&self) -> Result<IsbnNumbers> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await?
            .error_for_status()?;

        let numbers: BookNumberResponse = response.json().await?;
        tracing::debug!(?numbers, "Numbers received");

        let isbn13 = numbers.isbn13.ok_or("number service response has no isbn_13")?;
        let isbn10 = numbers.isbn10.ok_or("number service response has no isbn_10")?;

        Ok(IsbnNumbers::new(isbn13, isbn10)?)
    }
}
