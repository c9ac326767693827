use crate::normalization::CanonicalPhoneNumber;
use crate::providers::{ProviderError, ProviderReport, ReputationProvider};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const NUMVERIFY_NAME: &str = "NumVerify";

/// Number validation API. It knows nothing about spam, so a valid answer is a
/// responding provider with no reports.
pub struct NumVerifyProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NumVerifyResponse {
    #[serde(default)]
    pub valid: bool,
    pub country_name: Option<String>,
    pub carrier: Option<String>,
    pub line_type: Option<String>,
    pub local_format: Option<String>,
    pub international_format: Option<String>,
}

impl NumVerifyProvider {
    pub fn new(base_url: &str, api_key: &str, timeout_seconds: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        // Fail at construction rather than on every query
        Url::parse(base_url)?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn request_url(&self, number: &CanonicalPhoneNumber) -> Result<Url, ProviderError> {
        Url::parse_with_params(
            &self.base_url,
            &[
                ("access_key", self.api_key.as_str()),
                ("number", number.as_str()),
                ("country_code", "FR"),
                ("format", "1"),
            ],
        )
        .map_err(|e| ProviderError::Unavailable(format!("bad endpoint {}: {e}", self.base_url)))
    }

    pub fn interpret(response: NumVerifyResponse) -> Result<ProviderReport, ProviderError> {
        if !response.valid {
            return Err(ProviderError::Rejected(format!(
                "{NUMVERIFY_NAME} reports the number as invalid"
            )));
        }

        log::debug!(
            "{NUMVERIFY_NAME}: valid number, carrier={:?} line_type={:?}",
            response.carrier,
            response.line_type
        );
        Ok(ProviderReport::not_reported())
    }
}

#[async_trait]
impl ReputationProvider for NumVerifyProvider {
    fn name(&self) -> &str {
        NUMVERIFY_NAME
    }

    async fn query(&self, number: &CanonicalPhoneNumber) -> Result<ProviderReport, ProviderError> {
        let url = self.request_url(number)?;
        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<NumVerifyResponse>()
            .await?;
        Self::interpret(response)
    }
}
