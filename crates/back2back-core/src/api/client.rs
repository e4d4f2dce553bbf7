//! HTTP client for the Back2Back member API.
//!
//! Implements `GymApi` over reqwest with bearer token auth, a request
//! timeout and exponential backoff on rate limiting.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use super::{GymApi, SourceError};
use crate::models::{GymLocation, MembershipPlan, UserInfo};

// ============================================================================
// Constants
// ============================================================================

/// Default base URL for the member API
pub const DEFAULT_API_BASE_URL: &str = "https://api.back2back.com";

/// HTTP request timeout in seconds.
/// Mobile networks are slow; past 20s the cached value is the better answer.
const REQUEST_TIMEOUT_SECS: u64 = 20;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Deserialize)]
struct LocationsResponse {
    locations: Vec<GymLocation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrimaryGymRequest<'a> {
    gym_location_id: &'a str,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MembershipSelection {
    plan_id: String,
}

/// API client for the member API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, SourceError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status() == StatusCode::TOO_MANY_REQUESTS {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(SourceError::from_status(status, &body))
        }
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, SourceError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let mut request = self.client.request(method.clone(), url);
            if let Some(ref token) = self.token {
                request = request.bearer_auth(token);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            debug!(method = method.as_str(), url, "Sending request");
            let response = request.send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(SourceError::from_status(StatusCode::TOO_MANY_REQUESTS, ""));
                    }
                    warn!(url, retry = retries, backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        let url = self.url(path);
        let response = self.send::<()>(Method::GET, &url, None).await?;
        Ok(response.json().await?)
    }

    async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), SourceError> {
        let url = self.url(path);
        self.send(Method::PUT, &url, Some(body)).await?;
        Ok(())
    }
}

#[async_trait]
impl GymApi for ApiClient {
    async fn fetch_gym_locations(&self) -> Result<Vec<GymLocation>, SourceError> {
        let response: LocationsResponse = self.get("user/gym-locations").await?;
        debug!(count = response.locations.len(), "Gym locations fetched");
        Ok(response.locations)
    }

    async fn update_primary_gym(&self, location_id: &str) -> Result<(), SourceError> {
        self.put(
            "user/primary-gym",
            &PrimaryGymRequest {
                gym_location_id: location_id,
            },
        )
        .await
    }

    async fn fetch_membership_plans(&self) -> Result<Vec<MembershipPlan>, SourceError> {
        self.get("memberships/plans").await
    }

    async fn fetch_current_membership(&self) -> Result<String, SourceError> {
        let selection: MembershipSelection = self.get("user/membership").await?;
        Ok(selection.plan_id)
    }

    async fn update_membership(&self, plan_id: &str) -> Result<(), SourceError> {
        self.put(
            "user/membership",
            &MembershipSelection {
                plan_id: plan_id.to_string(),
            },
        )
        .await
    }

    async fn fetch_user_info(&self) -> Result<UserInfo, SourceError> {
        self.get("user/profile").await
    }

    async fn update_user_info(&self, info: &UserInfo) -> Result<(), SourceError> {
        self.put("user/profile", info).await
    }
}
