//! HTTP client for the ExplicaSurf backend.

use std::time::Duration;

use explicasurf_core::BackendConfig;
use tracing::instrument;
use url::Url;

use crate::error::ForecastError;
use crate::retry::{with_retry, RetryPolicy};
use crate::types::{ExplainResponse, Selection, SurferProfile};

#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl ForecastClient {
    /// Build a client from the `[backend]` config section.
    ///
    /// # Errors
    ///
    /// Fails when the base URL does not parse or the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, ForecastError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("explicasurf/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base(&config.base_url)?,
            retry: RetryPolicy::from_backend(config),
        })
    }

    /// Client with default settings and no retries, pointed at `base_url`.
    pub fn new_with_base_url(base_url: &str) -> Result<Self, ForecastError> {
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: normalize_base(base_url)?,
            retry: RetryPolicy::none(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forecast for a skill level and day, with the rule-based explanation.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_explain(&self, selection: &Selection) -> Result<ExplainResponse, ForecastError> {
        let url = self.explain_url(selection, None)?;
        tracing::info!("Fetching forecast for {}", selection.cache_key());
        with_retry(self.retry, || self.get_json(url.clone())).await
    }

    /// Same forecast, with an AI explanation personalized for `profile`.
    #[instrument(skip(self), level = "info")]
    pub async fn explain(
        &self,
        selection: &Selection,
        profile: &SurferProfile,
    ) -> Result<ExplainResponse, ForecastError> {
        let url = self.explain_url(selection, Some(profile))?;
        tracing::info!("Requesting AI explanation for {}", selection.cache_key());
        with_retry(self.retry, || self.get_json(url.clone())).await
    }

    /// Probe `/health` so a sleeping backend starts waking up.
    #[instrument(skip(self), level = "info")]
    pub async fn warmup(&self) -> Result<(), ForecastError> {
        let url = self.endpoint("health")?;
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status.is_success() {
            tracing::info!("Backend is awake");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Warm-up probe returned {}", status);
            Err(ForecastError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn explain_url(
        &self,
        selection: &Selection,
        profile: Option<&SurferProfile>,
    ) -> Result<Url, ForecastError> {
        let mut url = self.endpoint("api/explain")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("level", selection.level.as_str())
                .append_pair("day", &selection.day.get().to_string());
            if let Some(profile) = profile {
                query
                    .append_pair("ai", "on")
                    .append_pair("name", &profile.name)
                    .append_pair("stance", &profile.stance)
                    .append_pair("experience_months", &profile.experience_months.to_string());
            }
        }
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ForecastError> {
        let raw = format!("{}/{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| ForecastError::Parse(format!("invalid URL {}: {}", raw, e)))
    }

    async fn get_json(&self, url: Url) -> Result<ExplainResponse, ForecastError> {
        let response = self.client.get(url).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ForecastError> {
        let status = response.status();

        if status.is_success() {
            let text = response.text().await?;
            serde_json::from_str(&text)
                .map_err(|e| ForecastError::Parse(format!("JSON parse error: {}", e)))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ForecastError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Validate `base` and drop trailing slashes so paths can be appended.
fn normalize_base(base: &str) -> Result<String, ForecastError> {
    let parsed = Url::parse(base)
        .map_err(|e| ForecastError::Parse(format!("invalid base URL {}: {}", base, e)))?;
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::types::DayOffset;
    use explicasurf_core::SkillLevel;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn selection(day: u8) -> Selection {
        Selection::new(SkillLevel::Intermediario, DayOffset::new(day).unwrap())
    }

    #[test]
    fn test_explain_url_plain() {
        let client = ForecastClient::new_with_base_url("http://localhost:8000/").unwrap();
        let url = client.explain_url(&selection(1), None).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/explain?level=intermediario&day=1"
        );
    }

    #[test]
    fn test_explain_url_keeps_path_prefix() {
        let client = ForecastClient::new_with_base_url("http://localhost/surf").unwrap();
        let url = client.explain_url(&selection(0), None).unwrap();
        assert_eq!(url.path(), "/surf/api/explain");
    }

    #[test]
    fn test_explain_url_with_profile_is_encoded() {
        let client = ForecastClient::new_with_base_url("http://localhost").unwrap();
        let profile = SurferProfile {
            name: "João & Ana".to_string(),
            stance: "goofy".to_string(),
            experience_months: 18,
        };
        let url = client.explain_url(&selection(2), Some(&profile)).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("ai".to_string(), "on".to_string())));
        assert!(pairs.contains(&("name".to_string(), "João & Ana".to_string())));
        assert!(pairs.contains(&("experience_months".to_string(), "18".to_string())));
        assert!(!url.as_str().contains(" & "));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ForecastClient::new_with_base_url("not a url");
        assert!(matches!(result, Err(ForecastError::Parse(_))));
    }

    #[tokio::test]
    async fn test_fetch_explain() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/explain"))
            .and(query_param("level", "intermediario"))
            .and(query_param("day", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "forecast_now": {"wave_height_m": 1.2},
                "forecast_day": {},
                "forecast_series": [],
                "explanation_pt": "Mar pequeno"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ForecastClient::new_with_base_url(&mock_server.uri()).unwrap();
        let response = client.fetch_explain(&selection(0)).await.unwrap();

        assert_eq!(response.explanation_pt.as_deref(), Some("Mar pequeno"));
        assert_eq!(response.forecast_now["wave_height_m"], 1.2);
    }

    #[tokio::test]
    async fn test_status_error_carries_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/explain"))
            .respond_with(ResponseTemplate::new(422).set_body_string("bad level"))
            .mount(&mock_server)
            .await;

        let client = ForecastClient::new_with_base_url(&mock_server.uri()).unwrap();
        let result = client.fetch_explain(&selection(0)).await;

        match result {
            Err(ForecastError::Status { status, body }) => {
                assert_eq!(status, 422);
                assert_eq!(body, "bad level");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/explain"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>sleeping</html>"))
            .mount(&mock_server)
            .await;

        let client = ForecastClient::new_with_base_url(&mock_server.uri()).unwrap();
        let result = client.fetch_explain(&selection(0)).await;

        assert!(matches!(result, Err(ForecastError::Parse(_))));
    }

    #[tokio::test]
    async fn test_warmup() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&mock_server)
            .await;

        let client = ForecastClient::new_with_base_url(&mock_server.uri()).unwrap();
        assert!(client.warmup().await.is_ok());
    }

    #[tokio::test]
    async fn test_warmup_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = ForecastClient::new_with_base_url(&mock_server.uri()).unwrap();
        let result = client.warmup().await;
        assert!(matches!(result, Err(ForecastError::Status { status: 503, .. })));
    }
}
