//! Grafana Alerting Provisioning REST Client
//!
//! Native REST implementation of [`AlertingApi`] against Grafana's
//! `/api/v1/provisioning` endpoints. Uses reqwest with rustls.
//!
//! The organization is selected per request with the `X-Grafana-Org-Id`
//! header, so one client serves every org the credentials can reach.
//!
//! References:
//! - [Alerting provisioning HTTP API](https://grafana.com/docs/grafana/latest/developers/http_api/alerting_provisioning/)

use crate::client::{AlertingApi, ApiError};
use crate::config::ProvisionerConfig;
use crate::constants::PROVISIONING_API_PATH;
use crate::models::{ContactPoint, MuteTiming};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info_span, Instrument};

/// Grafana API error body
///
/// Grafana answers failed requests with `{"message": "...", "traceID": "..."}`.
#[derive(Debug, Deserialize)]
struct GrafanaErrorResponse {
    message: String,
}

enum Credentials {
    Basic { user: String, password: String },
    Bearer(String),
}

impl Credentials {
    /// `user:password` selects basic auth, anything else is treated as a token
    fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((user, password)) => Credentials::Basic {
                user: user.to_string(),
                password: password.to_string(),
            },
            None => Credentials::Bearer(raw.to_string()),
        }
    }
}

/// Grafana alerting provisioning REST client
pub struct GrafanaRestClient {
    http_client: Client,
    api_base: Url,
    endpoint: String,
    credentials: Option<Credentials>,
}

impl std::fmt::Debug for GrafanaRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrafanaRestClient")
            .field("endpoint", &self.endpoint)
            .field("authenticated", &self.credentials.is_some())
            .finish_non_exhaustive()
    }
}

impl GrafanaRestClient {
    /// Create a client for the configured Grafana instance
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built
    pub fn new(config: &ProvisionerConfig) -> Result<Self> {
        let base = Url::parse(&config.grafana_url)
            .with_context(|| format!("Invalid Grafana URL: {}", config.grafana_url))?;
        if base.cannot_be_a_base() {
            bail!("Grafana URL cannot be used as a base: {}", config.grafana_url);
        }

        let mut api_base = base.clone();
        if let Ok(mut segments) = api_base.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(PROVISIONING_API_PATH.split('/'));
        }

        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            api_base,
            endpoint: base.as_str().trim_end_matches('/').to_string(),
            credentials: config.auth.as_deref().map(Credentials::parse),
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        // Checked in `new`: the base URL has path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    /// Build HTTP request with org and authentication headers
    fn make_request(&self, method: Method, url: Url, org_id: i64) -> RequestBuilder {
        let request = self
            .http_client
            .request(method, url)
            .header("X-Grafana-Org-Id", org_id.to_string());

        match &self.credentials {
            Some(Credentials::Basic { user, password }) => request.basic_auth(user, Some(password)),
            Some(Credentials::Bearer(token)) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::handle_error_response(status, &error_text, what));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(format!("{what}: {e}")))
    }

    async fn send_empty(&self, request: RequestBuilder, what: &str) -> Result<(), ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let error_text = response.text().await.unwrap_or_default();
        Err(Self::handle_error_response(status, &error_text, what))
    }

    /// Handle Grafana API error responses
    fn handle_error_response(status: StatusCode, error_text: &str, what: &str) -> ApiError {
        if status == StatusCode::NOT_FOUND {
            return ApiError::NotFound(what.to_string());
        }

        let message = serde_json::from_str::<GrafanaErrorResponse>(error_text)
            .map(|body| body.message)
            .unwrap_or_else(|_| error_text.trim().to_string());
        debug!("Grafana returned {} for {}: {}", status, what, message);

        ApiError::Status {
            code: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl AlertingApi for GrafanaRestClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn list_contact_points(
        &self,
        org_id: i64,
        name: Option<&str>,
    ) -> Result<Vec<ContactPoint>, ApiError> {
        let span = tracing::debug_span!(
            "grafana.contact_points.list",
            org.id = org_id,
            contact_point.name = name.unwrap_or("*")
        );
        let mut url = self.url(&["contact-points"]);
        if let Some(name) = name {
            url.query_pairs_mut().append_pair("name", name);
        }
        let request = self.make_request(Method::GET, url, org_id);
        self.send_json(request, "contact points")
            .instrument(span)
            .await
    }

    async fn create_contact_point(
        &self,
        org_id: i64,
        point: &ContactPoint,
    ) -> Result<ContactPoint, ApiError> {
        let span = info_span!(
            "grafana.contact_point.create",
            org.id = org_id,
            contact_point.name = %point.name,
            notifier.kind = %point.type_tag
        );
        let url = self.url(&["contact-points"]);
        let request = self.make_request(Method::POST, url, org_id).json(point);
        self.send_json(request, &format!("contact point {}", point.name))
            .instrument(span)
            .await
    }

    async fn update_contact_point(
        &self,
        org_id: i64,
        uid: &str,
        point: &ContactPoint,
    ) -> Result<(), ApiError> {
        let span = info_span!(
            "grafana.contact_point.update",
            org.id = org_id,
            notifier.uid = uid,
            notifier.kind = %point.type_tag
        );
        let url = self.url(&["contact-points", uid]);
        let request = self.make_request(Method::PUT, url, org_id).json(point);
        self.send_empty(request, &format!("contact point notifier {uid}"))
            .instrument(span)
            .await
    }

    async fn delete_contact_point(&self, org_id: i64, uid: &str) -> Result<(), ApiError> {
        let span = info_span!(
            "grafana.contact_point.delete",
            org.id = org_id,
            notifier.uid = uid
        );
        let url = self.url(&["contact-points", uid]);
        let request = self.make_request(Method::DELETE, url, org_id);
        self.send_empty(request, &format!("contact point notifier {uid}"))
            .instrument(span)
            .await
    }

    async fn get_mute_timing(&self, org_id: i64, name: &str) -> Result<MuteTiming, ApiError> {
        let span = tracing::debug_span!(
            "grafana.mute_timing.get",
            org.id = org_id,
            mute_timing.name = name
        );
        let url = self.url(&["mute-timings", name]);
        let request = self.make_request(Method::GET, url, org_id);
        self.send_json(request, &format!("mute timing {name}"))
            .instrument(span)
            .await
    }

    async fn create_mute_timing(
        &self,
        org_id: i64,
        timing: &MuteTiming,
    ) -> Result<MuteTiming, ApiError> {
        let span = info_span!(
            "grafana.mute_timing.create",
            org.id = org_id,
            mute_timing.name = %timing.name
        );
        let url = self.url(&["mute-timings"]);
        let request = self.make_request(Method::POST, url, org_id).json(timing);
        self.send_json(request, &format!("mute timing {}", timing.name))
            .instrument(span)
            .await
    }

    async fn update_mute_timing(
        &self,
        org_id: i64,
        name: &str,
        timing: &MuteTiming,
    ) -> Result<MuteTiming, ApiError> {
        let span = info_span!(
            "grafana.mute_timing.update",
            org.id = org_id,
            mute_timing.name = name
        );
        let url = self.url(&["mute-timings", name]);
        let request = self.make_request(Method::PUT, url, org_id).json(timing);
        self.send_json(request, &format!("mute timing {name}"))
            .instrument(span)
            .await
    }

    async fn delete_mute_timing(&self, org_id: i64, name: &str) -> Result<(), ApiError> {
        let span = info_span!(
            "grafana.mute_timing.delete",
            org.id = org_id,
            mute_timing.name = name
        );
        let url = self.url(&["mute-timings", name]);
        let request = self.make_request(Method::DELETE, url, org_id);
        self.send_empty(request, &format!("mute timing {name}"))
            .instrument(span)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(url: &str) -> GrafanaRestClient {
        let config = ProvisionerConfig {
            grafana_url: url.to_string(),
            ..ProvisionerConfig::default()
        };
        GrafanaRestClient::new(&config).unwrap()
    }

    #[test]
    fn test_url_building_escapes_names() {
        let client = client_for("https://grafana.example.com/");
        let url = client.url(&["mute-timings", "office hours/weekend"]);
        assert_eq!(
            url.as_str(),
            "https://grafana.example.com/api/v1/provisioning/mute-timings/office%20hours%2Fweekend"
        );
    }

    #[test]
    fn test_url_building_keeps_sub_path() {
        let client = client_for("https://example.com/grafana");
        let url = client.url(&["contact-points"]);
        assert_eq!(
            url.as_str(),
            "https://example.com/grafana/api/v1/provisioning/contact-points"
        );
        assert_eq!(client.endpoint(), "https://example.com/grafana");
    }

    #[test]
    fn test_credentials_parsing() {
        assert!(matches!(
            Credentials::parse("admin:admin"),
            Credentials::Basic { .. }
        ));
        assert!(matches!(
            Credentials::parse("glsa_token"),
            Credentials::Bearer(_)
        ));
    }

    #[test]
    fn test_error_body_message_is_extracted() {
        let err = GrafanaRestClient::handle_error_response(
            StatusCode::BAD_REQUEST,
            r#"{"message":"invalid settings","traceID":""}"#,
            "contact point ops",
        );
        match err {
            ApiError::Status { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "invalid settings");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let missing =
            GrafanaRestClient::handle_error_response(StatusCode::NOT_FOUND, "", "mute timing x");
        assert!(missing.is_not_found());
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let config = ProvisionerConfig {
            grafana_url: "not a url".to_string(),
            ..ProvisionerConfig::default()
        };
        assert!(GrafanaRestClient::new(&config).is_err());
    }
}
