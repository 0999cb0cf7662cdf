// Async HTTP client for the streaming proxy REST collection.
//
// Base path: {api_url}/proxies
// Auth: optional `Authorization: Bearer` session token
// Every response is the `{ success, data?, error? }` envelope.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::debug;
use url::Url;

use crate::Error;
use crate::auth::SessionToken;
use crate::transport::TransportConfig;
use crate::types::{
    ApiResponse, CreateProxyRequest, HealthCheckResult, ProxyId, ProxyQuery, ProxyRecord,
    UpdateProxyRequest,
};

const UNAUTHORIZED_FALLBACK: &str = "Authentication required";

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn parse(raw: &str) -> Option<String> {
        let body: Self = serde_json::from_str(raw).ok()?;
        body.error.or(body.message)
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the proxy administration API.
///
/// Stateless: it holds only the HTTP stack, base URL and session token.
/// Cheap to clone (the inner `reqwest::Client` is reference counted).
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Option<SessionToken>,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL, optional session token, and transport config.
    pub fn new(
        base_url: &str,
        session: Option<SessionToken>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Wrap an existing `reqwest::Client` without a session token.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            session: None,
        })
    }

    /// Attach (or replace) the session token.
    pub fn with_session(mut self, session: SessionToken) -> Self {
        self.session = Some(session);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(raw.to_owned()));
        }
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request plumbing ─────────────────────────────────────────────

    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, Error> {
        debug!("{method} {url}");
        let mut builder = self.http.request(method, url);
        if let Some(ref session) = self.session {
            if session.is_expired() {
                return Err(Error::SessionExpired);
            }
            builder = builder.bearer_auth(session.bearer());
        }
        Ok(builder)
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<ApiResponse<T>, Error> {
        let resp = builder.send().await?;
        Self::handle_envelope(resp).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + Sync>(
        builder: RequestBuilder,
        body: &B,
    ) -> Result<ApiResponse<T>, Error> {
        Self::send(builder.json(body)).await
    }

    // ── Response handling ────────────────────────────────────────────

    /// Decode the envelope, turning transport-level and envelope-level
    /// failures into [`Error`]. `success: false` is an error even on 2xx.
    async fn handle_envelope<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<ApiResponse<T>, Error> {
        let status = resp.status();
        let body = resp.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized {
                message: ErrorBody::parse(&body)
                    .unwrap_or_else(|| UNAUTHORIZED_FALLBACK.to_owned()),
            });
        }

        if !status.is_success() {
            return Err(Error::Api {
                message: ErrorBody::parse(&body),
                status: status.as_u16(),
            });
        }

        if status == StatusCode::NO_CONTENT && body.trim().is_empty() {
            return Ok(ApiResponse {
                success: true,
                data: None,
                error: None,
            });
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        if envelope.success {
            Ok(envelope)
        } else {
            Err(Error::Api {
                message: envelope.error,
                status: status.as_u16(),
            })
        }
    }

    fn into_data<T>(envelope: ApiResponse<T>, operation: &'static str) -> Result<T, Error> {
        envelope.data.ok_or(Error::MissingData { operation })
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `GET /proxies`, optionally with server-side filter parameters.
    pub async fn list_proxies(&self, query: Option<&ProxyQuery>) -> Result<Vec<ProxyRecord>, Error> {
        let mut builder = self.request(Method::GET, self.url(&["proxies"])?)?;
        if let Some(query) = query {
            let params = query.to_params();
            if !params.is_empty() {
                debug!(?params, "forwarding proxy filter");
                builder = builder.query(&params);
            }
        }
        let envelope = Self::send(builder).await?;
        Self::into_data(envelope, "list proxies")
    }

    /// `POST /proxies`
    pub async fn create_proxy(&self, req: &CreateProxyRequest) -> Result<ProxyRecord, Error> {
        let builder = self.request(Method::POST, self.url(&["proxies"])?)?;
        let envelope = Self::send_json(builder, req).await?;
        Self::into_data(envelope, "create proxy")
    }

    /// `PATCH /proxies/{id}`
    pub async fn update_proxy(
        &self,
        id: &ProxyId,
        req: &UpdateProxyRequest,
    ) -> Result<ProxyRecord, Error> {
        let builder = self.request(Method::PATCH, self.url(&["proxies", id.as_str()])?)?;
        let envelope = Self::send_json(builder, req).await?;
        Self::into_data(envelope, "update proxy")
    }

    /// `DELETE /proxies/{id}`. Any `data` in the envelope is ignored.
    pub async fn delete_proxy(&self, id: &ProxyId) -> Result<(), Error> {
        let builder = self.request(Method::DELETE, self.url(&["proxies", id.as_str()])?)?;
        let _: ApiResponse<IgnoredAny> = Self::send(builder).await?;
        Ok(())
    }

    /// `POST /proxies/{id}/health-check`
    pub async fn run_health_check(&self, id: &ProxyId) -> Result<HealthCheckResult, Error> {
        let builder = self.request(
            Method::POST,
            self.url(&["proxies", id.as_str(), "health-check"])?,
        )?;
        let envelope = Self::send(builder).await?;
        Self::into_data(envelope, "health check")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn url_appends_segments_to_base_path() {
        let client =
            ApiClient::from_reqwest("https://dash.example.org/api/streaming/", reqwest::Client::new())
                .unwrap();
        let url = client.url(&["proxies", "p 1", "health-check"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://dash.example.org/api/streaming/proxies/p%201/health-check"
        );
    }

    #[test]
    fn url_without_trailing_slash() {
        let client =
            ApiClient::from_reqwest("https://dash.example.org/api", reqwest::Client::new()).unwrap();
        let url = client.url(&["proxies"]).unwrap();
        assert_eq!(url.as_str(), "https://dash.example.org/api/proxies");
    }

    #[test]
    fn rejects_non_base_url() {
        let err = ApiClient::from_reqwest("mailto:ops@example.org", reqwest::Client::new());
        assert!(matches!(err, Err(Error::InvalidBaseUrl(_))));
    }

    #[test]
    fn error_body_prefers_error_field() {
        assert_eq!(
            ErrorBody::parse(r#"{"success":false,"error":"locked","message":"other"}"#).as_deref(),
            Some("locked")
        );
        assert_eq!(
            ErrorBody::parse(r#"{"message":"gateway down"}"#).as_deref(),
            Some("gateway down")
        );
        assert!(ErrorBody::parse("<html>502</html>").is_none());
    }
}
