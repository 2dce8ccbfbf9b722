// Sensorflare HTTP client
//
// Wraps `reqwest::Client` with base-URL handling, Basic authorization and
// body reading. Endpoint groups (dashboards, resources, etc.) are
// implemented as inherent methods in separate files; this module only
// deals with transport mechanics.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "http://www.sensorflare.com/api/";

/// Endpoint probed by [`SensorflareClient::authenticate`].
const AUTH_PROBE_ENDPOINT: &str = "dashboard";

/// Async client for the Sensorflare API.
///
/// Holds a base URL and, once [`authenticate`](Self::authenticate) has been
/// called, a Basic-Auth token. Every method issues exactly one request;
/// nothing is cached between calls.
pub struct SensorflareClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
    authenticated: bool,
}

impl SensorflareClient {
    /// Client for the production endpoint with default transport settings.
    pub fn new() -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL, &TransportConfig::default())
    }

    /// Client for the given base URL.
    ///
    /// The URL must start with `http://` or `https://`; a trailing `/` is
    /// appended when missing.
    pub fn with_base_url(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url)
    }

    /// Client around a pre-built `reqwest::Client`.
    ///
    /// The caller's client should already carry the user agent it wants;
    /// see [`TransportConfig::build_client`].
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            token: None,
            authenticated: false,
        })
    }

    /// The normalized base URL, always ending in `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Point the client at another base URL. Authentication state is kept.
    pub fn set_base_url(&mut self, base_url: &str) -> Result<(), Error> {
        self.base_url = normalize_base_url(base_url)?;
        Ok(())
    }

    /// Whether the last [`authenticate`](Self::authenticate) call succeeded.
    /// No network call.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Whether a token is stored. A rejected `authenticate` still leaves
    /// its token here.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Authenticate with username/password.
    ///
    /// Stores the Basic-Auth token, then probes `GET dashboard`. Returns
    /// `true` iff the probe answered HTTP 200. The token is kept even when
    /// the probe fails; only the authenticated flag is cleared.
    pub async fn authenticate(
        &mut self,
        username: &str,
        password: &SecretString,
    ) -> Result<bool, Error> {
        let credentials = Credentials::new(username, password.clone());
        self.authenticate_with(&credentials).await
    }

    /// [`authenticate`](Self::authenticate) with a prepared [`Credentials`].
    pub async fn authenticate_with(&mut self, credentials: &Credentials) -> Result<bool, Error> {
        self.token = Some(credentials.basic_token());
        self.authenticated = false;

        let resp = self
            .authorized(Method::GET, AUTH_PROBE_ENDPOINT)?
            .send()
            .await
            .map_err(Error::Transport)?;

        self.authenticated = resp.status() == StatusCode::OK;
        debug!(
            username = %credentials.username,
            status = resp.status().as_u16(),
            authenticated = self.authenticated,
            "authentication probe finished"
        );
        Ok(self.authenticated)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build the absolute URL for an endpoint path relative to the base.
    pub(crate) fn endpoint_url(&self, endpoint: &str) -> Result<Url, Error> {
        if endpoint.is_empty() {
            return Err(Error::EmptyEndpoint);
        }
        Ok(Url::parse(&format!("{}{endpoint}", self.base_url))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Request builder carrying the `Authorization` header.
    ///
    /// Only needs a stored token; the authenticated flag is checked by the
    /// data helpers so the auth probe itself can go through here.
    fn authorized(&self, method: Method, endpoint: &str) -> Result<RequestBuilder, Error> {
        let token = self.token.as_ref().ok_or(Error::Unauthenticated)?;
        let url = self.endpoint_url(endpoint)?;
        debug!("{method} {url}");
        Ok(self
            .http
            .request(method, url)
            .header(AUTHORIZATION, format!("Basic {}", token.expose_secret())))
    }

    fn require_authenticated(&self) -> Result<(), Error> {
        if self.authenticated {
            Ok(())
        } else {
            Err(Error::Unauthenticated)
        }
    }

    /// GET an endpoint and return the whole body as text.
    pub(crate) async fn get_page(&self, endpoint: &str) -> Result<String, Error> {
        self.require_authenticated()?;
        let request = self.authorized(Method::GET, endpoint)?;
        read_body(request).await
    }

    /// POST form parameters to an endpoint and return the whole body.
    ///
    /// Parameters are URL-encoded as `key=value` pairs joined by `&`, in
    /// the order given. An empty slice sends an empty body.
    pub(crate) async fn post_page(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<String, Error> {
        self.require_authenticated()?;
        let mut request = self.authorized(Method::POST, endpoint)?;
        if !params.is_empty() {
            request = request
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encode_form(params));
        }
        read_body(request).await
    }

    /// GET an endpoint and deserialize its JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, Error> {
        let body = self.get_page(endpoint).await?;
        parse_json(&body)
    }

    /// GET an action endpoint and apply [`is_ok_response`] to the reply.
    pub(crate) async fn get_ok(&self, endpoint: &str) -> Result<bool, Error> {
        let value: Value = self.get_json(endpoint).await?;
        Ok(is_ok_response(&value))
    }
}

async fn read_body(request: RequestBuilder) -> Result<String, Error> {
    let resp = request.send().await.map_err(Error::Transport)?;
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

/// Deserialize a body, keeping the raw text on failure.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: body.to_owned(),
    })
}

/// Validate a base URL and make sure it ends with `/`.
pub fn normalize_base_url(raw: &str) -> Result<String, Error> {
    let invalid = |reason: &str| Error::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: reason.to_owned(),
    };

    if raw.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if !raw.starts_with("http://") && !raw.starts_with("https://") {
        return Err(invalid("must start with http:// or https://"));
    }
    Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;

    if raw.ends_with('/') {
        Ok(raw.to_owned())
    } else {
        Ok(format!("{raw}/"))
    }
}

/// `true` iff `value` is exactly `{"status": "Ok", "code": 200}`.
///
/// Both fields must match and no other fields may be present. This is
/// the service's acknowledgement for action endpoints.
pub fn is_ok_response(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    obj.len() == 2
        && obj.get("status").and_then(Value::as_str) == Some("Ok")
        && obj.get("code").and_then(Value::as_i64) == Some(200)
}

fn encode_form(params: &[(&str, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
        .finish()
}
