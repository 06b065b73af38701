//! The Reddit client: composes the transport, token session and write guard,
//! and owns request dispatch with its single 401 re-authentication retry.

pub mod guard;
pub mod session;
pub mod transport;

use crate::config::{AppConfig, AuthMode, Credentials, SafeModeConfig};
use crate::error::{RedditError, Result};
use guard::WriteGuard;
use log::debug;
use reqwest::Method;
use session::TokenSession;
use std::sync::Arc;
use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use url::Url;

/// One authenticated identity per process. Construct once and pass by
/// reference to every operation; there is no ambient global instance.
pub struct RedditClient {
    transport: Arc<dyn HttpTransport>,
    session: TokenSession,
    guard: WriteGuard,
    credentials: Credentials,
}

impl RedditClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let credentials = config.credentials();
        debug!("creating Reddit client with user agent {}", credentials.user_agent);
        let transport = Arc::new(ReqwestTransport::new(&credentials.user_agent)?);
        Self::with_transport(credentials, config.auth_mode, config.safe_mode.clone(), transport)
    }

    /// Construct over an explicit transport. This is the seam tests use to
    /// script responses.
    pub fn with_transport(
        credentials: Credentials,
        mode: AuthMode,
        safe_mode: SafeModeConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let session = TokenSession::new(credentials.clone(), mode)?;
        Ok(Self {
            transport,
            session,
            guard: WriteGuard::new(safe_mode),
            credentials,
        })
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.session.mode()
    }

    /// Dispatch a request against the resolved base host.
    ///
    /// Authenticates first when the trust mode calls for it. A 401 on a
    /// previously-authenticated session triggers exactly one forced token
    /// refresh and one retry of the identical request; a second 401 (or any
    /// other status) is surfaced to the caller unchanged.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        form: Option<Vec<(String, String)>>,
    ) -> Result<HttpResponse> {
        if self.session.requires_auth() {
            self.session
                .ensure_authenticated(self.transport.as_ref(), false)
                .await?;
        }

        let url = self.build_url(path, query)?;
        debug!("{} {}", method, url);

        let response = self.execute_once(method.clone(), &url, form.clone()).await?;
        if response.status == 401 && self.session.was_authenticated() {
            debug!("got 401 on an authenticated session, refreshing token and retrying once");
            self.session
                .ensure_authenticated(self.transport.as_ref(), true)
                .await?;
            return self.execute_once(method, &url, form).await;
        }

        Ok(response)
    }

    async fn execute_once(
        &self,
        method: Method,
        url: &str,
        form: Option<Vec<(String, String)>>,
    ) -> Result<HttpResponse> {
        let mut headers = vec![(
            "User-Agent".to_string(),
            self.credentials.user_agent.clone(),
        )];
        if self.session.requires_auth() {
            if let Some(token) = self.session.bearer_token() {
                headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
            }
        }

        self.transport
            .execute(HttpRequest {
                method,
                url: url.to_string(),
                headers,
                form,
            })
            .await
    }

    fn build_url(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let mut url = Url::parse(&format!("{}{}", self.session.base_url(), path))
            .map_err(|e| RedditError::Config(format!("invalid request path {}: {}", path, e)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url.into())
    }

    /// GET returning the parsed JSON body, with non-2xx mapped to an
    /// upstream error.
    pub(crate) async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value> {
        let response = self.request(Method::GET, path, query, None).await?;
        if !response.is_success() {
            return Err(upstream_error(&response));
        }
        response.json()
    }

    /// POST a form body and parse Reddit's `{json:{errors:[...]}}` envelope
    /// into a domain error before handing the payload back.
    pub(crate) async fn post_form(
        &self,
        path: &str,
        form: Vec<(String, String)>,
    ) -> Result<serde_json::Value> {
        let response = self.request(Method::POST, path, &[], Some(form)).await?;
        if !response.is_success() {
            return Err(upstream_error(&response));
        }
        let json = response.json()?;
        if let Some(message) = envelope_errors(&json) {
            return Err(RedditError::Upstream {
                status: response.status,
                message,
            });
        }
        Ok(json)
    }

    /// Run the full write gate: access validation, then the duplicate check,
    /// then the rate-limit wait. Access and duplicate failures short-circuit
    /// before the wait consumes wall-clock time.
    pub(crate) async fn guard_write(&self, content: Option<&str>) -> Result<()> {
        self.guard
            .validate_write_access(self.session.mode(), &self.credentials)?;
        if let Some(text) = content {
            self.guard.check_duplicate(text)?;
        }
        self.guard.wait_for_write_slot().await;
        Ok(())
    }
}

fn upstream_error(response: &HttpResponse) -> RedditError {
    let message = response
        .json()
        .ok()
        .and_then(|json| envelope_errors(&json))
        .unwrap_or_else(|| {
            let body = response.body.trim();
            if body.is_empty() {
                "no response body".to_string()
            } else {
                body.chars().take(200).collect()
            }
        });
    RedditError::Upstream {
        status: response.status,
        message,
    }
}

/// Collapse the API's own error envelope into one readable message.
fn envelope_errors(json: &serde_json::Value) -> Option<String> {
    let errors = json["json"]["errors"].as_array()?;
    if errors.is_empty() {
        return None;
    }
    let joined = errors
        .iter()
        .map(|entry| {
            let code = entry[0].as_str().unwrap_or("UNKNOWN");
            let detail = entry[1].as_str().unwrap_or("");
            if detail.is_empty() {
                code.to_string()
            } else {
                format!("{}: {}", code, detail)
            }
        })
        .collect::<Vec<_>>()
        .join("; ");
    Some(joined)
}
