//! Explicit session context handed to HTTP collaborators.
//!
//! Nothing in the console reads auth state from globals: whoever builds a
//! transport passes it a [`Session`].

use std::fmt;
use std::sync::Arc;

use url::Url;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

#[derive(Clone)]
pub struct Session {
    base_url: Url,
    bearer_token: Option<Arc<str>>,
}

impl Session {
    pub fn new(base_url: &str) -> Result<Self, SessionError> {
        let mut url = Url::parse(base_url).map_err(|e| SessionError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(SessionError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "cannot be a base".into(),
            });
        }
        // Relative endpoints resolve under the base path only with a trailing slash.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            base_url: url,
            bearer_token: None,
        })
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.bearer_token = (!token.is_empty()).then(|| Arc::from(token));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer_token.is_some()
    }

    /// Resolve an endpoint path (`/groups`, `exam-sessions/3/examinees`) under the base URL.
    ///
    /// Absolute URLs are rejected, and so is anything that resolves to another
    /// origin: the session's token is only ever sent to its own API.
    pub fn resolve(&self, endpoint: &str) -> Result<Url, SessionError> {
        let invalid = |reason: String| SessionError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };

        if Url::parse(endpoint).is_ok() {
            return Err(invalid("absolute URLs are not accepted".into()));
        }
        let relative = endpoint.trim_start_matches('/');
        if relative.is_empty() {
            return Err(invalid("empty path".into()));
        }

        let url = self
            .base_url
            .join(relative)
            .map_err(|e| invalid(e.to_string()))?;
        if url.origin() != self.base_url.origin() {
            return Err(invalid(format!(
                "resolves outside {}",
                self.base_url.origin().ascii_serialization()
            )));
        }
        Ok(url)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
