use thiserror::Error;

/// Failure of a single page fetch, as classified by the transport.
///
/// The collection core never inspects these beyond storing them; it is the
/// transport that decides what is transient and what is terminal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("transient fetch failure: {message}")]
    Transient {
        status: Option<u16>,
        message: String,
    },

    #[error("authentication required ({status}): {detail}")]
    Auth { status: u16, detail: String },

    #[error("request rejected ({status}): {detail}")]
    Terminal { status: u16, detail: String },

    #[error("malformed page response: {message}")]
    Decode { message: String },

    #[error("invalid page request: {message}")]
    Invalid { message: String },
}

impl FetchError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            status: None,
            message: message.into(),
        }
    }

    pub fn terminal(status: u16, detail: impl Into<String>) -> Self {
        Self::Terminal {
            status,
            detail: detail.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Whether an explicit retry (refetch / fetch_next_page) may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Whether the presentation layer should route to the access-denied view.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::Terminal { status: 403, .. })
    }

    /// Whether the session layer has to re-authenticate.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transient { status, .. } => *status,
            Self::Auth { status, .. } | Self::Terminal { status, .. } => Some(*status),
            Self::Decode { .. } | Self::Invalid { .. } => None,
        }
    }
}

impl From<paging_core::Error> for FetchError {
    fn from(e: paging_core::Error) -> Self {
        Self::Invalid {
            message: e.to_string(),
        }
    }
}

impl From<console_kit::SessionError> for FetchError {
    fn from(e: console_kit::SessionError) -> Self {
        Self::Invalid {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_helpers() {
        assert!(FetchError::transient("reset by peer").is_retryable());
        assert!(!FetchError::terminal(404, "gone").is_retryable());
        assert!(FetchError::terminal(403, "nope").is_access_denied());
        assert!(!FetchError::terminal(404, "gone").is_access_denied());
        let auth = FetchError::Auth {
            status: 401,
            detail: "expired".into(),
        };
        assert!(auth.is_auth());
        assert_eq!(auth.status(), Some(401));
        assert_eq!(FetchError::decode("eof").status(), None);
    }

    #[test]
    fn paging_errors_become_invalid() {
        let e: FetchError = paging_core::Error::InvalidPage(0).into();
        assert!(matches!(e, FetchError::Invalid { .. }));
        assert!(e.to_string().contains("page index"));
    }
}
