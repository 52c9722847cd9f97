use serde::Deserialize;

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// RFC 9457 Problem Details as returned by the console API on failures.
/// Every member is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: Option<String>,
    pub title: Option<String>,
    pub status: Option<u16>,
    pub detail: Option<String>,
    pub instance: Option<String>,
    pub code: Option<String>,
}

impl Problem {
    /// Parse a problem body; plain-text or unrelated JSON bodies yield `None`.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        let problem: Problem = serde_json::from_slice(body).ok()?;
        (problem.title.is_some() || problem.detail.is_some()).then_some(problem)
    }

    /// Human-readable message: detail, else title.
    pub fn message(&self) -> &str {
        self.detail
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or_default()
    }
}

/// Best-effort error text for a failed response body.
pub fn describe_error_body(body: &[u8]) -> String {
    if let Some(problem) = Problem::from_body(body) {
        return match &problem.code {
            Some(code) if !code.is_empty() => format!("{} ({code})", problem.message()),
            _ => problem.message().to_string(),
        };
    }
    let text = String::from_utf8_lossy(body);
    text.trim().chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_problem_json() {
        let body = br#"{"type":"about:blank","title":"Forbidden","status":403,"detail":"No access to group 7","code":"ACCESS_DENIED"}"#;
        let p = Problem::from_body(body).unwrap();
        assert_eq!(p.status, Some(403));
        assert_eq!(p.message(), "No access to group 7");
        assert_eq!(describe_error_body(body), "No access to group 7 (ACCESS_DENIED)");
    }

    #[test]
    fn falls_back_to_title() {
        let p = Problem::from_body(br#"{"title":"Bad Gateway"}"#).unwrap();
        assert_eq!(p.message(), "Bad Gateway");
    }

    #[test]
    fn non_problem_bodies() {
        assert!(Problem::from_body(b"upstream timeout").is_none());
        assert!(Problem::from_body(br#"{"items":[]}"#).is_none());
        assert_eq!(describe_error_body(b"  upstream timeout \n"), "upstream timeout");
    }
}
