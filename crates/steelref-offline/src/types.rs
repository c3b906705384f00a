//! Request and response value types for fetch interception.
//!
//! These mirror the parts of a host fetch event the dispatch logic actually
//! reads: URL, method, request mode, and the Accept header on the request
//! side; status, body, and origin kind on the response side.

use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP method of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Head => write!(f, "HEAD"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// Request mode as the host reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// A page navigation.
    Navigate,
    SameOrigin,
    NoCors,
    Cors,
}

/// Origin classification of a response. Only `Basic` (same-origin) responses
/// are eligible for the static-asset cache rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Basic,
    Cors,
    Opaque,
}

/// HTTP-cache interaction requested from the network layer. Precache
/// fetches bypass any intermediate cache so install always revalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    Default,
    NoCache,
}

/// One intercepted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRequest {
    pub url: String,
    pub method: Method,
    pub mode: RequestMode,
    /// Accept header, when the host supplies one.
    pub accept: Option<String>,
}

impl AssetRequest {
    /// Plain subresource GET.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            mode: RequestMode::NoCors,
            accept: None,
        }
    }

    /// Page navigation GET.
    #[must_use]
    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            mode: RequestMode::Navigate,
            accept: Some("text/html,application/xhtml+xml".into()),
        }
    }

    /// Replace the Accept header.
    #[must_use]
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Whether the Accept header indicates an HTML document.
    #[must_use]
    pub fn accepts_html(&self) -> bool {
        self.accept
            .as_deref()
            .is_some_and(|a| a.contains("text/html"))
    }

    /// URL with query string and fragment stripped.
    #[must_use]
    pub fn path(&self) -> &str {
        let end = self.url.find(['?', '#']).unwrap_or(self.url.len());
        &self.url[..end]
    }

    /// Suffix match against the stripped path.
    #[must_use]
    pub fn path_ends_with(&self, suffix: &str) -> bool {
        !suffix.is_empty() && self.path().ends_with(suffix)
    }
}

/// One response, live or cached. Cached copies are whole-value clones of
/// live responses; a cache write is a full replace, never a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetResponse {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub kind: ResponseKind,
}

impl AssetResponse {
    /// Successful same-origin response.
    #[must_use]
    pub fn ok(url: impl Into<String>, content_type: &str, body: &[u8]) -> Self {
        Self {
            url: url.into(),
            status: 200,
            content_type: Some(content_type.into()),
            body: body.to_vec(),
            kind: ResponseKind::Basic,
        }
    }

    /// Same response with a different status code.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Same response with a different origin kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    /// 2xx check.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Whether the static-asset rule may cache this response: a successful
    /// same-origin GET.
    #[must_use]
    pub fn is_cacheable_static(&self, method: Method) -> bool {
        method == Method::Get && self.status == 200 && self.kind == ResponseKind::Basic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_strips_query_and_fragment() {
        let request = AssetRequest::get("./app.js?v=4.1.1");
        assert_eq!(request.path(), "./app.js");
        let request = AssetRequest::get("./index.html#section");
        assert_eq!(request.path(), "./index.html");
        let request = AssetRequest::get("./steels.json");
        assert_eq!(request.path(), "./steels.json");
    }

    #[test]
    fn path_ends_with_ignores_query() {
        let request = AssetRequest::get("https://example.net/data/steels.json?ts=12345");
        assert!(request.path_ends_with("steels.json"));
        assert!(!request.path_ends_with("app.js"));
        assert!(!request.path_ends_with(""));
    }

    #[test]
    fn navigate_requests_accept_html() {
        let request = AssetRequest::navigate("./");
        assert_eq!(request.mode, RequestMode::Navigate);
        assert!(request.accepts_html());
    }

    #[test]
    fn plain_get_does_not_accept_html() {
        assert!(!AssetRequest::get("./app.css").accepts_html());
        let request = AssetRequest::get("./page").with_accept("text/html;q=0.9");
        assert!(request.accepts_html());
    }

    #[test]
    fn success_bounds() {
        let response = AssetResponse::ok("./a", "text/plain", b"x");
        assert!(response.is_success());
        assert!(!response.clone().with_status(199).is_success());
        assert!(response.clone().with_status(299).is_success());
        assert!(!response.clone().with_status(304).is_success());
        assert!(!response.with_status(500).is_success());
    }

    #[test]
    fn static_cache_rule_requires_basic_get_200() {
        let response = AssetResponse::ok("./a.png", "image/png", b"png");
        assert!(response.is_cacheable_static(Method::Get));
        assert!(!response.is_cacheable_static(Method::Post));
        assert!(!response.clone().with_status(404).is_cacheable_static(Method::Get));
        assert!(
            !response
                .with_kind(ResponseKind::Opaque)
                .is_cacheable_static(Method::Get)
        );
    }

    #[test]
    fn method_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Method::Get).unwrap(), "\"GET\"");
        assert_eq!(Method::Get.to_string(), "GET");
    }

    #[test]
    fn request_mode_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&RequestMode::NoCors).unwrap(),
            "\"no-cors\""
        );
        assert_eq!(
            serde_json::to_string(&RequestMode::Navigate).unwrap(),
            "\"navigate\""
        );
    }
}
