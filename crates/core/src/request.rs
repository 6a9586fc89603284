//! Intercepted request model and classification.

/// Media-type token that marks an Accept header as a page load.
const HTML_TOKEN: &str = "text/html";

/// How an intercepted request should be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Top-level page load; served network-first.
    Navigation,
    /// Script, style, image, or data fetch; served cache-first.
    Subresource,
}

/// A request captured at the interception boundary.
///
/// Carries only what classification and cache lookup need. Bodies are
/// never captured; only GET requests are ever intercepted.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method, uppercase.
    pub method: String,
    /// Absolute request URL.
    pub url: String,
    /// Accept header, if the request carried one.
    pub accept: Option<String>,
    /// Transport-level navigation flag set by the host.
    pub navigation: bool,
}

impl RequestDescriptor {
    /// A plain GET for `url` with no headers and no navigation flag.
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: "GET".into(), url: url.into(), accept: None, navigation: false }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Mark as a page load at the transport level.
    pub fn as_navigation(mut self) -> Self {
        self.navigation = true;
        self
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    /// Classify as a page load or a subresource fetch.
    ///
    /// Navigation holds when the host flagged the request as a page load
    /// or when the Accept header asks for HTML. Total: every request
    /// classifies one way or the other.
    pub fn kind(&self) -> RequestKind {
        if self.navigation || self.accept.as_deref().is_some_and(|a| a.contains(HTML_TOKEN)) {
            RequestKind::Navigation
        } else {
            RequestKind::Subresource
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_flag_wins() {
        let req = RequestDescriptor::get("https://example.com/app").as_navigation();
        assert_eq!(req.kind(), RequestKind::Navigation);
    }

    #[test]
    fn test_accept_header_html() {
        let req = RequestDescriptor::get("https://example.com/app")
            .with_accept("text/html,application/xhtml+xml,*/*;q=0.8");
        assert_eq!(req.kind(), RequestKind::Navigation);
    }

    #[test]
    fn test_plain_fetch_is_subresource() {
        let req = RequestDescriptor::get("https://example.com/app.js");
        assert_eq!(req.kind(), RequestKind::Subresource);

        let req = RequestDescriptor::get("https://example.com/data.json").with_accept("application/json");
        assert_eq!(req.kind(), RequestKind::Subresource);
    }

    #[test]
    fn test_is_get_case_insensitive() {
        assert!(RequestDescriptor::get("https://example.com/").is_get());
        assert!(RequestDescriptor::get("https://example.com/").with_method("get").is_get());
        assert!(!RequestDescriptor::get("https://example.com/").with_method("POST").is_get());
    }
}
