//! Request facts consumed by tenant resolution.

use std::collections::HashMap;

/// The parts of an incoming request that resolution strategies look at.
///
/// Header names are stored lower-cased; the host is normalised with
/// [`normalize_host`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantRequest {
    pub method: String,
    pub path: String,
    host: Option<String>,
    headers: HashMap<String, String>,
}

impl TenantRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the request host; ports and case are normalised away
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = normalize_host(host);
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Build from an `http` request.
    ///
    /// The host comes from the `Host` header, falling back to the URI
    /// authority (HTTP/2 requests carry it there). Non-UTF-8 header values
    /// are skipped.
    pub fn from_http<B>(request: &http::Request<B>) -> Self {
        let headers: HashMap<String, String> = request
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let host = headers
            .get("host")
            .map(String::as_str)
            .or_else(|| request.uri().host())
            .and_then(normalize_host);

        Self {
            method: request.method().as_str().to_string(),
            path: request.uri().path().to_string(),
            host,
            headers,
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Lower-case a host and strip any port.
///
/// `App.Example.com:8080` becomes `app.example.com`; bracketed IPv6 literals
/// keep their brackets. Blank input yields `None`.
pub fn normalize_host(raw: &str) -> Option<String> {
    let raw = raw.trim();

    let host = if raw.starts_with('[') {
        match raw.find(']') {
            Some(end) => &raw[..=end],
            None => raw,
        }
    } else {
        raw.split(':').next().unwrap_or(raw)
    };

    let host = host.trim_end_matches('.');
    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("App.Example.com"), Some("app.example.com".into()));
        assert_eq!(normalize_host("example.com:8080"), Some("example.com".into()));
        assert_eq!(normalize_host("example.com."), Some("example.com".into()));
        assert_eq!(normalize_host("[::1]:3000"), Some("[::1]".into()));
        assert_eq!(normalize_host("  "), None);
        assert_eq!(normalize_host(":80"), None);
    }

    #[test]
    fn test_from_http_uses_host_header() {
        let request = http::Request::builder()
            .method("POST")
            .uri("/api/users?page=2")
            .header("Host", "Acme.Example.com:443")
            .header("X-Tenant-ID", "tenant-1")
            .body(())
            .unwrap();

        let facts = TenantRequest::from_http(&request);
        assert_eq!(facts.method, "POST");
        assert_eq!(facts.path, "/api/users");
        assert_eq!(facts.host(), Some("acme.example.com"));
        assert_eq!(facts.header("x-tenant-id"), Some("tenant-1"));
        assert_eq!(facts.header("X-TENANT-ID"), Some("tenant-1"));
    }

    #[test]
    fn test_from_http_falls_back_to_authority() {
        let request = http::Request::builder()
            .uri("https://globex.example.com/dashboard")
            .body(())
            .unwrap();

        let facts = TenantRequest::from_http(&request);
        assert_eq!(facts.host(), Some("globex.example.com"));
    }

    #[test]
    fn test_without_host() {
        let request = http::Request::builder().uri("/health").body(()).unwrap();
        assert_eq!(TenantRequest::from_http(&request).host(), None);
    }
}
