use url::Url;

/// Scheme and host the current request arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub scheme: String,
    pub host: String,
}

impl RequestOrigin {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }
}

/// Rewrites a stored relative path into an absolute URL for `origin`.
///
/// Empty paths stay empty and paths that are already absolute `http(s)` URLs
/// pass through untouched. A leading `./` or `/` is dropped.
pub fn absolute_url(path: &str, origin: &RequestOrigin) -> String {
    if path.is_empty() || path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let relative = path.trim_start_matches("./").trim_start_matches('/');
    let base = format!("{}://{}/", origin.scheme, origin.host);

    match Url::parse(&base).and_then(|base| base.join(relative)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}{}", base, relative),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> RequestOrigin {
        RequestOrigin::new("http", "example.com")
    }

    #[test]
    fn normalizes_dot_slash_prefix() {
        assert_eq!(
            absolute_url("./assets/images/skill/GO.png", &origin()),
            "http://example.com/assets/images/skill/GO.png"
        );
    }

    #[test]
    fn keeps_port_and_scheme() {
        let origin = RequestOrigin::new("https", "localhost:8080");
        assert_eq!(
            absolute_url("/assets/images/school/UI.jpg", &origin),
            "https://localhost:8080/assets/images/school/UI.jpg"
        );
    }

    #[test]
    fn passes_through_external_and_empty_paths() {
        assert_eq!(absolute_url("", &origin()), "");
        assert_eq!(
            absolute_url("https://cdn.example.org/go.svg", &origin()),
            "https://cdn.example.org/go.svg"
        );
    }
}
