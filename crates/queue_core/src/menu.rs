//! Context-menu items, the keyboard command, and WebExtension match patterns.

use thiserror::Error;
use url::Url;

pub const MENU_ADD_PAGE: &str = "cq_add_page";
pub const MENU_ADD_LINK: &str = "cq_add_link";
pub const COMMAND_ADD_HOVERED_LINK: &str = "add-hovered-link";

/// Sites the menu items are offered on.
pub const MEDIA_URL_PATTERNS: [&str; 3] = [
    "*://*.youtube.com/*",
    "*://youtu.be/*",
    "*://*.soundcloud.com/*",
];

const SUPPORTED_HOSTS: [&str; 3] = ["youtube.com", "youtu.be", "soundcloud.com"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuContext {
    Page,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: &'static str,
    pub title: &'static str,
    pub context: MenuContext,
    /// Patterns the page URL must match (page items).
    pub document_patterns: Vec<MatchPattern>,
    /// Patterns the link URL must match (link items).
    pub target_patterns: Vec<MatchPattern>,
}

impl MenuItem {
    /// Whether the browser would show this item for the given page/link.
    pub fn applies_to(&self, page_url: &str, link_url: Option<&str>) -> bool {
        let any_match = |patterns: &[MatchPattern], url: &str| {
            patterns.is_empty() || patterns.iter().any(|p| p.matches(url))
        };
        match self.context {
            MenuContext::Page => any_match(&self.document_patterns, page_url),
            MenuContext::Link => link_url.is_some_and(|link| any_match(&self.target_patterns, link)),
        }
    }
}

/// The two menu items registered on install.
pub fn menu_items() -> Vec<MenuItem> {
    let media: Vec<MatchPattern> = MEDIA_URL_PATTERNS
        .iter()
        .filter_map(|raw| MatchPattern::parse(raw).ok())
        .collect();
    vec![
        MenuItem {
            id: MENU_ADD_PAGE,
            title: "Add page to Cosmos Queue",
            context: MenuContext::Page,
            document_patterns: media.clone(),
            target_patterns: Vec::new(),
        },
        MenuItem {
            id: MENU_ADD_LINK,
            title: "Add link to Cosmos Queue",
            context: MenuContext::Link,
            document_patterns: Vec::new(),
            target_patterns: media,
        },
    ]
}

/// Hint used by the popup: the server validates anyway.
pub fn is_supported_media_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw.trim()) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    SUPPORTED_HOSTS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern {0:?} is missing '://'")]
    MissingScheme(String),
    #[error("pattern {0:?} has an unsupported scheme")]
    UnsupportedScheme(String),
    #[error("pattern {0:?} has no path")]
    MissingPath(String),
    #[error("pattern {0:?} has an invalid host")]
    InvalidHost(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SchemeMatch {
    /// `*` matches http and https only.
    HttpOrHttps,
    Exact(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HostMatch {
    Any,
    /// `*.example.com` matches the domain itself and every subdomain.
    Domain(String),
    Exact(String),
}

/// A WebExtension match pattern such as `*://*.youtube.com/*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPattern {
    scheme: SchemeMatch,
    host: HostMatch,
    path: String,
}

impl MatchPattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let (scheme, rest) = raw
            .split_once("://")
            .ok_or_else(|| PatternError::MissingScheme(raw.to_string()))?;
        let scheme = match scheme {
            "*" => SchemeMatch::HttpOrHttps,
            "http" | "https" | "ws" | "wss" | "ftp" | "file" => {
                SchemeMatch::Exact(scheme.to_string())
            }
            _ => return Err(PatternError::UnsupportedScheme(raw.to_string())),
        };
        let slash = rest
            .find('/')
            .ok_or_else(|| PatternError::MissingPath(raw.to_string()))?;
        let (host, path) = rest.split_at(slash);
        let host = match host {
            "*" => HostMatch::Any,
            _ => {
                if let Some(domain) = host.strip_prefix("*.") {
                    if domain.is_empty() || domain.contains('*') {
                        return Err(PatternError::InvalidHost(raw.to_string()));
                    }
                    HostMatch::Domain(domain.to_ascii_lowercase())
                } else if host.contains('*') {
                    return Err(PatternError::InvalidHost(raw.to_string()));
                } else {
                    HostMatch::Exact(host.to_ascii_lowercase())
                }
            }
        };
        Ok(Self {
            scheme,
            host,
            path: path.to_string(),
        })
    }

    pub fn matches(&self, raw_url: &str) -> bool {
        let Ok(url) = Url::parse(raw_url) else {
            return false;
        };
        let scheme_ok = match &self.scheme {
            SchemeMatch::HttpOrHttps => matches!(url.scheme(), "http" | "https"),
            SchemeMatch::Exact(scheme) => url.scheme() == scheme,
        };
        if !scheme_ok {
            return false;
        }
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let host_ok = match &self.host {
            HostMatch::Any => true,
            HostMatch::Domain(domain) => {
                host == *domain || host.ends_with(&format!(".{domain}"))
            }
            HostMatch::Exact(exact) => host == *exact,
        };
        if !host_ok {
            return false;
        }
        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }
        glob_match(&self.path, &path)
    }
}

// `*` matches any run of characters, everything else is literal.
fn glob_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or_default();
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };
    let tail: Vec<&str> = parts.collect();
    let Some((last, middle)) = tail.split_last() else {
        return rest.is_empty();
    };
    for part in middle {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_handles_leading_middle_and_trailing_stars() {
        assert!(glob_match("/*", "/watch?v=1"));
        assert!(glob_match("/a*c*e", "/abcde"));
        assert!(!glob_match("/a*c*e", "/abcd"));
        assert!(glob_match("/exact", "/exact"));
        assert!(!glob_match("/exact", "/exact/more"));
    }

    #[test]
    fn subdomain_pattern_matches_bare_domain() {
        let pattern = MatchPattern::parse("*://*.youtube.com/*").unwrap();
        assert!(pattern.matches("https://youtube.com/watch?v=1"));
        assert!(pattern.matches("http://m.youtube.com/"));
        assert!(!pattern.matches("https://notyoutube.com/"));
        assert!(!pattern.matches("ftp://www.youtube.com/"));
    }
}
