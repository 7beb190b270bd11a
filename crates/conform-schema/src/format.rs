//! String format checks: email, url, uuid.

use std::sync::OnceLock;

use regex::Regex;

static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
static URL_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Local part of letters, digits and `_'+-.`, a domain of dot-separated
/// labels, and an alphabetic TLD of two or more letters. The local part
/// may not start with a dot and the address may not contain `..`.
pub fn is_email(s: &str) -> bool {
    if s.starts_with('.') || s.contains("..") {
        return false;
    }
    EMAIL_RE
        .get_or_init(|| {
            Regex::new(
                r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@(?:[A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$",
            )
            .ok()
        })
        .as_ref()
        .is_some_and(|re| re.is_match(s))
}

/// An absolute URL: `scheme://host[...]` with no whitespace.
pub fn is_url(s: &str) -> bool {
    URL_RE
        .get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s/?#]+[^\s]*$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(s))
}

/// A hyphenated UUID (`8-4-4-4-12` hex digits), any version.
pub fn is_uuid(s: &str) -> bool {
    s.len() == 36 && uuid::Uuid::parse_str(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        for email in [
            "dani@example.com",
            "dian@emxaple.com",
            "DANI@EXAMPLE.COM",
            "first.last+tag@sub.example.co.id",
            "o'neil@example.org",
        ] {
            assert!(is_email(email), "expected valid: {email}");
        }
    }

    #[test]
    fn test_invalid_emails() {
        for email in [
            "dani",
            "dn",
            "dani@example",
            ".dani@example.com",
            "da..ni@example.com",
            "dani@-example.com",
            "dani@example.c",
            "dani @example.com",
        ] {
            assert!(!is_email(email), "expected invalid: {email}");
        }
    }

    #[test]
    fn test_urls() {
        assert!(is_url("https://example.com"));
        assert!(is_url("http://localhost:8080/path?q=1"));
        assert!(!is_url("example.com"));
        assert!(!is_url("https://"));
        assert!(!is_url("https://exa mple.com"));
    }

    #[test]
    fn test_uuids() {
        assert!(is_uuid("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(!is_uuid("67e5504410b1426f9247bb680e5fe0c8"));
        assert!(!is_uuid("not-a-uuid"));
    }
}
