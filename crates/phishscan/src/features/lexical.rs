//! Deterministic URL checks that need no network access.
//!
//! Each check returns the raw feature value. A URL that fails to parse is
//! an ordinary input here: checks that need a parsed URL simply yield 0.

use super::shorteners;
use url::{Host, Url};

/// URLs at or above this many characters are flagged as long.
pub const LONG_URL_THRESHOLD: usize = 54;

fn hostname(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// 1 if the host is a literal IPv4 or IPv6 address.
pub fn having_ip(url: &str) -> u32 {
    match Url::parse(url).ok().as_ref().and_then(Url::host) {
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => 1,
        _ => 0,
    }
}

/// 1 if the raw URL contains `@`.
pub fn have_at_sign(url: &str) -> u32 {
    u32::from(url.contains('@'))
}

/// 1 if the URL is at least [`LONG_URL_THRESHOLD`] characters long.
pub fn url_length(url: &str) -> u32 {
    if url.chars().count() < LONG_URL_THRESHOLD {
        0
    } else {
        1
    }
}

/// Number of non-empty `/`-separated path segments. Not clamped.
pub fn url_depth(url: &str) -> u32 {
    match Url::parse(url) {
        Ok(u) => u.path().split('/').filter(|s| !s.is_empty()).count() as u32,
        Err(_) => 0,
    }
}

/// Flags a `//` that appears after the scheme separator.
///
/// Uses the character index of the last `//` in the raw string. Index 7
/// deliberately yields 0, same as anything at or below 6; only 8 and up
/// are flagged. The forest was trained on exactly this split.
pub fn redirection(url: &str) -> u32 {
    let Some(byte_pos) = url.rfind("//") else {
        return 0;
    };
    let pos = url[..byte_pos].chars().count();
    match pos {
        0..=6 => 0,
        7 => 0,
        _ => 1,
    }
}

/// 1 if the hostname (not the scheme) contains `https`.
pub fn https_in_domain(url: &str) -> u32 {
    hostname(url).map_or(0, |h| u32::from(h.contains("https")))
}

/// 1 if the URL mentions a known link-shortening service.
pub fn tiny_url(url: &str) -> u32 {
    u32::from(shorteners::matches(url))
}

/// 1 if the hostname contains a hyphen.
pub fn prefix_suffix(url: &str) -> u32 {
    hostname(url).map_or(0, |h| u32::from(h.contains('-')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_having_ip() {
        assert_eq!(having_ip("http://192.168.1.1/x"), 1);
        assert_eq!(having_ip("http://[2001:db8::1]/login"), 1);
        assert_eq!(having_ip("http://example.com"), 0);
        assert_eq!(having_ip("not a url"), 0);
    }

    #[test]
    fn test_have_at_sign() {
        assert_eq!(have_at_sign("http://a@b.com"), 1);
        assert_eq!(have_at_sign("http://b.com"), 0);
        // Raw string check, parsing not required
        assert_eq!(have_at_sign("garbage@"), 1);
    }

    #[test]
    fn test_url_length_boundary() {
        let base = "http://example.com/";
        let url53 = format!("{base}{}", "a".repeat(53 - base.len()));
        let url54 = format!("{base}{}", "a".repeat(54 - base.len()));
        assert_eq!(url53.chars().count(), 53);
        assert_eq!(url_length(&url53), 0);
        assert_eq!(url_length(&url54), 1);
    }

    #[test]
    fn test_url_length_counts_characters() {
        // 53 characters, more than 54 bytes
        let url = format!("http://example.com/{}", "é".repeat(34));
        assert!(url.len() > 54);
        assert_eq!(url_length(&url), 0);
    }

    #[test]
    fn test_url_depth() {
        assert_eq!(url_depth("https://example.com"), 0);
        assert_eq!(url_depth("https://example.com/"), 0);
        assert_eq!(url_depth("https://example.com/a/b/c"), 3);
        assert_eq!(url_depth("https://example.com/a//b/?q=/x/y"), 2);
        assert_eq!(url_depth("::::"), 0);
    }

    #[test]
    fn test_url_depth_is_not_clamped() {
        assert_eq!(url_depth("https://example.com/1/2/3/4/5/6/7"), 7);
    }

    #[test]
    fn test_redirection_split() {
        // "http://" puts the last // at index 5
        assert_eq!(redirection("http://example.com"), 0);
        // "https://" puts it at 6
        assert_eq!(redirection("https://example.com"), 0);
        // index 7 is not flagged
        assert_eq!(redirection("httpss://example.com"), 0);
        // index 8 is
        assert_eq!(redirection("http://a//b"), 1);
        assert_eq!(redirection("https://example.com//http://evil.com"), 1);
        assert_eq!(redirection("no slashes here"), 0);
    }

    #[test]
    fn test_https_in_domain_checks_host_only() {
        assert_eq!(https_in_domain("http://https-secure.example.com"), 1);
        assert_eq!(https_in_domain("https://example.com"), 0);
        assert_eq!(https_in_domain("http://example.com/https"), 0);
        assert_eq!(https_in_domain("nonsense"), 0);
    }

    #[test]
    fn test_prefix_suffix() {
        assert_eq!(prefix_suffix("http://pay-pal.com"), 1);
        assert_eq!(prefix_suffix("http://paypal.com/a-b"), 0);
        assert_eq!(prefix_suffix("-"), 0);
    }

    #[test]
    fn test_tiny_url() {
        assert_eq!(tiny_url("http://bit.ly/xyz"), 1);
        assert_eq!(tiny_url("https://www.rust-lang.org/learn"), 0);
    }
}
