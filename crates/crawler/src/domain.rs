use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("the host is empty")]
    EmptyHost,

    #[error("unrecognized host")]
    UnrecognizedHost,
}

static IPV4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:25[0-5]|2[0-4]\d|[01]?\d?\d)\.){3}(?:25[0-5]|2[0-4]\d|[01]?\d?\d)$")
        .expect("static ipv4 regex is valid")
});

/// Ordered so that specific two-part suffixes (`.com.uk`, `.gov.uk`, ...) are
/// tried before the generic two-letter country fallback (`.XX`) — order is
/// significant, see `SPEC_FULL.md` §4.8.2.
static DOMAIN_SUFFIXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\.(com|com\.\w{2})$",
        r"\.(gov|gov\.\w{2})$",
        r"\.(net|net\.\w{2})$",
        r"\.(org|org\.\w{2})$",
        r"\.me$",
        r"\.biz$",
        r"\.info$",
        r"\.name$",
        r"\.mobi$",
        r"\.so$",
        r"\.asia$",
        r"\.tel$",
        r"\.tv$",
        r"\.cc$",
        r"\.co$",
        r"\.(\w+\.)?\w{2}$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static domain suffix regex is valid"))
    .collect()
});

/// Extracts the registrable "primary domain" used to scope a crawl to a
/// single site (§4.8.2).
///
/// An IPv4 dotted-quad host is returned verbatim. Otherwise the first
/// matching suffix pattern in [`DOMAIN_SUFFIXES`] determines where the
/// primary domain begins: the substring from the last `.` before the match
/// (or the start of the host, if there is no earlier `.`) through the end of
/// the host.
///
/// # Errors
///
/// Returns [`DomainError::EmptyHost`] for a blank host (after trimming), or
/// [`DomainError::UnrecognizedHost`] if no suffix pattern matches.
pub fn primary_domain(host: &str) -> Result<String, DomainError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(DomainError::EmptyHost);
    }
    if IPV4.is_match(host) {
        return Ok(host.to_string());
    }

    let Some(suffix_start) = DOMAIN_SUFFIXES.iter().find_map(|re| re.find(host)).map(|m| m.start()) else {
        return Err(DomainError::UnrecognizedHost);
    };

    let first_part = &host[..suffix_start];
    let start = first_part.rfind('.').map_or(0, |idx| idx + 1);
    Ok(host[start..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sogou_strips_the_www_label() {
        assert_eq!(primary_domain("www.sogou.com").unwrap(), "sogou.com");
    }

    #[test]
    fn ipv4_host_is_returned_verbatim() {
        assert_eq!(primary_domain("10.0.0.1").unwrap(), "10.0.0.1");
    }

    #[test]
    fn generic_two_letter_fallback_after_country_suffix() {
        assert_eq!(primary_domain("a.b.co.uk").unwrap(), "b.co.uk");
    }

    #[test]
    fn empty_host_is_an_error() {
        assert_eq!(primary_domain(""), Err(DomainError::EmptyHost));
    }

    #[test]
    fn unmatched_suffix_is_unrecognized() {
        assert_eq!(primary_domain("localhost"), Err(DomainError::UnrecognizedHost));
    }

    #[test]
    fn primary_domain_is_idempotent() {
        let hosts = ["www.sogou.com", "10.0.0.1", "a.b.co.uk", "example.net"];
        for host in hosts {
            let once = primary_domain(host).unwrap();
            let twice = primary_domain(&once).unwrap();
            assert_eq!(once, twice);
        }
    }
}
