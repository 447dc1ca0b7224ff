/// Hostname and site-name extraction for the learner's domain signal
use url::Url;

/// Hostname of a URL, lowercased, without a leading "www."
///
/// Returns `Ok(None)` for URLs that parse but carry no host (`about:blank`,
/// `data:` URLs, ...).
pub fn hostname(url: &str) -> Result<Option<String>, url::ParseError> {
    let parsed = Url::parse(url.trim())?;

    Ok(parsed.host_str().map(|host| {
        let host = host.to_lowercase();
        match host.strip_prefix("www.") {
            Some(rest) => rest.to_string(),
            None => host,
        }
    }))
}

/// The registrable label of a hostname, with smart TLD handling
///
/// Algorithm:
/// 1. Split hostname by "."
/// 2. If the TLD is 2 letters AND the second-to-last label is "co" or "com",
///    the suffix is two labels long (e.g. "bbc.co.uk", "example.com.au")
/// 3. Otherwise the suffix is the last label
/// 4. Return the label right before the suffix
///
/// Examples:
/// - megastore.com → megastore
/// - docs.microsoft.com → microsoft
/// - news.bbc.co.uk → bbc
/// - localhost → localhost
///
/// IP addresses have no site name.
pub fn site_name(hostname: &str) -> Option<String> {
    if hostname.is_empty() || is_ip_address(hostname) {
        return None;
    }

    let parts: Vec<&str> = hostname.split('.').filter(|p| !p.is_empty()).collect();

    let label = match parts.len() {
        0 => return None,
        1 => parts[0],
        len => {
            let tld = parts[len - 1];
            let suffix_len = if len >= 3 && tld.len() == 2 && matches!(parts[len - 2], "co" | "com") {
                2
            } else {
                1
            };
            parts[len - suffix_len - 1]
        }
    };

    Some(label.to_string())
}

/// Check if a string looks like an IP address
fn is_ip_address(s: &str) -> bool {
    // IPv6 hosts come back from the url crate wrapped in brackets
    if s.starts_with('[') {
        return true;
    }
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_strips_www() {
        assert_eq!(
            hostname("https://www.megastore.com/deals").unwrap(),
            Some("megastore.com".to_string())
        );
        assert_eq!(
            hostname("http://Docs.Rust-Lang.org/book").unwrap(),
            Some("docs.rust-lang.org".to_string())
        );
    }

    #[test]
    fn test_hostname_without_host() {
        assert_eq!(hostname("about:blank").unwrap(), None);
    }

    #[test]
    fn test_hostname_parse_failure() {
        assert!(hostname("not a url").is_err());
        assert!(hostname("").is_err());
    }

    #[test]
    fn test_site_name_basic() {
        assert_eq!(site_name("megastore.com"), Some("megastore".to_string()));
        assert_eq!(site_name("docs.microsoft.com"), Some("microsoft".to_string()));
        assert_eq!(site_name("zinfandel.io"), Some("zinfandel".to_string()));
    }

    #[test]
    fn test_site_name_country_tlds() {
        assert_eq!(site_name("news.bbc.co.uk"), Some("bbc".to_string()));
        assert_eq!(site_name("shop.example.com.au"), Some("example".to_string()));
    }

    #[test]
    fn test_site_name_special_cases() {
        assert_eq!(site_name("localhost"), Some("localhost".to_string()));
        assert_eq!(site_name("192.168.1.1"), None);
        assert_eq!(site_name("[::1]"), None);
        assert_eq!(site_name(""), None);
    }
}
