pub fn build_session_cookie(
    raw_token: &str,
    max_age_secs: u64,
    cookie_domain: &Option<String>,
    secure: bool,
) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    let same_site = if secure { "Strict" } else { "Lax" };

    let mut cookie = format!(
        "session_token={}; HttpOnly{}; SameSite={}; Path=/auth; Max-Age={}",
        raw_token, secure_flag, same_site, max_age_secs
    );

    if let Some(domain) = cookie_domain {
        cookie.push_str(&format!("; Domain={}", domain));
    }

    cookie
}

pub fn build_clear_cookie(cookie_domain: &Option<String>, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    let same_site = if secure { "Strict" } else { "Lax" };

    let mut cookie = format!(
        "session_token=; HttpOnly{}; SameSite={}; Path=/auth; Max-Age=0",
        secure_flag, same_site
    );

    if let Some(domain) = cookie_domain {
        cookie.push_str(&format!("; Domain={}", domain));
    }

    cookie
}

pub fn extract_session_token(cookie_header: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let trimmed = part.trim();
        if let Some(value) = trimmed.strip_prefix("session_token=") {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_cookie_attributes() {
        let cookie = build_session_cookie("abc123", 3600, &None, true);
        assert!(cookie.starts_with("session_token=abc123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=3600"));
    }

    #[test]
    fn insecure_cookie_relaxes_same_site() {
        let cookie = build_session_cookie("abc123", 3600, &None, false);
        assert!(!cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
    }

    #[test]
    fn domain_appended_when_configured() {
        let cookie = build_session_cookie("abc", 60, &Some("example.com".into()), true);
        assert!(cookie.ends_with("Domain=example.com"));
    }

    #[test]
    fn extract_finds_token_among_other_cookies() {
        let header = "theme=dark; session_token=tok_123; locale=en";
        assert_eq!(extract_session_token(header).as_deref(), Some("tok_123"));
        assert_eq!(extract_session_token("theme=dark"), None);
        assert_eq!(extract_session_token("session_token="), None);
    }

    #[test]
    fn clear_cookie_zeroes_max_age() {
        let cookie = build_clear_cookie(&None, true);
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.starts_with("session_token=;"));
    }
}
