use http::header::AUTHORIZATION;
use http::header::COOKIE;
use http::HeaderMap;

const BEARER_PREFIX: &str = "Bearer ";

/// Where in the request a token was found.
///
/// Downstream response handling depends on this: a token that arrived via the
/// `Authorization` header belongs to an API client and stays in the response
/// body, while a cookie-borne token is moved back into a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLocation {
    Authorization,
    Cookie,
}

/// A token extracted from request headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedToken {
    pub token: String,
    pub location: TokenLocation,
}

/// Extract a bearer token from request headers.
///
/// Prefers an `Authorization: Bearer <token>` header; falls back to scanning
/// semicolon-delimited `Cookie` headers for an entry named `cookie_name`.
///
/// # Returns
/// The token and where it was found, or None if the request carries no token
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<ExtractedToken> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix(BEARER_PREFIX) {
            let token = token.trim();
            if !token.is_empty() {
                return Some(ExtractedToken {
                    token: token.to_string(),
                    location: TokenLocation::Authorization,
                });
            }
        }
    }

    for value in headers.get_all(COOKIE) {
        let Ok(value) = value.to_str() else {
            continue;
        };

        for entry in value.split(';') {
            let mut parts = entry.trim().splitn(2, '=');
            let name = parts.next().unwrap_or_default();
            let token = parts.next().unwrap_or_default();

            if name == cookie_name && !token.is_empty() {
                return Some(ExtractedToken {
                    token: token.to_string(),
                    location: TokenLocation::Cookie,
                });
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    const COOKIE_NAME: &str = "access_token";

    fn headers(entries: &[(http::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in entries {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_authorization_header() {
        let headers = headers(&[(AUTHORIZATION, "Bearer abc.def.ghi")]);

        let extracted = extract_token(&headers, COOKIE_NAME).expect("token");
        assert_eq!(extracted.token, "abc.def.ghi");
        assert_eq!(extracted.location, TokenLocation::Authorization);
    }

    #[test]
    fn test_cookie_fallback() {
        let headers = headers(&[(COOKIE, "theme=dark; access_token=abc.def.ghi; lang=en")]);

        let extracted = extract_token(&headers, COOKIE_NAME).expect("token");
        assert_eq!(extracted.token, "abc.def.ghi");
        assert_eq!(extracted.location, TokenLocation::Cookie);
    }

    #[test]
    fn test_authorization_preferred_over_cookie() {
        let headers = headers(&[
            (AUTHORIZATION, "Bearer from-header"),
            (COOKIE, "access_token=from-cookie"),
        ]);

        let extracted = extract_token(&headers, COOKIE_NAME).expect("token");
        assert_eq!(extracted.token, "from-header");
        assert_eq!(extracted.location, TokenLocation::Authorization);
    }

    #[test]
    fn test_no_token() {
        assert!(extract_token(&HeaderMap::new(), COOKIE_NAME).is_none());

        let headers = headers(&[(COOKIE, "theme=dark")]);
        assert!(extract_token(&headers, COOKIE_NAME).is_none());
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let headers = headers(&[(AUTHORIZATION, "Bearer "), (COOKIE, "access_token=")]);
        assert!(extract_token(&headers, COOKIE_NAME).is_none());
    }

    #[test]
    fn test_non_bearer_authorization_falls_back_to_cookie() {
        let headers = headers(&[
            (AUTHORIZATION, "Basic dXNlcjpwYXNz"),
            (COOKIE, "access_token=abc.def.ghi"),
        ]);

        let extracted = extract_token(&headers, COOKIE_NAME).expect("token");
        assert_eq!(extracted.location, TokenLocation::Cookie);
    }
}
