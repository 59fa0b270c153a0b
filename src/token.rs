//! Session token (vqd) extraction from the seed response.

use crate::{Result, SearchError};

/// Delimiter pairs the token may be wrapped in, in priority order.
const DELIMITERS: [(&str, &str); 3] = [("vqd=\"", "\""), ("vqd=", "&"), ("vqd='", "'")];

/// Extracts the `vqd` session token from an HTML response body.
///
/// The token authorizes subsequent paginated requests and is scoped to
/// the keyword text it was requested for. Each delimiter pair is tried
/// in order; the first non-empty match wins. Returns
/// [`SearchError::TokenNotFound`] when no pair matches.
pub fn extract_vqd(body: &str, keywords: &str) -> Result<String> {
    for (open, close) in DELIMITERS {
        if let Some(start) = body.find(open) {
            let after = &body[start + open.len()..];
            if let Some(end) = after.find(close) {
                if end > 0 {
                    return Ok(after[..end].to_string());
                }
            }
        }
    }
    Err(SearchError::TokenNotFound {
        keywords: keywords.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_double_quoted() {
        let body = r#"<script>DDG.deep.initialize('/d.js?q=x&vqd="abc123"');</script>"#;
        assert_eq!(extract_vqd(body, "x").unwrap(), "abc123");
    }

    #[test]
    fn test_extract_bare_ampersand_terminated() {
        let body = "/d.js?q=rust&vqd=4-1234567890&p=1";
        assert_eq!(extract_vqd(body, "rust").unwrap(), "4-1234567890");
    }

    #[test]
    fn test_extract_single_quoted() {
        let body = "init({vqd:'tok'})".replace("vqd:", "vqd=");
        assert_eq!(extract_vqd(&body, "x").unwrap(), "tok");
    }

    #[test]
    fn test_double_quotes_take_priority() {
        // Both forms present; the quoted pair is tried first.
        let body = r#"vqd="quoted" vqd=bare&"#;
        assert_eq!(extract_vqd(body, "x").unwrap(), "quoted");
    }

    #[test]
    fn test_missing_token_errors_with_keywords() {
        let err = extract_vqd("<html><body>nothing here</body></html>", "rust lang").unwrap_err();
        match err {
            SearchError::TokenNotFound { keywords } => assert_eq!(keywords, "rust lang"),
            other => panic!("expected TokenNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_body() {
        assert!(extract_vqd("", "x").is_err());
    }

    #[test]
    fn test_empty_token_is_not_a_match() {
        // vqd="" matches the delimiters but captures nothing.
        assert!(extract_vqd(r#"vqd="""#, "x").is_err());
    }
}
