use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;

pub const EXPIRY_BUFFER_SECS: i64 = 30;

pub fn looks_like_jwt(token: &str) -> bool {
    token.split('.').count() == 3
}

/// `Bearer` for JWTs, `Token` for opaque DRF tokens.
pub fn authorization_header(token: &str) -> String {
    if looks_like_jwt(token) {
        format!("Bearer {}", token)
    } else {
        format!("Token {}", token)
    }
}

fn jwt_exp(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp").and_then(|v| v.as_i64())
}

/// True when a JWT's `exp` falls within `buffer_secs` of now. Opaque tokens never expire here.
pub fn is_token_expired(token: &str, buffer_secs: i64) -> bool {
    if !looks_like_jwt(token) {
        return false;
    }
    match jwt_exp(token) {
        Some(exp) => Utc::now().timestamp() + buffer_secs >= exp,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jwt_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(json!({"alg": "HS256", "typ": "JWT"}).to_string());
        let payload = URL_SAFE_NO_PAD.encode(json!({"exp": exp, "user_id": 7}).to_string());
        format!("{}.{}.sig", header, payload)
    }

    #[test]
    fn header_scheme_follows_token_shape() {
        assert_eq!(authorization_header("a.b.c"), "Bearer a.b.c");
        assert_eq!(authorization_header("9944b09199c62bcf"), "Token 9944b09199c62bcf");
    }

    #[test]
    fn expiry_honours_buffer() {
        let now = Utc::now().timestamp();
        assert!(!is_token_expired(&jwt_with_exp(now + 3600), EXPIRY_BUFFER_SECS));
        assert!(is_token_expired(&jwt_with_exp(now + 10), EXPIRY_BUFFER_SECS));
        assert!(is_token_expired(&jwt_with_exp(now - 10), 0));
        assert!(is_token_expired("a.not-base64!.c", 0));
        assert!(!is_token_expired("opaque", 0));
    }
}
