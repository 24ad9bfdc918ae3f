use crate::utils::error::{ClientError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

/// Access token 的 payload（只解碼、不驗簽，簽章由伺服器負責）
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<serde_json::Number>,
    #[serde(default)]
    pub iat: Option<serde_json::Number>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<i64> {
        let exp = self.exp.as_ref()?;
        exp.as_i64().or_else(|| exp.as_f64().map(|v| v.floor() as i64))
    }
}

pub fn decode_claims(token: &str) -> Result<TokenClaims> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_header), Some(payload), Some(_signature)) if segments.next().is_none() => payload,
        _ => {
            return Err(ClientError::TokenError {
                message: "access token is not a three-part JWT".to_string(),
            })
        }
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ClientError::TokenError {
            message: format!("payload is not valid base64url: {}", e),
        })?;

    serde_json::from_slice(&bytes).map_err(|e| ClientError::TokenError {
        message: format!("payload is not valid JSON: {}", e),
    })
}

/// 比較 `exp` 與目前時間，不允許時鐘誤差
pub fn is_expired(token: &str, now: i64) -> Result<bool> {
    let claims = decode_claims(token)?;
    let exp = claims.expires_at().ok_or_else(|| ClientError::TokenError {
        message: "payload has no exp claim".to_string(),
    })?;
    Ok(exp <= now)
}

#[cfg(test)]
pub(crate) fn encode_test_token(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.signature", header, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_claims() {
        let token = encode_test_token(&json!({"sub": "u1", "exp": 1_700_000_000, "iat": 1_699_999_000}));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("u1"));
        assert_eq!(claims.expires_at(), Some(1_700_000_000));
    }

    #[test]
    fn test_expiry_boundary_has_no_skew() {
        let token = encode_test_token(&json!({"exp": 1000}));
        assert!(is_expired(&token, 1000).unwrap());
        assert!(is_expired(&token, 1001).unwrap());
        assert!(!is_expired(&token, 999).unwrap());
    }

    #[test]
    fn test_fractional_exp() {
        let token = encode_test_token(&json!({"exp": 1500.75}));
        assert!(!is_expired(&token, 1499).unwrap());
        assert!(is_expired(&token, 1500).unwrap());
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(decode_claims("not-a-jwt").is_err());
        assert!(decode_claims("a.b.c.d").is_err());
        assert!(decode_claims("a.%%%.c").is_err());

        let no_exp = encode_test_token(&json!({"sub": "u1"}));
        assert!(matches!(
            is_expired(&no_exp, 0),
            Err(ClientError::TokenError { .. })
        ));
    }
}
