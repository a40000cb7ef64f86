//! JWT encoding and validation.
//!
//! The codec signs and verifies claim sets and knows nothing about users.
//! Expiry is checked against a caller-supplied timestamp rather than the
//! system clock so that callers can inject time.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// Token type for distinguishing access vs refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token presented on each protected request
    Access,
    /// Long-lived token exchanged for a new access token
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims shared by access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Token type
    #[serde(rename = "typ")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Signs and verifies tokens under one secret and algorithm.
#[derive(Clone)]
pub struct JwtCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtCodec {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            algorithm: config.algorithm(),
            encoding_key: EncodingKey::from_secret(config.secret()),
            decoding_key: DecodingKey::from_secret(config.secret()),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Serialize and sign a claim set. Identical claims produce identical tokens.
    pub fn encode(&self, claims: &Claims) -> Result<String, EncodeError> {
        jsonwebtoken::encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(EncodeError)
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// A token is expired when `exp <= now`. The signature is always checked
    /// before the expiry, so a tampered token that is also stale reports
    /// [`DecodeError::BadSignature`].
    pub fn decode(&self, token: &str, now: u64) -> Result<Claims, DecodeError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below against the injected time.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| classify(token, self.algorithm, &e))?;

        if token_data.claims.exp <= now {
            return Err(DecodeError::Expired);
        }

        Ok(token_data.claims)
    }
}

fn classify(
    token: &str,
    expected: Algorithm,
    error: &jsonwebtoken::errors::Error,
) -> DecodeError {
    match error.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => DecodeError::BadSignature,
        ErrorKind::ExpiredSignature => DecodeError::Expired,
        _ if names_other_algorithm(token, expected) => DecodeError::BadSignature,
        _ if only_signature_unreadable(token) => DecodeError::BadSignature,
        _ => DecodeError::Malformed,
    }
}

/// True when the header is a JSON object whose `alg` is not the configured
/// algorithm, including names such as `none` that jsonwebtoken cannot parse.
fn names_other_algorithm(token: &str, expected: Algorithm) -> bool {
    let header = token.split('.').next().unwrap_or_default();
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(header) else {
        return false;
    };
    let Ok(header) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
        return false;
    };
    match header.get("alg").and_then(serde_json::Value::as_str) {
        Some(alg) => alg.parse::<Algorithm>().ok() != Some(expected),
        None => false,
    }
}

/// True when the header and payload segments decode but everything after
/// the second dot does not.
fn only_signature_unreadable(token: &str) -> bool {
    let segments: Vec<&str> = token.splitn(3, '.').collect();
    let [header, payload, signature] = segments.as_slice() else {
        return false;
    };
    URL_SAFE_NO_PAD.decode(header).is_ok()
        && URL_SAFE_NO_PAD.decode(payload).is_ok()
        && URL_SAFE_NO_PAD.decode(signature).is_err()
}

/// Signing failed.
#[derive(Debug)]
pub struct EncodeError(jsonwebtoken::errors::Error);

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to encode token: {}", self.0)
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Reasons a presented token is rejected by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Expiry is at or before the verification time
    Expired,
    /// Signature does not verify under the configured secret and algorithm
    BadSignature,
    /// Not a parseable token or claim set
    Malformed,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Expired => write!(f, "Token has expired"),
            DecodeError::BadSignature => write!(f, "Token signature is invalid"),
            DecodeError::Malformed => write!(f, "Token is malformed"),
        }
    }
}

impl std::error::Error for DecodeError {}
