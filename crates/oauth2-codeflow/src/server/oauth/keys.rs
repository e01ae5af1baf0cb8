//! Token signing keys.
//!
//! One RSA keypair is generated per process. Tokens are RS256 JWTs whose
//! header names the key id, so anyone holding the published JWKS can verify
//! them without calling back into this server.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

use super::types::AccessTokenClaims;
use crate::error::{OAuthError, OAuthResult, TokenRejection};

/// Modulus size of the generated signing key.
pub const RSA_KEY_BITS: usize = 2048;

/// The server's signing identity for the lifetime of the process.
pub struct KeyMaterial {
    key_id: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
    public: RsaPublicKey,
}

impl KeyMaterial {
    /// Generate a fresh RSA-2048 keypair.
    ///
    /// CPU-bound; call it once at startup.
    pub fn generate() -> OAuthResult<Self> {
        let private = RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)?;
        Self::from_private_key(&private)
    }

    fn from_private_key(private: &RsaPrivateKey) -> OAuthResult<Self> {
        let public = private.to_public_key();
        let private_der = private.to_pkcs1_der()?;
        let public_der = public.to_pkcs1_der()?;

        Ok(Self {
            key_id: uuid::Uuid::new_v4().simple().to_string(),
            encoding: EncodingKey::from_rsa_der(private_der.as_bytes()),
            decoding: DecodingKey::from_rsa_der(public_der.as_bytes()),
            public,
        })
    }

    /// Key id carried in every token header and in the JWKS.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

/// Signs access tokens and publishes the key that verifies them.
///
/// The engine and guard hold this as a trait object so the signing backend
/// can be swapped without touching the flow.
pub trait TokenSigner: Send + Sync {
    /// Sign a claim set into a compact JWT.
    fn sign(&self, claims: &AccessTokenClaims) -> OAuthResult<String>;

    /// Check signature and expiry, returning the claims.
    fn verify(&self, token: &str) -> OAuthResult<AccessTokenClaims>;

    /// Public verification keys.
    fn jwks(&self) -> JwkSet;
}

impl TokenSigner for KeyMaterial {
    /// Sign a claim set into a compact RS256 JWT.
    fn sign(&self, claims: &AccessTokenClaims) -> OAuthResult<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.key_id.clone());
        Ok(jsonwebtoken::encode(&header, claims, &self.encoding)?)
    }

    /// Verify signature and expiry of a token issued with this key.
    ///
    /// Only a past `exp` is reported as expired; any other failure means the
    /// token is not one of ours.
    fn verify(&self, token: &str) -> OAuthResult<AccessTokenClaims> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;

        jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token verification failed");
                match e.kind() {
                    ErrorKind::ExpiredSignature => OAuthError::InvalidToken(TokenRejection::Expired),
                    _ => OAuthError::InvalidToken(TokenRejection::Unknown),
                }
            })
    }

    /// Public verification key as a JSON Web Key Set.
    fn jwks(&self) -> JwkSet {
        JwkSet {
            keys: vec![Jwk {
                kty: "RSA".to_string(),
                use_: "sig".to_string(),
                alg: "RS256".to_string(),
                kid: self.key_id.clone(),
                n: URL_SAFE_NO_PAD.encode(self.public.n().to_bytes_be()),
                e: URL_SAFE_NO_PAD.encode(self.public.e().to_bytes_be()),
            }],
        }
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial").field("key_id", &self.key_id).finish()
    }
}

/// A JWKS document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

/// An RSA public key in JWK form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(rename = "use")]
    pub use_: String,
    pub alg: String,
    pub kid: String,
    pub n: String,
    pub e: String,
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;

    static KEYS: LazyLock<KeyMaterial> =
        LazyLock::new(|| KeyMaterial::generate().expect("key generation"));

    fn claims(exp_offset: i64) -> AccessTokenClaims {
        let now = chrono::Utc::now().timestamp();
        AccessTokenClaims {
            sub: "user123".into(),
            iat: now,
            exp: now + exp_offset,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn test_sign_and_verify() {
        let original = claims(3600);
        let token = KEYS.sign(&original).unwrap();

        // Compact JWS: header.payload.signature
        assert_eq!(token.split('.').count(), 3);

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some(KEYS.key_id()));

        assert_eq!(KEYS.verify(&token).unwrap(), original);
    }

    #[test]
    fn test_expired_token_fails_verification() {
        let token = KEYS.sign(&claims(-120)).unwrap();
        assert!(matches!(
            KEYS.verify(&token),
            Err(OAuthError::InvalidToken(TokenRejection::Expired))
        ));
    }

    #[test]
    fn test_tampered_token_fails_verification() {
        let token = KEYS.sign(&claims(3600)).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(r#"{"sub":"admin","iat":0,"exp":9999999999,"jti":"x"}"#);
        parts[1] = &forged;
        assert!(matches!(
            KEYS.verify(&parts.join(".")),
            Err(OAuthError::InvalidToken(TokenRejection::Unknown))
        ));
    }

    #[test]
    fn test_garbage_token_is_unknown_not_expired() {
        assert!(matches!(
            KEYS.verify("not-a-jwt"),
            Err(OAuthError::InvalidToken(TokenRejection::Unknown))
        ));
    }

    #[test]
    fn test_jwks_verifies_issued_tokens() {
        let jwks = KEYS.jwks();
        assert_eq!(jwks.keys.len(), 1);

        let jwk = &jwks.keys[0];
        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.use_, "sig");
        assert_eq!(jwk.kid, KEYS.key_id());
        // 65537
        assert_eq!(jwk.e, "AQAB");

        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e).unwrap();
        let token = KEYS.sign(&claims(3600)).unwrap();
        let decoded = jsonwebtoken::decode::<AccessTokenClaims>(
            &token,
            &key,
            &Validation::new(Algorithm::RS256),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, "user123");
    }

    #[test]
    fn test_debug_omits_key_bytes() {
        let debug = format!("{:?}", *KEYS);
        assert!(debug.contains(KEYS.key_id()));
        assert!(!debug.contains("encoding"));
    }
}
