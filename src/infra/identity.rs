//! Identity-provider token verification.
//!
//! Customers sign in with the hosted identity provider and hand its RS256
//! ID token to `/api/auth/verify`. Signing keys are published as a JWKS
//! document; they are fetched with `reqwest` and cached on the verifier
//! for an hour. A token carrying an unknown `kid` forces one refetch so
//! key rotation is picked up without waiting for the cache to expire.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::{IdentitySettings, DEV_DISPLAY_NAME, DEV_TOKEN_PREFIX, IDENTITY_ISSUER_PREFIX};
use crate::domain::VerifiedIdentity;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const JWKS_CACHE_DURATION: Duration = Duration::from_secs(3600);
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Verifies identity-provider tokens.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify `token` and return the identity it asserts.
    ///
    /// Invalid or expired tokens give `AppError::Identity`; an unreachable
    /// key endpoint gives `AppError::Upstream`.
    async fn verify(&self, token: &str) -> AppResult<VerifiedIdentity>;
}

/// Claims read from a provider ID token
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    email: Option<String>,
    phone_number: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kty: String,
    kid: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

struct KeyCache {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<Instant>,
}

impl KeyCache {
    fn is_fresh(&self) -> bool {
        self.fetched_at
            .map(|at| at.elapsed() < JWKS_CACHE_DURATION)
            .unwrap_or(false)
    }
}

/// JWKS-backed verifier for RS256 provider tokens.
///
/// In development, `dev_email:<addr>` and `dev_phone:<number>` tokens are
/// accepted without a signature so the API can be driven locally.
pub struct JwksIdentityVerifier {
    settings: IdentitySettings,
    allow_dev_tokens: bool,
    client: reqwest::Client,
    cache: RwLock<KeyCache>,
}

impl JwksIdentityVerifier {
    pub fn new(settings: IdentitySettings, allow_dev_tokens: bool) -> Self {
        let client = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            settings,
            allow_dev_tokens,
            client,
            cache: RwLock::new(KeyCache {
                keys: HashMap::new(),
                fetched_at: None,
            }),
        }
    }

    async fn verify_provider_token(&self, token: &str) -> AppResult<VerifiedIdentity> {
        let project_id = self
            .settings
            .project_id
            .as_deref()
            .ok_or_else(|| AppError::Identity("identity provider is not configured".into()))?;

        let header = decode_header(token)
            .map_err(|e| AppError::Identity(format!("malformed token header: {}", e)))?;
        let kid = header
            .kid
            .ok_or_else(|| AppError::Identity("token has no key id".into()))?;

        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[project_id]);
        validation.set_issuer(&[format!("{}{}", IDENTITY_ISSUER_PREFIX, project_id)]);

        let claims = decode::<IdTokenClaims>(token, &key, &validation)
            .map_err(|e| AppError::Identity(e.to_string()))?
            .claims;

        if claims.sub.is_empty() {
            return Err(AppError::Identity("token subject is empty".into()));
        }

        Ok(VerifiedIdentity {
            uid: claims.sub,
            email: claims.email,
            phone: claims.phone_number,
            display_name: claims.name,
        })
    }

    async fn decoding_key(&self, kid: &str) -> AppResult<DecodingKey> {
        {
            let cache = self.cache.read().await;
            if cache.is_fresh() {
                if let Some(key) = cache.keys.get(kid) {
                    return Ok(key.clone());
                }
            }
        }

        let keys = self.fetch_keys().await?;

        let mut cache = self.cache.write().await;
        cache.keys = keys;
        cache.fetched_at = Some(Instant::now());

        cache
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| AppError::Identity(format!("unknown signing key '{}'", kid)))
    }

    async fn fetch_keys(&self) -> AppResult<HashMap<String, DecodingKey>> {
        let url = &self.settings.jwks_url;
        tracing::debug!(url = %url, "Fetching identity signing keys");

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!(error = %e, url = %url, "Failed to fetch JWKS");
            AppError::Upstream("identity signing keys unavailable".into())
        })?;

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), url = %url, "JWKS fetch returned non-success status");
            return Err(AppError::Upstream("identity signing keys unavailable".into()));
        }

        let jwks: Jwks = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse JWKS response");
            AppError::Upstream("identity signing keys unreadable".into())
        })?;

        let keys: HashMap<String, DecodingKey> = jwks
            .keys
            .iter()
            .filter_map(|jwk| Some((jwk.kid.clone()?, jwk_to_decoding_key(jwk)?)))
            .collect();

        tracing::info!(keys_count = keys.len(), "Identity signing keys refreshed");
        Ok(keys)
    }
}

#[async_trait]
impl IdentityVerifier for JwksIdentityVerifier {
    async fn verify(&self, token: &str) -> AppResult<VerifiedIdentity> {
        if self.allow_dev_tokens && token.starts_with(DEV_TOKEN_PREFIX) {
            return parse_dev_token(token);
        }
        self.verify_provider_token(token).await
    }
}

fn jwk_to_decoding_key(jwk: &Jwk) -> Option<DecodingKey> {
    if jwk.kty != "RSA" {
        tracing::debug!(kty = %jwk.kty, "Skipping non-RSA JWK");
        return None;
    }
    DecodingKey::from_rsa_components(jwk.n.as_ref()?, jwk.e.as_ref()?).ok()
}

/// `dev_email:a@b.dk` or `dev_phone:+4512345678`.
fn parse_dev_token(token: &str) -> AppResult<VerifiedIdentity> {
    let rest = token.strip_prefix(DEV_TOKEN_PREFIX).unwrap_or(token);
    let (kind, value) = rest
        .split_once(':')
        .filter(|(_, value)| !value.is_empty())
        .ok_or_else(|| AppError::Identity("malformed development token".into()))?;

    let uid = format!("{}{}", DEV_TOKEN_PREFIX, value.replace('@', "_").replace('+', ""));
    let (email, phone) = match kind {
        "email" => (Some(value.to_string()), None),
        "phone" => (None, Some(value.to_string())),
        other => {
            return Err(AppError::Identity(format!(
                "unknown development token kind '{}'",
                other
            )))
        }
    };

    Ok(VerifiedIdentity {
        uid,
        email,
        phone,
        display_name: Some(DEV_DISPLAY_NAME.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(jwks_url: String) -> IdentitySettings {
        IdentitySettings {
            project_id: Some("grocery-test".into()),
            jwks_url,
        }
    }

    #[test]
    fn test_dev_email_token() {
        let identity = parse_dev_token("dev_email:test@example.com").unwrap();
        assert_eq!(identity.uid, "dev_test_example.com");
        assert_eq!(identity.email.as_deref(), Some("test@example.com"));
        assert_eq!(identity.phone, None);
        assert_eq!(identity.display_name.as_deref(), Some("Dev User"));
    }

    #[test]
    fn test_dev_phone_token() {
        let identity = parse_dev_token("dev_phone:+4512345678").unwrap();
        assert_eq!(identity.uid, "dev_4512345678");
        assert_eq!(identity.phone.as_deref(), Some("+4512345678"));
        assert_eq!(identity.email, None);
    }

    #[test]
    fn test_malformed_dev_tokens_rejected() {
        for token in ["dev_", "dev_email", "dev_email:", "dev_sms:123"] {
            assert!(matches!(parse_dev_token(token), Err(AppError::Identity(_))), "{}", token);
        }
    }

    #[tokio::test]
    async fn test_dev_tokens_refused_outside_development() {
        let verifier = JwksIdentityVerifier::new(settings("http://127.0.0.1:9/jwks".into()), false);
        let result = verifier.verify("dev_email:test@example.com").await;
        assert!(matches!(result, Err(AppError::Identity(_))));
    }

    #[tokio::test]
    async fn test_dev_tokens_accepted_in_development() {
        let verifier = JwksIdentityVerifier::new(settings("http://127.0.0.1:9/jwks".into()), true);
        let identity = verifier.verify("dev_email:kunde@example.dk").await.unwrap();
        assert_eq!(identity.uid, "dev_kunde_example.dk");
    }

    #[tokio::test]
    async fn test_missing_project_is_identity_error() {
        let verifier = JwksIdentityVerifier::new(
            IdentitySettings {
                project_id: None,
                jwks_url: "http://127.0.0.1:9/jwks".into(),
            },
            false,
        );
        let result = verifier.verify("eyJhbGciOiJSUzI1NiJ9.e30.sig").await;
        assert!(matches!(result, Err(AppError::Identity(_))));
    }

    #[tokio::test]
    async fn test_garbage_token_is_identity_error() {
        let verifier = JwksIdentityVerifier::new(settings("http://127.0.0.1:9/jwks".into()), false);
        let result = verifier.verify("not-a-jwt").await;
        assert!(matches!(result, Err(AppError::Identity(_))));
    }

    /// HS256 token carrying `kid`; rejected by RS256 validation after key lookup.
    fn token_with_kid(kid: &str) -> String {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let header = Header {
            kid: Some(kid.to_string()),
            ..Header::default()
        };
        encode(
            &header,
            &serde_json::json!({"sub": "someone", "exp": 4_102_444_800_i64}),
            &EncodingKey::from_secret(b"not-the-provider-key"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_jwks_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let verifier = JwksIdentityVerifier::new(settings(format!("{}/jwks", server.uri())), false);
        let result = verifier.verify(&token_with_kid("k1")).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_unknown_kid_is_identity_error_and_keys_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "keys": [{
                    "kty": "RSA",
                    "kid": "known",
                    "alg": "RS256",
                    "use": "sig",
                    "n": "sXchDaQebHnPiGvyDOAT4saGEUetSyo9MKLOoWFsueri23bOdgWp4Dy1WlUzewbgBHod5pcM9H95GQRV3JDXboIRROSBigeC5yjU1hGzHHyXss8UDprecbAYxknTcQkhslANGRUZmdTOQ5qTRsLAt6BTYuyvVRdhS8exSZEy_c4gs_7svlJJQ4H9_NxsiIoLwAEk7-Q3UXERGYw_75IDrGA84-lA_-Ct4eTlXHBIY2EaV7t7LjJaynVJCpkv4LKjTTAumiGUIuQhrNhZLuF_RJLqHpM2kgWFLU7-VTdL1VbC2tejvcI2BlMkEpk1BzBZI0KQB0GaDWFLN-aEAw3vRw",
                    "e": "AQAB"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let verifier = JwksIdentityVerifier::new(settings(format!("{}/jwks", server.uri())), false);

        let result = verifier.verify(&token_with_kid("rotated-away")).await;
        assert!(matches!(result, Err(AppError::Identity(_))));

        // Known kid is served from the cache; the signature check then fails.
        let result = verifier.verify(&token_with_kid("known")).await;
        assert!(matches!(result, Err(AppError::Identity(_))));
    }
}
