use chrono::{Duration, Utc};
use pasetors::claims::{Claims, ClaimsValidationRules};
use pasetors::keys::SymmetricKey;
use pasetors::local;
use pasetors::token::UntrustedToken;
use pasetors::version4::V4;
use serde_json::json;
use tracing::instrument;

use crate::settings::Secret;
use crate::types::{SessionUser, TokenError};

/// Issues and reads the PASETO v4.local token kept in the session cookie.
///
/// The token encrypts the sanitized user (`id`, `role`) and an expiry; the
/// configured HMAC secret is bound in as the implicit assertion.
#[derive(Clone)]
pub struct SessionTokens {
    key: Vec<u8>,
    implicit_assertion: Vec<u8>,
    lifetime: Duration,
}

impl SessionTokens {
    pub fn new(secret: &Secret) -> Result<Self, TokenError> {
        let key = secret.secret_key.as_bytes().to_vec();
        // Reject a malformed key at startup rather than on the first login.
        SymmetricKey::<V4>::from(&key).map_err(|e| TokenError::Key(e.to_string()))?;

        let lifetime = Duration::try_minutes(secret.token_expiration)
            .filter(|lifetime| *lifetime > Duration::zero())
            .ok_or_else(|| TokenError::Key("token_expiration must be a positive number of minutes".to_string()))?;

        Ok(Self {
            key,
            implicit_assertion: secret.hmac_secret.as_bytes().to_vec(),
            lifetime,
        })
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    fn key(&self) -> Result<SymmetricKey<V4>, TokenError> {
        SymmetricKey::<V4>::from(&self.key).map_err(|e| TokenError::Key(e.to_string()))
    }

    #[instrument(name = "Issue session token", skip(self, user), fields(user_id = %user.id))]
    pub fn issue(&self, user: &SessionUser) -> Result<String, TokenError> {
        let expires_at = Utc::now() + self.lifetime;

        let mut claims = Claims::new().map_err(|e| TokenError::Issue(e.to_string()))?;
        claims
            .expiration(&expires_at.to_rfc3339())
            .map_err(|e| TokenError::Issue(e.to_string()))?;
        claims
            .add_additional("id", json!(user.id))
            .map_err(|e| TokenError::Issue(e.to_string()))?;
        claims
            .add_additional("role", json!(user.role))
            .map_err(|e| TokenError::Issue(e.to_string()))?;

        local::encrypt(
            &self.key()?,
            &claims,
            None,
            Some(self.implicit_assertion.as_slice()),
        )
        .map_err(|e| TokenError::Issue(e.to_string()))
    }

    /// Decrypts `token` and checks its expiry.
    #[instrument(name = "Verify session token", skip(self, token))]
    pub fn verify(&self, token: &str) -> Result<SessionUser, TokenError> {
        let untrusted_token = UntrustedToken::<pasetors::token::Local, V4>::try_from(token)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        let trusted_token = local::decrypt(
            &self.key()?,
            &untrusted_token,
            &ClaimsValidationRules::new(),
            None,
            Some(self.implicit_assertion.as_slice()),
        )
        .map_err(|e| TokenError::Invalid(e.to_string()))?;

        let claims = trusted_token
            .payload_claims()
            .ok_or_else(|| TokenError::Invalid("token carries no claims".to_string()))?;

        let id = claims
            .get_claim("id")
            .ok_or_else(|| TokenError::Invalid("missing id claim".to_string()))?;
        let role = claims
            .get_claim("role")
            .ok_or_else(|| TokenError::Invalid("missing role claim".to_string()))?;

        Ok(SessionUser {
            id: serde_json::from_value(id.clone()).map_err(|e| TokenError::Invalid(e.to_string()))?,
            role: serde_json::from_value(role.clone())
                .map_err(|e| TokenError::Invalid(e.to_string()))?,
        })
    }
}
