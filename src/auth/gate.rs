use std::{sync::Arc, time::Duration};

use actix_web::http::header::HeaderMap;

use crate::{
    auth::{
        credentials::{extract_bearer_token, extract_license_key},
        license::fingerprint,
        AuthDecision, AuthError, Identity, LicenseGrant, LicenseRegistry, RoutePolicy,
        TokenError, TokenVerifier,
    },
    config::{AuthFallback, Config},
    models::domain::Role,
};

#[derive(Debug, Clone, Copy)]
pub struct GateOptions {
    pub verify_timeout: Duration,
    pub fallback: AuthFallback,
}

impl GateOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            verify_timeout: config.token_verify_timeout,
            fallback: config.auth_fallback,
        }
    }
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            verify_timeout: Duration::from_secs(2),
            fallback: AuthFallback::Lenient,
        }
    }
}

/// Decides, per request, whether it proceeds and with which credential.
///
/// Tokens are tried first. A token that fails verification falls through to
/// the license check (unless the fallback mode is strict), so only running
/// out of both credentials is fatal. Role-restricted routes additionally need
/// a token identity; a license never satisfies a role requirement.
pub struct Gate {
    verifier: Arc<dyn TokenVerifier>,
    licenses: Arc<dyn LicenseRegistry>,
    options: GateOptions,
}

impl Gate {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        licenses: Arc<dyn LicenseRegistry>,
        options: GateOptions,
    ) -> Self {
        Self {
            verifier,
            licenses,
            options,
        }
    }

    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
        query: &str,
        policy: &RoutePolicy,
    ) -> Result<AuthDecision, AuthError> {
        if *policy == RoutePolicy::Public {
            return Ok(AuthDecision::Public);
        }

        let decision = self.check_credentials(headers, query).await?;

        if let RoutePolicy::Roles(allowed) = policy {
            authorize(&decision, allowed)?;
        }

        Ok(decision)
    }

    async fn check_credentials(
        &self,
        headers: &HeaderMap,
        query: &str,
    ) -> Result<AuthDecision, AuthError> {
        match extract_bearer_token(headers) {
            Ok(Some(token)) => {
                if let Some(identity) = self.verify_token(&token).await? {
                    return Ok(AuthDecision::Token(identity));
                }
            }
            Ok(None) => {}
            Err(err) if self.options.fallback == AuthFallback::Strict => return Err(err),
            Err(err) => log::debug!("Ignoring authorization header ({}); trying license", err),
        }

        let Some(key) = extract_license_key(headers, query) else {
            return Err(AuthError::MissingCredential);
        };

        let valid = self.licenses.contains(&key).await.map_err(|e| {
            log::error!("License registry failure: {}", e);
            AuthError::Infrastructure(e.to_string())
        })?;

        if valid {
            Ok(AuthDecision::License(LicenseGrant::new(key)))
        } else {
            log::info!("Rejected unknown license {}", fingerprint(&key));
            Err(AuthError::InvalidLicense)
        }
    }

    /// `Ok(None)` means the token was rejected and the license path may run.
    async fn verify_token(&self, token: &str) -> Result<Option<Identity>, AuthError> {
        let outcome =
            tokio::time::timeout(self.options.verify_timeout, self.verifier.verify(token)).await;

        match outcome {
            Err(_) => {
                log::error!(
                    "Token verification timed out after {:?}",
                    self.options.verify_timeout
                );
                Err(AuthError::Infrastructure(
                    "token verification timed out".to_string(),
                ))
            }
            Ok(Ok(claims)) => Ok(Some(Identity::from(claims))),
            Ok(Err(TokenError::Unavailable(reason))) => {
                log::error!("Token verifier unavailable: {}", reason);
                Err(AuthError::Infrastructure(reason))
            }
            Ok(Err(err)) if self.options.fallback == AuthFallback::Strict => {
                Err(AuthError::InvalidToken(err.to_string()))
            }
            Ok(Err(err)) => {
                log::debug!("Bearer token rejected ({}); trying license", err);
                Ok(None)
            }
        }
    }
}

/// Role check for a granted decision.
pub fn authorize(decision: &AuthDecision, allowed: &[Role]) -> Result<(), AuthError> {
    match decision {
        AuthDecision::Token(identity) if allowed.contains(&identity.role) => Ok(()),
        AuthDecision::Token(identity) => Err(AuthError::ForbiddenRole(identity.role)),
        AuthDecision::License(_) => Err(AuthError::RoleRequiredButLicenseUsed),
        AuthDecision::Public => Err(AuthError::MissingCredential),
    }
}
