use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::{errors::INTERNAL_ERROR_MESSAGE, models::domain::Role};

/// Why the gate refused a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no credential presented")]
    MissingCredential,

    #[error("malformed credential: {0}")]
    MalformedCredential(String),

    #[error("token rejected: {0}")]
    InvalidToken(String),

    #[error("license key not recognised")]
    InvalidLicense,

    #[error("role '{0}' is not allowed on this route")]
    ForbiddenRole(Role),

    #[error("route requires a role but the request used a license")]
    RoleRequiredButLicenseUsed,

    #[error("authentication backend failure: {0}")]
    Infrastructure(String),
}

impl AuthError {
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::MalformedCredential(_) => "malformed_credential",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::InvalidLicense => "invalid_license",
            AuthError::ForbiddenRole(_) => "forbidden_role",
            AuthError::RoleRequiredButLicenseUsed => "role_required_but_license_used",
            AuthError::Infrastructure(_) => "internal_error",
        }
    }

    pub fn client_message(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => {
                "Acceso no autorizado. Envíe un token (Bearer o JWT) o una licencia"
            }
            AuthError::MalformedCredential(_) => "Formato de token inválido, use Bearer o JWT",
            AuthError::InvalidToken(_) => "Token inválido o expirado",
            AuthError::InvalidLicense => "Licencia inválida",
            AuthError::ForbiddenRole(_) => "Acceso denegado. Rol no autorizado.",
            AuthError::RoleRequiredButLicenseUsed => {
                "Acceso denegado. Esta ruta requiere iniciar sesión con un rol autorizado."
            }
            AuthError::Infrastructure(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

#[derive(Debug, Serialize)]
struct AuthErrorResponse {
    success: bool,
    message: &'static str,
    reason: &'static str,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredential | AuthError::MalformedCredential(_) => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::InvalidToken(_)
            | AuthError::InvalidLicense
            | AuthError::ForbiddenRole(_)
            | AuthError::RoleRequiredButLicenseUsed => StatusCode::FORBIDDEN,
            AuthError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(AuthErrorResponse {
            success: false,
            message: self.client_message(),
            reason: self.reason(),
        })
    }
}
