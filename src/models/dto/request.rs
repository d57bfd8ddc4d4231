use serde::Deserialize;
use validator::Validate;

use crate::models::domain::Role;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(email(message = "Email inválido"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Email y password requeridos"))]
    pub password: String,

    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email y password requeridos"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Email y password requeridos"))]
    pub password: String,
}

/// `?activo=true|false` (or `?active=` for age ranges) on catalog listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActiveFilterParams {
    pub activo: Option<String>,
    pub active: Option<String>,
}

impl ActiveFilterParams {
    pub fn value(&self) -> Option<bool> {
        self.activo
            .as_deref()
            .or(self.active.as_deref())
            .map(|raw| raw.trim().eq_ignore_ascii_case("true"))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerHistoryParams {
    pub pregunta: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            email: "profe@example.com".to_string(),
            password: "secreto".to_string(),
            role: None,
        };
        assert!(valid.validate().is_ok());

        let missing_password = RegisterRequest {
            password: String::new(),
            ..valid.clone()
        };
        assert!(missing_password.validate().is_err());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..valid
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_login_request_missing_fields_default_to_empty() {
        let request: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(request.email.is_empty());
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_active_filter_value() {
        let params = ActiveFilterParams {
            activo: Some("true".to_string()),
            active: None,
        };
        assert_eq!(params.value(), Some(true));

        let params = ActiveFilterParams {
            activo: None,
            active: Some("false".to_string()),
        };
        assert_eq!(params.value(), Some(false));

        assert_eq!(ActiveFilterParams::default().value(), None);
    }
}
