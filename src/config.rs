use std::{env, time::Duration};

use secrecy::SecretString;

const DEFAULT_JWT_SECRET: &str = "dev_secret_key_change_in_production";

/// How the gate treats a bearer credential that cannot be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthFallback {
    /// Malformed headers and failed tokens fall through to the license check.
    Lenient,
    /// Malformed headers are rejected with 401 and failed tokens with 403.
    Strict,
}

impl AuthFallback {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("strict") {
            AuthFallback::Strict
        } else {
            AuthFallback::Lenient
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub app_env: String,
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub users_collection: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub licenses: Vec<SecretString>,
    pub token_verify_timeout: Duration,
    pub auth_fallback: AuthFallback,
    pub disabled_modules: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            mongo_conn_string: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "cuestionario".to_string()),
            users_collection: env::var("USERS_COLLECTION")
                .unwrap_or_else(|_| "usuarios".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_server_port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt_secret: SecretString::from(
                env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
            ),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(3),
            licenses: split_list(&env::var("LICENCIAS").unwrap_or_default())
                .into_iter()
                .map(SecretString::from)
                .collect(),
            token_verify_timeout: Duration::from_millis(
                env::var("TOKEN_VERIFY_TIMEOUT_MS")
                    .ok()
                    .and_then(|ms| ms.parse().ok())
                    .unwrap_or(2000),
            ),
            auth_fallback: AuthFallback::parse(&env::var("AUTH_FALLBACK").unwrap_or_default()),
            disabled_modules: split_list(&env::var("DISABLED_MODULES").unwrap_or_default()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn is_module_disabled(&self, name: &str) -> bool {
        self.disabled_modules
            .iter()
            .any(|disabled| disabled.eq_ignore_ascii_case(name))
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == DEFAULT_JWT_SECRET {
            panic!(
                "FATAL: JWT_SECRET is using default value! Set JWT_SECRET environment variable to a secure random string."
            );
        }

        if jwt_secret.len() < 32 {
            panic!(
                "FATAL: JWT_SECRET is too short ({}). Must be at least 32 characters for security.",
                jwt_secret.len()
            );
        }

        if self.licenses.is_empty() {
            log::warn!("LICENCIAS is empty; license-key access is disabled");
        }
    }

    /// Deterministic configuration for tests; never reads the environment.
    pub fn test_config() -> Self {
        Self {
            app_env: "test".to_string(),
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "cuestionario-test".to_string(),
            users_collection: "usuarios".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 3000,
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            licenses: vec![
                SecretString::from("LICENCIA_1_ACTIVA_2024_XYZ123".to_string()),
                SecretString::from("LICENCIA_2_ACTIVA_2024_ABC456".to_string()),
            ],
            token_verify_timeout: Duration::from_millis(500),
            auth_fallback: AuthFallback::Lenient,
            disabled_modules: Vec::new(),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_config_from_env_with_defaults() {
        let config = Config::from_env();

        assert!(!config.mongo_conn_string.is_empty());
        assert!(!config.mongo_db_name.is_empty());
        assert!(config.jwt_expiration_hours > 0);
    }

    #[test]
    fn test_test_config() {
        let config = Config::test_config();

        assert_eq!(config.mongo_db_name, "cuestionario-test");
        assert_eq!(config.users_collection, "usuarios");
        assert_eq!(config.licenses.len(), 2);
        assert_eq!(config.auth_fallback, AuthFallback::Lenient);
        assert!(!config.is_production());
    }

    #[test]
    fn test_split_list_trims_and_skips_blanks() {
        let items = split_list(" LIC_A , ,LIC_B,");
        assert_eq!(items, vec!["LIC_A".to_string(), "LIC_B".to_string()]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_auth_fallback_parse() {
        assert_eq!(AuthFallback::parse("strict"), AuthFallback::Strict);
        assert_eq!(AuthFallback::parse(" STRICT "), AuthFallback::Strict);
        assert_eq!(AuthFallback::parse("lenient"), AuthFallback::Lenient);
        assert_eq!(AuthFallback::parse("whatever"), AuthFallback::Lenient);
    }

    #[test]
    fn test_module_disabled_is_case_insensitive() {
        let mut config = Config::test_config();
        config.disabled_modules = vec!["Categorias".to_string()];

        assert!(config.is_module_disabled("categorias"));
        assert!(!config.is_module_disabled("preguntas"));
    }

    #[test]
    #[should_panic(expected = "default value")]
    fn test_production_rejects_default_secret() {
        let mut config = Config::test_config();
        config.jwt_secret = SecretString::from(DEFAULT_JWT_SECRET.to_string());
        config.validate_for_production();
    }

    #[test]
    fn test_production_accepts_long_secret() {
        let mut config = Config::test_config();
        config.jwt_secret = SecretString::from("a".repeat(48));
        config.validate_for_production();
        assert_eq!(config.jwt_secret.expose_secret().len(), 48);
    }
}
