use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{Identity, JwtService},
    errors::{AppError, AppResult},
    models::{
        domain::User,
        dto::{
            request::{LoginRequest, RegisterRequest},
            response::UserDto,
        },
    },
    repositories::UserRepository,
    services::password::PasswordHasher,
};

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, jwt: Arc<JwtService>) -> Self {
        Self::with_hasher(repository, jwt, PasswordHasher::default())
    }

    pub fn with_hasher(
        repository: Arc<dyn UserRepository>,
        jwt: Arc<JwtService>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            repository,
            jwt,
            hasher,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<UserDto> {
        let email = request.email.trim().to_string();
        if email.is_empty() || request.password.is_empty() {
            return Err(AppError::ValidationError(
                "Email y password requeridos".to_string(),
            ));
        }
        request.validate()?;

        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(AppError::AlreadyExists("Usuario ya existe".to_string()));
        }

        let hash = self.hasher.hash(&request.password).await?;
        let user = User::new(&email, &hash, request.role.unwrap_or_default());
        let created = self.repository.create(user).await?;

        log::info!("Registered user {} with role {}", created.email, created.role);
        Ok(UserDto::from(created))
    }

    /// Checks credentials and issues a signed token.
    pub async fn login(&self, request: LoginRequest) -> AppResult<(UserDto, String)> {
        request.validate()?;
        let email = request.email.trim();

        let user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        if !self.hasher.verify(&request.password, &user.password).await? {
            log::info!("Rejected login for {}: wrong password", email);
            return Err(AppError::Unauthorized("Contraseña incorrecta".to_string()));
        }

        let identity = Identity {
            id: user.id_hex(),
            email: user.email.clone(),
            role: user.role,
        };
        let token = self.jwt.create_token(&identity)?;

        Ok((UserDto::from(user), token))
    }
}
