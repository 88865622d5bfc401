//! Credential store for CourseHub: registration, login, profile updates
//! and bearer token verification.

use coursehub_config::{AuthConfig, BootstrapConfig};
use coursehub_database::{
    DatabaseError, NewUser, UpdateProfile, User, UserRepository, UserRole,
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

pub mod jwt;
pub mod password;
pub mod validation;

pub use jwt::{Claims, TokenIssuer};

const GENERATED_PASSWORD_LEN: usize = 24;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("User already exists")]
    UserExists,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid or missing token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("User not found")]
    UserNotFound,
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("{0}")]
    Internal(String),
}

/// A user together with a freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// What `ensure_bootstrap_admin` found or did.
#[derive(Debug, Clone)]
pub enum BootstrapOutcome {
    /// The bootstrap administrator already exists.
    Existing(User),
    /// A new bootstrap administrator was created. `generated_password` is
    /// set when no password was configured.
    Created {
        user: User,
        generated_password: Option<String>,
    },
    /// The configured email belongs to an ordinary account.
    EmailTaken(User),
}

#[derive(Clone)]
pub struct Authenticator {
    users: UserRepository,
    tokens: TokenIssuer,
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: &AuthConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: TokenIssuer::new(config),
        }
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    /// Self-service registration. New accounts are learners.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthSession, AuthError> {
        let user = self
            .create_user(email, password, name, UserRole::Learner)
            .await?;
        let token = self.tokens.issue(&user)?;
        info!(user = %user.public_id, "user registered");
        Ok(AuthSession { user, token })
    }

    /// Create an account with an explicit role.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: UserRole,
    ) -> Result<User, AuthError> {
        let request = self.new_user(email, password, name, role)?;
        self.users.create(&request).await.map_err(map_duplicate)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = validation::normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation("Email and password are required".into()));
        }

        let Some((user, hash)) = self.users.find_credentials(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify_password(password, &hash) {
            debug!(user = %user.public_id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        Ok(AuthSession { user, token })
    }

    /// Resolve a bearer token to its user. The user is re-read from the
    /// store so deleted accounts and role changes take effect immediately.
    pub async fn authenticate_token(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.verify(token)?;
        self.users
            .find_by_public_id(&claims.user_id)
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    /// Update name and/or email of an existing user.
    pub async fn update_profile(
        &self,
        user: &User,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, AuthError> {
        let name = name.map(validation::validate_name).transpose()?;
        let email = match email {
            Some(raw) => {
                let email = validation::normalize_email(raw);
                validation::validate_email(&email)?;
                Some(email)
            }
            None => None,
        };

        let update = UpdateProfile { name, email };
        let updated = self
            .users
            .update_profile(user.id, &update)
            .await
            .map_err(map_duplicate)?;
        info!(user = %updated.public_id, "profile updated");
        Ok(updated)
    }

    /// Make sure the configured bootstrap administrator exists.
    pub async fn ensure_bootstrap_admin(
        &self,
        config: &BootstrapConfig,
    ) -> Result<BootstrapOutcome, AuthError> {
        if let Some(existing) = self.users.find_bootstrap().await? {
            return Ok(BootstrapOutcome::Existing(existing));
        }

        let email = validation::normalize_email(&config.admin_email);
        if let Some(taken) = self.users.find_by_email(&email).await? {
            return Ok(BootstrapOutcome::EmailTaken(taken));
        }

        let (password, generated) = match config.admin_password.as_deref() {
            Some(password) if !password.is_empty() => (password.to_string(), None),
            _ => {
                let password = password::generate_random_password(GENERATED_PASSWORD_LEN);
                (password.clone(), Some(password))
            }
        };

        let request = self.new_user(&email, &password, &config.admin_name, UserRole::Admin)?;
        let user = self
            .users
            .create_bootstrap(&request)
            .await
            .map_err(map_duplicate)?;
        info!(user = %user.public_id, email = %user.email, "bootstrap administrator created");
        Ok(BootstrapOutcome::Created {
            user,
            generated_password: generated,
        })
    }

    fn new_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: UserRole,
    ) -> Result<NewUser, AuthError> {
        let email = validation::normalize_email(email);
        if email.is_empty() || password.is_empty() || name.trim().is_empty() {
            return Err(AuthError::Validation(
                "Email, password, and name are required".into(),
            ));
        }
        validation::validate_email(&email)?;
        validation::validate_password(password)?;
        let name = validation::validate_name(name)?;

        Ok(NewUser {
            email,
            name,
            password_hash: password::hash_password(password)?,
            role,
        })
    }
}

fn map_duplicate(err: DatabaseError) -> AuthError {
    match err {
        DatabaseError::Duplicate(_) => AuthError::UserExists,
        DatabaseError::NotFound(_) => AuthError::UserNotFound,
        other => AuthError::Database(other),
    }
}
