//! User account service.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use ladle_common::{AppError, AppResult, IdGenerator, StorageBackend, generate_storage_key};
use ladle_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::media::decode_data_url;

/// User service for registration, authentication and profile management.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    storage: Arc<dyn StorageBackend>,
    id_gen: IdGenerator,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(email, length(max = 254))]
    pub email: String,

    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(length(min = 1, max = 150))]
    pub first_name: String,

    #[validate(length(min = 1, max = 150))]
    pub last_name: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Input for changing the password of an authenticated user.
#[derive(Debug, Deserialize, Validate)]
pub struct SetPasswordInput {
    #[validate(length(min = 1))]
    pub current_password: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            user_repo,
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user account.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;
        validate_username(&input.username)?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Validation(
                "A user with this email already exists.".to_string(),
            ));
        }
        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Validation(
                "A user with this username already exists.".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(input.email),
            username: Set(input.username),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            password_hash: Set(password_hash),
            token: Set(None),
            avatar_url: Set(None),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.user_repo.create(model).await
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// List users ordered by username, with the total count.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<(u64, Vec<user::Model>)> {
        let count = self.user_repo.count().await?;
        let users = self.user_repo.find_page(limit, offset).await?;

        Ok((count, users))
    }

    /// Authenticate a user by access token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Authenticate by email and password, issuing an access token.
    ///
    /// The token is created on first login and reused until logout.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        // Unknown email and wrong password produce the same rejection.
        let rejection =
            || AppError::BadRequest("Unable to log in with provided credentials.".to_string());

        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(rejection)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(rejection());
        }

        if let Some(token) = user.token {
            return Ok(token);
        }

        let token = self.id_gen.generate_token();
        self.user_repo.set_token(&user.id, Some(token.clone())).await?;

        Ok(token)
    }

    /// Destroy the user's access token.
    pub async fn logout(&self, user_id: &str) -> AppResult<()> {
        self.user_repo.set_token(user_id, None).await?;
        Ok(())
    }

    /// Change the password, verifying the current one first.
    pub async fn set_password(&self, user_id: &str, input: SetPasswordInput) -> AppResult<()> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        if !verify_password(&input.current_password, &user.password_hash)? {
            return Err(AppError::Validation(
                "Current password is incorrect.".to_string(),
            ));
        }

        let password_hash = hash_password(&input.new_password)?;
        self.user_repo.set_password_hash(user_id, password_hash).await?;

        Ok(())
    }

    /// Set the user's avatar from a base64 data URL.
    ///
    /// Returns the public URL of the stored image.
    pub async fn set_avatar(&self, user_id: &str, data_url: &str) -> AppResult<String> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let image = decode_data_url(data_url)?;

        let key = generate_storage_key(&user.id, &image.extension);
        let stored = self
            .storage
            .upload(&key, &image.bytes, &image.content_type)
            .await?;

        self.user_repo
            .set_avatar_url(user_id, Some(stored.url.clone()))
            .await?;

        Ok(stored.url)
    }

    /// Remove the user's avatar, deleting the stored image.
    pub async fn clear_avatar(&self, user_id: &str) -> AppResult<()> {
        let user = self.user_repo.get_by_id(user_id).await?;

        if let Some(avatar_url) = &user.avatar_url {
            // Removing the row reference matters more than the object;
            // a missing file is logged and ignored.
            if let Some(key) = self.storage.key_for_url(avatar_url) {
                if let Err(e) = self.storage.delete(&key).await {
                    tracing::warn!(error = %e, %key, "Failed to delete avatar file");
                }
            }
        }

        self.user_repo.set_avatar_url(user_id, None).await?;

        Ok(())
    }
}

/// Check the username against the allowed character set.
fn validate_username(username: &str) -> AppResult<()> {
    let valid = username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || "@.+-".contains(c));

    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Username may contain only letters, digits and @/./+/-/_.".to_string(),
        ))
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
