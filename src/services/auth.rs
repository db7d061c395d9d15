use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{self, AuthError, TokenIssuer};
use crate::database::models::{Role, User};
use crate::database::{Store, UserStore};
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{is_valid_email, Validator};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Account operations: registration, login and password management.
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: TokenIssuer,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(state: &AppState) -> Self {
        Self::with_parts(
            state.store.clone(),
            state.tokens.clone(),
            state.config.security.bcrypt_cost,
        )
    }

    pub fn with_parts(store: Arc<dyn Store>, tokens: TokenIssuer, bcrypt_cost: u32) -> Self {
        Self {
            store,
            tokens,
            bcrypt_cost,
        }
    }

    /// Creates a regular account. Admin accounts are only made out of band.
    pub async fn register(&self, req: RegisterRequest) -> Result<Session, ApiError> {
        let email = req.email.trim().to_lowercase();
        let mut v = Validator::new();
        v.required("email", &email, "Email is required");
        if !email.is_empty() && !is_valid_email(&email) {
            v.push("email", "Please enter a valid email");
        }
        check_password(&mut v, "password", &req.password);
        v.finish()?;

        let hash = self.hash(req.password).await?;
        let user = self
            .store
            .create_user(User::new(&email, req.name.trim(), hash, Role::User))
            .await?;
        info!(user_id = %user.id, "Registered user");

        let token = self.tokens.issue(&user)?;
        Ok(Session { token, user })
    }

    pub async fn login(&self, req: LoginRequest) -> Result<Session, ApiError> {
        let email = req.email.trim().to_lowercase();
        if email.is_empty() || req.password.is_empty() {
            return Err(ApiError::bad_request("Please provide email and password"));
        }

        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        self.verify(req.password, user.password_hash.clone()).await?;

        let token = self.tokens.issue(&user)?;
        Ok(Session { token, user })
    }

    pub async fn me(&self, user_id: Uuid) -> Result<User, ApiError> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.required(
            "currentPassword",
            &req.current_password,
            "Current password is required",
        );
        check_password(&mut v, "newPassword", &req.new_password);
        v.finish()?;

        let user = self.me(user_id).await?;
        match self.verify(req.current_password, user.password_hash).await {
            Err(ApiError::AuthenticationRequired(_)) => {
                return Err(ApiError::field_error(
                    "currentPassword",
                    "Current password is incorrect",
                ))
            }
            other => other?,
        }

        let hash = self.hash(req.new_password).await?;
        self.store.update_password(user_id, &hash).await?;
        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Creates an admin account, or promotes and re-keys an existing one.
    pub async fn ensure_admin(&self, email: &str, password: &str, name: &str) -> Result<User, ApiError> {
        let email = email.trim().to_lowercase();
        let mut v = Validator::new();
        if !is_valid_email(&email) {
            v.push("email", "Please enter a valid email");
        }
        check_password(&mut v, "password", password);
        v.finish()?;

        let hash = self.hash(password.to_string()).await?;
        match self.store.find_user_by_email(&email).await? {
            Some(mut user) => {
                self.store.update_password(user.id, &hash).await?;
                self.store.set_role(user.id, Role::Admin).await?;
                user.role = Role::Admin;
                info!(user_id = %user.id, "Promoted existing user to admin");
                Ok(user)
            }
            None => {
                let user = self
                    .store
                    .create_user(User::new(&email, name, hash, Role::Admin))
                    .await?;
                info!(user_id = %user.id, "Created admin user");
                Ok(user)
            }
        }
    }

    // bcrypt runs on the blocking pool.
    async fn hash(&self, password: String) -> Result<String, ApiError> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || auth::hash_password(&password, cost))
            .await
            .map_err(|e| ApiError::internal_server_error(format!("Hashing task failed: {}", e)))?
            .map_err(ApiError::from)
    }

    async fn verify(&self, password: String, hash: String) -> Result<(), ApiError> {
        tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
            .await
            .map_err(|e| ApiError::internal_server_error(format!("Hashing task failed: {}", e)))?
            .map_err(ApiError::from)
    }
}

fn check_password(v: &mut Validator, field: &str, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        v.push(
            field,
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
    }
}
