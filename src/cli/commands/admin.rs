use std::sync::Arc;

use anyhow::Context;
use serde_json::json;

use crate::auth;
use crate::auth::TokenIssuer;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgStore};
use crate::services::AuthService;

async fn connect(config: &AppConfig) -> anyhow::Result<DatabaseManager> {
    let url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL is required for this command")?;
    DatabaseManager::connect(&config.database, url)
        .await
        .context("failed to connect to the database")
}

pub async fn create_admin(
    config: AppConfig,
    email: &str,
    password: &str,
    name: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let manager = connect(&config).await?;
    let service = AuthService::with_parts(
        Arc::new(PgStore::from_manager(&manager)),
        TokenIssuer::from_config(&config.security),
        config.security.bcrypt_cost,
    );

    let user = service.ensure_admin(email, password, name).await?;
    manager.close().await;

    output_success(
        output_format,
        "Admin account ready",
        Some(json!({ "id": user.id, "email": user.email })),
    )
}

pub fn hash_password(
    config: &AppConfig,
    password: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let hash = auth::hash_password(password, config.security.bcrypt_cost)?;
    output_success(output_format, "Password hashed", Some(json!({ "hash": hash })))
}

pub async fn migrate(config: AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let manager = connect(&config).await?;
    manager.health_check().await?;
    manager.close().await;
    output_success(output_format, "Database schema is up to date", None)
}
