mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;
use portfolio_api::auth::Claims;
use portfolio_api::database::models::Role;

#[tokio::test]
async fn register_issues_user_token_and_hides_hash() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/register",
            None,
            json!({ "email": "  Visitor@Example.com ", "password": "secret123", "name": "Visitor" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], "visitor@example.com");
    assert_eq!(body["data"]["user"]["role"], "user");
    assert!(body["data"]["user"].get("passwordHash").is_none());
    assert!(body["data"]["user"].get("password_hash").is_none());

    let token = body["data"]["token"].as_str().unwrap();
    let (status, me) = app.get("/api/auth/me", Some(token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["email"], "visitor@example.com");
    Ok(())
}

#[tokio::test]
async fn register_rejects_duplicates_and_short_passwords() -> Result<()> {
    let app = TestApp::new();
    app.user_token("taken@example.com").await?;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/register",
            None,
            json!({ "email": "TAKEN@example.com", "password": "secret123" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/register",
            None,
            json!({ "email": "new@example.com", "password": "12345" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "password");
    Ok(())
}

#[tokio::test]
async fn login_checks_credentials() -> Result<()> {
    let app = TestApp::new();
    app.admin_token().await?;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": common::ADMIN_EMAIL, "password": common::ADMIN_PASSWORD }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["user"]["role"], "admin");

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": common::ADMIN_EMAIL, "password": "wrong-password" }),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": "nobody@example.com", "password": "whatever" }),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn change_password_requires_current_password() -> Result<()> {
    let app = TestApp::new();
    let token = app.user_token("changer@example.com").await?;

    let (status, body) = app
        .json(
            Method::PUT,
            "/api/auth/change-password",
            Some(&token),
            json!({ "currentPassword": "not-it", "newPassword": "another123" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Current password is incorrect");

    let (status, _) = app
        .json(
            Method::PUT,
            "/api/auth/change-password",
            Some(&token),
            json!({ "currentPassword": "secret123", "newPassword": "another123" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": "changer@example.com", "password": "another123" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn gate_distinguishes_missing_invalid_and_non_admin() -> Result<()> {
    let app = TestApp::new();
    let user = app.user_token("plain@example.com").await?;

    let (status, body) = app.get("/api/messages", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/api/messages", Some("not-a-jwt")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/api/messages", Some(&user)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied. Admin only.");

    let (status, _) = app.get("/api/auth/me", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn expired_credentials_are_rejected() -> Result<()> {
    let app = TestApp::new();
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: uuid::Uuid::new_v4(),
        role: Role::Admin,
        iat: now - 7200,
        exp: now - 3600,
    };
    let expired = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(
            app.state.config.security.jwt_secret.as_bytes(),
        ),
    )?;

    let (status, body) = app.get("/api/messages", Some(&expired)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");

    // Public reads ignore the stale credential rather than failing.
    let (status, _) = app.get("/api/projects", Some(&expired)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
