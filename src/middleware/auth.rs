use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::auth::{AuthError, Claims, TokenIssuer};
use crate::error::ApiError;
use crate::state::AppState;

/// What an operation demands of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

/// The authorization gate. Pure: it only inspects the verification outcome.
///
/// Absent or invalid credentials fail with 401 when anything beyond public
/// access is required; a valid non-admin credential fails admin operations
/// with 403.
pub fn authorize(
    credential: Result<Claims, AuthError>,
    required: Access,
) -> Result<Option<Claims>, ApiError> {
    match (required, credential) {
        (Access::Public, credential) => Ok(credential.ok()),
        (_, Err(e)) => Err(e.into()),
        (Access::Authenticated, Ok(claims)) => Ok(Some(claims)),
        (Access::Admin, Ok(claims)) if claims.is_admin() => Ok(Some(claims)),
        (Access::Admin, Ok(_)) => Err(ApiError::forbidden("Access denied. Admin only.")),
    }
}

fn gate(tokens: &TokenIssuer, headers: &HeaderMap, required: Access) -> Result<Option<Claims>, ApiError> {
    authorize(tokens.authenticate(headers), required)
}

/// Any caller holding a valid credential.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

/// A caller holding a valid admin credential.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

/// The caller as seen by public reads: admin only when the credential is
/// valid and carries the admin role, anonymous otherwise. Never rejects.
#[derive(Debug, Clone, PartialEq)]
pub enum Viewer {
    Anonymous,
    User(Claims),
    Admin(Claims),
}

impl Viewer {
    pub fn is_admin(&self) -> bool {
        matches!(self, Viewer::Admin(_))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match gate(&state.tokens, &parts.headers, Access::Authenticated)? {
            Some(claims) => Ok(AuthUser(claims)),
            None => Err(AuthError::MissingToken.into()),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match gate(&state.tokens, &parts.headers, Access::Admin)? {
            Some(claims) => Ok(AdminUser(claims)),
            None => Err(AuthError::MissingToken.into()),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(match gate(&state.tokens, &parts.headers, Access::Public)? {
            Some(claims) if claims.is_admin() => Viewer::Admin(claims),
            Some(claims) => Viewer::User(claims),
            None => Viewer::Anonymous,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Role;
    use uuid::Uuid;

    fn claims(role: Role) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            role,
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn admin_operations() {
        assert!(authorize(Ok(claims(Role::Admin)), Access::Admin).is_ok());

        let denied = authorize(Ok(claims(Role::User)), Access::Admin).unwrap_err();
        assert_eq!(denied.status_code(), 403);

        let missing = authorize(Err(AuthError::MissingToken), Access::Admin).unwrap_err();
        assert_eq!(missing.status_code(), 401);
    }

    #[test]
    fn public_operations_never_fail() {
        assert_eq!(
            authorize(Err(AuthError::MalformedHeader), Access::Public).unwrap(),
            None
        );
        assert!(authorize(Ok(claims(Role::User)), Access::Public)
            .unwrap()
            .is_some());
    }

    #[test]
    fn authenticated_accepts_any_role() {
        assert!(authorize(Ok(claims(Role::User)), Access::Authenticated).is_ok());
        assert_eq!(
            authorize(Err(AuthError::InvalidCredentials), Access::Authenticated)
                .unwrap_err()
                .status_code(),
            401
        );
    }
}
