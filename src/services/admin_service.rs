use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::auth::{AdminLoginRequest, AdminLoginResponse},
    error::{AppError, AppResult},
    models::Admin,
    response::{ApiResponse, Meta},
};

/// Validate administrator credentials against the stored argon2 hash.
/// Unknown usernames and wrong passwords fail identically, and no session
/// token is issued; the caller only learns success or failure.
pub async fn login_admin(
    pool: &DbPool,
    payload: AdminLoginRequest,
) -> AppResult<ApiResponse<AdminLoginResponse>> {
    let AdminLoginRequest { username, password } = payload;

    let username = username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Validation("username"));
    }
    if password.is_empty() {
        return Err(AppError::Validation("password"));
    }

    let admin: Option<Admin> = sqlx::query_as(
        "SELECT id, username, password_hash, created_at FROM admins WHERE username = $1",
    )
    .bind(username.as_str())
    .fetch_optional(pool)
    .await?;

    let admin = match admin {
        Some(admin) => admin,
        None => {
            tracing::info!(username = %username, "login attempt for unknown admin");
            return Err(AppError::Unauthorized);
        }
    };

    let parsed_hash = PasswordHash::new(&admin.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized);
    }

    if let Err(err) = log_audit(
        pool,
        Some(&admin.username),
        "admin_login",
        Some("admins"),
        Some(serde_json::json!({ "admin_id": admin.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Authentication successful",
        AdminLoginResponse { success: true },
        Some(Meta::empty()),
    ))
}
