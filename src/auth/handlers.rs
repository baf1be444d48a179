use crate::{
    auth::{
        auth::bearer_token,
        jwt::{Subject, generate_access_token, generate_refresh_token, verify_token},
        password::verify_password,
    },
    config::Config,
    error::AppError,
    model::{role::Role, user::User},
    models::{Claims, LoginReqDto, LoginResponse, TokenPair, TokenType, UserIdentity},
};
use actix_web::{HttpRequest, HttpResponse, web};
use sqlx::{MySql, MySqlPool, Transaction};
use tracing::{debug, error, info, instrument, warn};

fn db_failure(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        error!(error = %e, "{}", context);
        AppError::Internal(format!("{}: {}", context, e))
    }
}

fn token_failure(e: jsonwebtoken::errors::Error) -> AppError {
    error!(error = %e, "Failed to sign token");
    AppError::Internal(format!("Failed to sign token: {}", e))
}

async fn store_refresh_token(
    tx: &mut Transaction<'_, MySql>,
    claims: &Claims,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(claims.user_id)
    .bind(&claims.jti)
    .bind(claims.exp as i64)
    .execute(&mut **tx)
    .await
    .map_err(db_failure("Failed to store refresh token"))?;
    Ok(())
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Tokens and caller identity", body = LoginResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return Err(AppError::invalid("Username or password required"));
    }

    let db_user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, role_id, employee_id, is_active
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(user.username.trim())
    .fetch_optional(pool.get_ref())
    .await
    .map_err(db_failure("Database error while fetching user"))?;

    let Some(db_user) = db_user.filter(|u| u.is_active) else {
        info!("Invalid credentials: unknown or inactive user");
        return Err(AppError::Unauthorized("Invalid credentials"));
    };

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(AppError::Unauthorized("Invalid credentials"));
    }

    let role = Role::from_id(db_user.role_id).ok_or_else(|| {
        error!(role_id = db_user.role_id, "User has an unknown role");
        AppError::Internal(format!("unknown role id {}", db_user.role_id))
    })?;

    let subject = Subject {
        user_id: db_user.id,
        username: db_user.username.clone(),
        role: db_user.role_id,
        employee_id: db_user.employee_id,
    };

    let access_token =
        generate_access_token(&subject, &config.jwt_secret, config.access_token_ttl)
            .map_err(token_failure)?;
    let (refresh_token, refresh_claims) =
        generate_refresh_token(&subject, &config.jwt_secret, config.refresh_token_ttl)
            .map_err(token_failure)?;

    debug!(user_id = db_user.id, jti = %refresh_claims.jti, "Storing refresh token");

    let mut tx = pool
        .begin()
        .await
        .map_err(db_failure("Failed to open transaction"))?;
    store_refresh_token(&mut tx, &refresh_claims).await?;
    tx.commit()
        .await
        .map_err(db_failure("Failed to commit refresh token"))?;

    // Non-fatal.
    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW(3) WHERE id = ?")
        .bind(db_user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!(user_id = db_user.id, role = role.as_str(), "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
        user: UserIdentity {
            id: db_user.id,
            username: db_user.username,
            role: role.as_str().to_string(),
            employee_id: db_user.employee_id,
        },
    }))
}

/// Rotate a refresh token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Missing, revoked or non-refresh token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_refresh", skip_all)]
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(req.headers())?;

    let claims = verify_token(token, &config.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token"))?;

    if claims.token_type != TokenType::Refresh {
        return Err(AppError::Unauthorized("Refresh token required"));
    }

    let mut tx = pool
        .begin()
        .await
        .map_err(db_failure("Failed to open transaction"))?;

    // Revoking under the row lock makes each refresh token single-use.
    let revoked = sqlx::query_scalar::<_, i8>(
        "SELECT revoked FROM refresh_tokens WHERE jti = ? FOR UPDATE",
    )
    .bind(&claims.jti)
    .fetch_optional(&mut *tx)
    .await
    .map_err(db_failure("Failed to load refresh token"))?;

    if revoked != Some(0) {
        warn!(user_id = claims.user_id, "Refresh with unknown or revoked token");
        return Err(AppError::Unauthorized("Invalid or expired token"));
    }

    sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE jti = ?")
        .bind(&claims.jti)
        .execute(&mut *tx)
        .await
        .map_err(db_failure("Failed to revoke refresh token"))?;

    let subject = Subject::from(&claims);
    let (new_refresh_token, new_claims) =
        generate_refresh_token(&subject, &config.jwt_secret, config.refresh_token_ttl)
            .map_err(token_failure)?;
    store_refresh_token(&mut tx, &new_claims).await?;

    tx.commit()
        .await
        .map_err(db_failure("Failed to commit token rotation"))?;

    let access_token =
        generate_access_token(&subject, &config.jwt_secret, config.access_token_ttl)
            .map_err(token_failure)?;

    info!(user_id = claims.user_id, "Refresh token rotated");

    Ok(HttpResponse::Ok().json(TokenPair {
        access_token,
        refresh_token: new_refresh_token,
    }))
}

/// Revoke a refresh token
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Logged out (idempotent)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> HttpResponse {
    let Ok(token) = bearer_token(req.headers()) else {
        return HttpResponse::NoContent().finish();
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) if c.token_type == TokenType::Refresh => c,
        _ => return HttpResponse::NoContent().finish(),
    };

    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token on logout");
    }

    HttpResponse::NoContent().finish()
}
