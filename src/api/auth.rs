use axum::{Json, extract::State};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use super::{
    error::ApiError,
    handlers::AppState,
    types::{SuccessResponse, TokenRequest},
};
use crate::config::AuthConfig;

/// トークンを保持するCookie名
pub const TOKEN_COOKIE: &str = "token";

/// JWTクレーム
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub exp: usize,
}

/// トークン発行のエラー
#[derive(Debug, Error)]
pub enum TokenIssueError {
    #[error("Token lifetime of {0} seconds is out of range")]
    LifetimeOutOfRange(u64),
    #[error(transparent)]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// メールアドレスに対するトークンを発行する
pub fn issue_token(auth: &AuthConfig, email: &str) -> Result<String, TokenIssueError> {
    let out_of_range = || TokenIssueError::LifetimeOutOfRange(auth.jwt_expiration_seconds);
    let lifetime = i64::try_from(auth.jwt_expiration_seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(out_of_range)?;
    let expires_at = Utc::now()
        .checked_add_signed(lifetime)
        .ok_or_else(out_of_range)?;
    let claims = Claims {
        email: email.to_string(),
        exp: usize::try_from(expires_at.timestamp()).map_err(|_| out_of_range())?,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )?)
}

/// トークンを検証してクレームを返す（署名と有効期限）
pub fn verify_token(auth: &AuthConfig, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// リクエストが email 本人のものか確認する
///
/// 認証が無効（JWT_SECRET 未設定）の場合は常に許可する。
pub fn authorize_email(state: &AppState, jar: &CookieJar, email: &str) -> Result<(), ApiError> {
    let Some(auth) = state.auth.as_ref() else {
        return Ok(());
    };

    let token = jar.get(TOKEN_COOKIE).ok_or(ApiError::Unauthorized)?;
    let claims = verify_token(auth, token.value()).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        ApiError::Unauthorized
    })?;

    if claims.email != email {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

fn token_cookie(auth: &AuthConfig, value: String) -> Cookie<'static> {
    // クロスサイトのフロントエンドから送信させるには SameSite=None + Secure が必要
    let same_site = if auth.secure_cookie {
        SameSite::None
    } else {
        SameSite::Strict
    };

    Cookie::build((TOKEN_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(auth.secure_cookie)
        .same_site(same_site)
        .build()
}

/// POST /jwt - トークンを発行してCookieに設定
pub async fn create_token(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<TokenRequest>,
) -> Result<(CookieJar, Json<SuccessResponse>), ApiError> {
    let Some(auth) = state.auth.as_ref() else {
        return Err(ApiError::Unauthorized);
    };

    let token = issue_token(auth, &req.email).map_err(ApiError::TokenIssue)?;
    tracing::debug!(email = %req.email, "Token issued");

    Ok((
        jar.add(token_cookie(auth, token)),
        Json(SuccessResponse { success: true }),
    ))
}

/// GET /logout - トークンCookieを削除
///
/// 削除用Cookieは発行時と同じ属性（SameSite / Secure / Path）で返す。
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<SuccessResponse>) {
    let removal = match state.auth.as_ref() {
        Some(auth) => token_cookie(auth, String::new()),
        None => Cookie::build((TOKEN_COOKIE, "")).path("/").build(),
    };

    (jar.remove(removal), Json(SuccessResponse { success: true }))
}
