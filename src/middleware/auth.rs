use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// JWT claims issued at login. `sub` carries the user's UUID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

fn unauthorized(code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response()
}

fn extract_claims(req: &Request) -> Result<Claims, Response> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("missing_authorization"))?;
    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("bad_authorization"))?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("unsupported_scheme"))?;

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| unauthorized("invalid_token"))
}

/// Guards a route tree: rejects requests without a valid HS256 bearer token
/// and stores the decoded claims as a request extension for handlers.
pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    match extract_claims(&req) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(rejection) => rejection,
    }
}
