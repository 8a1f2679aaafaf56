use crate::handlers::auth::{issue_credential, TokenAuthority};
use crate::handlers::directory::CredentialDirectory;
use crate::handlers::error::ApiError;
use crate::middleware::auth_middleware::AccessGuard;
use crate::models::all_models::{Operation, Subject};
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use serde::Deserialize;

//Login Request
// Absent fields fall through to the credential check.
#[derive(Deserialize, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    /// Only JSON bodies are read; any other body (or none) is an empty request.
    pub fn from_body(req: &HttpRequest, body: &[u8]) -> Result<Self, ApiError> {
        if !req.content_type().eq_ignore_ascii_case("application/json") || body.is_empty() {
            return Ok(LoginRequest::default());
        }
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))
    }
}

//Login
//Login Input: LoginRequest
//Login Output: IssuedCredential { token, user: { id, role } }
pub async fn login(
    req: HttpRequest,
    directory: web::Data<dyn CredentialDirectory>,
    tokens: web::Data<TokenAuthority>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let payload = LoginRequest::from_body(&req, &body)?;
    let issued = issue_credential(
        directory.get_ref(),
        tokens.get_ref(),
        &payload.username,
        &payload.password,
    )?;
    Ok(HttpResponse::Ok().json(issued))
}

//Current User
//Current User Input: HttpRequest(JWT Token)
//Current User Output: Subject
pub async fn current_user(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let subject = req
        .extensions()
        .get::<Subject>()
        .cloned()
        .ok_or(ApiError::MissingOrMalformedToken)?;
    Ok(HttpResponse::Ok().json(subject))
}

//Config User Auth Routes
// POST /login
pub fn config_user_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(login));
}

//Config Protected Auth Routes
// GET /me
pub fn config_protected_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/me")
            .wrap(AccessGuard::new(Operation::ReadProfile))
            .route(web::get().to(current_user)),
    );
}
