use crate::handlers::auth::TokenAuthority;
use crate::handlers::error::ApiError;
use crate::handlers::policy::AccessPolicy;
use crate::models::all_models::{Operation, Subject};
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    web, Error, HttpMessage,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use log::{debug, warn};
use std::rc::Rc;

const BEARER_PREFIX: &str = "Bearer ";

/// Middleware for bearer-token authentication and role authorization.
///
/// Bound to one [`Operation`]; the roles allowed to perform it come from the
/// [`AccessPolicy`] registered as app data. On success the decoded
/// [`Subject`] is stored in the request extensions.
pub struct AccessGuard {
    operation: Operation,
}

impl AccessGuard {
    pub fn new(operation: Operation) -> Self {
        AccessGuard { operation }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AccessGuardMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AccessGuardMiddleware {
            service: Rc::new(service),
            operation: self.operation,
        })
    }
}

pub struct AccessGuardMiddleware<S> {
    service: Rc<S>,
    operation: Operation,
}

impl<S, B> Service<ServiceRequest> for AccessGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let operation = self.operation;

        Box::pin(async move {
            match authorize(&req, operation) {
                Ok(subject) => {
                    debug!("{} admitted to {}", subject.id, operation);
                    req.extensions_mut().insert(subject);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    warn!("Denied {} {} ({}): {}", req.method(), req.path(), operation, err);
                    Ok(req.error_response(err).map_into_right_body())
                }
            }
        })
    }
}

/// Returns the token following `Bearer `, or fails before any verification.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or(ApiError::MissingOrMalformedToken)
}

fn authorize(req: &ServiceRequest, operation: Operation) -> Result<Subject, ApiError> {
    let token = bearer_token(req.headers())?;

    let tokens = req
        .app_data::<web::Data<TokenAuthority>>()
        .ok_or_else(|| ApiError::Internal("token authority is not registered".to_string()))?;
    let policy = req
        .app_data::<web::Data<AccessPolicy>>()
        .ok_or_else(|| ApiError::Internal("access policy is not registered".to_string()))?;

    let subject = tokens.verify(token)?.subject();
    policy.check(operation, subject.role)?;

    Ok(subject)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::all_models::UserRole;
    use crate::state::test_support::{test_state, test_tokens, token_for};
    use actix_web::{
        http::{header::HeaderValue, StatusCode},
        test, App, HttpRequest, HttpResponse,
    };
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};

    async fn echo_subject(req: HttpRequest) -> HttpResponse {
        match req.extensions().get::<Subject>() {
            Some(subject) => HttpResponse::Ok().json(subject),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    macro_rules! guarded_app {
        () => {{
            let state = test_state();
            test::init_service(
                App::new()
                    .configure(|cfg| state.configure(cfg))
                    .service(
                        web::resource("/admin-only")
                            .wrap(AccessGuard::new(Operation::DeletePost))
                            .route(web::post().to(echo_subject)),
                    )
                    .service(
                        web::resource("/anyone")
                            .wrap(AccessGuard::new(Operation::ReadProfile))
                            .route(web::post().to(echo_subject)),
                    ),
            )
            .await
        }};
    }

    async fn call_with(uri: &str, authorization: Option<String>) -> (StatusCode, Value) {
        let app = guarded_app!();
        let mut req = test::TestRequest::post().uri(uri);
        if let Some(value) = authorization {
            req = req.insert_header((AUTHORIZATION, value));
        }
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        (status, test::read_body_json(resp).await)
    }

    #[actix_web::test]
    async fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(matches!(bearer_token(&headers), Err(ApiError::MissingOrMalformedToken)));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers).unwrap(), "");

        for malformed in ["bearer abc", "Basic dXNlcjE6cGFzczE=", "InvalidFormat token", "Bearer"] {
            headers.insert(AUTHORIZATION, HeaderValue::from_static(malformed));
            assert!(matches!(bearer_token(&headers), Err(ApiError::MissingOrMalformedToken)));
        }
    }

    #[actix_web::test]
    async fn missing_header_is_rejected() {
        let (status, body) = call_with("/admin-only", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Missing or invalid token" }));
    }

    #[actix_web::test]
    async fn malformed_header_is_rejected_before_verification() {
        // A valid admin token behind the wrong scheme still fails as malformed.
        let token = token_for("u2", UserRole::Admin);
        let (status, body) = call_with("/admin-only", Some(format!("Token {}", token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Missing or invalid token");
    }

    #[actix_web::test]
    async fn bad_token_is_rejected() {
        let (status, body) =
            call_with("/admin-only", Some("Bearer invalid-token".to_string())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token");

        let (status, body) = call_with("/admin-only", Some("Bearer ".to_string())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token");
    }

    #[actix_web::test]
    async fn expired_token_is_rejected() {
        let expired = test_tokens()
            .issue_at(
                &Subject { id: "u2".into(), role: UserRole::Admin },
                Utc::now() - Duration::hours(2),
            )
            .unwrap();
        let (status, body) = call_with("/admin-only", Some(format!("Bearer {}", expired))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token");
    }

    #[actix_web::test]
    async fn wrong_role_is_forbidden() {
        let token = token_for("u1", UserRole::User);
        let (status, body) = call_with("/admin-only", Some(format!("Bearer {}", token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Insufficient permissions");
    }

    #[actix_web::test]
    async fn admitted_subject_reaches_handler() {
        let token = token_for("u2", UserRole::Admin);
        let (status, body) = call_with("/admin-only", Some(format!("Bearer {}", token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "id": "u2", "role": "admin" }));

        let token = token_for("u1", UserRole::User);
        let (status, body) = call_with("/anyone", Some(format!("Bearer {}", token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "u1");
    }

    #[actix_web::test]
    async fn unregistered_state_is_an_internal_error() {
        let app = test::init_service(
            App::new().service(
                web::resource("/admin-only")
                    .wrap(AccessGuard::new(Operation::DeletePost))
                    .route(web::post().to(echo_subject)),
            ),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/admin-only")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token_for("u2", UserRole::Admin))))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
