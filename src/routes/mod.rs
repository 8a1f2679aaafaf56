pub mod posts;
pub mod user_auth;

use actix_web::{web, HttpResponse};
use posts::config_feed_routes;
use user_auth::{config_protected_auth_routes, config_user_auth_routes};

// POST /login
// GET /me
// GET /feed
// DELETE /posts/{id}
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(config_user_auth_routes)
        .configure(config_protected_auth_routes)
        .configure(config_feed_routes)
        .route(
            "/",
            web::get().to(|| async { HttpResponse::Ok().body("Welcome to the Feed API") }),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn root_serves_welcome_banner() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .configure(|cfg| state.configure(cfg))
                .configure(config_routes),
        )
        .await;

        let body = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(body, web::Bytes::from_static(b"Welcome to the Feed API"));
    }
}
