use crate::handlers::error::ApiError;
use crate::handlers::mock_feed::{build_page, FeedSettings};
use crate::middleware::auth_middleware::AccessGuard;
use crate::models::all_models::{Operation, Subject};
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use log::info;
use serde::{Deserialize, Serialize};

// List Posts Query
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

// List Posts Handler
// List Posts Input: FeedQuery
// List Posts Output: FeedPage
pub async fn list_posts(
    settings: web::Data<FeedSettings>,
    query: web::Query<FeedQuery>,
) -> HttpResponse {
    let page = build_page(&settings, query.page, query.limit, &mut rand::rng());
    HttpResponse::Ok().json(page)
}

// Delete Post Response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePostResponse {
    pub message: String,
    pub acted_by: String,
}

// Delete Post Handler
// Delete Post Input: Post ID
// Delete Post Output: DeletePostResponse
pub async fn delete_post(
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let Some(subject) = req.extensions().get::<Subject>().cloned() else {
        return Err(ApiError::MissingOrMalformedToken);
    };
    let post_id = path.into_inner();

    info!("Post {} deleted by {}", post_id, subject.id);

    Ok(HttpResponse::Ok().json(DeletePostResponse {
        message: format!("Post {} deleted successfully", post_id),
        acted_by: subject.id,
    }))
}

//Config Feed Routes
// GET /feed - Paginated mock feed
// DELETE /posts/{id} - Delete a post
pub fn config_feed_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/feed", web::get().to(list_posts)).service(
        web::resource("/posts/{id}")
            .wrap(AccessGuard::new(Operation::DeletePost))
            .route(web::delete().to(delete_post)),
    );
}
