use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use log::{error, info, warn};
use std::{rc::Rc, time::Instant};

// Request logger middleware
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestLoggerMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequestLoggerMiddleware {
            service: Rc::new(service),
        })
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_owned();
        let client_ip = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_owned();

        info!("[FEED-REQUEST] {} - {} {}", client_ip, method, path);

        let service = self.service.clone();
        Box::pin(async move {
            let res = service.call(req).await;
            let elapsed = start_time.elapsed();

            match &res {
                // Auth failures are expected traffic, but worth seeing.
                Ok(response) if response.status().is_client_error() => {
                    warn!(
                        "[FEED-RESPONSE] {} - {} {} - Status: {} - Time: {:.2?}",
                        client_ip,
                        method,
                        path,
                        response.status().as_u16(),
                        elapsed
                    );
                }
                Ok(response) => {
                    info!(
                        "[FEED-RESPONSE] {} - {} {} - Status: {} - Time: {:.2?}",
                        client_ip,
                        method,
                        path,
                        response.status().as_u16(),
                        elapsed
                    );
                }
                Err(err) => {
                    error!(
                        "[FEED-ERROR] {} - {} {} - Error: {} - Time: {:.2?}",
                        client_ip, method, path, err, elapsed
                    );
                }
            }

            res
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    #[actix_web::test]
    async fn passes_responses_through() {
        let app = test::init_service(
            App::new()
                .wrap(RequestLogger)
                .route("/ok", web::get().to(|| async { HttpResponse::Ok().body("fine") }))
                .route("/teapot", web::get().to(|| async { HttpResponse::ImATeapot().finish() })),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/ok").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, web::Bytes::from_static(b"fine"));

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/teapot").to_request()).await;
        assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
    }
}
