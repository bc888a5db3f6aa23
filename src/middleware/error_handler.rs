use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};

// 只截取前 4KB 响应体写入日志
const LOGGED_BODY_LIMIT: usize = 4 * 1024;

pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        warn!("{} {} answered 401, client should retry", method, path);
        return response;
    }
    if !status.is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to read error response body: {}", e);
            return Response::from_parts(parts, Body::empty());
        }
    };
    let excerpt = String::from_utf8_lossy(&bytes[..bytes.len().min(LOGGED_BODY_LIMIT)]);

    error!(
        "Server error occurred - {} {} - Status: {}, Body: {}",
        method, path, status, excerpt
    );

    // body 已被读出，重建响应
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, middleware, routing::get};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn server_error_body_is_preserved() {
        let app = Router::new()
            .route(
                "/boom",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
            )
            .layer(middleware::from_fn(log_errors));

        let response = app
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"upstream exploded");
    }
}
