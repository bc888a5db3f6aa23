use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::{AppState, middleware::log_errors, routes};

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(routes::alive))
        .route(
            "/sendMessage",
            post(routes::message::send_message)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        // 上传目录与表单页面按静态文件直接提供
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(log_errors)),
        );

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    router.with_state(state)
}
