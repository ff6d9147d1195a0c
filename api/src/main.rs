use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use cms_api::application::ports::article_repository::ArticleRepository;
use cms_api::bootstrap::app_context::{AppContext, AppServices};
use cms_api::bootstrap::config::Config;
use cms_api::infrastructure::db::repositories::article_repository_sqlx::SqlxArticleRepository;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            cms_api::presentation::http::bulk_replace::search,
            cms_api::presentation::http::bulk_replace::preview,
            cms_api::presentation::http::bulk_replace::commit,
            cms_api::presentation::http::bulk_replace::history,
            cms_api::presentation::http::health::health,
        ),
        components(schemas(
            cms_api::presentation::http::bulk_replace::SearchOptionsPayload,
            cms_api::presentation::http::bulk_replace::BulkSearchRequest,
            cms_api::presentation::http::bulk_replace::BulkReplaceRequest,
            cms_api::presentation::http::bulk_replace::MatchItem,
            cms_api::presentation::http::bulk_replace::BulkStatusKind,
            cms_api::presentation::http::bulk_replace::BulkResultItem,
            cms_api::presentation::http::bulk_replace::BulkSearchResponse,
            cms_api::presentation::http::bulk_replace::MatchDetail,
            cms_api::presentation::http::bulk_replace::PreviewDetails,
            cms_api::presentation::http::bulk_replace::DiffLineKind,
            cms_api::presentation::http::bulk_replace::DiffLineItem,
            cms_api::presentation::http::bulk_replace::PreviewResultItem,
            cms_api::presentation::http::bulk_replace::BulkPreviewResponse,
            cms_api::presentation::http::bulk_replace::CommittedChange,
            cms_api::presentation::http::bulk_replace::BulkCommitResponse,
            cms_api::presentation::http::bulk_replace::ReplacementRunItem,
            cms_api::presentation::http::bulk_replace::ErrorResponse,
            cms_api::presentation::http::health::HealthResp,
        )),
        tags(
            (name = "Bulk Replace", description = "Link-aware bulk search and replace over articles"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

fn build_cors(cfg: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION]);
    match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin).allow_credentials(true),
        // In production, FRONTEND_URL is mandatory (enforced in Config), so only dev lands here
        Some(Err(_)) | None if !cfg.is_production => base
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true),
        _ => base.allow_origin(AllowOrigin::exact(HeaderValue::from_static("http://invalid"))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "cms_api=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(?cfg, "Starting CMS bulk replace backend");

    // Database
    let pool =
        cms_api::infrastructure::db::connect_pool(&cfg.database_url, cfg.db_max_connections)
            .await?;
    cms_api::infrastructure::db::migrate(&pool).await?;

    let article_repo: Arc<dyn ArticleRepository> =
        Arc::new(SqlxArticleRepository::new(pool.clone()));
    let ctx = AppContext::new(cfg.clone(), AppServices::new(article_repo));

    let app = Router::new()
        .nest(
            "/api",
            cms_api::presentation::http::health::routes(pool.clone()),
        )
        .nest(
            "/api",
            cms_api::presentation::http::bulk_replace::routes(ctx.clone()),
        )
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(build_cors(&cfg))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = ?e, "shutdown_signal_failed");
            }
            info!("Shutting down");
        })
        .await?;
    Ok(())
}
