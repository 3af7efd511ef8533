use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::auth::{AuthError, JwtKeys};
use crate::config::AppConfig;
use crate::database::Store;
use crate::handlers::{protected, public, query::ListQuery};
use crate::middleware::jwt_auth_middleware;
use crate::services::{
    AttachmentService, CatalogService, CompositionService, ContentService, PageRequest, TranslationService,
    UserService,
};
use crate::storage::BlobStore;


/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub blobs: Arc<dyn BlobStore>,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Result<Self, AuthError> {
        let jwt = JwtKeys::from_config(&config.security)?;
        Ok(Self {
            config: Arc::new(config),
            store,
            blobs,
            jwt,
        })
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.store.clone(), self.blobs.clone())
    }

    pub fn catalogs(&self) -> CatalogService {
        CatalogService::new(self.store.clone(), self.blobs.clone())
    }

    pub fn content(&self) -> ContentService {
        ContentService::new(self.store.clone(), self.blobs.clone())
    }

    pub fn translations(&self) -> TranslationService {
        TranslationService::new(self.store.clone())
    }

    pub fn attachments(&self) -> AttachmentService {
        AttachmentService::new(self.store.clone(), self.blobs.clone())
    }

    pub fn composition(&self) -> CompositionService {
        CompositionService::new(self.store.clone())
    }

    pub fn page_request(&self, query: &ListQuery) -> PageRequest {
        query.page(self.config.api.default_page_size)
    }
}

pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth_public_routes())
        .merge(portfolio_public_routes())
        .merge(protected_routes(state.clone()));

    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api);

    let prefix = state.config.storage.public_prefix.trim_matches('/');
    if !prefix.is_empty() {
        router = router.nest_service(&format!("/{}", prefix), ServeDir::new(&state.config.storage.root));
    }

    router
        .layer(DefaultBodyLimit::max(state.config.api.max_upload_bytes + 1024 * 1024))
        .layer(cors_layer(&state.config.security.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn auth_public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(public::register))
        .route("/login", post(public::login))
        .route("/logout", get(public::logout))
}

fn portfolio_public_routes() -> Router<AppState> {
    Router::new()
        .route("/public/user/:username", get(public::user_profile))
        .route("/public/user/:username/skill", get(public::user_skills))
        .route("/public/user/:username/experience", get(public::user_experiences))
        .route("/public/user/:username/education", get(public::user_educations))
        .route("/public/user/:username/project", get(public::user_projects))
        .route("/public/user/:username/project/:slug", get(public::user_project_detail))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(catalog_routes())
        .merge(content_routes())
        .merge(translation_routes())
        .merge(attachment_routes())
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn user_routes() -> Router<AppState> {
    use protected::user;

    Router::new()
        .route("/profile", get(user::profile))
        .route("/user", get(user::list))
        .route("/user/:id", get(user::get).put(user::put).delete(user::delete))
}

fn catalog_routes() -> Router<AppState> {
    use protected::catalog;

    Router::new()
        .route("/language", get(catalog::language_list).post(catalog::language_post))
        .route("/language/:id", get(catalog::language_get))
        .route("/skill", get(catalog::skill_list).post(catalog::skill_post))
        .route("/skill/:id", get(catalog::skill_get))
        .route("/company", get(catalog::company_list).post(catalog::company_post))
        .route("/company/:id", get(catalog::company_get))
        .route("/school", get(catalog::school_list).post(catalog::school_post))
        .route("/school/:id", get(catalog::school_get))
        .route(
            "/project-platform",
            get(catalog::project_platform_list).post(catalog::project_platform_post),
        )
        .route("/project-platform/:id", get(catalog::project_platform_get))
}

fn content_routes() -> Router<AppState> {
    use protected::content;

    Router::new()
        .route("/user-skill", post(content::skill_post))
        .route("/user-skill/:skill_id", delete(content::skill_delete))
        .route("/user-experience", post(content::experience_post))
        .route("/user-experience/:company_id", delete(content::experience_delete))
        .route("/user-education", post(content::education_post))
        .route("/user-education/:school_id", delete(content::education_delete))
        .route("/user-language", post(content::language_post))
        .route("/user-language/:language_id", delete(content::language_delete))
        .route("/user-position", post(content::position_post))
        .route("/user-position/:id", delete(content::position_delete))
        .route("/user-project", post(content::project_post))
        .route("/user-project/:id", delete(content::project_delete))
}

fn translation_routes() -> Router<AppState> {
    use protected::translation;

    Router::new()
        .route("/skill-translation", post(translation::skill_post))
        .route(
            "/skill-translation/:skill_id/:language_id",
            delete(translation::skill_delete),
        )
        .route("/project-platform-translation", post(translation::project_platform_post))
        .route(
            "/project-platform-translation/:project_platform_id/:language_id",
            delete(translation::project_platform_delete),
        )
        .route("/user-experience-translation", post(translation::experience_post))
        .route(
            "/user-experience-translation/:company_id/:language_id",
            delete(translation::experience_delete),
        )
        .route("/user-education-translation", post(translation::education_post))
        .route(
            "/user-education-translation/:school_id/:language_id",
            delete(translation::education_delete),
        )
        .route("/user-language-translation", post(translation::language_post))
        .route(
            "/user-language-translation/:select_language_id/:language_id",
            delete(translation::language_delete),
        )
        .route("/user-project-translation", post(translation::project_post))
        .route("/user-project-translation/:id", delete(translation::project_delete))
}

fn attachment_routes() -> Router<AppState> {
    use protected::attachment;

    Router::new()
        .route("/user-attachment", post(attachment::user_post))
        .route("/user-attachment/:id", delete(attachment::user_delete))
        .route("/user-project-attachment", post(attachment::project_post))
        .route("/user-project-attachment/:id", delete(attachment::project_delete))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "message": "success",
        "data": {
            "name": "Portfolio API",
            "version": version,
            "description": "Personal portfolio CMS backend with multi-language content",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/api/v1/register, /api/v1/login, /api/v1/logout (public)",
                "portfolio": "/api/v1/public/user/:username[/skill|experience|education|project] (public)",
                "catalogs": "/api/v1/language|skill|company|school|project-platform (protected)",
                "content": "/api/v1/user-* (protected)",
                "assets": "/assets/* (public)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "message": "success",
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "message": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
