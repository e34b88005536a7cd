/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use lms_api::{app::{build_router, AppState}, config::Config};
/// use lms_shared::{db::pool::create_pool, store::PgStore};
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{guard::guard, security::SecurityHeadersLayer},
    routes,
    services::{AuthService, BoardService, CourseService, ProgressService, UserService},
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use lms_shared::{
    auth::strategy::{AdminOnly, Combined, UserOnly},
    store::Store,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    pub auth: AuthService,
    pub users: UserService,
    pub courses: CourseService,
    pub progress: ProgressService,
    pub board: BoardService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let ttl = chrono::Duration::seconds(config.jwt.expiry_seconds);

        Self {
            auth: AuthService::new(store.clone(), config.jwt.secret.clone(), ttl),
            users: UserService::new(store.clone()),
            courses: CourseService::new(store.clone()),
            progress: ProgressService::new(store.clone()),
            board: BoardService::new(store.clone()),
            store,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete router
///
/// ```text
/// /health                         store check (public)
/// /api/v1/auth/login              POST
/// /api/v1/users/...               Combined guard
/// /api/v1/course/...              course tree, board, progress
/// ```
///
/// Layers, outermost last: tracing, CORS, security headers.
pub fn build_router(state: AppState) -> Router {
    let admin = from_fn_with_state(state.clone(), guard::<AdminOnly>);
    let learner = from_fn_with_state(state.clone(), guard::<UserOnly>);
    let any_user = from_fn_with_state(state.clone(), guard::<Combined>);

    let auth_routes = Router::new().route("/login", post(routes::auth::login));

    let user_routes = Router::new()
        .route("/", get(routes::users::get_all_users).post(routes::users::create_user))
        .route(
            "/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route("/changePassword/:id", put(routes::users::change_password))
        .route_layer(any_user.clone());

    let course_routes = Router::new()
        // Courses
        .route("/", get(routes::courses::get_all_courses).post(routes::courses::create_course))
        .route(
            "/:id",
            get(routes::courses::get_course)
                .put(routes::courses::update_course)
                .delete(routes::courses::delete_course),
        )
        .route("/assign", post(routes::courses::assign_course).route_layer(admin.clone()))
        .route("/assigned/:id", get(routes::courses::get_all_assigned_courses))
        .route("/report/:id", get(routes::courses::get_course_report).route_layer(admin.clone()))
        // Modules
        .route("/modules/:id", get(routes::courses::get_all_modules))
        .route("/user-modules/:id", get(routes::courses::get_all_user_modules))
        .route("/module", post(routes::courses::create_module))
        .route(
            "/module/:id",
            get(routes::courses::get_module)
                .put(routes::courses::update_module)
                .delete(routes::courses::delete_module),
        )
        // Chapters
        .route("/chapters/:id", get(routes::courses::get_all_chapters))
        .route("/chapter", post(routes::courses::create_chapter))
        .route(
            "/chapter/:id",
            get(routes::courses::get_chapter)
                .put(routes::courses::update_chapter)
                .delete(routes::courses::delete_chapter),
        )
        // Sections
        .route("/sections/:id", get(routes::courses::get_all_sections))
        .route(
            "/user-sections/:id",
            get(routes::courses::get_all_user_sections).route_layer(any_user.clone()),
        )
        .route("/section", post(routes::courses::create_section))
        .route(
            "/section/:id",
            get(routes::courses::get_section)
                .put(routes::courses::update_section)
                .delete(routes::courses::delete_section),
        )
        // Board
        .route(
            "/:id/posts",
            get(routes::board::get_all_posts).merge(post(routes::board::create_post).route_layer(any_user.clone())),
        )
        .route(
            "/post/:id",
            get(routes::board::get_post)
                .put(routes::board::update_post)
                .delete(routes::board::delete_post),
        )
        .route(
            "/post/:id/comments",
            get(routes::board::get_post_comments)
                .merge(post(routes::board::create_post_comment).route_layer(any_user.clone())),
        )
        .route(
            "/comment/:id",
            put(routes::board::update_post_comment).delete(routes::board::delete_post_comment),
        )
        .route(
            "/policies",
            get(routes::board::get_user_policies)
                .post(routes::board::create_policies)
                .route_layer(any_user)
                .merge(axum::routing::delete(routes::board::delete_policies).route_layer(admin)),
        )
        // Progress
        .route("/progress", post(routes::progress::update_user_chapter_progress).route_layer(learner.clone()))
        .route("/progress/:user_id/:course_id", get(routes::progress::get_user_chapter_progress))
        .route("/last-seen", put(routes::progress::update_last_seen).route_layer(learner))
        .route("/last-seen/:user_id/:course_id", get(routes::progress::get_last_seen));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/course", course_routes);

    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// `*` mirrors the request origin so credentials stay allowed
fn cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::HEAD,
        Method::PUT,
        Method::PATCH,
        Method::POST,
        Method::DELETE,
    ];

    if config.cors_allows_any() {
        return CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_methods(methods)
            .allow_credentials(true);
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
