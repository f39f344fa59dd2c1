//! Quill: a self-hostable blogging platform backend.
//!
//! Accounts register with email and password and authenticate through a
//! JWT session cookie. Posts and comments go through a moderation queue:
//! they are created unapproved, and only admin approval makes them
//! visible on the public listings. Admins also manage accounts and
//! roles. The OpenAPI description of the whole surface is served at
//! `/docs`.

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post, put},
};
use bon::Builder;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod storage;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::api::models::users::Role;
use crate::config::Config;
use crate::db::handlers::{Repository, Users};
use crate::db::models::users::UserCreateDBRequest;
use crate::storage::{DiskStore, ObjectStore};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Shared state handed to every handler.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub store: Arc<dyn ObjectStore>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::current_user,
        api::handlers::posts::list_public,
        api::handlers::posts::get_public,
        api::handlers::posts::create,
        api::handlers::posts::list_mine,
        api::handlers::posts::update,
        api::handlers::posts::delete,
        api::handlers::comments::list_for_post,
        api::handlers::comments::create,
        api::handlers::profiles::get_public,
        api::handlers::profiles::get_mine,
        api::handlers::profiles::update_mine,
        api::handlers::uploads::upload,
        api::handlers::admin::list_all_posts,
        api::handlers::admin::list_pending_posts,
        api::handlers::admin::approve_post,
        api::handlers::admin::reject_post,
        api::handlers::admin::delete_post,
        api::handlers::admin::list_all_comments,
        api::handlers::admin::list_pending_comments,
        api::handlers::admin::approve_comment,
        api::handlers::admin::reject_comment,
        api::handlers::admin::delete_comment,
        api::handlers::admin::list_users,
        api::handlers::admin::update_user_role,
        api::handlers::admin::delete_user,
    ),
    info(
        title = "Quill",
        description = "Blogging platform backend with moderated publishing"
    )
)]
struct ApiDoc;

/// Create the initial admin account if configured and not yet present.
/// Safe to run on every startup.
pub async fn create_initial_admin_user(config: &Config, pool: &PgPool) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };

    let mut tx = pool.begin().await?;
    let mut users = Users::new(&mut tx);

    if users.get_user_by_email(email).await?.is_some() {
        tracing::debug!(email = %email, "admin user already exists");
        return Ok(());
    }

    let password = password.clone();
    let password_hash = tokio::task::spawn_blocking(move || auth::password::hash_string(&password))
        .await
        .map_err(|e| anyhow::anyhow!("joining password hash task: {e}"))??;

    users
        .create(&UserCreateDBRequest {
            email: email.clone(),
            password_hash,
            role: Role::Admin,
        })
        .await?;
    tx.commit().await?;

    tracing::info!(email = %email, "created initial admin user");
    Ok(())
}

/// Build the CORS layer from configuration. Credentialed requests are
/// the norm here since the session rides in a cookie.
pub fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let origins = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("invalid CORS origin {origin:?}: {e}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(config.cors.allow_credentials)
        .max_age(config.cors.max_age))
}

/// Assemble the full router: public routes, session-gated routes, the
/// admin surface, static serving of uploads, and the API docs.
pub fn build_router(state: AppState) -> Router {
    use api::handlers::{admin, auth as auth_handlers, comments, posts, profiles, uploads};

    let uploads_dir = state.config.uploads.dir.clone();

    Router::new()
        // Auth and session
        .route("/api/register", post(auth_handlers::register))
        .route("/api/login", post(auth_handlers::login))
        .route("/api/logout", post(auth_handlers::logout))
        .route("/api/user", get(auth_handlers::current_user))
        // Posts
        .route(
            "/api/posts",
            get(posts::list_public).post(posts::create),
        )
        .route(
            "/api/posts/{id}",
            get(posts::get_public)
                .put(posts::update)
                .delete(posts::delete),
        )
        .route("/api/my-posts", get(posts::list_mine))
        // Comments
        .route(
            "/api/posts/{id}/comments",
            get(comments::list_for_post).post(comments::create),
        )
        // Profiles
        .route("/api/users/{id}/profile", get(profiles::get_public))
        .route(
            "/api/my-profile",
            get(profiles::get_mine).put(profiles::update_mine),
        )
        // Uploads
        .route("/api/upload", post(uploads::upload))
        // Moderation and user management
        .route("/api/admin/posts", get(admin::list_all_posts))
        .route("/api/admin/posts/pending", get(admin::list_pending_posts))
        .route("/api/admin/posts/{id}", delete(admin::delete_post))
        .route("/api/admin/posts/{id}/approve", put(admin::approve_post))
        .route("/api/admin/posts/{id}/reject", delete(admin::reject_post))
        .route("/api/admin/comments", get(admin::list_all_comments))
        .route(
            "/api/admin/comments/pending",
            get(admin::list_pending_comments),
        )
        .route("/api/admin/comments/{id}", delete(admin::delete_comment))
        .route(
            "/api/admin/comments/{id}/approve",
            put(admin::approve_comment),
        )
        .route(
            "/api/admin/comments/{id}/reject",
            delete(admin::reject_comment),
        )
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/{id}", delete(admin::delete_user))
        .route("/api/admin/users/{id}/role", put(admin::update_user_role))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// A fully wired application: pool connected, migrations applied,
/// initial admin created, router built.
pub struct Application {
    pub router: Router,
    pub config: Config,
    pub pool: PgPool,
}

impl Application {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let database_url = config
            .database_url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("database_url is not configured"))?;

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&database_url)
            .await?;

        MIGRATOR.run(&pool).await?;
        create_initial_admin_user(&config, &pool).await?;

        let store: Arc<dyn ObjectStore> = Arc::new(DiskStore::new(&config.uploads.dir).await?);
        let state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .store(store)
            .build();
        let router = build_router(state).layer(create_cors_layer(&config)?);

        Ok(Self {
            router,
            config,
            pool,
        })
    }

    /// Serve until the shutdown future resolves, then drain the pool.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let address = self.config.bind_address();
        let listener = tokio::net::TcpListener::bind(&address).await?;
        tracing::info!(%address, "listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        self.pool.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{auth_cookie, create_test_app, create_test_config, create_test_user};
    use axum::http::StatusCode;
    use axum::http::header::{COOKIE, SET_COOKIE};
    use serde_json::json;

    /// The value portion of the session cookie from a login response.
    fn session_cookie_value(set_cookie: &str) -> &str {
        set_cookie
            .split(';')
            .next()
            .expect("cookie has at least one part")
    }

    #[sqlx::test]
    #[test_log::test]
    async fn full_post_lifecycle(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let (admin, _) = create_test_user(&pool, Role::Admin).await;

        // Register and log in as a fresh author.
        server
            .post("/api/register")
            .json(&json!({"email": "author@example.com", "password": "hunter42"}))
            .await
            .assert_status(StatusCode::CREATED);

        let login = server
            .post("/api/login")
            .json(&json!({"email": "author@example.com", "password": "hunter42"}))
            .await;
        login.assert_status_ok();
        let cookie = session_cookie_value(login.header(SET_COOKIE).to_str().unwrap()).to_string();
        let author_cookie = HeaderValue::from_str(&cookie).unwrap();

        // Create a post. It is not publicly visible yet.
        let created = server
            .post("/api/posts")
            .add_header(COOKIE, author_cookie.clone())
            .json(&json!({"title": "Hello", "description": "First post"}))
            .await;
        created.assert_status(StatusCode::CREATED);
        let post_id = created.json::<serde_json::Value>()["id"]
            .as_str()
            .unwrap()
            .to_string();

        server
            .get(&format!("/api/posts/{post_id}"))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        // Admin approves; the post goes public.
        server
            .put(&format!("/api/admin/posts/{post_id}/approve"))
            .add_header(COOKIE, auth_cookie(admin.id))
            .await
            .assert_status_ok();

        server
            .get(&format!("/api/posts/{post_id}"))
            .await
            .assert_status_ok();

        // A different user cannot delete it.
        let (stranger, _) = create_test_user(&pool, Role::User).await;
        server
            .delete(&format!("/api/posts/{post_id}"))
            .add_header(COOKIE, auth_cookie(stranger.id))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        // The admin can, and afterwards the post is gone.
        server
            .delete(&format!("/api/admin/posts/{post_id}"))
            .add_header(COOKIE, auth_cookie(admin.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get(&format!("/api/posts/{post_id}"))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn api_docs_are_served(pool: PgPool) {
        let server = create_test_app(pool).await;
        server.get("/docs").await.assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn initial_admin_bootstrap_is_idempotent(pool: PgPool) {
        let config = Config {
            admin_email: Some("root@example.com".to_string()),
            admin_password: Some("super-secret-pass".to_string()),
            ..create_test_config()
        };

        create_initial_admin_user(&config, &pool).await.unwrap();
        create_initial_admin_user(&config, &pool).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let admin = Users::new(&mut conn)
            .get_user_by_email("root@example.com")
            .await
            .unwrap()
            .expect("admin exists");
        assert_eq!(admin.role, Role::Admin);
    }

    #[test]
    fn cors_layer_rejects_bad_origins() {
        let mut config = create_test_config();
        config.cors.allowed_origins = vec!["not a url \u{7f}".to_string()];
        assert!(create_cors_layer(&config).is_err());
    }
}
