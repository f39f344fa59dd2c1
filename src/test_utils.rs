//! Shared helpers for the test suite.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum_test::TestServer;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::models::users::Role;
use crate::auth::password::{Argon2Params, hash_string_with_params};
use crate::auth::session::create_session_token;
use crate::build_router;
use crate::config::{Config, UploadsConfig};
use crate::db::handlers::{Comments, Posts, Repository, Users};
use crate::db::models::comments::{CommentCreateDBRequest, CommentDBResponse};
use crate::db::models::posts::{PostCreateDBRequest, PostDBResponse};
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use crate::storage::{DiskStore, ObjectStore};
use crate::types::{PostId, UserId};
use crate::AppState;

pub const TEST_SECRET: &str = "test-secret-key";

/// Low-cost hashing so user factories do not dominate test runtime. The
/// parameters ride along in the PHC string, so verification still works.
const TEST_HASH_PARAMS: Argon2Params = Argon2Params {
    memory_kib: 1024,
    iterations: 1,
    parallelism: 1,
};

/// Deterministic test configuration with a unique uploads directory.
pub fn create_test_config() -> Config {
    let mut config = Config {
        secret_key: TEST_SECRET.to_string(),
        uploads: UploadsConfig {
            dir: std::env::temp_dir().join(format!("quill-test-{}", Uuid::new_v4().simple())),
        },
        ..Default::default()
    };
    config.auth.session.cookie_secure = false;
    config
}

/// Spin up the full router over the given pool behind a [`TestServer`].
pub async fn create_test_app(pool: PgPool) -> TestServer {
    let config = create_test_config();
    let store: Arc<dyn ObjectStore> = Arc::new(
        DiskStore::new(&config.uploads.dir)
            .await
            .expect("create upload dir"),
    );

    let state = AppState::builder()
        .db(pool)
        .config(config)
        .store(store)
        .build();

    TestServer::new(build_router(state)).expect("start test server")
}

/// A `Cookie` header value carrying a valid session for the user.
pub fn auth_cookie(user_id: UserId) -> HeaderValue {
    let config = create_test_config();
    let token = create_session_token(user_id, TEST_SECRET, config.auth.session.timeout)
        .expect("sign session token");
    HeaderValue::from_str(&format!("{}={}", config.auth.session.cookie_name, token))
        .expect("valid header value")
}

/// Insert a user with a unique email. Returns the row and the plaintext
/// password it was created with.
pub async fn create_test_user(pool: &PgPool, role: Role) -> (UserDBResponse, String) {
    let password = "correct-horse-battery".to_string();
    let password_hash =
        hash_string_with_params(&password, TEST_HASH_PARAMS).expect("hash password");

    let mut conn = pool.acquire().await.expect("acquire connection");
    let user = Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            email: format!("{}@example.com", Uuid::new_v4().simple()),
            password_hash,
            role,
        })
        .await
        .expect("create test user");

    (user, password)
}

pub async fn create_test_post(
    pool: &PgPool,
    user_id: UserId,
    title: &str,
    approved: bool,
) -> PostDBResponse {
    let mut conn = pool.acquire().await.expect("acquire connection");
    let mut posts = Posts::new(&mut conn);

    let post = posts
        .create(&PostCreateDBRequest {
            title: title.to_string(),
            description: "a description".to_string(),
            image: None,
            user_id,
        })
        .await
        .expect("create test post");

    if approved {
        posts.approve(post.id).await.expect("approve test post")
    } else {
        post
    }
}

pub async fn create_test_comment(
    pool: &PgPool,
    user_id: UserId,
    post_id: PostId,
    content: &str,
    approved: bool,
) -> CommentDBResponse {
    let mut conn = pool.acquire().await.expect("acquire connection");
    let mut comments = Comments::new(&mut conn);

    let comment = comments
        .create(&CommentCreateDBRequest {
            content: content.to_string(),
            user_id,
            post_id,
        })
        .await
        .expect("create test comment");

    if approved {
        comments
            .approve(comment.id)
            .await
            .expect("approve test comment")
    } else {
        comment
    }
}
