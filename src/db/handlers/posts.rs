//! Database repository for posts.

use async_trait::async_trait;
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::models::posts::{
    PostCreateDBRequest, PostDBResponse, PostUpdateDBRequest, PostWithOwnerDBResponse,
};
use crate::types::{PostId, UserId, abbrev_uuid};

/// Filter for post listings. `None` fields match everything, so the admin
/// views reuse the same query as the owner-scoped ones.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub owner: Option<UserId>,
    pub approved: Option<bool>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

pub struct Posts<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Posts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Approved posts joined with their authors, newest first.
    #[instrument(skip(self), err)]
    pub async fn list_approved_with_owner(
        &mut self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostWithOwnerDBResponse>> {
        let posts = sqlx::query_as::<_, PostWithOwnerDBResponse>(
            r#"
            SELECT p.id, p.title, p.description, p.image, p.user_id,
                   p.is_approved, p.created_at, p.updated_at,
                   u.first_name AS owner_first_name,
                   u.last_name AS owner_last_name,
                   u.picture_url AS owner_picture_url
            FROM posts p
            JOIN users u ON u.id = p.user_id
            WHERE p.is_approved = TRUE
            ORDER BY p.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(posts)
    }

    /// A single approved post with its author, `None` if the post is
    /// missing or still pending moderation.
    #[instrument(skip(self), fields(post_id = %abbrev_uuid(&id)), err)]
    pub async fn get_approved_with_owner(
        &mut self,
        id: PostId,
    ) -> Result<Option<PostWithOwnerDBResponse>> {
        let post = sqlx::query_as::<_, PostWithOwnerDBResponse>(
            r#"
            SELECT p.id, p.title, p.description, p.image, p.user_id,
                   p.is_approved, p.created_at, p.updated_at,
                   u.first_name AS owner_first_name,
                   u.last_name AS owner_last_name,
                   u.picture_url AS owner_picture_url
            FROM posts p
            JOIN users u ON u.id = p.user_id
            WHERE p.id = $1 AND p.is_approved = TRUE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(post)
    }

    /// Posts awaiting moderation, newest first, with their authors.
    #[instrument(skip(self), err)]
    pub async fn list_pending_with_owner(&mut self) -> Result<Vec<PostWithOwnerDBResponse>> {
        let posts = sqlx::query_as::<_, PostWithOwnerDBResponse>(
            r#"
            SELECT p.id, p.title, p.description, p.image, p.user_id,
                   p.is_approved, p.created_at, p.updated_at,
                   u.first_name AS owner_first_name,
                   u.last_name AS owner_last_name,
                   u.picture_url AS owner_picture_url
            FROM posts p
            JOIN users u ON u.id = p.user_id
            WHERE p.is_approved = FALSE
            ORDER BY p.created_at DESC
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(posts)
    }

    /// Mark a post as approved. Already-approved posts are left as-is.
    #[instrument(skip(self), fields(post_id = %abbrev_uuid(&id)), err)]
    pub async fn approve(&mut self, id: PostId) -> Result<PostDBResponse> {
        let post = sqlx::query_as::<_, PostDBResponse>(
            r#"
            UPDATE posts SET is_approved = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(post)
    }

    /// Number of posts matching the filter, for pagination metadata.
    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &PostFilter) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM posts
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::boolean IS NULL OR is_approved = $2)
            "#,
        )
        .bind(filter.owner)
        .bind(filter.approved)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }
}

#[async_trait]
impl Repository for Posts<'_> {
    type CreateRequest = PostCreateDBRequest;
    type UpdateRequest = PostUpdateDBRequest;
    type Response = PostDBResponse;
    type Id = PostId;
    type Filter = PostFilter;

    /// New posts always start unapproved, regardless of caller input.
    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id = Uuid::new_v4();

        let post = sqlx::query_as::<_, PostDBResponse>(
            r#"
            INSERT INTO posts (id, title, description, image, user_id, is_approved)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.image)
        .bind(request.user_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(post)
    }

    #[instrument(skip(self), fields(post_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let post = sqlx::query_as::<_, PostDBResponse>("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(post)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let limit = filter.limit.unwrap_or(100);
        let skip = filter.skip.unwrap_or(0);

        let posts = sqlx::query_as::<_, PostDBResponse>(
            r#"
            SELECT * FROM posts
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::boolean IS NULL OR is_approved = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.owner)
        .bind(filter.approved)
        .bind(limit)
        .bind(skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(posts)
    }

    /// Partial update. The approval flag is never touched here, so an
    /// already-published post stays published after an edit.
    #[instrument(skip(self, request), fields(post_id = %abbrev_uuid(&id)), err)]
    async fn update(
        &mut self,
        id: Self::Id,
        request: &Self::UpdateRequest,
    ) -> Result<Self::Response> {
        let post = sqlx::query_as::<_, PostDBResponse>(
            r#"
            UPDATE posts SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                image = COALESCE($4, image),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.image)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(post)
    }

    #[instrument(skip(self), fields(post_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::handlers::users::Users;
    use crate::db::models::users::UserCreateDBRequest;
    use sqlx::PgPool;

    async fn seed_user(conn: &mut PgConnection, email: &str) -> UserId {
        let mut users = Users::new(conn);
        users
            .create(&UserCreateDBRequest {
                email: email.to_string(),
                password_hash: "hash".to_string(),
                role: Role::User,
            })
            .await
            .unwrap()
            .id
    }

    fn make_post(user_id: UserId, title: &str) -> PostCreateDBRequest {
        PostCreateDBRequest {
            title: title.to_string(),
            description: "a description".to_string(),
            image: None,
            user_id,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn new_posts_start_unapproved(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let author = seed_user(&mut conn, "author@example.com").await;

        let mut posts = Posts::new(&mut conn);
        let post = posts.create(&make_post(author, "First")).await.unwrap();
        assert!(!post.is_approved);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn approved_listing_excludes_pending_and_orders_newest_first(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let author = seed_user(&mut conn, "author@example.com").await;

        let mut posts = Posts::new(&mut conn);
        let older = posts.create(&make_post(author, "Older")).await.unwrap();
        let newer = posts.create(&make_post(author, "Newer")).await.unwrap();
        posts.create(&make_post(author, "Pending")).await.unwrap();

        posts.approve(older.id).await.unwrap();
        posts.approve(newer.id).await.unwrap();

        let listed = posts.list_approved_with_owner(10, 0).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn approve_is_idempotent(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let author = seed_user(&mut conn, "author@example.com").await;

        let mut posts = Posts::new(&mut conn);
        let post = posts.create(&make_post(author, "Title")).await.unwrap();

        let first = posts.approve(post.id).await.unwrap();
        let second = posts.approve(post.id).await.unwrap();
        assert!(first.is_approved);
        assert!(second.is_approved);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn approve_missing_post_is_not_found(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut posts = Posts::new(&mut conn);

        let err = posts.approve(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn update_preserves_approval(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let author = seed_user(&mut conn, "author@example.com").await;

        let mut posts = Posts::new(&mut conn);
        let post = posts.create(&make_post(author, "Title")).await.unwrap();
        posts.approve(post.id).await.unwrap();

        let updated = posts
            .update(
                post.id,
                &PostUpdateDBRequest {
                    title: Some("New title".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "New title");
        assert_eq!(updated.description, "a description");
        assert!(updated.is_approved);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn owner_filter_lists_all_statuses(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let author = seed_user(&mut conn, "author@example.com").await;
        let other = seed_user(&mut conn, "other@example.com").await;

        let mut posts = Posts::new(&mut conn);
        let mine = posts.create(&make_post(author, "Mine")).await.unwrap();
        posts.approve(mine.id).await.unwrap();
        posts
            .create(&make_post(author, "Mine pending"))
            .await
            .unwrap();
        posts.create(&make_post(other, "Theirs")).await.unwrap();

        let filter = PostFilter {
            owner: Some(author),
            ..Default::default()
        };
        let listed = posts.list(&filter).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(posts.count(&filter).await.unwrap(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn deleting_user_cascades_to_posts(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let author = seed_user(&mut conn, "author@example.com").await;

        let post_id = {
            let mut posts = Posts::new(&mut conn);
            posts.create(&make_post(author, "Title")).await.unwrap().id
        };

        let mut users = Users::new(&mut conn);
        assert!(users.delete(author).await.unwrap());

        let mut posts = Posts::new(&mut conn);
        assert!(posts.get_by_id(post_id).await.unwrap().is_none());
    }
}
